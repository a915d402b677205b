//! Integration test harness for metcalc.
//!
//! Provides an in-memory field store and an evaluation context loaded from
//! YAML, so tests can run equations end to end: expression → registry →
//! operators → field cache → retrieval.

use chrono::Duration;
use metcalc_eqtn_db::{Field, FieldDatabase, FieldDescriptor, FieldKind, MemorySource, Surface};
use metcalc_foundation::{fit_grid, EvalConfig, EvalContext, Grid, MapProjection, Point, Value};
use metcalc_runtime::{Evaluator, Expr};

// Ensure functions are registered
use metcalc_functions as _;

/// Source name used for every harness field.
pub const SOURCE: &str = "test";

/// Evaluation context plus an in-memory field store.
pub struct TestHarness {
    ctx: EvalContext,
    db: FieldDatabase<MemorySource>,
}

impl TestHarness {
    /// Create a harness from an `EvalConfig` YAML document.
    ///
    /// # Panics
    ///
    /// Panics if the configuration does not parse or validate.
    pub fn from_config(yaml: &str) -> Self {
        let config = match EvalConfig::from_yaml(yaml) {
            Ok(c) => c,
            Err(e) => panic!("invalid config: {e}"),
        };
        Self {
            ctx: config.into_context(),
            db: FieldDatabase::new(MemorySource::new()),
        }
    }

    pub fn ctx(&self) -> &EvalContext {
        &self.ctx
    }

    pub fn ctx_mut(&mut self) -> &mut EvalContext {
        &mut self.ctx
    }

    pub fn db(&self) -> &FieldDatabase<MemorySource> {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut FieldDatabase<MemorySource> {
        &mut self.db
    }

    /// Descriptor of a continuous harness field.
    pub fn descriptor(element: &str, level: &str) -> FieldDescriptor {
        FieldDescriptor::new(SOURCE, element, level, FieldKind::Continuous)
    }

    /// Leaf expression reading a harness field at the context's valid time.
    pub fn field(element: &str, level: &str) -> Expr {
        Expr::field(Self::descriptor(element, level))
    }

    /// Store a surface valid `minutes` after the context's valid time,
    /// fitted through `f` at every node of the default grid.
    ///
    /// # Panics
    ///
    /// Panics if the context has no usable default grid.
    pub fn add_surface(
        &mut self,
        element: &str,
        level: &str,
        minutes: i64,
        f: impl Fn(Point) -> f64 + Sync,
    ) -> &mut Self {
        let field = Field::Surface(Surface::scalar(self.fit(f)));
        self.add_field(element, level, FieldKind::Continuous, minutes, field)
    }

    /// Store any field valid `minutes` after the context's valid time.
    pub fn add_field(
        &mut self,
        element: &str,
        level: &str,
        kind: FieldKind,
        minutes: i64,
        field: Field,
    ) -> &mut Self {
        let like = Self::descriptor(element, level)
            .with_valid_time(self.ctx.valid_time + Duration::minutes(minutes));
        self.db
            .source_mut()
            .metafile_mut(&like, &self.ctx.projection)
            .insert(element, level, kind, field);
        self
    }

    /// Store a continuous field under `subsource`, in a metafile read on
    /// `projection` instead of the context's.
    pub fn add_field_on(
        &mut self,
        subsource: &str,
        projection: &MapProjection,
        element: &str,
        level: &str,
        field: Field,
    ) -> &mut Self {
        let like = Self::descriptor(element, level)
            .with_subsource(subsource)
            .with_valid_time(self.ctx.valid_time);
        self.db
            .source_mut()
            .metafile_mut(&like, projection)
            .insert(element, level, FieldKind::Continuous, field);
        self
    }

    fn fit(&self, f: impl Fn(Point) -> f64 + Sync) -> metcalc_foundation::Spline {
        let grid = match self.ctx.default_grid() {
            Ok(g) => g,
            Err(e) => panic!("harness needs a default grid: {e}"),
        };
        let nodes = Grid::from_fn(grid.nx, grid.ny, grid.cell_size, |ix, iy| {
            f(grid.node(ix, iy))
        });
        match fit_grid(&nodes, Point::default(), &self.ctx.projection) {
            Ok(s) => s,
            Err(e) => panic!("cannot fit harness surface: {e}"),
        }
    }

    /// Evaluate an expression under the harness context.
    pub fn evaluate(&mut self, expr: &Expr) -> metcalc_runtime::Result<Value> {
        Evaluator::new(&mut self.db).evaluate(expr, &self.ctx)
    }

    /// Evaluate under a copy of the context restricted to `points`.
    pub fn evaluate_at(
        &mut self,
        expr: &Expr,
        points: Vec<Point>,
    ) -> metcalc_runtime::Result<Value> {
        let ctx = self.ctx.clone().with_points(points);
        Evaluator::new(&mut self.db).evaluate(expr, &ctx)
    }
}

/// Values of a VectorList result.
///
/// # Panics
///
/// Panics on any other value kind.
pub fn point_values(value: &Value) -> &[f64] {
    match value.as_vlist() {
        Some(list) => &list.values,
        None => panic!("expected a vector list, got {}", value.kind()),
    }
}

/// Node values of a Grid result.
///
/// # Panics
///
/// Panics on any other value kind.
pub fn grid_values(value: &Value) -> &[f64] {
    match value.as_grid() {
        Some(grid) => &grid.data,
        None => panic!("expected a grid, got {}", value.kind()),
    }
}
