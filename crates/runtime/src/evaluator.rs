//! Expression evaluator
//!
//! Walks an [`Expr`] bottom-up. Calls are resolved through the function
//! registry; field leaves are read through the [`FieldDatabase`] on the
//! context projection, so vector components arrive rotated into its frame.
//!
//! In pointwise mode an argument is still evaluated over the whole default
//! grid when its function cannot take it pointwise (spatial derivatives need
//! the surface around each point). The demand propagates down: everything
//! beneath such an argument is evaluated in field mode too.

use metcalc_eqtn_db::{
    FieldDatabase, FieldDescriptor, FieldSource, Geometry, StandardGeometry, Surface,
};
use metcalc_foundation::{EvalContext, Value, VectorList};
use metcalc_functions::{find, FunctionClass, FunctionDescriptor};
use tracing::{debug, instrument, trace, warn};

use crate::error::{Error, Result};
use crate::expr::Expr;

/// Evaluates operator trees against a field database.
pub struct Evaluator<'db, S, G = StandardGeometry> {
    db: &'db mut FieldDatabase<S, G>,
}

impl<'db, S: FieldSource, G: Geometry> Evaluator<'db, S, G> {
    pub fn new(db: &'db mut FieldDatabase<S, G>) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &FieldDatabase<S, G> {
        self.db
    }

    /// Evaluate `expr` under `ctx`.
    ///
    /// The result is a VectorList over the evaluation points in pointwise
    /// mode, otherwise a Scalar, Grid or Spline.
    #[instrument(skip_all, fields(expr = %expr, pointwise = ctx.is_pointwise()))]
    pub fn evaluate(&mut self, expr: &Expr, ctx: &EvalContext) -> Result<Value> {
        check(expr)?;
        self.eval(expr, ctx, false)
    }

    fn eval(&mut self, expr: &Expr, ctx: &EvalContext, want_field: bool) -> Result<Value> {
        match expr {
            Expr::Constant(value) => Ok(Value::Scalar(*value)),
            Expr::Field(descriptor) => self.leaf(descriptor, ctx, want_field),
            Expr::Call { name, args } => self.call(name, args, ctx, want_field),
        }
    }

    fn call(
        &mut self,
        name: &str,
        args: &[Expr],
        ctx: &EvalContext,
        want_field: bool,
    ) -> Result<Value> {
        let function = resolve(name)?;
        check_arity(function, args.len())?;

        let field_ctx;
        let ctx = if want_field && ctx.is_pointwise() {
            field_ctx = EvalContext {
                points: None,
                ..ctx.clone()
            };
            &field_ctx
        } else {
            ctx
        };

        if function.class() == FunctionClass::TimeSeries {
            let want = want_field || !function.accepts_pointwise(0);
            let mut members = Vec::with_capacity(ctx.series_offsets.len());
            for &offset in &ctx.series_offsets {
                trace!(function = function.name, offset, "series member");
                members.push(self.eval(&args[0], &ctx.shifted(offset), want)?);
            }
            return Ok(function.call_series(&ctx.series_offsets, &members, ctx)?);
        }

        let mut values = Vec::with_capacity(args.len());
        for (i, arg) in args.iter().enumerate() {
            let want = want_field || !function.accepts_pointwise(i);
            values.push(self.eval(arg, ctx, want)?);
        }
        function.call(&values, ctx).map_err(|err| {
            let kinds: Vec<_> = values.iter().map(|v| v.kind().name()).collect();
            debug!(function = function.name, operands = ?kinds, error = %err, "call failed");
            err.into()
        })
    }

    fn leaf(
        &mut self,
        descriptor: &FieldDescriptor,
        ctx: &EvalContext,
        want_field: bool,
    ) -> Result<Value> {
        let mut descriptor = descriptor.clone();
        if descriptor.valid_time.is_none() {
            descriptor.valid_time = Some(ctx.valid_time);
        }
        if descriptor.level.trim().is_empty() {
            if let Some(level) = &ctx.level {
                descriptor.level = level.name.clone();
            }
        }

        let field = self.db.field_for(&descriptor, &ctx.projection)?;
        let spline = field
            .as_surface()
            .and_then(Surface::single)
            .cloned()
            .ok_or_else(|| Error::NotASurface {
                descriptor: descriptor.to_string(),
            })?;

        if want_field || !ctx.is_pointwise() {
            return Ok(Value::Spline(spline));
        }
        spline.ensure_usable("field sample")?;
        let points = ctx.eval_points()?;
        let values = points
            .iter()
            .map(|&p| spline.value_at(ctx.projection.transfer(p, &spline.projection)))
            .collect();
        Ok(Value::VectorList(VectorList::new(points.to_vec(), values)?))
    }
}

/// Resolve every call in the tree and check its arity, without reading any
/// field.
pub fn check(expr: &Expr) -> Result<()> {
    if let Expr::Call { name, args } = expr {
        let function = resolve(name)?;
        check_arity(function, args.len())?;
        args.iter().try_for_each(check)?;
    }
    Ok(())
}

fn resolve(name: &str) -> Result<&'static FunctionDescriptor> {
    find(name).ok_or_else(|| {
        warn!(function = %name, "unknown function");
        Error::UnknownFunction(name.to_string())
    })
}

fn check_arity(function: &FunctionDescriptor, got: usize) -> Result<()> {
    if got == function.arity {
        return Ok(());
    }
    Err(metcalc_foundation::Error::Arity {
        op: function.name,
        expected: function.arity,
        got,
    }
    .into())
}
