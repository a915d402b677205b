//! Value conversion
//!
//! | from \ to  | Scalar | Grid      | Spline   | VectorList |
//! |------------|--------|-----------|----------|------------|
//! | Scalar     | copy   | broadcast | broadcast| broadcast  |
//! | Grid       | -      | copy      | fit      | -          |
//! | Spline     | -      | sample    | copy     | -          |
//! | VectorList | -      | -         | -        | copy       |
//!
//! Grid and Spline conversions use the default grid of the evaluation
//! projection. Grid -> Spline fits on the grid's own node spacing, so
//! Grid -> Spline -> Grid renormalises any grid onto the default dimensions.

use tracing::debug;

use crate::context::EvalContext;
use crate::error::{Error, Result};
use crate::spline::fit_grid;
use crate::value::{Grid, Point, Spline, Value, ValueKind, VectorList};

/// Convert `value` to `target`. The input is never modified.
pub fn convert(target: ValueKind, value: &Value, ctx: &EvalContext) -> Result<Value> {
    match (value, target) {
        (v, t) if v.kind() == t => Ok(v.clone()),
        (Value::Scalar(s), ValueKind::Grid) => {
            let g = ctx.default_grid()?;
            Ok(Value::Grid(Grid::filled(g.nx, g.ny, g.cell_size, *s)))
        }
        (Value::Scalar(s), ValueKind::Spline) => Ok(Value::Spline(Spline::constant(
            *s,
            ctx.default_grid()?,
            &ctx.projection,
        ))),
        (Value::Scalar(s), ValueKind::VectorList) => Ok(Value::VectorList(VectorList::filled(
            ctx.eval_points()?.to_vec(),
            *s,
        ))),
        (Value::Grid(g), ValueKind::Spline) => grid_to_spline(g, ctx).map(Value::Spline),
        (Value::Spline(s), ValueKind::Grid) => spline_to_grid(s, ctx).map(Value::Grid),
        (v, t) => Err(Error::Conversion {
            from: v.kind(),
            to: t,
        }),
    }
}

/// Fit a spline to a grid anchored at the default projection origin.
pub fn grid_to_spline(grid: &Grid, ctx: &EvalContext) -> Result<Spline> {
    ctx.default_grid()?;
    fit_grid(grid, Point::default(), &ctx.projection)
}

/// Sample a spline at every node of the default grid.
pub fn spline_to_grid(spline: &Spline, ctx: &EvalContext) -> Result<Grid> {
    let grid = ctx.default_grid()?;
    spline.ensure_usable("spline sample")?;
    Ok(spline.to_grid(grid, &ctx.projection))
}

/// Whether a grid already has the default dimensions.
pub fn on_default_grid(grid: &Grid, ctx: &EvalContext) -> Result<bool> {
    let g = ctx.default_grid()?;
    Ok(grid.nx == g.nx && grid.ny == g.ny && grid.cell_size == g.cell_size)
}

/// Bring a grid onto the default dimensions (Grid -> Spline -> Grid).
pub fn normalize_grid(grid: &Grid, ctx: &EvalContext) -> Result<Grid> {
    if on_default_grid(grid, ctx)? {
        return Ok(grid.clone());
    }
    debug!(
        nx = grid.nx,
        ny = grid.ny,
        cell_size = grid.cell_size,
        "renormalising grid onto default dimensions"
    );
    spline_to_grid(&grid_to_spline(grid, ctx)?, ctx)
}
