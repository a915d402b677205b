//! Evaluation positions shared by position-dependent operators.

use metcalc_foundation::{EvalContext, Grid, Point, Result, Value, VectorList};
use rayon::prelude::*;

/// Evaluate `f` at every context point (pointwise mode, vector list result)
/// or at every default grid node (field mode, grid result).
pub(crate) fn sample<F>(ctx: &EvalContext, f: F) -> Result<Value>
where
    F: Fn(Point) -> f64 + Sync,
{
    if ctx.is_pointwise() {
        let points = ctx.eval_points()?.to_vec();
        let values = points.par_iter().map(|&p| f(p)).collect();
        return VectorList::new(points, values).map(Value::VectorList);
    }
    let grid = ctx.default_grid()?;
    Ok(Value::Grid(Grid::from_fn(
        grid.nx,
        grid.ny,
        grid.cell_size,
        |ix, iy| f(grid.node(ix, iy)),
    )))
}
