//! Reprojection of vector components

use metcalc_foundation::{fit_grid, Grid, MapProjection, Point, Result, Spline};

/// Geometry collaborator used when assembling vector components.
pub trait Geometry {
    /// Whether fields stored on `stored` must be reprojected before use on
    /// `target`.
    fn needs_reprojection(&self, stored: &MapProjection, target: &MapProjection) -> bool;

    /// Reproject an x/y component pair jointly onto `target`.
    fn reproject_components(
        &self,
        x: &Spline,
        y: &Spline,
        target: &MapProjection,
    ) -> Result<(Spline, Spline)>;
}

/// [`Geometry`] built on the in-tree projection module.
///
/// Components are resampled at the target grid nodes (the target's own grid,
/// else the source node grid) and rotated by the change in the direction of
/// local north between the two projections.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardGeometry;

impl Geometry for StandardGeometry {
    fn needs_reprojection(&self, stored: &MapProjection, target: &MapProjection) -> bool {
        !stored.same_map(target)
    }

    fn reproject_components(
        &self,
        x: &Spline,
        y: &Spline,
        target: &MapProjection,
    ) -> Result<(Spline, Spline)> {
        x.ensure_usable("component reprojection")?;
        y.ensure_usable("component reprojection")?;
        let grid = target.grid.unwrap_or_else(|| x.node_grid());
        let rotated = |ix: usize, iy: usize| {
            let p = grid.node(ix, iy);
            let at = target.transfer(p, &x.projection);
            let (u, v) = (x.value_at(at), y.value_at(at));
            let turn = target.north_angle(p) - x.projection.north_angle(at);
            let (s, c) = turn.sin_cos();
            (u * c - v * s, u * s + v * c)
        };
        let gx = Grid::from_fn(grid.nx, grid.ny, grid.cell_size, |ix, iy| rotated(ix, iy).0);
        let gy = Grid::from_fn(grid.nx, grid.ny, grid.cell_size, |ix, iy| rotated(ix, iy).1);
        Ok((
            fit_grid(&gx, Point::default(), target)?,
            fit_grid(&gy, Point::default(), target)?,
        ))
    }
}
