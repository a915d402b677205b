//! Spline primitives
//!
//! Tensor-product uniform cubic B-splines with natural end conditions, used
//! for every grid <-> spline conversion and for spatial derivatives, plus a
//! one-dimensional natural cubic spline over unevenly spaced samples for
//! time derivatives.

use crate::error::{Error, Result};
use crate::projection::{GridDef, MapProjection};
use crate::value::{Grid, Point, Spline};

/// Partial derivatives of a surface in map units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Derivatives {
    pub value: f64,
    pub fx: f64,
    pub fy: f64,
    pub fxx: f64,
    pub fxy: f64,
    pub fyy: f64,
}

#[inline]
fn basis(t: f64) -> [f64; 4] {
    let s = 1.0 - t;
    [
        s * s * s / 6.0,
        (3.0 * t * t * t - 6.0 * t * t + 4.0) / 6.0,
        (-3.0 * t * t * t + 3.0 * t * t + 3.0 * t + 1.0) / 6.0,
        t * t * t / 6.0,
    ]
}

#[inline]
fn basis_d1(t: f64) -> [f64; 4] {
    let s = 1.0 - t;
    [
        -s * s / 2.0,
        (3.0 * t * t - 4.0 * t) / 2.0,
        (-3.0 * t * t + 2.0 * t + 1.0) / 2.0,
        t * t / 2.0,
    ]
}

#[inline]
fn basis_d2(t: f64) -> [f64; 4] {
    [1.0 - t, 3.0 * t - 2.0, 1.0 - 3.0 * t, t]
}

/// Solve a constant-diagonal tridiagonal system `x[i-1] + 4 x[i] + x[i+1] = rhs[i]`.
fn solve_uniform_tridiagonal(rhs: &mut [f64]) {
    let k = rhs.len();
    if k == 0 {
        return;
    }
    let mut diag = vec![4.0; k];
    for i in 1..k {
        let w = 1.0 / diag[i - 1];
        diag[i] -= w;
        rhs[i] -= w * rhs[i - 1];
    }
    rhs[k - 1] /= diag[k - 1];
    for i in (0..k - 1).rev() {
        rhs[i] = (rhs[i] - rhs[i + 1]) / diag[i];
    }
}

/// Interpolating coefficients for `N >= 2` evenly spaced samples.
///
/// Returns `N + 2` coefficients; the outer pair enforces a zero second
/// derivative at both ends.
fn fit_line(samples: &[f64]) -> Vec<f64> {
    let n = samples.len();
    let mut c = vec![0.0; n + 2];
    c[1] = samples[0];
    c[n] = samples[n - 1];

    if n > 2 {
        let mut rhs: Vec<f64> = samples[1..n - 1].iter().map(|s| 6.0 * s).collect();
        rhs[0] -= c[1];
        let last = rhs.len() - 1;
        rhs[last] -= c[n];
        solve_uniform_tridiagonal(&mut rhs);
        c[2..n].copy_from_slice(&rhs);
    }

    c[0] = 2.0 * c[1] - c[2];
    c[n + 1] = 2.0 * c[n] - c[n - 1];
    c
}

/// Fit a spline through every node of `grid`, anchored at `origin`.
pub fn fit_grid(grid: &Grid, origin: Point, projection: &MapProjection) -> Result<Spline> {
    if grid.nx < 2 || grid.ny < 2 || grid.cell_size <= 0.0 || grid.data.len() != grid.nx * grid.ny
    {
        return Err(Error::ShapeMismatch {
            op: "spline fit",
            detail: format!(
                "cannot fit a {}x{} grid with cell size {}",
                grid.nx, grid.ny, grid.cell_size
            ),
        });
    }

    let m = grid.nx + 2;
    let n = grid.ny + 2;

    let rows: Vec<Vec<f64>> = (0..grid.ny).map(|iy| fit_line(grid.row(iy))).collect();

    let mut coeffs = vec![0.0; m * n];
    let mut column = vec![0.0; grid.ny];
    for j in 0..m {
        for (iy, row) in rows.iter().enumerate() {
            column[iy] = row[j];
        }
        for (k, c) in fit_line(&column).into_iter().enumerate() {
            coeffs[k * m + j] = c;
        }
    }

    Ok(Spline {
        m,
        n,
        coeffs,
        origin,
        orientation: 0.0,
        cell_size: grid.cell_size,
        projection: projection.clone(),
    })
}

/// Cell index and local parameter along one axis with `nodes` nodes.
///
/// Positions past either end extrapolate the outermost cell.
#[inline]
fn locate(u: f64, nodes: usize) -> (usize, f64) {
    let last = (nodes - 2) as f64;
    let i = u.floor().clamp(0.0, last);
    (i as usize, u - i)
}

impl Spline {
    /// Constant surface over `grid`.
    pub fn constant(value: f64, grid: GridDef, projection: &MapProjection) -> Spline {
        let m = grid.nx + 2;
        let n = grid.ny + 2;
        Spline {
            m,
            n,
            coeffs: vec![value; m * n],
            origin: Point::default(),
            orientation: 0.0,
            cell_size: grid.cell_size,
            projection: projection.clone(),
        }
    }

    /// `ShapeMismatch` for `op` unless the surface can be sampled.
    pub fn ensure_usable(&self, op: &'static str) -> Result<()> {
        if self.is_usable() {
            return Ok(());
        }
        Err(Error::ShapeMismatch {
            op,
            detail: format!(
                "spline of {}x{} coefficients with cell size {}",
                self.m, self.n, self.cell_size
            ),
        })
    }

    /// Grid definition of the nodes this surface was fitted on.
    pub fn node_grid(&self) -> GridDef {
        GridDef::new(
            self.m.saturating_sub(2),
            self.n.saturating_sub(2),
            self.cell_size,
        )
    }

    /// Fractional node coordinates of a map position.
    fn local(&self, p: Point) -> (f64, f64) {
        let (s, c) = self.orientation.to_radians().sin_cos();
        let dx = p.x - self.origin.x;
        let dy = p.y - self.origin.y;
        (
            (dx * c + dy * s) / self.cell_size,
            (-dx * s + dy * c) / self.cell_size,
        )
    }

    #[inline]
    fn weighted(&self, i: usize, j: usize, wu: &[f64; 4], wv: &[f64; 4]) -> f64 {
        let mut sum = 0.0;
        for (b, wb) in wv.iter().enumerate() {
            let row = &self.coeffs[(j + b) * self.m + i..(j + b) * self.m + i + 4];
            let inner: f64 = row.iter().zip(wu).map(|(c, w)| c * w).sum();
            sum += wb * inner;
        }
        sum
    }

    /// Surface value at a map position. The surface must be usable.
    pub fn value_at(&self, p: Point) -> f64 {
        let (u, v) = self.local(p);
        let (i, tu) = locate(u, self.m - 2);
        let (j, tv) = locate(v, self.n - 2);
        self.weighted(i, j, &basis(tu), &basis(tv))
    }

    /// Value and first/second partial derivatives at a map position.
    pub fn derivatives_at(&self, p: Point) -> Derivatives {
        let (u, v) = self.local(p);
        let (i, tu) = locate(u, self.m - 2);
        let (j, tv) = locate(v, self.n - 2);

        let (bu, du, ddu) = (basis(tu), basis_d1(tu), basis_d2(tu));
        let (bv, dv, ddv) = (basis(tv), basis_d1(tv), basis_d2(tv));

        let f = self.weighted(i, j, &bu, &bv);
        let f_u = self.weighted(i, j, &du, &bv);
        let f_v = self.weighted(i, j, &bu, &dv);
        let f_uu = self.weighted(i, j, &ddu, &bv);
        let f_uv = self.weighted(i, j, &du, &dv);
        let f_vv = self.weighted(i, j, &bu, &ddv);

        // Rotate node-space derivatives back onto the map axes
        let (s, c) = self.orientation.to_radians().sin_cos();
        let h = self.cell_size;
        let h2 = h * h;
        Derivatives {
            value: f,
            fx: (c * f_u - s * f_v) / h,
            fy: (s * f_u + c * f_v) / h,
            fxx: (c * c * f_uu - 2.0 * c * s * f_uv + s * s * f_vv) / h2,
            fxy: (c * s * f_uu + (c * c - s * s) * f_uv - c * s * f_vv) / h2,
            fyy: (s * s * f_uu + 2.0 * c * s * f_uv + c * c * f_vv) / h2,
        }
    }

    /// Sample the surface at every node of `grid`, laid over `projection`.
    pub fn to_grid(&self, grid: GridDef, projection: &MapProjection) -> Grid {
        Grid::from_fn(grid.nx, grid.ny, grid.cell_size, |ix, iy| {
            self.value_at(projection.transfer(grid.node(ix, iy), &self.projection))
        })
    }
}

/// Slope at `t` of the natural cubic spline through `(times[i], values[i])`.
///
/// `times` must be strictly increasing with at least two members; `t`
/// outside the sampled range extrapolates the outermost interval.
pub fn series_slope_at(times: &[f64], values: &[f64], t: f64) -> f64 {
    let n = times.len();
    let h: Vec<f64> = times.windows(2).map(|w| w[1] - w[0]).collect();

    // Second derivatives, zero at both ends
    let mut m2 = vec![0.0; n];
    if n > 2 {
        let k = n - 2;
        let mut diag = vec![0.0; k];
        let mut rhs = vec![0.0; k];
        for i in 0..k {
            diag[i] = 2.0 * (h[i] + h[i + 1]);
            rhs[i] = 6.0
                * ((values[i + 2] - values[i + 1]) / h[i + 1] - (values[i + 1] - values[i]) / h[i]);
        }
        for i in 1..k {
            let w = h[i] / diag[i - 1];
            diag[i] -= w * h[i];
            rhs[i] -= w * rhs[i - 1];
        }
        m2[k] = rhs[k - 1] / diag[k - 1];
        for i in (0..k - 1).rev() {
            m2[i + 1] = (rhs[i] - h[i + 1] * m2[i + 2]) / diag[i];
        }
    }

    let seg = times[1..n - 1]
        .iter()
        .position(|&ti| t < ti)
        .unwrap_or(n - 2);
    let hi = h[seg];
    let a = times[seg + 1] - t;
    let b = t - times[seg];
    -m2[seg] * a * a / (2.0 * hi) + m2[seg + 1] * b * b / (2.0 * hi)
        + (values[seg + 1] - values[seg]) / hi
        - (m2[seg + 1] - m2[seg]) * hi / 6.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plane_grid(nx: usize, ny: usize, h: f64) -> Grid {
        Grid::from_fn(nx, ny, h, |ix, iy| {
            2.0 * ix as f64 * h - 0.5 * iy as f64 * h + 7.0
        })
    }

    #[test]
    fn test_degenerate_surface_is_not_usable() {
        let tiny = Spline {
            m: 3,
            n: 3,
            coeffs: vec![1.0; 9],
            cell_size: 10.0,
            ..Spline::default()
        };
        assert!(matches!(
            tiny.ensure_usable("point sample"),
            Err(Error::ShapeMismatch { op: "point sample", .. })
        ));
        let flat = Spline::constant(1.0, GridDef::new(2, 2, 10.0), &MapProjection::default());
        assert_eq!(flat.ensure_usable("sample"), Ok(()));
    }

    #[test]
    fn test_fit_interpolates_nodes() {
        let grid = Grid::from_fn(6, 5, 10.0, |ix, iy| ((ix * ix) as f64).sin() + iy as f64);
        let spline = fit_grid(&grid, Point::default(), &MapProjection::default()).unwrap();
        assert_eq!((spline.m, spline.n), (8, 7));
        for iy in 0..grid.ny {
            for ix in 0..grid.nx {
                let p = Point::new(ix as f64 * 10.0, iy as f64 * 10.0);
                assert!((spline.value_at(p) - grid.get(ix, iy)).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_constant_surface_has_zero_derivatives() {
        let grid = Grid::filled(5, 4, 25.0, 3.25);
        let spline = fit_grid(&grid, Point::default(), &MapProjection::default()).unwrap();
        let d = spline.derivatives_at(Point::new(37.0, 51.0));
        assert!((d.value - 3.25).abs() < 1e-12);
        for v in [d.fx, d.fy, d.fxx, d.fxy, d.fyy] {
            assert!(v.abs() < 1e-12);
        }
    }

    #[test]
    fn test_linear_surface_gradient() {
        let spline = fit_grid(&plane_grid(6, 6, 5.0), Point::default(), &MapProjection::default())
            .unwrap();
        let d = spline.derivatives_at(Point::new(12.0, 8.0));
        assert!((d.fx - 2.0).abs() < 1e-9);
        assert!((d.fy + 0.5).abs() < 1e-9);
        assert!(d.fxx.abs() < 1e-9);
    }

    #[test]
    fn test_rotated_gradient() {
        let mut spline =
            fit_grid(&plane_grid(6, 6, 5.0), Point::default(), &MapProjection::default()).unwrap();
        spline.orientation = 90.0;
        // Node u-axis now points along +y
        let d = spline.derivatives_at(Point::new(-8.0, 12.0));
        assert!((d.fy - 2.0).abs() < 1e-9);
        assert!((d.fx - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_fit_rejects_degenerate_grid() {
        let grid = Grid::filled(1, 4, 1.0, 0.0);
        assert!(fit_grid(&grid, Point::default(), &MapProjection::default()).is_err());
    }

    #[test]
    fn test_series_slope_two_points() {
        let slope = series_slope_at(&[-60.0, 0.0], &[10.0, 12.0], 0.0);
        assert!((slope - 2.0 / 60.0).abs() < 1e-12);
    }

    #[test]
    fn test_series_slope_linear_data() {
        let times = [-180.0, -60.0, 0.0, 120.0];
        let values: Vec<f64> = times.iter().map(|t| 3.0 * t + 1.0).collect();
        assert!((series_slope_at(&times, &values, 0.0) - 3.0).abs() < 1e-9);
        assert!((series_slope_at(&times, &values, 200.0) - 3.0).abs() < 1e-9);
    }
}
