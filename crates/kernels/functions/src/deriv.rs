//! Spatial Derivative Operators
//!
//! `ddx`, `ddy`, `curv` and `laplc` differentiate a fitted surface;
//! `divrg` and `advct` are built from `ddx`/`ddy` and the arithmetic
//! operators.
//!
//! Derivatives are taken per map unit and scaled by
//! [`EvalContext::unit_factor`] to the configured display distance.

use metcalc_foundation::{grid_to_spline, Derivatives, EvalContext, Error, Result, Spline, Value};
use metcalc_registry::FunctionImpl;
use tracing::debug;

use crate::arith::{combine, MULTIPLY, PLUS};
use crate::args;
use crate::sample::sample;

enum Prepared {
    /// The derivative is identically zero in this shape
    Zero(Value),
    Surface(Spline),
}

fn prepare(op: &'static str, value: &Value, ctx: &EvalContext) -> Result<Prepared> {
    match value {
        Value::Scalar(_) => {
            debug!(op, "derivative of a scalar is zero");
            Ok(Prepared::Zero(Value::Scalar(0.0)))
        }
        Value::VectorList(list) => Ok(Prepared::Zero(Value::VectorList(list.map(|_| 0.0)))),
        Value::Grid(grid) => grid_to_spline(grid, ctx).map(Prepared::Surface),
        Value::Spline(spline) if spline.is_usable() => Ok(Prepared::Surface(spline.clone())),
        Value::Spline(spline) => Err(Error::ShapeMismatch {
            op,
            detail: format!("spline of {}x{} coefficients", spline.m, spline.n),
        }),
    }
}

/// Evaluate `f` on the surface derivatives at every evaluation position.
fn differentiate<F>(op: &'static str, value: &Value, ctx: &EvalContext, f: F) -> Result<Value>
where
    F: Fn(&Derivatives) -> f64 + Sync,
{
    match prepare(op, value, ctx)? {
        Prepared::Zero(zero) => Ok(zero),
        Prepared::Surface(surface) => sample(ctx, |p| {
            let at = ctx.projection.transfer(p, &surface.projection);
            f(&surface.derivatives_at(at))
        }),
    }
}

/// Curvature of the isolines through a point; zero where the gradient
/// vanishes.
pub fn isoline_curvature(d: &Derivatives) -> f64 {
    let g2 = d.fx * d.fx + d.fy * d.fy;
    if g2 <= f64::EPSILON {
        return 0.0;
    }
    (d.fxx * d.fy * d.fy - 2.0 * d.fxy * d.fx * d.fy + d.fyy * d.fx * d.fx) / g2.powf(1.5)
}

pub fn ddx_of(value: &Value, ctx: &EvalContext) -> Result<Value> {
    let k = ctx.unit_factor();
    differentiate("ddx", value, ctx, |d| d.fx * k)
}

pub fn ddy_of(value: &Value, ctx: &EvalContext) -> Result<Value> {
    let k = ctx.unit_factor();
    differentiate("ddy", value, ctx, |d| d.fy * k)
}

pub fn ddx(values: &[Value], ctx: &EvalContext) -> Result<Value> {
    let [field] = args::<1>("ddx", values)?;
    ddx_of(field, ctx)
}

pub fn ddy(values: &[Value], ctx: &EvalContext) -> Result<Value> {
    let [field] = args::<1>("ddy", values)?;
    ddy_of(field, ctx)
}

pub fn curv(values: &[Value], ctx: &EvalContext) -> Result<Value> {
    let [field] = args::<1>("curv", values)?;
    let k = ctx.unit_factor();
    differentiate("curv", field, ctx, |d| isoline_curvature(d) * k)
}

pub fn laplc(values: &[Value], ctx: &EvalContext) -> Result<Value> {
    let [field] = args::<1>("laplc", values)?;
    let k = ctx.unit_factor();
    differentiate("laplc", field, ctx, |d| (d.fxx + d.fyy) * k * k)
}

/// `ddx(u) + ddy(v)`
pub fn divrg(values: &[Value], ctx: &EvalContext) -> Result<Value> {
    let [u, v] = args::<2>("divrg", values)?;
    combine(PLUS, &ddx_of(u, ctx)?, &ddy_of(v, ctx)?, ctx)
}

/// `-(u * ddx(f) + v * ddy(f))`
pub fn advct(values: &[Value], ctx: &EvalContext) -> Result<Value> {
    let [field, u, v] = args::<3>("advct", values)?;
    let along_x = combine(MULTIPLY, u, &ddx_of(field, ctx)?, ctx)?;
    let along_y = combine(MULTIPLY, v, &ddy_of(field, ctx)?, ctx)?;
    let total = combine(PLUS, &along_x, &along_y, ctx)?;
    combine(MULTIPLY, &total, &Value::Scalar(-1.0), ctx)
}

register!(
    DDX_FN,
    name = "ddx",
    signature = "ddx(f) -> Value",
    doc = "Partial derivative along the map x axis",
    pointwise = [false],
    FunctionImpl::Field(ddx),
);

register!(
    DDY_FN,
    name = "ddy",
    signature = "ddy(f) -> Value",
    doc = "Partial derivative along the map y axis",
    pointwise = [false],
    FunctionImpl::Field(ddy),
);

register!(
    CURV_FN,
    name = "curv",
    signature = "curv(f) -> Value",
    doc = "Isoline curvature",
    pointwise = [false],
    FunctionImpl::Field(curv),
);

register!(
    LAPLC_FN,
    name = "laplc",
    signature = "laplc(f) -> Value",
    doc = "Laplacian",
    pointwise = [false],
    FunctionImpl::Field(laplc),
);

register!(
    DIVRG_FN,
    name = "divrg",
    signature = "divrg(u, v) -> Value",
    doc = "Divergence of the vector (u, v)",
    pointwise = [false, false],
    FunctionImpl::Field(divrg),
);

register!(
    ADVCT_FN,
    name = "advct",
    signature = "advct(f, u, v) -> Value",
    doc = "Advection of f by the wind (u, v)",
    pointwise = [false, true, true],
    FunctionImpl::Field(advct),
);

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use metcalc_foundation::{Grid, GridDef, MapProjection, Point, ValueKind, VectorList};

    use super::*;

    fn ctx() -> EvalContext {
        let t = NaiveDate::from_ymd_opt(2026, 4, 2)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .unwrap();
        // One metre per map unit, derivatives per metre
        let mut projection = MapProjection::default().with_grid(GridDef::new(6, 5, 10.0));
        projection.map.units = 1.0;
        EvalContext::new(projection, t)
    }

    fn plane() -> Grid {
        Grid::from_fn(6, 5, 10.0, |ix, iy| 3.0 * ix as f64 * 10.0 - 2.0 * iy as f64 * 10.0)
    }

    fn bowl() -> Grid {
        Grid::from_fn(11, 11, 10.0, |ix, iy| {
            let (x, y) = (ix as f64 * 10.0, iy as f64 * 10.0);
            x * x + y * y
        })
    }

    fn assert_all(value: &Value, expected: f64, tol: f64) {
        let g = value.as_grid().expect("grid result");
        for (i, v) in g.data.iter().enumerate() {
            assert!((v - expected).abs() < tol, "node {i}: {v} != {expected}");
        }
    }

    #[test]
    fn test_constant_grid_has_zero_gradient() {
        let c = ctx();
        let flat = Value::Grid(Grid::filled(6, 5, 10.0, 287.0));
        assert_all(&ddx(&[flat.clone()], &c).unwrap(), 0.0, 1e-9);
        assert_all(&ddy(&[flat.clone()], &c).unwrap(), 0.0, 1e-9);
        assert_all(&laplc(&[flat.clone()], &c).unwrap(), 0.0, 1e-9);
        assert_all(&curv(&[flat], &c).unwrap(), 0.0, 1e-9);
    }

    #[test]
    fn test_plane_gradient() {
        let c = ctx();
        let f = Value::Grid(plane());
        assert_all(&ddx(&[f.clone()], &c).unwrap(), 3.0, 1e-9);
        assert_all(&ddy(&[f], &c).unwrap(), -2.0, 1e-9);
    }

    #[test]
    fn test_display_distance_scales_derivatives() {
        let c = ctx().with_display_distance(1000.0);
        let f = Value::Grid(plane());
        assert_all(&ddx(&[f], &c).unwrap(), 3000.0, 1e-6);
    }

    #[test]
    fn test_degenerate_inputs() {
        let c = ctx();
        assert_eq!(ddx(&[Value::Scalar(4.0)], &c), Ok(Value::Scalar(0.0)));
        let list = VectorList::filled(vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0)], 9.0);
        let out = ddy(&[Value::VectorList(list.clone())], &c).unwrap();
        assert_eq!(out, Value::VectorList(list.map(|_| 0.0)));
    }

    #[test]
    fn test_pointwise_mode_returns_vector_list() {
        let points = vec![Point::new(15.0, 15.0), Point::new(30.0, 20.0)];
        let c = ctx().with_points(points.clone());
        let out = ddx(&[Value::Grid(plane())], &c).unwrap();
        assert_eq!(out.kind(), ValueKind::VectorList);
        let list = out.as_vlist().unwrap();
        assert_eq!(list.points, points);
        assert!(list.values.iter().all(|v| (v - 3.0).abs() < 1e-9));
    }

    #[test]
    fn test_laplacian_interior() {
        // Far from the natural end conditions
        let c = ctx().with_points(vec![Point::new(50.0, 50.0)]);
        let out = laplc(&[Value::Grid(bowl())], &c).unwrap();
        let v = out.as_vlist().unwrap().values[0];
        assert!((v - 4.0).abs() < 0.05, "laplacian {v}");
    }

    #[test]
    fn test_divergence_is_sum_of_partials() {
        let c = ctx();
        let u = Value::Grid(bowl());
        let v = Value::Grid(plane());
        let div = divrg(&[u.clone(), v.clone()], &c).unwrap();
        let expected = combine(PLUS, &ddx_of(&u, &c).unwrap(), &ddy_of(&v, &c).unwrap(), &c)
            .unwrap();
        assert_eq!(div, expected);
    }

    #[test]
    fn test_advection_of_plane_by_uniform_wind() {
        let c = ctx();
        let out = advct(
            &[Value::Grid(plane()), Value::Scalar(2.0), Value::Scalar(1.0)],
            &c,
        )
        .unwrap();
        // -(2 * 3 + 1 * -2)
        assert_all(&out, -4.0, 1e-9);
    }

    #[test]
    fn test_curvature_of_circles() {
        let d = Derivatives {
            value: 0.0,
            fx: 2.0,
            fy: 0.0,
            fxx: 2.0,
            fxy: 0.0,
            fyy: 2.0,
        };
        // Isolines of x^2 + y^2 at (1, 0) are circles of radius 1
        assert!((isoline_curvature(&d) - 1.0).abs() < 1e-12);
        assert_eq!(isoline_curvature(&Derivatives::default()), 0.0);
    }
}
