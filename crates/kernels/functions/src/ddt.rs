//! Time derivative
//!
//! `ddt(f)` samples its argument at several times around the valid time and
//! differentiates the natural cubic spline through each element's series at
//! `t = 0`. Times are in minutes; the result is per second.

use metcalc_foundation::{
    align, normalize_grid, series_slope_at, spline_to_grid, EvalContext, Error, Result, Value,
};
use metcalc_registry::FunctionImpl;
use tracing::debug;

const SECONDS_PER_MINUTE: f64 = 60.0;

/// Time derivative at `t = 0` of `members[i]` sampled at `times[i]` minutes.
pub fn ddt(times: &[f64], members: &[Value], ctx: &EvalContext) -> Result<Value> {
    let len = members.len();
    if len < ctx.series_min || len > ctx.series_max {
        return Err(Error::SeriesLength {
            len,
            min: ctx.series_min,
            max: ctx.series_max,
        });
    }
    if times.len() != len {
        return Err(Error::ShapeMismatch {
            op: "ddt",
            detail: format!("{} sample times for {len} members", times.len()),
        });
    }

    let first = members[0].kind();
    if let Some(other) = members.iter().map(Value::kind).find(|k| *k != first) {
        return Err(Error::UnmatchedSeriesKind { first, other });
    }

    let mut order: Vec<usize> = (0..len).collect();
    order.sort_by(|&a, &b| times[a].total_cmp(&times[b]));
    let sorted_times: Vec<f64> = order.iter().map(|&i| times[i]).collect();
    if let Some(w) = sorted_times.windows(2).find(|w| w[0] == w[1]) {
        return Err(Error::DuplicateSeriesTime(w[0]));
    }

    let mut sorted = Vec::with_capacity(len);
    for &i in &order {
        sorted.push(match &members[i] {
            Value::Spline(s) => Value::Grid(spline_to_grid(s, ctx)?),
            Value::Grid(g) => Value::Grid(normalize_grid(g, ctx)?),
            other => other.clone(),
        });
    }

    debug!(members = len, kind = %first, "time derivative");
    align("ddt", &sorted, ctx)?
        .apply(|values| series_slope_at(&sorted_times, values, 0.0) / SECONDS_PER_MINUTE)
}

register!(
    DDT_FN,
    name = "ddt",
    signature = "ddt(f) -> Value",
    doc = "Time derivative (per second) at the valid time",
    pointwise = [true],
    FunctionImpl::TimeSeries(ddt),
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
        EvalContext::new(
            MapProjection::default().with_grid(GridDef::new(3, 3, 50.0)),
            t,
        )
    }

    #[test]
    fn test_two_scalars() {
        let out = ddt(
            &[-60.0, 0.0],
            &[Value::Scalar(10.0), Value::Scalar(12.0)],
            &ctx(),
        )
        .unwrap();
        let v = out.as_scalar().unwrap();
        assert!((v - 2.0 / 3600.0).abs() < 1e-12);
    }

    #[test]
    fn test_member_order_does_not_matter() {
        let c = ctx();
        let a = ddt(
            &[-120.0, -60.0, 0.0],
            &[Value::Scalar(1.0), Value::Scalar(4.0), Value::Scalar(2.0)],
            &c,
        )
        .unwrap();
        let b = ddt(
            &[0.0, -120.0, -60.0],
            &[Value::Scalar(2.0), Value::Scalar(1.0), Value::Scalar(4.0)],
            &c,
        )
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_linear_trend_on_grids() {
        let c = ctx();
        let members: Vec<Value> = [-90.0, -30.0, 30.0]
            .iter()
            .map(|t| Value::Grid(Grid::filled(3, 3, 50.0, 100.0 + 0.5 * t)))
            .collect();
        let out = ddt(&[-90.0, -30.0, 30.0], &members, &c).unwrap();
        assert_eq!(out.kind(), ValueKind::Grid);
        let expected = 0.5 / 60.0;
        assert!(out
            .as_grid()
            .unwrap()
            .data
            .iter()
            .all(|v| (v - expected).abs() < 1e-12));
    }

    #[test]
    fn test_series_limits() {
        let c = ctx();
        assert_eq!(
            ddt(&[0.0], &[Value::Scalar(1.0)], &c),
            Err(Error::SeriesLength {
                len: 1,
                min: 2,
                max: 5
            })
        );
        let six = vec![Value::Scalar(0.0); 6];
        assert!(matches!(
            ddt(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0], &six, &c),
            Err(Error::SeriesLength { len: 6, .. })
        ));
    }

    #[test]
    fn test_rejects_mixed_and_duplicate_members() {
        let c = ctx();
        assert_eq!(
            ddt(
                &[-60.0, 0.0],
                &[Value::Scalar(1.0), Value::Grid(Grid::filled(3, 3, 50.0, 1.0))],
                &c
            ),
            Err(Error::UnmatchedSeriesKind {
                first: ValueKind::Scalar,
                other: ValueKind::Grid
            })
        );
        assert_eq!(
            ddt(&[0.0, 0.0], &[Value::Scalar(1.0), Value::Scalar(2.0)], &c),
            Err(Error::DuplicateSeriesTime(0.0))
        );
    }

    #[test]
    fn test_vector_lists_must_share_points() {
        let c = ctx();
        let a = VectorList::filled(vec![Point::new(0.0, 0.0)], 1.0);
        let b = VectorList::filled(vec![Point::new(5.0, 0.0)], 2.0);
        assert_eq!(
            ddt(&[-60.0, 0.0], &[Value::VectorList(a), Value::VectorList(b)], &c),
            Err(Error::PointMismatch { op: "ddt" })
        );
    }
}
