//! Geographic position functions: `lat()` and `lon()` in degrees.

use metcalc_foundation::{EvalContext, Result, Value};
use metcalc_registry::FunctionImpl;

use crate::args;
use crate::sample::sample;

pub fn lat(values: &[Value], ctx: &EvalContext) -> Result<Value> {
    args::<0>("lat", values)?;
    sample(ctx, |p| ctx.projection.pos_to_latlon(p).0)
}

pub fn lon(values: &[Value], ctx: &EvalContext) -> Result<Value> {
    args::<0>("lon", values)?;
    sample(ctx, |p| ctx.projection.pos_to_latlon(p).1)
}

register!(
    LAT_FN,
    name = "lat",
    signature = "lat() -> Value",
    doc = "Latitude (degrees) of each evaluation position",
    pointwise = [],
    FunctionImpl::Field(lat),
);

register!(
    LON_FN,
    name = "lon",
    signature = "lon() -> Value",
    doc = "Longitude (degrees) of each evaluation position",
    pointwise = [],
    FunctionImpl::Field(lon),
);

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use metcalc_foundation::{GridDef, MapDef, MapProjection, Point, ProjectionKind};

    use super::*;

    fn ctx() -> EvalContext {
        let t = NaiveDate::from_ymd_opt(2026, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap();
        let map = MapDef {
            olat: 45.0,
            olon: -63.0,
            lref: -63.0,
            ..MapDef::default()
        };
        let projection = MapProjection::new(
            ProjectionKind::PolarStereographic {
                north: true,
                true_lat: 60.0,
            },
            map,
        )
        .with_grid(GridDef::new(3, 3, 100.0));
        EvalContext::new(projection, t)
    }

    #[test]
    fn test_origin_reads_back_map_origin() {
        let c = ctx().with_points(vec![Point::default()]);
        let la = lat(&[], &c).unwrap();
        let lo = lon(&[], &c).unwrap();
        assert!((la.as_vlist().unwrap().values[0] - 45.0).abs() < 1e-6);
        assert!((lo.as_vlist().unwrap().values[0] + 63.0).abs() < 1e-6);
    }

    #[test]
    fn test_latitude_increases_northward() {
        let grid = lat(&[], &ctx()).unwrap();
        let g = grid.as_grid().unwrap();
        assert!(g.get(0, 2) > g.get(0, 0));
    }
}
