//! Integration tests for end-to-end metcalc evaluation.
//!
//! Each test loads an evaluation context from YAML, stores surfaces in the
//! in-memory source and evaluates equations through the registry, the
//! operators and the field cache.

use metcalc_eqtn_db::{ComponentTable, Field, FieldDescriptor, FieldKind, Surface};
use metcalc_foundation::{Error as ValueError, GridDef, MapProjection, Point, Spline, Value};
use metcalc_runtime::{Error, Expr};
use metcalc_tests::{grid_values, point_values, TestHarness, SOURCE};

const CONFIG: &str = r#"
apiVersion: metcalc/v1
kind: EvalConfig
projection: { type: lat_lon }
map: { olat: 0.0, olon: 0.0, lref: 0.0, xorg: 0.0, yorg: 0.0, xlen: 100.0, ylen: 100.0, units: 1000.0 }
grid: { nx: 11, ny: 11, cell_size: 10.0 }
validTime: 2026-01-15T06:00:00
level: 850mb
displayDistance: 1000.0
"#;

fn harness() -> TestHarness {
    let mut h = TestHarness::from_config(CONFIG);
    h.add_surface("temp", "850mb", 0, |p| 270.0 + 0.5 * p.x)
        .add_surface("hght", "850mb", 0, |_| 1500.0)
        .add_surface("uuwind", "850mb", 0, |_| 10.0)
        .add_surface("vvwind", "850mb", 0, |p| 0.2 * p.y);
    h
}

fn call(name: &str, args: Vec<Expr>) -> Expr {
    Expr::call(name, args)
}

fn temp() -> Expr {
    TestHarness::field("temp", "850mb")
}

fn interior() -> Vec<Point> {
    vec![
        Point::new(35.0, 40.0),
        Point::new(50.0, 50.0),
        Point::new(62.5, 71.0),
    ]
}

#[test]
fn test_plus_commutes() {
    let mut h = harness();
    let hght = TestHarness::field("hght", "850mb");

    let a = h.evaluate(&call("plus", vec![temp(), Expr::constant(3.0)])).unwrap();
    let b = h.evaluate(&call("plus", vec![Expr::constant(3.0), temp()])).unwrap();
    assert_eq!(a, b);

    let a = h.evaluate(&call("plus", vec![temp(), hght.clone()])).unwrap();
    let b = h.evaluate(&call("plus", vec![hght, temp()])).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_divide_by_zero_anywhere() {
    let mut h = harness();
    let hght = TestHarness::field("hght", "850mb");
    let zero = call("minus", vec![hght.clone(), hght]);

    assert_eq!(
        h.evaluate(&call("divide", vec![temp(), zero])),
        Err(Error::Value(ValueError::DivideByZero { op: "divide" }))
    );
    assert_eq!(
        h.evaluate_at(&call("divide", vec![temp(), Expr::constant(0.0)]), interior()),
        Err(Error::Value(ValueError::DivideByZero { op: "divide" }))
    );
}

#[test]
fn test_clamps() {
    let mut h = harness();
    let mut eval = |name: &str, x: f64| {
        let e = call(name, vec![Expr::constant(x), Expr::constant(0.0), Expr::constant(10.0)]);
        h.evaluate(&e).unwrap().as_scalar().unwrap()
    };
    assert_eq!(eval("outside", 3.0), 0.0);
    assert_eq!(eval("outside", 7.0), 10.0);
    assert_eq!(eval("outside", 5.0), 10.0);
    assert_eq!(eval("between", -5.0), 0.0);
    assert_eq!(eval("between", 15.0), 10.0);
    assert_eq!(eval("between", 5.0), 5.0);
}

#[test]
fn test_derivatives_of_constant_vanish() {
    let mut h = harness();
    for name in ["ddx", "ddy"] {
        let v = h
            .evaluate(&call(name, vec![TestHarness::field("hght", "850mb")]))
            .unwrap();
        let nodes = grid_values(&v);
        assert_eq!(nodes.len(), 121);
        assert!(nodes.iter().all(|d| d.abs() < 1e-9), "{name} not zero");
    }
}

#[test]
fn test_divergence_is_sum_of_derivatives() {
    let mut h = harness();
    let u = TestHarness::field("temp", "850mb");
    let v = TestHarness::field("vvwind", "850mb");

    let divrg = h.evaluate(&call("divrg", vec![u.clone(), v.clone()])).unwrap();
    let sum = h
        .evaluate(&call("plus", vec![call("ddx", vec![u]), call("ddy", vec![v])]))
        .unwrap();
    assert_eq!(divrg, sum);

    let nodes = grid_values(&divrg);
    assert!((nodes[60] - 0.7).abs() < 1e-6, "divrg = {}", nodes[60]);
}

#[test]
fn test_advection_at_points() {
    let mut h = harness();
    let e = call(
        "advct",
        vec![
            temp(),
            TestHarness::field("uuwind", "850mb"),
            TestHarness::field("vvwind", "850mb"),
        ],
    );
    let v = h.evaluate_at(&e, interior()).unwrap();
    for a in point_values(&v) {
        assert!((a + 5.0).abs() < 1e-6, "advct = {a}");
    }
}

#[test]
fn test_ddt_across_valid_times() {
    let mut h = harness();
    h.add_surface("dewpt", "850mb", -60, |_| 10.0)
        .add_surface("dewpt", "850mb", 0, |_| 12.0);
    let v = h
        .evaluate_at(
            &call("ddt", vec![TestHarness::field("dewpt", "850mb")]),
            interior(),
        )
        .unwrap();
    for rate in point_values(&v) {
        assert!((rate - 2.0 / 3600.0).abs() < 1e-9, "ddt = {rate}");
    }
}

#[test]
fn test_ddt_missing_member_aborts() {
    let mut h = harness();
    let err = h.evaluate(&call("ddt", vec![temp()])).unwrap_err();
    assert!(matches!(err, Error::Database(_)));
}

#[test]
fn test_saturation_vapour_pressure_at_freezing() {
    let mut h = harness();
    h.add_surface("tk", "850mb", 0, |_| 273.15);
    let v = h
        .evaluate_at(&call("svprs", vec![TestHarness::field("tk", "850mb")]), interior())
        .unwrap();
    for e in point_values(&v) {
        assert!((e - 611.0).abs() < 2.0, "svprs = {e}");
    }
}

#[test]
fn test_level_pressures() {
    let mut h = harness();
    assert_eq!(h.evaluate(&call("lvlprs", vec![])), Ok(Value::Scalar(85000.0)));
    assert!(matches!(
        h.evaluate(&call("uprprs", vec![])),
        Err(Error::Value(ValueError::LevelCategory { which: "upper", .. }))
    ));
}

#[test]
fn test_latitude_at_configured_points() {
    let yaml = format!("{CONFIG}points:\n  latLon: [[0.01, 0.02], [-0.03, 0.005]]\n");
    let mut h = TestHarness::from_config(&yaml);
    assert!(h.ctx().is_pointwise());

    let lat = h.evaluate(&call("lat", vec![])).unwrap();
    let lon = h.evaluate(&call("lon", vec![])).unwrap();
    let (lat, lon) = (point_values(&lat), point_values(&lon));
    assert!((lat[0] - 0.01).abs() < 1e-9 && (lat[1] + 0.03).abs() < 1e-9);
    assert!((lon[0] - 0.02).abs() < 1e-9 && (lon[1] - 0.005).abs() < 1e-9);
}

#[test]
fn test_sun_distance_in_january() {
    let mut h = harness();
    let v = h.evaluate(&call("sundist", vec![])).unwrap();
    let nodes = grid_values(&v);
    assert!(nodes.iter().all(|d| (0.98..0.99).contains(d)));
}

#[test]
fn test_fields_are_cached_between_evaluations() {
    let mut h = harness();
    let e = call("laplc", vec![temp()]);
    let first = h.evaluate(&e).unwrap();
    assert_eq!(h.db().source().reads(), 1);
    assert_eq!(h.evaluate(&e).unwrap(), first);
    assert_eq!(h.db().source().reads(), 1);

    let valid = h.ctx().valid_time;
    let stored = TestHarness::descriptor("temp", "850mb").with_valid_time(valid);
    assert!(h.db_mut().delete(&stored));
    h.evaluate(&e).unwrap();
    assert_eq!(h.db().source().reads(), 2);
}

#[test]
fn test_vector_field_from_components() {
    let mut h = harness();
    let wind = FieldDescriptor::new(SOURCE, "wind", "850mb", FieldKind::Vector)
        .with_valid_time(h.ctx().valid_time);

    let field = h.db_mut().vector_field(&wind, "uuwind", "vvwind").unwrap();
    let surface = field.as_surface().unwrap();
    assert!(surface.is_vector());
    assert!((surface.components[0].value_at(Point::new(40.0, 40.0)) - 10.0).abs() < 1e-6);
    assert!((surface.components[1].value_at(Point::new(40.0, 40.0)) - 8.0).abs() < 1e-6);

    // The assembled field is a surface, but not a single one
    let err = h.evaluate(&Expr::field(wind)).unwrap_err();
    assert!(matches!(err, Error::NotASurface { .. }));
    assert!(Surface::single(surface).is_none());
}

/// Polar stereographic map centred on 60N 90E, where local north points
/// along -x.
const POLAR: &str = r#"
apiVersion: metcalc/v1
kind: EvalConfig
projection: { type: polar_stereographic, north: true, true_lat: 60.0 }
map: { olat: 60.0, olon: 90.0, lref: 0.0, xorg: 0.0, yorg: 0.0, xlen: 100.0, ylen: 100.0, units: 1000.0 }
grid: { nx: 11, ny: 11, cell_size: 10.0 }
validTime: 2026-01-15T06:00:00
level: 850mb
"#;

/// Harness on the polar map with a 10 m/s northward wind stored on a
/// lat/lon map under the `latlon` subsource.
fn polar_harness() -> TestHarness {
    let latlon = MapProjection::default();
    let flat = |v: f64| {
        let spline = Spline::constant(v, GridDef::new(5, 5, 100.0), &latlon);
        Field::Surface(Surface::scalar(spline))
    };
    let mut h = TestHarness::from_config(POLAR);
    h.add_field_on("latlon", &latlon, "uuwind", "850mb", flat(0.0))
        .add_field_on("latlon", &latlon, "vvwind", "850mb", flat(10.0));
    h
}

fn latlon_field(element: &str) -> Expr {
    Expr::field(TestHarness::descriptor(element, "850mb").with_subsource("latlon"))
}

#[test]
fn test_components_rotate_into_evaluation_map() {
    let mut h = polar_harness();
    h.db_mut()
        .set_components(ComponentTable::new().with_vector("wind", "uuwind", "vvwind"));

    let origin = vec![Point::new(0.0, 0.0)];
    let u = h.evaluate_at(&latlon_field("uuwind"), origin.clone()).unwrap();
    let v = h.evaluate_at(&latlon_field("vvwind"), origin.clone()).unwrap();
    assert!((point_values(&u)[0] + 10.0).abs() < 1e-6, "u = {:?}", point_values(&u));
    assert!(point_values(&v)[0].abs() < 1e-6, "v = {:?}", point_values(&v));

    // Speed is unchanged by the rotation
    let speed = call(
        "power",
        vec![
            call(
                "plus",
                vec![
                    call("multiply", vec![latlon_field("uuwind"), latlon_field("uuwind")]),
                    call("multiply", vec![latlon_field("vvwind"), latlon_field("vvwind")]),
                ],
            ),
            Expr::constant(0.5),
        ],
    );
    let s = h.evaluate_at(&speed, origin).unwrap();
    assert!((point_values(&s)[0] - 10.0).abs() < 1e-6);
}

#[test]
fn test_undeclared_components_are_only_resampled() {
    let mut h = polar_harness();
    let u = h
        .evaluate_at(&latlon_field("uuwind"), vec![Point::new(0.0, 0.0)])
        .unwrap();
    assert!(point_values(&u)[0].abs() < 1e-6);
}

#[test]
fn test_unknown_function_aborts() {
    let mut h = harness();
    assert_eq!(
        h.evaluate(&call("vort", vec![temp()])),
        Err(Error::UnknownFunction("vort".into()))
    );
    assert_eq!(h.db().source().reads(), 0);
}

#[test]
fn test_equation_from_yaml() {
    let yaml = r#"
call:
  name: multiply
  args:
    - constant: 2.0
    - call:
        name: ddx
        args:
          - field: { source: test, element: temp, level: 850mb, kind: continuous }
"#;
    let e: Expr = serde_yaml::from_str(yaml).unwrap();
    let mut h = harness();
    let v = h.evaluate_at(&e, interior()).unwrap();
    for g in point_values(&v) {
        assert!((g - 1.0).abs() < 1e-6, "2*ddx = {g}");
    }
}
