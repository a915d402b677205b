//! Solar Geometry
//!
//! `sunang` (solar zenith angle, degrees) and `sundist` (Earth-Sun distance,
//! AU) at the valid time, evaluated at every point or grid node.
//!
//! Uses the Fourier-series fits for declination, equation of time and
//! orbital eccentricity in the fractional-year angle.

use std::f64::consts::PI;

use chrono::{Datelike, NaiveDateTime, Timelike};
use metcalc_foundation::{EvalContext, Result, Value};
use metcalc_registry::FunctionImpl;

use crate::args;
use crate::sample::sample;

/// Orbital position of the Earth at an instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarPosition {
    /// Fractional year (radians)
    pub gamma: f64,
    /// Solar declination (radians)
    pub declination: f64,
    /// Equation of time (minutes)
    pub equation_of_time: f64,
    /// Minutes past midnight
    pub minutes: f64,
}

impl SolarPosition {
    pub fn at(time: NaiveDateTime) -> Self {
        let minutes =
            time.hour() as f64 * 60.0 + time.minute() as f64 + time.second() as f64 / 60.0;
        let days_in_year = if time.date().leap_year() { 366.0 } else { 365.0 };
        let gamma =
            2.0 * PI / days_in_year * (time.ordinal0() as f64 + (minutes / 60.0 - 12.0) / 24.0);

        let (s1, c1) = gamma.sin_cos();
        let (s2, c2) = (2.0 * gamma).sin_cos();
        let (s3, c3) = (3.0 * gamma).sin_cos();

        let equation_of_time =
            229.18 * (0.000075 + 0.001868 * c1 - 0.032077 * s1 - 0.014615 * c2 - 0.040849 * s2);
        let declination = 0.006918 - 0.399912 * c1 + 0.070257 * s1 - 0.006758 * c2
            + 0.000907 * s2
            - 0.002697 * c3
            + 0.00148 * s3;

        Self {
            gamma,
            declination,
            equation_of_time,
            minutes,
        }
    }

    /// Solar zenith angle (degrees) at `lat`/`lon` degrees.
    pub fn zenith(&self, lat: f64, lon: f64) -> f64 {
        let true_solar = self.minutes + self.equation_of_time + 4.0 * lon;
        let hour_angle = (true_solar / 4.0 - 180.0).to_radians();
        let lat = lat.to_radians();
        let cos_zenith = lat.sin() * self.declination.sin()
            + lat.cos() * self.declination.cos() * hour_angle.cos();
        cos_zenith.clamp(-1.0, 1.0).acos().to_degrees()
    }

    /// Earth-Sun distance (AU).
    pub fn distance(&self) -> f64 {
        let g = self.gamma;
        let inverse_square = 1.000110
            + 0.034221 * g.cos()
            + 0.001280 * g.sin()
            + 0.000719 * (2.0 * g).cos()
            + 0.000077 * (2.0 * g).sin();
        1.0 / inverse_square.sqrt()
    }
}

pub fn sunang(values: &[Value], ctx: &EvalContext) -> Result<Value> {
    args::<0>("sunang", values)?;
    let sun = SolarPosition::at(ctx.valid_time);
    sample(ctx, |p| {
        let (lat, lon) = ctx.projection.pos_to_latlon(p);
        // Local solar time already accounts for longitude
        let lon = if ctx.local_time { 0.0 } else { lon };
        sun.zenith(lat, lon)
    })
}

pub fn sundist(values: &[Value], ctx: &EvalContext) -> Result<Value> {
    args::<0>("sundist", values)?;
    let distance = SolarPosition::at(ctx.valid_time).distance();
    sample(ctx, |_| distance)
}

register!(
    SUNANG_FN,
    name = "sunang",
    signature = "sunang() -> Value",
    doc = "Solar zenith angle (degrees) at the valid time",
    pointwise = [],
    FunctionImpl::Field(sunang),
);

register!(
    SUNDIST_FN,
    name = "sundist",
    signature = "sundist() -> Value",
    doc = "Earth-Sun distance (AU) at the valid time",
    pointwise = [],
    FunctionImpl::Field(sundist),
);
