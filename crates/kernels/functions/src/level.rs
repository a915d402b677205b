//! Level Pressure Functions
//!
//! `lvlprs`, `uprprs` and `lwrprs` return the pressure (Pa) of the current
//! level and of the upper and lower bounds of the current layer.

use metcalc_foundation::{EvalContext, Error, Level, LevelCategory, Result, Value};
use metcalc_registry::FunctionImpl;

use crate::args;

fn pressure_of(which: &'static str, level: Option<&Level>) -> Result<Value> {
    match level {
        Some(Level {
            category: LevelCategory::Pressure,
            pressure: Some(pa),
            ..
        }) => Ok(Value::Scalar(*pa)),
        other => Err(Error::LevelCategory {
            which,
            level: other.map(|l| l.name.clone()),
        }),
    }
}

pub fn lvlprs(values: &[Value], ctx: &EvalContext) -> Result<Value> {
    args::<0>("lvlprs", values)?;
    pressure_of("current", ctx.level.as_ref())
}

pub fn uprprs(values: &[Value], ctx: &EvalContext) -> Result<Value> {
    args::<0>("uprprs", values)?;
    let upper = ctx
        .upper_level
        .clone()
        .or_else(|| ctx.level.as_ref().and_then(Level::upper));
    pressure_of("upper", upper.as_ref())
}

pub fn lwrprs(values: &[Value], ctx: &EvalContext) -> Result<Value> {
    args::<0>("lwrprs", values)?;
    let lower = ctx
        .lower_level
        .clone()
        .or_else(|| ctx.level.as_ref().and_then(Level::lower));
    pressure_of("lower", lower.as_ref())
}

register!(
    LVLPRS_FN,
    name = "lvlprs",
    signature = "lvlprs() -> Scalar",
    doc = "Pressure (Pa) of the current level",
    pointwise = [],
    FunctionImpl::Field(lvlprs),
);

register!(
    UPRPRS_FN,
    name = "uprprs",
    signature = "uprprs() -> Scalar",
    doc = "Pressure (Pa) of the upper level of the current layer",
    pointwise = [],
    FunctionImpl::Field(uprprs),
);

register!(
    LWRPRS_FN,
    name = "lwrprs",
    signature = "lwrprs() -> Scalar",
    doc = "Pressure (Pa) of the lower level of the current layer",
    pointwise = [],
    FunctionImpl::Field(lwrprs),
);
