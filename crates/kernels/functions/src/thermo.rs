//! Thermodynamic Functions

use metcalc_foundation::{align, EvalContext, Error, Operand, Result, Value};
use metcalc_registry::FunctionImpl;

use crate::args;

/// Steam-point temperature (K)
const STEAM_POINT: f64 = 373.16;
/// Saturation vapour pressure at the steam point (hPa)
const STEAM_POINT_PRESSURE: f64 = 1013.246;

/// Goff–Gratch saturation vapour pressure over water, `t` in K, result in Pa.
pub fn saturation_vapour_pressure(t: f64) -> f64 {
    let ratio = STEAM_POINT / t;
    let log_es = -7.90298 * (ratio - 1.0) + 5.02808 * ratio.log10()
        - 1.3816e-7 * (10f64.powf(11.344 * (1.0 - 1.0 / ratio)) - 1.0)
        + 8.1328e-3 * (10f64.powf(-3.49149 * (ratio - 1.0)) - 1.0)
        + STEAM_POINT_PRESSURE.log10();
    10f64.powf(log_es) * 100.0
}

/// `svprs(t)`: saturation vapour pressure (Pa) of temperature `t` (K).
pub fn svprs(values: &[Value], ctx: &EvalContext) -> Result<Value> {
    let aligned = align("svprs", args::<1>("svprs", values)?, ctx)?;
    let invalid = match &aligned.operands[0] {
        Operand::Const(t) => Some(*t).filter(|t| *t <= 0.0),
        Operand::Data(ts) => ts.iter().copied().find(|t| *t <= 0.0),
    };
    if let Some(value) = invalid {
        return Err(Error::OutOfDomain { op: "svprs", value });
    }
    aligned.apply(|xs| saturation_vapour_pressure(xs[0]))
}

register!(
    SVPRS_FN,
    name = "svprs",
    signature = "svprs(t) -> Value",
    doc = "Saturation vapour pressure (Pa) over water of a temperature (K)",
    pointwise = [true],
    FunctionImpl::Field(svprs),
);
