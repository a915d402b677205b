//! Range Operators
//!
//! `between(x, lo, hi)` clamps into a range, `outside(x, lo, hi)` pushes
//! values out of it. Both align their three operands first.

use metcalc_foundation::{align, EvalContext, Result, Value};
use metcalc_registry::FunctionImpl;

use crate::args;

/// Clamp `x` into `[lo, hi]`.
#[inline]
pub fn between_value(x: f64, lo: f64, hi: f64) -> f64 {
    x.max(lo).min(hi)
}

/// Move `x` strictly inside `(lo, hi)` to the nearer bound; the midpoint
/// itself goes to `hi`.
#[inline]
pub fn outside_value(x: f64, lo: f64, hi: f64) -> f64 {
    if lo < x && x < hi {
        let mid = (lo + hi) / 2.0;
        if x < mid { lo } else { hi }
    } else {
        x
    }
}

fn ternary(
    op: &'static str,
    values: &[Value],
    ctx: &EvalContext,
    f: fn(f64, f64, f64) -> f64,
) -> Result<Value> {
    let operands = args::<3>(op, values)?;
    align(op, operands, ctx)?.apply(|xs| f(xs[0], xs[1], xs[2]))
}

pub fn between(values: &[Value], ctx: &EvalContext) -> Result<Value> {
    ternary("between", values, ctx, between_value)
}

pub fn outside(values: &[Value], ctx: &EvalContext) -> Result<Value> {
    ternary("outside", values, ctx, outside_value)
}

register!(
    BETWEEN_FN,
    name = "between",
    signature = "between(x, lo, hi) -> Value",
    doc = "Clamp x into [lo, hi]",
    pointwise = [true, true, true],
    FunctionImpl::Field(between),
);

register!(
    OUTSIDE_FN,
    name = "outside",
    signature = "outside(x, lo, hi) -> Value",
    doc = "Move values inside (lo, hi) to the nearer bound",
    pointwise = [true, true, true],
    FunctionImpl::Field(outside),
);
