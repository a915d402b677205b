//! Arithmetic Operators
//!
//! `power`, `plus`, `minus`, `multiply`, `divide`, `max` and `min` over any
//! pair of values.
//!
//! Resolution, in order:
//!
//! - a scalar against a spline broadcasts over the spline coefficients
//! - two splines with equal coefficient dimensions combine coefficient-wise
//! - everything else is aligned (splines sampled to grids, scalars
//!   broadcast, mismatched grids renormalised) and combined element-wise
//!
//! Vector lists never combine with grids or splines, and two vector lists
//! must share their points.

use metcalc_foundation::{align, EvalContext, Error, Result, Spline, Value};
use metcalc_registry::FunctionImpl;

use crate::args;

/// An element-wise binary operator.
#[derive(Debug, Clone, Copy)]
pub struct BinaryOp {
    pub name: &'static str,
    pub apply: fn(f64, f64) -> f64,
    /// Fail with `DivideByZero` if any right-hand element is `0.0`
    pub rejects_zero_rhs: bool,
}

pub const POWER: BinaryOp = BinaryOp {
    name: "power",
    apply: f64::powf,
    rejects_zero_rhs: false,
};

pub const PLUS: BinaryOp = BinaryOp {
    name: "plus",
    apply: |a, b| a + b,
    rejects_zero_rhs: false,
};

pub const MINUS: BinaryOp = BinaryOp {
    name: "minus",
    apply: |a, b| a - b,
    rejects_zero_rhs: false,
};

pub const MULTIPLY: BinaryOp = BinaryOp {
    name: "multiply",
    apply: |a, b| a * b,
    rejects_zero_rhs: false,
};

pub const DIVIDE: BinaryOp = BinaryOp {
    name: "divide",
    apply: |a, b| a / b,
    rejects_zero_rhs: true,
};

pub const MAX: BinaryOp = BinaryOp {
    name: "max",
    apply: f64::max,
    rejects_zero_rhs: false,
};

pub const MIN: BinaryOp = BinaryOp {
    name: "min",
    apply: f64::min,
    rejects_zero_rhs: false,
};

impl BinaryOp {
    fn check_divisor<'a>(&self, mut divisor: impl Iterator<Item = &'a f64>) -> Result<()> {
        if self.rejects_zero_rhs && divisor.any(|&v| v == 0.0) {
            return Err(Error::DivideByZero { op: self.name });
        }
        Ok(())
    }

    fn coeffwise(&self, left: &Spline, right: &Spline) -> Spline {
        Spline {
            coeffs: left
                .coeffs
                .iter()
                .zip(&right.coeffs)
                .map(|(&a, &b)| (self.apply)(a, b))
                .collect(),
            ..left.clone()
        }
    }
}

/// Combine two values with `op`. Neither input is modified.
pub fn combine(op: BinaryOp, left: &Value, right: &Value, ctx: &EvalContext) -> Result<Value> {
    let f = op.apply;
    match (left, right) {
        (Value::Scalar(a), Value::Spline(s)) => {
            op.check_divisor(s.coeffs.iter())?;
            Ok(Value::Spline(s.map_coeffs(|c| f(*a, c))))
        }
        (Value::Spline(s), Value::Scalar(b)) => {
            op.check_divisor(std::iter::once(b))?;
            Ok(Value::Spline(s.map_coeffs(|c| f(c, *b))))
        }
        (Value::Spline(p), Value::Spline(q)) if p.same_shape(q) => {
            op.check_divisor(q.coeffs.iter())?;
            Ok(Value::Spline(op.coeffwise(p, q)))
        }
        _ => {
            let aligned = align(op.name, &[left.clone(), right.clone()], ctx)?;
            if op.rejects_zero_rhs && aligned.operands[1].has_zero() {
                return Err(Error::DivideByZero { op: op.name });
            }
            aligned.apply(|xs| f(xs[0], xs[1]))
        }
    }
}

fn binary(op: BinaryOp, values: &[Value], ctx: &EvalContext) -> Result<Value> {
    let [left, right] = args::<2>(op.name, values)?;
    combine(op, left, right, ctx)
}

pub fn power(values: &[Value], ctx: &EvalContext) -> Result<Value> {
    binary(POWER, values, ctx)
}

pub fn plus(values: &[Value], ctx: &EvalContext) -> Result<Value> {
    binary(PLUS, values, ctx)
}

pub fn minus(values: &[Value], ctx: &EvalContext) -> Result<Value> {
    binary(MINUS, values, ctx)
}

pub fn multiply(values: &[Value], ctx: &EvalContext) -> Result<Value> {
    binary(MULTIPLY, values, ctx)
}

pub fn divide(values: &[Value], ctx: &EvalContext) -> Result<Value> {
    binary(DIVIDE, values, ctx)
}

pub fn max(values: &[Value], ctx: &EvalContext) -> Result<Value> {
    binary(MAX, values, ctx)
}

pub fn min(values: &[Value], ctx: &EvalContext) -> Result<Value> {
    binary(MIN, values, ctx)
}

register!(
    POWER_FN,
    name = "power",
    signature = "power(base, exponent) -> Value",
    doc = "Element-wise base raised to exponent",
    pointwise = [true, true],
    FunctionImpl::Field(power),
);

register!(
    PLUS_FN,
    name = "plus",
    signature = "plus(a, b) -> Value",
    doc = "Element-wise sum",
    pointwise = [true, true],
    FunctionImpl::Field(plus),
);

register!(
    MINUS_FN,
    name = "minus",
    signature = "minus(a, b) -> Value",
    doc = "Element-wise difference",
    pointwise = [true, true],
    FunctionImpl::Field(minus),
);

register!(
    MULTIPLY_FN,
    name = "multiply",
    signature = "multiply(a, b) -> Value",
    doc = "Element-wise product",
    pointwise = [true, true],
    FunctionImpl::Field(multiply),
);

register!(
    DIVIDE_FN,
    name = "divide",
    signature = "divide(a, b) -> Value",
    doc = "Element-wise quotient; any zero divisor element is an error",
    pointwise = [true, true],
    FunctionImpl::Field(divide),
);

register!(
    MAX_FN,
    name = "max",
    signature = "max(a, b) -> Value",
    doc = "Element-wise maximum",
    pointwise = [true, true],
    FunctionImpl::Field(max),
);

register!(
    MIN_FN,
    name = "min",
    signature = "min(a, b) -> Value",
    doc = "Element-wise minimum",
    pointwise = [true, true],
    FunctionImpl::Field(min),
);
