//! Native Math Functions
//!
//! Plain numeric functions, lifted element-wise over any value by the
//! registry. Trigonometric functions work in degrees.

use metcalc_registry::FunctionImpl;

// === Basic math ===

/// Absolute value: `abs(x)`
pub fn abs(args: &[f64]) -> f64 {
    args[0].abs()
}

/// Square root: `sqrt(x)`
pub fn sqrt(args: &[f64]) -> f64 {
    args[0].sqrt()
}

// === Exponential / Logarithmic ===

/// Exponential: `exp(x)` → `e^x`
pub fn exp(args: &[f64]) -> f64 {
    args[0].exp()
}

/// Natural log: `log(x)`
pub fn log(args: &[f64]) -> f64 {
    args[0].ln()
}

/// Log base 10: `log10(x)`
pub fn log10(args: &[f64]) -> f64 {
    args[0].log10()
}

// === Trigonometry (degrees) ===

pub fn sin(args: &[f64]) -> f64 {
    args[0].to_radians().sin()
}

pub fn cos(args: &[f64]) -> f64 {
    args[0].to_radians().cos()
}

pub fn tan(args: &[f64]) -> f64 {
    args[0].to_radians().tan()
}

pub fn asin(args: &[f64]) -> f64 {
    args[0].asin().to_degrees()
}

pub fn acos(args: &[f64]) -> f64 {
    args[0].acos().to_degrees()
}

pub fn atan(args: &[f64]) -> f64 {
    args[0].atan().to_degrees()
}

// === Hyperbolic ===

pub fn sinh(args: &[f64]) -> f64 {
    args[0].sinh()
}

pub fn cosh(args: &[f64]) -> f64 {
    args[0].cosh()
}

pub fn tanh(args: &[f64]) -> f64 {
    args[0].tanh()
}

macro_rules! native {
    ($($slot:ident => $name:literal, $f:path;)*) => {
        $(
            register!(
                $slot,
                name = $name,
                signature = concat!($name, "(x) -> Value"),
                doc = concat!("Element-wise ", $name),
                pointwise = [true],
                FunctionImpl::Native($f),
            );
        )*
    };
}

native! {
    ABS_FN => "abs", abs;
    SQRT_FN => "sqrt", sqrt;
    EXP_FN => "exp", exp;
    LOG_FN => "log", log;
    LOG10_FN => "log10", log10;
    SIN_FN => "sin", sin;
    COS_FN => "cos", cos;
    TAN_FN => "tan", tan;
    ASIN_FN => "asin", asin;
    ACOS_FN => "acos", acos;
    ATAN_FN => "atan", atan;
    SINH_FN => "sinh", sinh;
    COSH_FN => "cosh", cosh;
    TANH_FN => "tanh", tanh;
}
