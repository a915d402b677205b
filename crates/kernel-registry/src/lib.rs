//! Function Registry.
//!
//! Maps function names used in equations to their descriptors: arity,
//! per-argument evaluability, classification and the callable.
//!
//! # Architecture
//!
//! The registry uses [`linkme::distributed_slice`] for link-time registration:
//!
//! 1. Operator crates declare `#[distributed_slice(FUNCTIONS)]` statics
//! 2. At link time, all registrations are collected into [`FUNCTIONS`]
//! 3. At runtime, [`find`] scans the table by case-insensitive name
//!
//! # Function Classes
//!
//! - **Native** ([`FunctionImpl::Native`]) - plain numbers in, number out,
//!   e.g. `sqrt(x)`; lifted element-wise over any value
//! - **Field** ([`FunctionImpl::Field`]) - values in, value out, e.g. `ddx(z)`
//! - **Time series** ([`FunctionImpl::TimeSeries`]) - one value per sample
//!   time, e.g. `ddt(t)`
//!
//! # Example Lookup
//!
//! ```ignore
//! use metcalc_registry::find;
//!
//! let plus = find("PLUS").expect("registered by metcalc-functions");
//! let sum = plus.call(&[Value::Scalar(1.0), Value::Scalar(2.0)], &ctx)?;
//! ```

pub use linkme;

use linkme::distributed_slice;
use metcalc_foundation::{align, EvalContext, Error, Result, Value};

/// Signature for plain numeric functions
pub type NativeFn = fn(&[f64]) -> f64;

/// Signature for value-returning field functions
pub type FieldFn = fn(&[Value], &EvalContext) -> Result<Value>;

/// Signature for time-series functions: sample times (minutes) and members
pub type SeriesFn = fn(&[f64], &[Value], &EvalContext) -> Result<Value>;

/// Classification of a registered function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionClass {
    Native,
    Field,
    TimeSeries,
}

/// The actual function pointer, tagged by calling convention
#[derive(Clone, Copy)]
pub enum FunctionImpl {
    Native(NativeFn),
    Field(FieldFn),
    TimeSeries(SeriesFn),
}

impl FunctionImpl {
    pub fn class(&self) -> FunctionClass {
        match self {
            FunctionImpl::Native(_) => FunctionClass::Native,
            FunctionImpl::Field(_) => FunctionClass::Field,
            FunctionImpl::TimeSeries(_) => FunctionClass::TimeSeries,
        }
    }
}

/// Descriptor for a registered function
pub struct FunctionDescriptor {
    /// Canonical name (matched case-insensitively)
    pub name: &'static str,
    /// Signature string, e.g. "between(x, lo, hi) -> Value"
    pub signature: &'static str,
    /// Documentation string
    pub doc: &'static str,
    /// Fixed number of arguments
    pub arity: usize,
    /// Per argument: may it be supplied as a pointwise evaluation, or must
    /// it be a full field
    pub pointwise: &'static [bool],
    /// The implementation
    pub implementation: FunctionImpl,
}

impl FunctionDescriptor {
    pub fn class(&self) -> FunctionClass {
        self.implementation.class()
    }

    /// Whether argument `index` may be evaluated pointwise.
    pub fn accepts_pointwise(&self, index: usize) -> bool {
        self.pointwise.get(index).copied().unwrap_or(true)
    }

    fn check_arity(&self, got: usize) -> Result<()> {
        if got != self.arity {
            return Err(Error::Arity {
                op: self.name,
                expected: self.arity,
                got,
            });
        }
        Ok(())
    }

    /// Call a native or field function.
    ///
    /// Native functions are applied element-wise. A time-series function
    /// called this way takes one member per offset in
    /// [`EvalContext::series_offsets`].
    pub fn call(&self, args: &[Value], ctx: &EvalContext) -> Result<Value> {
        match self.implementation {
            FunctionImpl::Native(f) => {
                self.check_arity(args.len())?;
                lift_native(self.name, f, args, ctx)
            }
            FunctionImpl::Field(f) => {
                self.check_arity(args.len())?;
                f(args, ctx)
            }
            FunctionImpl::TimeSeries(f) => f(&ctx.series_offsets, args, ctx),
        }
    }

    /// Call a time-series function with one member per sample time.
    pub fn call_series(
        &self,
        times: &[f64],
        members: &[Value],
        ctx: &EvalContext,
    ) -> Result<Value> {
        match self.implementation {
            FunctionImpl::TimeSeries(f) => f(times, members, ctx),
            _ => self.call(members, ctx),
        }
    }
}

/// Apply a numeric function element-wise across aligned operands.
fn lift_native(
    name: &'static str,
    f: NativeFn,
    args: &[Value],
    ctx: &EvalContext,
) -> Result<Value> {
    align(name, args, ctx)?.apply(f)
}

/// Distributed slice collecting all function registrations.
#[distributed_slice]
pub static FUNCTIONS: [FunctionDescriptor];

/// Get all registered function names
pub fn all_names() -> impl Iterator<Item = &'static str> {
    FUNCTIONS.iter().map(|f| f.name)
}

/// Look up a function by name, ignoring case
pub fn find(name: &str) -> Option<&'static FunctionDescriptor> {
    FUNCTIONS.iter().find(|f| f.name.eq_ignore_ascii_case(name))
}

/// Check if a function name is registered
pub fn is_known(name: &str) -> bool {
    find(name).is_some()
}
