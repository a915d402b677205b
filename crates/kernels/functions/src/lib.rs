//! metcalc Operator Library
//!
//! Operators available to equations. Every operator is registered into
//! [`metcalc_registry::FUNCTIONS`] at link time through the `register!`
//! macro, so depending on this crate is enough to populate the registry.

/// Register a function descriptor in the link-time function table.
///
/// The arity is the number of pointwise flags.
macro_rules! register {
    (
        $slot:ident,
        name = $name:expr,
        signature = $signature:expr,
        doc = $doc:expr,
        pointwise = [$($pw:expr),* $(,)?],
        $implementation:expr $(,)?
    ) => {
        #[::linkme::distributed_slice(::metcalc_registry::FUNCTIONS)]
        static $slot: ::metcalc_registry::FunctionDescriptor =
            ::metcalc_registry::FunctionDescriptor {
                name: $name,
                signature: $signature,
                doc: $doc,
                arity: <[bool]>::len(&[$($pw),*]),
                pointwise: &[$($pw),*],
                implementation: $implementation,
            };
    };
}

pub mod arith;
pub mod clamp;
pub mod ddt;
pub mod deriv;
pub mod geo;
pub mod level;
pub mod math;
mod sample;
pub mod solar;
pub mod thermo;

pub use metcalc_registry::{all_names, find, is_known, FunctionClass, FunctionDescriptor};

use metcalc_foundation::{Error, Result, Value};

/// Borrow exactly `N` arguments, or fail with `Arity`.
pub(crate) fn args<'a, const N: usize>(
    op: &'static str,
    args: &'a [Value],
) -> Result<&'a [Value; N]> {
    args.try_into().map_err(|_| Error::Arity {
        op,
        expected: N,
        got: args.len(),
    })
}
