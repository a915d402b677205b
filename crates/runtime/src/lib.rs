//! metcalc Runtime
//!
//! Evaluates operator trees. Calls are resolved through the function
//! registry, leaves are read through the field database.

pub mod error;
pub mod evaluator;
pub mod expr;

pub use error::{Error, Result};
pub use evaluator::{check, Evaluator};
pub use expr::Expr;
