//! Value and operator errors

use thiserror::Error;

use crate::value::ValueKind;

/// Foundation result type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building, converting or combining values.
///
/// Every operator surfaces these to its immediate caller; the evaluator
/// aborts the whole equation on the first one.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("unknown value kind: {0}")]
    UnknownValueKind(String),

    #[error("cannot convert {from} to {to}")]
    Conversion { from: ValueKind, to: ValueKind },

    #[error("default evaluation grid is not usable (nx={nx}, ny={ny}, cell_size={cell_size})")]
    InvalidDefaultGrid { nx: usize, ny: usize, cell_size: f64 },

    #[error("shape mismatch in {op}: {detail}")]
    ShapeMismatch { op: &'static str, detail: String },

    #[error("{op}: vector lists are defined over different points")]
    PointMismatch { op: &'static str },

    #[error("{op}: cannot combine {left} with {right}")]
    IncompatibleKind {
        op: &'static str,
        left: ValueKind,
        right: ValueKind,
    },

    #[error("{op}: division by zero")]
    DivideByZero { op: &'static str },

    #[error("time series has {len} members, expected {min}..={max}")]
    SeriesLength { len: usize, min: usize, max: usize },

    #[error("time series mixes {first} and {other} members")]
    UnmatchedSeriesKind { first: ValueKind, other: ValueKind },

    #[error("time series has more than one member at t={0}")]
    DuplicateSeriesTime(f64),

    #[error("{which} level {level:?} is not a constant-pressure level")]
    LevelCategory {
        which: &'static str,
        level: Option<String>,
    },

    #[error("{op}: argument {value} is outside the valid domain")]
    OutOfDomain { op: &'static str, value: f64 },

    #[error("pointwise evaluation requested without evaluation points")]
    NoEvaluationPoints,

    #[error("{op} expects {expected} arguments, got {got}")]
    Arity {
        op: &'static str,
        expected: usize,
        got: usize,
    },
}
