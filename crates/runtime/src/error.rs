//! Runtime errors

use thiserror::Error;

/// Runtime result type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort an evaluation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Value(#[from] metcalc_foundation::Error),

    #[error(transparent)]
    Database(#[from] metcalc_eqtn_db::Error),

    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error("{descriptor} is not a single-component surface")]
    NotASurface { descriptor: String },
}
