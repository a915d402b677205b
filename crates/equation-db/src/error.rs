//! Equation database errors

use thiserror::Error;

/// Equation database result type
pub type Result<T> = std::result::Result<T, Error>;

/// Why a field could not be fetched from its source.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("no backing file for {0}")]
    NoBackingFile(String),

    #[error("metafile {path} for {descriptor} is unreadable")]
    Unreadable { path: String, descriptor: String },

    #[error("{descriptor} is not present in {path}")]
    NotPresent { path: String, descriptor: String },
}

/// Equation database errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("components of {descriptor} were read on different projections")]
    MismatchedProjection { descriptor: String },

    #[error("component {element} of {descriptor} is missing")]
    MissingComponent { descriptor: String, element: String },

    #[error("{0} is not a vector field")]
    NotVectorField(String),

    #[error(transparent)]
    Value(#[from] metcalc_foundation::Error),
}
