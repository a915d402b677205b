//! metcalc Foundation
//!
//! Core types shared by every metcalc crate: the four-way [`Value`]
//! representation of a meteorological field, conversion between
//! representations, the spline primitive behind those conversions, map
//! projection geometry, and the [`EvalContext`] threaded through every
//! operator.

pub mod align;
pub mod config;
pub mod context;
pub mod convert;
pub mod error;
pub mod projection;
pub mod spline;
pub mod value;

pub use align::{Aligned, Layout, Operand, align};
pub use config::{ConfigError, ConfigResult, EvalConfig, PointList};
pub use context::{EvalContext, Level, LevelCategory};
pub use convert::{convert, grid_to_spline, normalize_grid, on_default_grid, spline_to_grid};
pub use error::{Error, Result};
pub use projection::{GridDef, MapDef, MapProjection, ProjectionKind};
pub use spline::{Derivatives, fit_grid, series_slope_at};
pub use value::{Grid, Point, Spline, Value, ValueKind, VectorList};
