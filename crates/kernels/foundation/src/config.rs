//! Evaluation configuration loading.
//!
//! An [`EvalConfig`] is a YAML document describing the default evaluation
//! projection, grid, optional point list, levels and valid time. It is
//! validated on load and turned into an [`EvalContext`].
//!
//! ```yaml
//! apiVersion: metcalc/v1
//! kind: EvalConfig
//! projection:
//!   type: polar_stereographic
//!   north: true
//!   true_lat: 60.0
//! map: { olat: 40.0, olon: -100.0, lref: -100.0, xorg: 0, yorg: 0, xlen: 4000, ylen: 3000, units: 1000 }
//! grid: { nx: 81, ny: 61, cell_size: 50.0 }
//! validTime: 2026-10-19T12:00:00
//! level: 500mb
//! ```

use std::path::Path;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::context::{DEFAULT_SERIES_MAX, DEFAULT_SERIES_MIN, EvalContext, Level};
use crate::projection::{GridDef, MapDef, MapProjection, ProjectionKind};
use crate::value::Point;

const API_VERSION: &str = "metcalc/v1";
const KIND: &str = "EvalConfig";

/// Errors that can occur when loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse the configuration YAML.
    #[error("failed to parse config YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("invalid apiVersion: expected 'metcalc/v1', got '{0}'")]
    InvalidApiVersion(String),

    #[error("invalid kind: expected 'EvalConfig', got '{0}'")]
    InvalidKind(String),

    #[error("invalid grid: nx={nx}, ny={ny}, cell_size={cell_size}")]
    InvalidGrid { nx: usize, ny: usize, cell_size: f64 },

    #[error("map units must be positive, got {0}")]
    InvalidUnits(f64),

    #[error("series limits {min}..={max} are not usable")]
    InvalidSeriesLimits { min: usize, max: usize },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Evaluation points, either as map positions or as lat/lon pairs.
///
/// Written as a single-key map: `{ map: [[x, y], ...] }` or
/// `{ latLon: [[lat, lon], ...] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointList {
    Map {
        map: Vec<[f64; 2]>,
    },
    LatLon {
        #[serde(rename = "latLon")]
        lat_lon: Vec<[f64; 2]>,
    },
}

/// Serialized evaluation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvalConfig {
    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_kind")]
    pub kind: String,

    pub projection: ProjectionKind,

    #[serde(default)]
    pub map: MapDef,

    pub grid: GridDef,

    /// Pointwise mode when present
    #[serde(default)]
    pub points: Option<PointList>,

    pub valid_time: NaiveDateTime,

    #[serde(default)]
    pub level: Option<String>,

    #[serde(default)]
    pub upper_level: Option<String>,

    #[serde(default)]
    pub lower_level: Option<String>,

    #[serde(default)]
    pub local_time: bool,

    /// Metres per displayed distance unit for spatial derivatives
    #[serde(default = "default_display_distance")]
    pub display_distance: f64,

    #[serde(default = "default_series_min")]
    pub series_min: usize,

    #[serde(default = "default_series_max")]
    pub series_max: usize,

    /// Minutes relative to the valid time sampled by `ddt`
    #[serde(default = "default_series_offsets")]
    pub series_offsets: Vec<f64>,
}

fn default_api_version() -> String {
    API_VERSION.to_string()
}

fn default_kind() -> String {
    KIND.to_string()
}

fn default_display_distance() -> f64 {
    1.0
}

fn default_series_min() -> usize {
    DEFAULT_SERIES_MIN
}

fn default_series_max() -> usize {
    DEFAULT_SERIES_MAX
}

fn default_series_offsets() -> Vec<f64> {
    vec![-60.0, 0.0]
}

impl EvalConfig {
    /// Load a configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> ConfigResult<Self> {
        let config: EvalConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.api_version != API_VERSION {
            return Err(ConfigError::InvalidApiVersion(self.api_version.clone()));
        }
        if self.kind != KIND {
            return Err(ConfigError::InvalidKind(self.kind.clone()));
        }
        if !self.grid.is_valid() {
            return Err(ConfigError::InvalidGrid {
                nx: self.grid.nx,
                ny: self.grid.ny,
                cell_size: self.grid.cell_size,
            });
        }
        if self.map.units <= 0.0 {
            return Err(ConfigError::InvalidUnits(self.map.units));
        }
        if self.series_min < 2 || self.series_max < self.series_min {
            return Err(ConfigError::InvalidSeriesLimits {
                min: self.series_min,
                max: self.series_max,
            });
        }
        Ok(())
    }

    /// Build the evaluation context described by this configuration.
    pub fn into_context(self) -> EvalContext {
        let projection = MapProjection::new(self.projection, self.map).with_grid(self.grid);
        let points = self.points.map(|list| match list {
            PointList::Map { map } => map.into_iter().map(Point::from).collect::<Vec<_>>(),
            PointList::LatLon { lat_lon } => lat_lon
                .into_iter()
                .map(|[lat, lon]| projection.latlon_to_pos(lat, lon))
                .collect(),
        });

        let mut ctx = EvalContext::new(projection, self.valid_time)
            .with_local_time(self.local_time)
            .with_display_distance(self.display_distance)
            .with_series_offsets(self.series_offsets);
        ctx.series_min = self.series_min;
        ctx.series_max = self.series_max;
        ctx.points = points;
        if let Some(level) = self.level.as_deref() {
            ctx = ctx.with_level(Level::parse(level));
        }
        if let Some(upper) = self.upper_level.as_deref() {
            ctx.upper_level = Some(Level::parse(upper));
        }
        if let Some(lower) = self.lower_level.as_deref() {
            ctx.lower_level = Some(Level::parse(lower));
        }
        ctx
    }
}
