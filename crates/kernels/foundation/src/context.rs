//! Evaluation context
//!
//! Everything an operator may read besides its operands: the default
//! projection and grid, the point list for pointwise evaluation, the current
//! levels and valid time, and unit settings.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::projection::{GridDef, MapProjection};
use crate::value::Point;

/// Smallest time series accepted by `ddt`
pub const DEFAULT_SERIES_MIN: usize = 2;
/// Largest time series accepted by `ddt`
pub const DEFAULT_SERIES_MAX: usize = 5;

/// Vertical level classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelCategory {
    Surface,
    MeanSeaLevel,
    Pressure,
    Layer,
    Other,
}

/// A named vertical level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub name: String,
    pub category: LevelCategory,
    /// Pressure (Pa) of a constant-pressure level
    pub pressure: Option<f64>,
    /// Upper and lower pressures (Pa) of a layer
    pub layer: Option<(f64, f64)>,
}

/// Parse `"500"`, `"500mb"`, `"500hPa"` into Pa.
fn parse_pressure(s: &str) -> Option<f64> {
    let lower = s.trim().to_ascii_lowercase();
    let digits = lower
        .strip_suffix("hpa")
        .or_else(|| lower.strip_suffix("mb"))
        .unwrap_or(&lower);
    digits
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|p| *p > 0.0)
        .map(|p| p * 100.0)
}

impl Level {
    pub fn parse(name: &str) -> Level {
        let trimmed = name.trim();
        let lower = trimmed.to_ascii_lowercase();
        let (category, pressure, layer) = match lower.as_str() {
            "surface" | "sfc" => (LevelCategory::Surface, None, None),
            "msl" => (LevelCategory::MeanSeaLevel, None, None),
            _ => {
                if let Some(p) = parse_pressure(&lower) {
                    (LevelCategory::Pressure, Some(p), None)
                } else if let Some((a, b)) = lower.split_once('-') {
                    match (parse_pressure(a), parse_pressure(b)) {
                        (Some(a), Some(b)) => {
                            (LevelCategory::Layer, None, Some((a.min(b), a.max(b))))
                        }
                        _ => (LevelCategory::Other, None, None),
                    }
                } else {
                    (LevelCategory::Other, None, None)
                }
            }
        };
        Level {
            name: trimmed.to_string(),
            category,
            pressure,
            layer,
        }
    }

    /// Upper level of a layer.
    pub fn upper(&self) -> Option<Level> {
        self.layer.map(|(upper, _)| Level::pressure(upper))
    }

    /// Lower level of a layer.
    pub fn lower(&self) -> Option<Level> {
        self.layer.map(|(_, lower)| Level::pressure(lower))
    }

    /// Constant-pressure level at `pa` Pascals.
    pub fn pressure(pa: f64) -> Level {
        Level {
            name: format!("{}mb", pa / 100.0),
            category: LevelCategory::Pressure,
            pressure: Some(pa),
            layer: None,
        }
    }
}

/// Per-evaluation settings threaded through every operator.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalContext {
    /// Default evaluation projection; its grid sets Grid/Spline dimensions
    pub projection: MapProjection,
    /// Evaluation points; `Some` selects pointwise mode
    pub points: Option<Vec<Point>>,
    pub level: Option<Level>,
    pub upper_level: Option<Level>,
    pub lower_level: Option<Level>,
    pub valid_time: NaiveDateTime,
    /// Valid time is local solar time
    pub local_time: bool,
    /// Metres per displayed distance unit for spatial derivatives
    pub display_distance: f64,
    pub series_min: usize,
    pub series_max: usize,
    /// Time offsets (minutes) at which `ddt` samples its argument
    pub series_offsets: Vec<f64>,
}

impl EvalContext {
    pub fn new(projection: MapProjection, valid_time: NaiveDateTime) -> Self {
        Self {
            projection,
            points: None,
            level: None,
            upper_level: None,
            lower_level: None,
            valid_time,
            local_time: false,
            display_distance: 1.0,
            series_min: DEFAULT_SERIES_MIN,
            series_max: DEFAULT_SERIES_MAX,
            series_offsets: vec![-60.0, 0.0],
        }
    }

    /// Builder method: evaluate at these points only.
    pub fn with_points(mut self, points: Vec<Point>) -> Self {
        self.points = Some(points);
        self
    }

    /// Builder method: set the current level; layers also set upper/lower.
    pub fn with_level(mut self, level: Level) -> Self {
        if level.category == LevelCategory::Layer {
            self.upper_level = level.upper();
            self.lower_level = level.lower();
        }
        self.level = Some(level);
        self
    }

    pub fn with_local_time(mut self, local_time: bool) -> Self {
        self.local_time = local_time;
        self
    }

    pub fn with_display_distance(mut self, metres: f64) -> Self {
        self.display_distance = metres;
        self
    }

    pub fn with_series_offsets(mut self, minutes: Vec<f64>) -> Self {
        self.series_offsets = minutes;
        self
    }

    /// Default grid dimensions, or `InvalidDefaultGrid`.
    pub fn default_grid(&self) -> Result<GridDef> {
        match self.projection.grid {
            Some(grid) if grid.is_valid() => Ok(grid),
            Some(grid) => Err(Error::InvalidDefaultGrid {
                nx: grid.nx,
                ny: grid.ny,
                cell_size: grid.cell_size,
            }),
            None => Err(Error::InvalidDefaultGrid {
                nx: 0,
                ny: 0,
                cell_size: 0.0,
            }),
        }
    }

    pub fn is_pointwise(&self) -> bool {
        self.points.is_some()
    }

    /// Evaluation points for pointwise mode.
    pub fn eval_points(&self) -> Result<&[Point]> {
        self.points.as_deref().ok_or(Error::NoEvaluationPoints)
    }

    /// Factor taking per-map-unit derivatives to per-display-distance.
    pub fn unit_factor(&self) -> f64 {
        self.display_distance / self.projection.map.units
    }

    /// Copy of this context with the valid time moved by `minutes`.
    pub fn shifted(&self, minutes: f64) -> EvalContext {
        let mut ctx = self.clone();
        ctx.valid_time += Duration::seconds((minutes * 60.0).round() as i64);
        ctx
    }
}
