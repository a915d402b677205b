//! Cached field objects

use metcalc_foundation::{GridDef, MapProjection, Point, Spline};
use serde::{Deserialize, Serialize};

/// One spline per component: one for continuous fields, two for vectors.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Surface {
    pub components: Vec<Spline>,
}

impl Surface {
    pub fn scalar(spline: Spline) -> Self {
        Self {
            components: vec![spline],
        }
    }

    pub fn vector(x: Spline, y: Spline) -> Self {
        Self {
            components: vec![x, y],
        }
    }

    pub fn is_vector(&self) -> bool {
        self.components.len() == 2
    }

    /// The only component of a single-component surface.
    pub fn single(&self) -> Option<&Spline> {
        match self.components.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    /// Grid definition implied by the spline parameters.
    pub fn grid_def(&self) -> Option<GridDef> {
        self.components.first().map(Spline::node_grid)
    }
}

/// A labelled point sequence, optionally carrying a value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Feature {
    pub label: String,
    pub points: Vec<Point>,
    #[serde(default)]
    pub value: Option<f64>,
}

impl Feature {
    pub fn new(label: impl Into<String>, points: Vec<Point>) -> Self {
        Self {
            label: label.into(),
            points,
            value: None,
        }
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }
}

/// Broad class of a field, used to pick it out of a metafile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Surface,
    AreaSet,
    CurveSet,
    PlotSet,
    SpotSet,
    LchainSet,
}

/// A field as held by the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Field {
    Surface(Surface),
    AreaSet(Vec<Feature>),
    CurveSet(Vec<Feature>),
    PlotSet(Vec<Feature>),
    SpotSet(Vec<Feature>),
    LchainSet(Vec<Feature>),
}

impl Field {
    pub fn category(&self) -> Category {
        match self {
            Field::Surface(_) => Category::Surface,
            Field::AreaSet(_) => Category::AreaSet,
            Field::CurveSet(_) => Category::CurveSet,
            Field::PlotSet(_) => Category::PlotSet,
            Field::SpotSet(_) => Category::SpotSet,
            Field::LchainSet(_) => Category::LchainSet,
        }
    }

    pub fn as_surface(&self) -> Option<&Surface> {
        match self {
            Field::Surface(s) => Some(s),
            _ => None,
        }
    }

    pub fn features(&self) -> Option<&[Feature]> {
        match self {
            Field::Surface(_) => None,
            Field::AreaSet(f)
            | Field::CurveSet(f)
            | Field::PlotSet(f)
            | Field::SpotSet(f)
            | Field::LchainSet(f) => Some(f),
        }
    }

    /// Record the grid implied by a surface on `projection`.
    pub(crate) fn stamp_grid(&self, projection: &mut MapProjection) {
        if let Some(grid) = self.as_surface().and_then(Surface::grid_def) {
            projection.grid = Some(grid);
        }
    }
}
