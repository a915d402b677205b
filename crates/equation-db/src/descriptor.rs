//! Field descriptors
//!
//! A descriptor names one field: where it comes from, when it is valid,
//! which element and level it holds, and what kind of field it is. Cache
//! identity ignores the attached projection.

use std::fmt;

use chrono::NaiveDateTime;
use metcalc_foundation::MapProjection;
use serde::{Deserialize, Serialize};

/// Explicit field-kind tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Continuous,
    Vector,
    Discrete,
    Wind,
    Line,
    Scattered,
    Lchain,
}

impl FieldKind {
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Continuous => "continuous",
            FieldKind::Vector => "vector",
            FieldKind::Discrete => "discrete",
            FieldKind::Wind => "wind",
            FieldKind::Line => "line",
            FieldKind::Scattered => "scattered",
            FieldKind::Lchain => "lchain",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identifies one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub source: String,
    #[serde(default)]
    pub subsource: String,
    #[serde(default)]
    pub run_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub valid_time: Option<NaiveDateTime>,
    pub element: String,
    pub level: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub projection: Option<MapProjection>,
}

impl FieldDescriptor {
    pub fn new(
        source: impl Into<String>,
        element: impl Into<String>,
        level: impl Into<String>,
        kind: FieldKind,
    ) -> Self {
        Self {
            source: source.into(),
            subsource: String::new(),
            run_time: None,
            valid_time: None,
            element: element.into(),
            level: level.into(),
            kind,
            projection: None,
        }
    }

    pub fn with_subsource(mut self, subsource: impl Into<String>) -> Self {
        self.subsource = subsource.into();
        self
    }

    pub fn with_run_time(mut self, run_time: NaiveDateTime) -> Self {
        self.run_time = Some(run_time);
        self
    }

    pub fn with_valid_time(mut self, valid_time: NaiveDateTime) -> Self {
        self.valid_time = Some(valid_time);
        self
    }

    pub fn with_projection(mut self, projection: MapProjection) -> Self {
        self.projection = Some(projection);
        self
    }

    /// Same descriptor for another element and kind.
    pub fn component(&self, element: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            element: element.into(),
            kind,
            ..self.clone()
        }
    }

    /// Cache identity: every field but the projection.
    pub fn same_field(&self, other: &FieldDescriptor) -> bool {
        self.source == other.source
            && self.subsource == other.subsource
            && self.run_time == other.run_time
            && self.valid_time == other.valid_time
            && self.element == other.element
            && self.level == other.level
            && self.kind == other.kind
    }

    /// Copy with names trimmed and case-folded.
    pub fn normalized(&self) -> FieldDescriptor {
        let fold = |s: &str| s.trim().to_lowercase();
        FieldDescriptor {
            source: fold(&self.source),
            subsource: fold(&self.subsource),
            element: fold(&self.element),
            level: fold(&self.level),
            ..self.clone()
        }
    }

    /// Identity after normalising names on both sides.
    pub fn matches_normalized(&self, other: &FieldDescriptor) -> bool {
        self.normalized().same_field(&other.normalized())
    }
}

impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)?;
        if !self.subsource.is_empty() {
            write!(f, ":{}", self.subsource)?;
        }
        write!(f, " {} {} ({})", self.element, self.level, self.kind)?;
        if let Some(t) = self.valid_time {
            write!(f, " valid {t}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use metcalc_foundation::{MapDef, ProjectionKind};

    use super::*;

    fn temperature() -> FieldDescriptor {
        FieldDescriptor::new("gem", "temp", "500mb", FieldKind::Continuous)
    }

    #[test]
    fn test_identity_ignores_projection() {
        let mercator =
            MapProjection::new(ProjectionKind::Mercator { true_lat: 0.0 }, MapDef::default());
        let a = temperature();
        let b = temperature().with_projection(mercator);
        assert!(a.same_field(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_identity_is_exact_on_names() {
        let padded = FieldDescriptor::new(" GEM", "Temp ", "500MB", FieldKind::Continuous);
        assert!(!temperature().same_field(&padded));
        assert!(temperature().matches_normalized(&padded));
        let vector = temperature().component("temp", FieldKind::Vector);
        assert!(!temperature().matches_normalized(&vector));
    }

    #[test]
    fn test_component_keeps_everything_else() {
        let wind =
            FieldDescriptor::new("gem", "wind", "850mb", FieldKind::Vector).with_subsource("reg");
        let u = wind.component("uuwind", FieldKind::Continuous);
        assert_eq!(u.element, "uuwind");
        assert_eq!(u.subsource, "reg");
        assert_eq!(u.kind, FieldKind::Continuous);
    }

    #[test]
    fn test_display() {
        let d = temperature().with_subsource("reg");
        assert_eq!(d.to_string(), "gem:reg temp 500mb (continuous)");
    }
}
