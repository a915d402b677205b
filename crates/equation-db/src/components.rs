//! Vector component metadata
//!
//! Element configuration naming the x/y component elements of each vector
//! element. It decides how a descriptor is read: vector elements are
//! assembled from their components, either component is reprojected jointly
//! with its partner, and everything else is a plain cache-or-fetch.
//!
//! ```yaml
//! wind: { x: uuwind, y: vvwind }
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::database::Component;

/// Component elements of one vector element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorElement {
    pub x: String,
    pub y: String,
}

/// Vector elements keyed by their case-folded name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentTable {
    vectors: IndexMap<String, VectorElement>,
}

fn fold(element: &str) -> String {
    element.trim().to_lowercase()
}

impl ComponentTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: declare `element` as a vector of `x` and `y`.
    pub fn with_vector(mut self, element: &str, x: &str, y: &str) -> Self {
        self.insert(element, x, y);
        self
    }

    pub fn insert(&mut self, element: &str, x: &str, y: &str) {
        self.vectors.insert(
            fold(element),
            VectorElement {
                x: x.to_string(),
                y: y.to_string(),
            },
        );
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Components of a vector element.
    pub fn vector(&self, element: &str) -> Option<&VectorElement> {
        let key = fold(element);
        self.vectors
            .iter()
            .find(|(name, _)| fold(name) == key)
            .map(|(_, v)| v)
    }

    /// Partner element of a component, and which half `element` is.
    pub fn component(&self, element: &str) -> Option<(&str, Component)> {
        let key = fold(element);
        self.vectors.values().find_map(|v| {
            if fold(&v.x) == key {
                Some((v.y.as_str(), Component::X))
            } else if fold(&v.y) == key {
                Some((v.x.as_str(), Component::Y))
            } else {
                None
            }
        })
    }
}
