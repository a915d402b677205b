//! metcalc Equation Database
//!
//! Cache of fetched and computed fields keyed by [`FieldDescriptor`], with
//! fetch-on-miss through a [`FieldSource`] and vector assembly from x/y
//! components, declared in a [`ComponentTable`], through a [`Geometry`].

pub mod cache;
pub mod components;
pub mod database;
pub mod descriptor;
pub mod error;
pub mod field;
pub mod geometry;
pub mod source;

pub use cache::{CacheEntry, FieldCache};
pub use components::{ComponentTable, VectorElement};
pub use database::{Component, FieldDatabase};
pub use descriptor::{FieldDescriptor, FieldKind};
pub use error::{Error, FetchError, Result};
pub use field::{Category, Feature, Field, Surface};
pub use geometry::{Geometry, StandardGeometry};
pub use source::{FieldSource, MemorySource, Metafile};
