//! Field retrieval
//!
//! [`FieldSource`] resolves descriptors to metafiles; [`Metafile`] hands out
//! individual fields. [`MemorySource`] keeps everything in memory.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use indexmap::IndexMap;
use metcalc_foundation::MapProjection;

use crate::descriptor::{FieldDescriptor, FieldKind};
use crate::field::{Category, Field};

/// Retrieval collaborator consulted on cache misses.
pub trait FieldSource {
    /// Backing file holding the descriptor's fields.
    fn locate(&self, descriptor: &FieldDescriptor) -> Option<PathBuf>;

    /// Read a metafile. `projection` is the projection the caller intends to
    /// evaluate on.
    fn read_metafile(&self, path: &Path, projection: Option<&MapProjection>) -> Option<Metafile>;
}

/// Fields of one valid time from one source, on one projection.
///
/// The projection carries no grid definition; grids are implied by the
/// spline parameters of each surface.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Metafile {
    pub projection: MapProjection,
    fields: IndexMap<(String, String), (FieldKind, Field)>,
}

fn key(element: &str, level: &str) -> (String, String) {
    (element.trim().to_lowercase(), level.trim().to_lowercase())
}

impl Metafile {
    pub fn new(mut projection: MapProjection) -> Self {
        projection.grid = None;
        Self {
            projection,
            fields: IndexMap::new(),
        }
    }

    /// Builder method: add a field.
    pub fn with_field(
        mut self,
        element: &str,
        level: &str,
        kind: FieldKind,
        field: Field,
    ) -> Self {
        self.insert(element, level, kind, field);
        self
    }

    pub fn insert(&mut self, element: &str, level: &str, kind: FieldKind, field: Field) {
        self.fields.insert(key(element, level), (kind, field));
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Copy out the named field if it has the requested category and kind.
    pub fn take_field(
        &self,
        category: Category,
        kind: FieldKind,
        element: &str,
        level: &str,
    ) -> Option<Field> {
        self.fields
            .get(&key(element, level))
            .filter(|(k, f)| *k == kind && f.category() == category)
            .map(|(_, f)| f.clone())
    }
}

/// In-memory [`FieldSource`] keyed by source, subsource and times.
#[derive(Debug, Default)]
pub struct MemorySource {
    files: IndexMap<PathBuf, Metafile>,
    reads: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Path a descriptor resolves to.
    pub fn path_for(descriptor: &FieldDescriptor) -> PathBuf {
        let stamp = |t: Option<chrono::NaiveDateTime>| {
            t.map(|t| t.format("%Y%m%d%H%M").to_string())
                .unwrap_or_else(|| "-".to_string())
        };
        let subsource = if descriptor.subsource.is_empty() {
            "-"
        } else {
            descriptor.subsource.as_str()
        };
        PathBuf::from(descriptor.source.trim().to_lowercase())
            .join(subsource.trim().to_lowercase())
            .join(stamp(descriptor.run_time))
            .join(stamp(descriptor.valid_time))
    }

    /// Store `metafile` as the backing file for descriptors like `like`.
    pub fn insert(&mut self, like: &FieldDescriptor, metafile: Metafile) {
        self.files.insert(Self::path_for(like), metafile);
    }

    /// Backing metafile for descriptors like `like`, created empty on
    /// `projection` if absent.
    pub fn metafile_mut(
        &mut self,
        like: &FieldDescriptor,
        projection: &MapProjection,
    ) -> &mut Metafile {
        self.files
            .entry(Self::path_for(like))
            .or_insert_with(|| Metafile::new(projection.clone()))
    }

    /// Number of successful metafile reads.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }
}

impl FieldSource for MemorySource {
    fn locate(&self, descriptor: &FieldDescriptor) -> Option<PathBuf> {
        let path = Self::path_for(descriptor);
        self.files.contains_key(&path).then_some(path)
    }

    fn read_metafile(&self, path: &Path, _projection: Option<&MapProjection>) -> Option<Metafile> {
        let metafile = self.files.get(path).cloned();
        if metafile.is_some() {
            self.reads.fetch_add(1, Ordering::Relaxed);
        }
        metafile
    }
}
