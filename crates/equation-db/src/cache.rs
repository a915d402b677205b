//! Field cache
//!
//! A growable table of slots, each either empty or holding one fetched or
//! computed field. The table never shrinks: deleted slots are reused by the
//! next [`FieldCache::add`]. Lookups start at the slot of the last hit.

use metcalc_foundation::MapProjection;
use tracing::debug;

use crate::descriptor::FieldDescriptor;
use crate::field::Field;

/// A populated cache slot.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub descriptor: FieldDescriptor,
    /// Projection the field was read on, with the grid implied by a surface
    pub projection: MapProjection,
    pub field: Field,
}

impl CacheEntry {
    pub(crate) fn new(
        descriptor: FieldDescriptor,
        mut projection: MapProjection,
        field: Field,
    ) -> Self {
        field.stamp_grid(&mut projection);
        Self {
            descriptor,
            projection,
            field,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
enum Slot {
    #[default]
    Empty,
    Populated(CacheEntry),
}

impl Slot {
    fn entry(&self) -> Option<&CacheEntry> {
        match self {
            Slot::Populated(entry) => Some(entry),
            Slot::Empty => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct FieldCache {
    slots: Vec<Slot>,
    last_hit: Option<usize>,
}

impl FieldCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of populated slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.entry().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of slots, populated or not.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn last_hit(&self) -> Option<usize> {
        self.last_hit
    }

    pub fn get(&self, index: usize) -> Option<&CacheEntry> {
        self.slots.get(index).and_then(Slot::entry)
    }

    pub fn entries(&self) -> impl Iterator<Item = &CacheEntry> {
        self.slots.iter().filter_map(Slot::entry)
    }

    fn scan(&self, mut matches: impl FnMut(&FieldDescriptor) -> bool) -> Option<usize> {
        let n = self.slots.len();
        let start = self.last_hit.filter(|&i| i < n).unwrap_or(0);
        (0..n)
            .map(|k| (start + k) % n)
            .find(|&i| self.get(i).is_some_and(|e| matches(&e.descriptor)))
    }

    /// Slot holding `descriptor`, ignoring projections.
    ///
    /// Updates the last-hit hint on a hit and clears it on a miss.
    pub fn lookup(&mut self, descriptor: &FieldDescriptor) -> Option<usize> {
        let found = self.scan(|d| d.same_field(descriptor));
        self.last_hit = found;
        debug!(%descriptor, slot = ?found, "cache lookup");
        found
    }

    /// Store a field in the first empty slot, or a new one.
    pub fn add(
        &mut self,
        descriptor: FieldDescriptor,
        projection: MapProjection,
        field: Field,
    ) -> usize {
        let entry = Slot::Populated(CacheEntry::new(descriptor, projection, field));
        match self.slots.iter().position(|s| matches!(s, Slot::Empty)) {
            Some(index) => {
                self.slots[index] = entry;
                index
            }
            None => {
                self.slots.push(entry);
                self.slots.len() - 1
            }
        }
    }

    /// Overwrite the slot matching the normalised descriptor, or add.
    pub fn replace(
        &mut self,
        descriptor: FieldDescriptor,
        projection: MapProjection,
        field: Field,
    ) -> usize {
        match self.scan(|d| d.matches_normalized(&descriptor)) {
            Some(index) => {
                self.slots[index] = Slot::Populated(CacheEntry::new(descriptor, projection, field));
                index
            }
            None => self.add(descriptor, projection, field),
        }
    }

    /// Empty the slot holding `descriptor`. Returns whether one was found.
    pub fn delete(&mut self, descriptor: &FieldDescriptor) -> bool {
        let found = self.scan(|d| d.same_field(descriptor));
        self.last_hit = None;
        match found {
            Some(index) => {
                self.slots[index] = Slot::Empty;
                true
            }
            None => false,
        }
    }

    /// Empty every slot and release the table.
    pub fn clear_all(&mut self) {
        self.slots = Vec::new();
        self.last_hit = None;
    }
}
