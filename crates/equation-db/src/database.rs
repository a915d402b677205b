//! Field database
//!
//! Couples the [`FieldCache`] with a [`FieldSource`] consulted on misses and
//! a [`Geometry`] used to assemble vector fields from their components.

use metcalc_foundation::MapProjection;
use tracing::{debug, instrument, warn};

use crate::cache::{CacheEntry, FieldCache};
use crate::components::ComponentTable;
use crate::descriptor::{FieldDescriptor, FieldKind};
use crate::error::{Error, FetchError, Result};
use crate::field::{Category, Field, Surface};
use crate::geometry::{Geometry, StandardGeometry};
use crate::source::FieldSource;

/// Half of a vector field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    X,
    Y,
}

/// Cache-or-fetch access to fields.
#[derive(Debug)]
pub struct FieldDatabase<S, G = StandardGeometry> {
    source: S,
    geometry: G,
    components: ComponentTable,
    cache: FieldCache,
    prefer_plot: bool,
    last_projection: Option<MapProjection>,
}

impl<S: FieldSource> FieldDatabase<S> {
    pub fn new(source: S) -> Self {
        Self::with_geometry(source, StandardGeometry)
    }
}

impl<S: FieldSource, G: Geometry> FieldDatabase<S, G> {
    pub fn with_geometry(source: S, geometry: G) -> Self {
        Self {
            source,
            geometry,
            components: ComponentTable::new(),
            cache: FieldCache::new(),
            prefer_plot: false,
            last_projection: None,
        }
    }

    /// Builder method: vector component metadata used by [`Self::field_for`].
    pub fn with_components(mut self, components: ComponentTable) -> Self {
        self.components = components;
        self
    }

    pub fn set_components(&mut self, components: ComponentTable) {
        self.components = components;
    }

    pub fn components(&self) -> &ComponentTable {
        &self.components
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Retrieval collaborator. Cached fields are not refreshed when it
    /// changes.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn cache(&self) -> &FieldCache {
        &self.cache
    }

    /// Read the next scattered field as a plot set instead of a spot set.
    pub fn prefer_plot(&mut self) {
        self.prefer_plot = true;
    }

    /// Projection of the most recently assembled vector field.
    pub fn last_projection(&self) -> Option<&MapProjection> {
        self.last_projection.as_ref()
    }

    fn category_for(&mut self, kind: FieldKind) -> Category {
        match kind {
            FieldKind::Continuous | FieldKind::Vector => Category::Surface,
            FieldKind::Discrete | FieldKind::Wind => Category::AreaSet,
            FieldKind::Line => Category::CurveSet,
            FieldKind::Scattered => {
                let plot = std::mem::take(&mut self.prefer_plot);
                if plot {
                    Category::PlotSet
                } else {
                    Category::SpotSet
                }
            }
            FieldKind::Lchain => Category::LchainSet,
        }
    }

    /// Read a field from the source without touching the cache.
    fn fetch(&mut self, descriptor: &FieldDescriptor) -> Result<CacheEntry> {
        let category = self.category_for(descriptor.kind);
        let fail = |err: FetchError| {
            warn!(
                source = %descriptor.source,
                subsource = %descriptor.subsource,
                run_time = ?descriptor.run_time,
                valid_time = ?descriptor.valid_time,
                element = %descriptor.element,
                level = %descriptor.level,
                error = %err,
                "field fetch failed"
            );
            Error::Fetch(err)
        };

        let path = self
            .source
            .locate(descriptor)
            .ok_or_else(|| fail(FetchError::NoBackingFile(descriptor.to_string())))?;
        let metafile = self
            .source
            .read_metafile(&path, descriptor.projection.as_ref())
            .ok_or_else(|| {
                fail(FetchError::Unreadable {
                    path: path.display().to_string(),
                    descriptor: descriptor.to_string(),
                })
            })?;
        let field = metafile
            .take_field(
                category,
                descriptor.kind,
                &descriptor.element,
                &descriptor.level,
            )
            .ok_or_else(|| {
                fail(FetchError::NotPresent {
                    path: path.display().to_string(),
                    descriptor: descriptor.to_string(),
                })
            })?;

        Ok(CacheEntry::new(descriptor.clone(), metafile.projection, field))
    }

    /// Cached entry, fetching and caching it on a miss.
    fn entry(&mut self, descriptor: &FieldDescriptor) -> Result<CacheEntry> {
        if let Some(entry) = self.cache.lookup(descriptor).and_then(|i| self.cache.get(i)) {
            debug!(%descriptor, "cache hit");
            return Ok(entry.clone());
        }
        let fetched = self.fetch(descriptor)?;
        let index = self.cache.add(
            fetched.descriptor.clone(),
            fetched.projection.clone(),
            fetched.field,
        );
        debug!(%descriptor, slot = index, "cached after fetch");
        self.cache
            .get(index)
            .cloned()
            .ok_or_else(|| Error::Fetch(FetchError::NoBackingFile(descriptor.to_string())))
    }

    /// Cached field, fetched from the source on a miss.
    ///
    /// A failed fetch leaves the cache untouched.
    #[instrument(skip_all, fields(descriptor = %descriptor))]
    pub fn get_or_fetch(&mut self, descriptor: &FieldDescriptor) -> Result<Field> {
        self.entry(descriptor).map(|e| e.field)
    }

    /// Cached field with its stored projection.
    pub fn get_with_projection(
        &mut self,
        descriptor: &FieldDescriptor,
    ) -> Result<(MapProjection, Field)> {
        self.entry(descriptor).map(|e| (e.projection, e.field))
    }

    /// Plain cache-or-fetch.
    pub fn default_field(&mut self, descriptor: &FieldDescriptor) -> Result<Field> {
        self.get_or_fetch(descriptor)
    }

    /// Field to evaluate on `target`, read the way its element is declared.
    ///
    /// Vector elements are assembled from their components, a component is
    /// reprojected jointly with its partner, anything else is read through
    /// [`Self::default_field`].
    pub fn field_for(
        &mut self,
        descriptor: &FieldDescriptor,
        target: &MapProjection,
    ) -> Result<Field> {
        if descriptor.kind == FieldKind::Vector {
            if let Some(vector) = self.components.vector(&descriptor.element).cloned() {
                return self.vector_field(descriptor, &vector.x, &vector.y);
            }
        }
        let pair = self
            .components
            .component(&descriptor.element)
            .map(|(partner, which)| (partner.to_string(), which));
        match pair {
            Some((partner, which)) => self.xycomp_field(descriptor, which, &partner, target),
            None => self.default_field(descriptor),
        }
    }

    pub fn add(
        &mut self,
        descriptor: FieldDescriptor,
        projection: MapProjection,
        field: Field,
    ) -> usize {
        self.cache.add(descriptor, projection, field)
    }

    pub fn replace(
        &mut self,
        descriptor: FieldDescriptor,
        projection: MapProjection,
        field: Field,
    ) -> usize {
        self.cache.replace(descriptor, projection, field)
    }

    pub fn delete(&mut self, descriptor: &FieldDescriptor) -> bool {
        self.cache.delete(descriptor)
    }

    pub fn clear_all(&mut self) {
        self.cache.clear_all();
    }

    fn single_component(
        &mut self,
        vector: &FieldDescriptor,
        element: &str,
    ) -> Result<CacheEntry> {
        let missing = || Error::MissingComponent {
            descriptor: vector.to_string(),
            element: element.to_string(),
        };
        let component = vector.component(element, FieldKind::Continuous);
        let entry = self.entry(&component).map_err(|_| missing())?;
        match entry.field.as_surface().and_then(Surface::single) {
            Some(_) => Ok(entry),
            None => Err(missing()),
        }
    }

    /// Vector field, read whole or assembled from its x/y components.
    ///
    /// Each component is read through the cache. An assembled field is
    /// cached under the vector descriptor unless the components disagree on
    /// their projection.
    #[instrument(skip_all, fields(descriptor = %descriptor))]
    pub fn vector_field(
        &mut self,
        descriptor: &FieldDescriptor,
        x_element: &str,
        y_element: &str,
    ) -> Result<Field> {
        if descriptor.kind != FieldKind::Vector {
            return Err(Error::NotVectorField(descriptor.to_string()));
        }

        match self.entry(descriptor) {
            Ok(entry) if entry.field.as_surface().is_some_and(Surface::is_vector) => {
                self.last_projection = Some(entry.projection);
                return Ok(entry.field);
            }
            Ok(_) | Err(Error::Fetch(_)) => {
                debug!(%descriptor, "assembling vector field from components");
            }
            Err(other) => return Err(other),
        }

        let x = self.single_component(descriptor, x_element)?;
        let y = self.single_component(descriptor, y_element)?;
        if !x.projection.same_map(&y.projection) {
            warn!(
                %descriptor,
                x = x_element,
                y = y_element,
                "vector components read on different projections"
            );
            return Err(Error::MismatchedProjection {
                descriptor: descriptor.to_string(),
            });
        }

        let (Some(xs), Some(ys)) = (
            x.field.as_surface().and_then(Surface::single),
            y.field.as_surface().and_then(Surface::single),
        ) else {
            return Err(Error::MissingComponent {
                descriptor: descriptor.to_string(),
                element: x_element.to_string(),
            });
        };
        let field = Field::Surface(Surface::vector(xs.clone(), ys.clone()));
        self.cache
            .replace(descriptor.clone(), x.projection.clone(), field.clone());
        self.last_projection = Some(x.projection);
        Ok(field)
    }

    /// One half of a vector field, reprojected jointly with its partner
    /// onto `target` when the stored projection does not fit.
    #[instrument(skip_all, fields(descriptor = %descriptor, which = ?which))]
    pub fn xycomp_field(
        &mut self,
        descriptor: &FieldDescriptor,
        which: Component,
        partner_element: &str,
        target: &MapProjection,
    ) -> Result<Field> {
        let requested = self.entry(descriptor)?;
        if !self
            .geometry
            .needs_reprojection(&requested.projection, target)
        {
            return Ok(requested.field);
        }

        let partner = self
            .entry(&descriptor.component(partner_element, descriptor.kind))
            .map_err(|_| Error::MissingComponent {
                descriptor: descriptor.to_string(),
                element: partner_element.to_string(),
            })?;
        if !requested.projection.same_map(&partner.projection) {
            return Err(Error::MismatchedProjection {
                descriptor: descriptor.to_string(),
            });
        }

        let single = |entry: &CacheEntry, element: &str| {
            entry
                .field
                .as_surface()
                .and_then(Surface::single)
                .cloned()
                .ok_or_else(|| Error::MissingComponent {
                    descriptor: descriptor.to_string(),
                    element: element.to_string(),
                })
        };
        let mine = single(&requested, &descriptor.element)?;
        let theirs = single(&partner, partner_element)?;
        let (x, y) = match which {
            Component::X => (mine, theirs),
            Component::Y => (theirs, mine),
        };

        debug!(%descriptor, ?which, "reprojecting component pair");
        let (x, y) = self.geometry.reproject_components(&x, &y, target)?;
        Ok(Field::Surface(Surface::scalar(match which {
            Component::X => x,
            Component::Y => y,
        })))
    }
}
