//! Map projections
//!
//! A small geometry layer: forward/inverse projection between lat/lon and
//! map positions, projection equality, and the local direction of north.
//!
//! Map positions are expressed in map units (`MapDef::units` metres each),
//! measured from the map origin `(olat, olon)` and shifted by `(xorg, yorg)`.
//! Grid nodes of a [`GridDef`] sit at `(ix * cell_size, iy * cell_size)`.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use serde::{Deserialize, Serialize};

use crate::value::Point;

/// Mean Earth radius in metres
pub const EARTH_RADIUS: f64 = 6_371_220.0;

/// Projection family, dispatched statically.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProjectionKind {
    /// Plate carrée on the reference longitude.
    LatLon,
    /// Polar stereographic, true at `true_lat` degrees.
    PolarStereographic { north: bool, true_lat: f64 },
    /// Normal Mercator, true at `true_lat` degrees.
    Mercator { true_lat: f64 },
}

/// Map extent and placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapDef {
    /// Latitude of the map origin (degrees)
    pub olat: f64,
    /// Longitude of the map origin (degrees)
    pub olon: f64,
    /// Reference (vertical) longitude (degrees)
    pub lref: f64,
    /// Map position of the origin
    pub xorg: f64,
    pub yorg: f64,
    /// Map extent in map units
    pub xlen: f64,
    pub ylen: f64,
    /// Metres per map unit
    pub units: f64,
}

impl Default for MapDef {
    fn default() -> Self {
        Self {
            olat: 0.0,
            olon: 0.0,
            lref: 0.0,
            xorg: 0.0,
            yorg: 0.0,
            xlen: 0.0,
            ylen: 0.0,
            units: 1000.0,
        }
    }
}

/// Regular grid laid over a map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridDef {
    pub nx: usize,
    pub ny: usize,
    /// Node spacing in map units
    pub cell_size: f64,
}

impl GridDef {
    pub fn new(nx: usize, ny: usize, cell_size: f64) -> Self {
        Self { nx, ny, cell_size }
    }

    /// At least two nodes along each axis and a positive spacing.
    pub fn is_valid(&self) -> bool {
        self.nx >= 2 && self.ny >= 2 && self.cell_size > 0.0
    }

    /// Map position of node `(ix, iy)`.
    pub fn node(&self, ix: usize, iy: usize) -> Point {
        Point::new(ix as f64 * self.cell_size, iy as f64 * self.cell_size)
    }

    pub fn len(&self) -> usize {
        self.nx * self.ny
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A map projection with an optional grid definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapProjection {
    pub kind: ProjectionKind,
    pub map: MapDef,
    #[serde(default)]
    pub grid: Option<GridDef>,
}

impl Default for MapProjection {
    fn default() -> Self {
        Self {
            kind: ProjectionKind::LatLon,
            map: MapDef::default(),
            grid: None,
        }
    }
}

impl MapProjection {
    pub fn new(kind: ProjectionKind, map: MapDef) -> Self {
        Self {
            kind,
            map,
            grid: None,
        }
    }

    /// Builder method: attach a grid definition.
    pub fn with_grid(mut self, grid: GridDef) -> Self {
        self.grid = Some(grid);
        self
    }

    /// Same projection and map definition. Grid definitions are ignored.
    pub fn same_map(&self, other: &MapProjection) -> bool {
        self.kind == other.kind && self.map == other.map
    }

    /// Forward projection onto the projection plane (metres).
    pub fn plane(&self, lat: f64, lon: f64) -> (f64, f64) {
        let dlon = wrap_degrees(lon - self.map.lref).to_radians();
        let phi = lat.to_radians();
        match self.kind {
            ProjectionKind::LatLon => (EARTH_RADIUS * dlon, EARTH_RADIUS * phi),
            ProjectionKind::Mercator { true_lat } => {
                let k = EARTH_RADIUS * true_lat.to_radians().cos();
                let phi = phi.clamp(-89.9_f64.to_radians(), 89.9_f64.to_radians());
                (k * dlon, k * (FRAC_PI_4 + phi / 2.0).tan().ln())
            }
            ProjectionKind::PolarStereographic { north, true_lat } => {
                let scale = EARTH_RADIUS * (1.0 + true_lat.abs().to_radians().sin());
                if north {
                    let rho = scale * phi.cos() / (1.0 + phi.sin());
                    (rho * dlon.sin(), -rho * dlon.cos())
                } else {
                    let rho = scale * phi.cos() / (1.0 - phi.sin());
                    (rho * dlon.sin(), rho * dlon.cos())
                }
            }
        }
    }

    /// Inverse projection from the projection plane (metres) to `(lat, lon)`.
    pub fn plane_inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let (phi, dlon) = match self.kind {
            ProjectionKind::LatLon => (y / EARTH_RADIUS, x / EARTH_RADIUS),
            ProjectionKind::Mercator { true_lat } => {
                let k = EARTH_RADIUS * true_lat.to_radians().cos();
                (2.0 * (y / k).exp().atan() - FRAC_PI_2, x / k)
            }
            ProjectionKind::PolarStereographic { north, true_lat } => {
                let scale = EARTH_RADIUS * (1.0 + true_lat.abs().to_radians().sin());
                let rho = x.hypot(y);
                let colat = 2.0 * (rho / scale).atan();
                if north {
                    (FRAC_PI_2 - colat, x.atan2(-y))
                } else {
                    (colat - FRAC_PI_2, x.atan2(y))
                }
            }
        };
        (
            phi.to_degrees(),
            wrap_degrees(dlon.to_degrees() + self.map.lref),
        )
    }

    /// Map position of a lat/lon location.
    pub fn latlon_to_pos(&self, lat: f64, lon: f64) -> Point {
        let (x0, y0) = self.plane(self.map.olat, self.map.olon);
        let (x, y) = self.plane(lat, lon);
        Point::new(
            (x - x0) / self.map.units + self.map.xorg,
            (y - y0) / self.map.units + self.map.yorg,
        )
    }

    /// Lat/lon of a map position.
    pub fn pos_to_latlon(&self, pos: Point) -> (f64, f64) {
        let (x0, y0) = self.plane(self.map.olat, self.map.olon);
        self.plane_inverse(
            (pos.x - self.map.xorg) * self.map.units + x0,
            (pos.y - self.map.yorg) * self.map.units + y0,
        )
    }

    /// Direction of local north at a map position, radians from the +x axis.
    pub fn north_angle(&self, pos: Point) -> f64 {
        match self.kind {
            ProjectionKind::LatLon | ProjectionKind::Mercator { .. } => FRAC_PI_2,
            ProjectionKind::PolarStereographic { north, .. } => {
                let (x0, y0) = self.plane(self.map.olat, self.map.olon);
                let x = (pos.x - self.map.xorg) * self.map.units + x0;
                let y = (pos.y - self.map.yorg) * self.map.units + y0;
                if x.hypot(y) < 1e-6 {
                    FRAC_PI_2
                } else if north {
                    (-y).atan2(-x)
                } else {
                    y.atan2(x)
                }
            }
        }
    }

    /// Position of `pos` (a map position in `self`) expressed in `other`.
    pub fn transfer(&self, pos: Point, other: &MapProjection) -> Point {
        if self.same_map(other) {
            return pos;
        }
        let (lat, lon) = self.pos_to_latlon(pos);
        other.latlon_to_pos(lat, lon)
    }
}

/// Wrap an angle in degrees into `(-180, 180]`.
pub fn wrap_degrees(angle: f64) -> f64 {
    let mut a = angle % 360.0;
    if a > 180.0 {
        a -= 360.0;
    } else if a <= -180.0 {
        a += 360.0;
    }
    a
}
