//! Evaluation values
//!
//! Four interchangeable representations of a field. A value's variant never
//! changes in place; [`crate::convert`] always builds a new value.

use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::projection::MapProjection;

/// A map position (map units).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for Point {
    fn from(p: [f64; 2]) -> Self {
        Self::new(p[0], p[1])
    }
}

/// Discriminant of [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Scalar,
    Grid,
    Spline,
    VectorList,
}

impl ValueKind {
    /// All kinds in tag order
    pub const ALL: [ValueKind; 4] = [
        ValueKind::Scalar,
        ValueKind::Grid,
        ValueKind::Spline,
        ValueKind::VectorList,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Scalar => "scalar",
            ValueKind::Grid => "grid",
            ValueKind::Spline => "spline",
            ValueKind::VectorList => "vlist",
        }
    }

    /// Parse a kind tag, either its name or its numeric tag.
    pub fn from_tag(tag: &str) -> Result<Self> {
        let tag = tag.trim();
        if let Ok(n) = tag.parse::<u8>() {
            return Self::try_from(n);
        }
        match tag.to_ascii_lowercase().as_str() {
            "scalar" => Ok(ValueKind::Scalar),
            "grid" => Ok(ValueKind::Grid),
            "spline" => Ok(ValueKind::Spline),
            "vlist" | "vectorlist" | "vector_list" => Ok(ValueKind::VectorList),
            _ => Err(Error::UnknownValueKind(tag.to_string())),
        }
    }
}

impl TryFrom<u8> for ValueKind {
    type Error = Error;

    fn try_from(tag: u8) -> Result<Self> {
        ValueKind::ALL
            .get(tag as usize)
            .copied()
            .ok_or_else(|| Error::UnknownValueKind(tag.to_string()))
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Regular rectangular sampling, row-major (`ny` rows of `nx`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Grid {
    pub nx: usize,
    pub ny: usize,
    pub cell_size: f64,
    pub data: Vec<f64>,
}

impl Grid {
    pub fn new(nx: usize, ny: usize, cell_size: f64, data: Vec<f64>) -> Result<Self> {
        if data.len() != nx * ny {
            return Err(Error::ShapeMismatch {
                op: "grid",
                detail: format!("{} values for a {nx}x{ny} grid", data.len()),
            });
        }
        Ok(Self {
            nx,
            ny,
            cell_size,
            data,
        })
    }

    pub fn filled(nx: usize, ny: usize, cell_size: f64, value: f64) -> Self {
        Self {
            nx,
            ny,
            cell_size,
            data: vec![value; nx * ny],
        }
    }

    /// Build a grid from a node function `f(ix, iy)`, rows in parallel.
    pub fn from_fn<F>(nx: usize, ny: usize, cell_size: f64, f: F) -> Self
    where
        F: Fn(usize, usize) -> f64 + Sync,
    {
        let mut data = vec![0.0; nx * ny];
        if nx > 0 {
            data.par_chunks_mut(nx).enumerate().for_each(|(iy, row)| {
                for (ix, cell) in row.iter_mut().enumerate() {
                    *cell = f(ix, iy);
                }
            });
        }
        Self {
            nx,
            ny,
            cell_size,
            data,
        }
    }

    pub fn get(&self, ix: usize, iy: usize) -> f64 {
        self.data[iy * self.nx + ix]
    }

    pub fn row(&self, iy: usize) -> &[f64] {
        &self.data[iy * self.nx..(iy + 1) * self.nx]
    }

    /// Equal `nx`, `ny` and `cell_size`.
    pub fn same_shape(&self, other: &Grid) -> bool {
        self.nx == other.nx && self.ny == other.ny && self.cell_size == other.cell_size
    }

    pub fn map(&self, f: impl Fn(f64) -> f64) -> Grid {
        Grid {
            nx: self.nx,
            ny: self.ny,
            cell_size: self.cell_size,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }
}

/// Bicubic spline surface.
///
/// `coeffs` holds `n` rows of `m` B-spline coefficients; a surface fitted to
/// an `nx` x `ny` grid has `m = nx + 2`, `n = ny + 2`. Node `(i, j)` of the
/// fitted grid sits `(i, j) * cell_size` map units from `origin`, rotated
/// anticlockwise by `orientation` degrees.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Spline {
    pub m: usize,
    pub n: usize,
    pub coeffs: Vec<f64>,
    pub origin: Point,
    pub orientation: f64,
    pub cell_size: f64,
    pub projection: MapProjection,
}

impl Spline {
    /// Equal coefficient dimensions.
    pub fn same_shape(&self, other: &Spline) -> bool {
        self.m == other.m && self.n == other.n
    }

    /// At least two nodes in each direction and a positive spacing.
    pub fn is_usable(&self) -> bool {
        self.m >= 4
            && self.n >= 4
            && self.cell_size > 0.0
            && self.coeffs.len() == self.m * self.n
    }

    pub fn map_coeffs(&self, f: impl Fn(f64) -> f64) -> Spline {
        Spline {
            coeffs: self.coeffs.iter().map(|&c| f(c)).collect(),
            ..self.clone()
        }
    }
}

/// Scattered samples: parallel position and value arrays.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VectorList {
    pub points: Vec<Point>,
    pub values: Vec<f64>,
}

impl VectorList {
    pub fn new(points: Vec<Point>, values: Vec<f64>) -> Result<Self> {
        if points.len() != values.len() {
            return Err(Error::ShapeMismatch {
                op: "vlist",
                detail: format!("{} points but {} values", points.len(), values.len()),
            });
        }
        Ok(Self { points, values })
    }

    pub fn filled(points: Vec<Point>, value: f64) -> Self {
        let values = vec![value; points.len()];
        Self { points, values }
    }

    /// Exact, position-for-position point equality.
    pub fn same_points(&self, other: &VectorList) -> bool {
        self.points == other.points
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn map(&self, f: impl Fn(f64) -> f64) -> VectorList {
        VectorList {
            points: self.points.clone(),
            values: self.values.iter().map(|&v| f(v)).collect(),
        }
    }
}

/// An evaluated (sub-)expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Scalar(f64),
    Grid(Grid),
    Spline(Spline),
    VectorList(VectorList),
}

impl Value {
    /// Default-initialised value of the given kind.
    pub fn init(kind: ValueKind) -> Value {
        match kind {
            ValueKind::Scalar => Value::Scalar(0.0),
            ValueKind::Grid => Value::Grid(Grid::default()),
            ValueKind::Spline => Value::Spline(Spline::default()),
            ValueKind::VectorList => Value::VectorList(VectorList::default()),
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Scalar(_) => ValueKind::Scalar,
            Value::Grid(_) => ValueKind::Grid,
            Value::Spline(_) => ValueKind::Spline,
            Value::VectorList(_) => ValueKind::VectorList,
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Value::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_grid(&self) -> Option<&Grid> {
        match self {
            Value::Grid(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_spline(&self) -> Option<&Spline> {
        match self {
            Value::Spline(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_vlist(&self) -> Option<&VectorList> {
        match self {
            Value::VectorList(v) => Some(v),
            _ => None,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Scalar(0.0)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Scalar(v)
    }
}
