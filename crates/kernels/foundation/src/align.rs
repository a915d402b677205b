//! Operand alignment for element-wise operators
//!
//! Brings any number of values onto one common layout: splines are sampled
//! onto the default grid, scalars broadcast, grids of differing shape are
//! renormalised, and vector lists must share their points.

use rayon::prelude::*;

use crate::context::EvalContext;
use crate::convert::{normalize_grid, spline_to_grid};
use crate::error::{Error, Result};
use crate::value::{Grid, Point, Value, ValueKind, VectorList};

/// One aligned operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Const(f64),
    Data(Vec<f64>),
}

impl Operand {
    #[inline]
    pub fn at(&self, i: usize) -> f64 {
        match self {
            Operand::Const(c) => *c,
            Operand::Data(d) => d[i],
        }
    }

    /// Any element equal to `0.0`.
    pub fn has_zero(&self) -> bool {
        match self {
            Operand::Const(c) => *c == 0.0,
            Operand::Data(d) => d.iter().any(|&v| v == 0.0),
        }
    }
}

/// Shape shared by every aligned operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Layout {
    Scalar,
    Grid { nx: usize, ny: usize, cell_size: f64 },
    Points(Vec<Point>),
}

impl Layout {
    pub fn len(&self) -> usize {
        match self {
            Layout::Scalar => 1,
            Layout::Grid { nx, ny, .. } => nx * ny,
            Layout::Points(points) => points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Operands laid over one common layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Aligned {
    pub layout: Layout,
    pub operands: Vec<Operand>,
}

impl Aligned {
    /// Evaluate `f` on every element and wrap the result in the layout's kind.
    pub fn apply<F>(&self, f: F) -> Result<Value>
    where
        F: Fn(&[f64]) -> f64 + Sync,
    {
        let data: Vec<f64> = (0..self.layout.len())
            .into_par_iter()
            .map_init(
                || vec![0.0; self.operands.len()],
                |xs, i| {
                    for (x, op) in xs.iter_mut().zip(&self.operands) {
                        *x = op.at(i);
                    }
                    f(xs)
                },
            )
            .collect();

        match &self.layout {
            Layout::Scalar => Ok(Value::Scalar(data.first().copied().unwrap_or_default())),
            Layout::Grid { nx, ny, cell_size } => {
                Grid::new(*nx, *ny, *cell_size, data).map(Value::Grid)
            }
            Layout::Points(points) => VectorList::new(points.clone(), data).map(Value::VectorList),
        }
    }
}

/// Align `values` for the element-wise operator `op`.
pub fn align(op: &'static str, values: &[Value], ctx: &EvalContext) -> Result<Aligned> {
    // Grid and vector list never mix, whatever the splines turn into
    let spatial = values
        .iter()
        .find(|v| matches!(v, Value::Grid(_) | Value::Spline(_)));
    let scattered = values.iter().find(|v| matches!(v, Value::VectorList(_)));
    if let (Some(field), Some(list)) = (spatial, scattered) {
        return Err(Error::IncompatibleKind {
            op,
            left: field.kind(),
            right: list.kind(),
        });
    }

    if let Some(Value::VectorList(first)) = scattered {
        let mut operands = Vec::with_capacity(values.len());
        for v in values {
            operands.push(match v {
                Value::Scalar(s) => Operand::Const(*s),
                Value::VectorList(l) if l.same_points(first) => Operand::Data(l.values.clone()),
                _ => return Err(Error::PointMismatch { op }),
            });
        }
        return Ok(Aligned {
            layout: Layout::Points(first.points.clone()),
            operands,
        });
    }

    if spatial.is_none() {
        return Ok(Aligned {
            layout: Layout::Scalar,
            operands: values
                .iter()
                .filter_map(Value::as_scalar)
                .map(Operand::Const)
                .collect(),
        });
    }

    let mut grids: Vec<Option<Grid>> = Vec::with_capacity(values.len());
    for v in values {
        grids.push(match v {
            Value::Scalar(_) => None,
            Value::Grid(g) => Some(g.clone()),
            Value::Spline(s) => Some(spline_to_grid(s, ctx)?),
            Value::VectorList(_) => return Err(Error::PointMismatch { op }),
        });
    }

    let mut present = grids.iter().flatten();
    let uniform = match present.next() {
        Some(first) => present.all(|g| g.same_shape(first)),
        None => true,
    };
    if !uniform {
        for g in grids.iter_mut().flatten() {
            *g = normalize_grid(g, ctx)?;
        }
    }

    let shape = grids
        .iter()
        .flatten()
        .next()
        .map(|g| (g.nx, g.ny, g.cell_size))
        .ok_or(Error::Conversion {
            from: ValueKind::Scalar,
            to: ValueKind::Grid,
        })?;

    let operands = values
        .iter()
        .zip(grids)
        .map(|(v, g)| match (v, g) {
            (_, Some(g)) => Operand::Data(g.data),
            (v, None) => Operand::Const(v.as_scalar().unwrap_or_default()),
        })
        .collect();

    Ok(Aligned {
        layout: Layout::Grid {
            nx: shape.0,
            ny: shape.1,
            cell_size: shape.2,
        },
        operands,
    })
}
