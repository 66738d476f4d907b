//! Geometry and point type tags shared by curves, surfaces and multivariates.

use crate::error::{CagdError, Result};
use freeform_math::MAX_PT_COORD;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// The basis a curve or surface is represented in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeomType {
    /// Bernstein basis over the fixed domain `[0, 1]`.
    Bezier,
    /// B-spline basis over a knot vector.
    BSpline,
    /// Monomial basis over the fixed domain `[0, 1]`.
    Power,
}

impl GeomType {
    /// Basis named by its serialized tag, `None` if unknown.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "Bezier" => Some(Self::Bezier),
            "BSpline" => Some(Self::BSpline),
            "Power" => Some(Self::Power),
            _ => None,
        }
    }
}

/// Point type of the control points: Euclidean dimension plus rational flag.
///
/// Coefficients are laid out with index 0 reserved for the weight `W`
/// (present only when rational) and indices `1..=dim` for `X, Y, Z, ...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPointType")]
pub struct PointType {
    dim: u8,
    rational: bool,
}

#[derive(Deserialize)]
struct RawPointType {
    dim: usize,
    rational: bool,
}

impl TryFrom<RawPointType> for PointType {
    type Error = CagdError;

    fn try_from(raw: RawPointType) -> Result<Self> {
        Self::new(raw.dim, raw.rational)
    }
}

impl PointType {
    /// Scalar field.
    pub const E1: Self = Self { dim: 1, rational: false };
    /// Planar points.
    pub const E2: Self = Self { dim: 2, rational: false };
    /// Spatial points.
    pub const E3: Self = Self { dim: 3, rational: false };
    /// Rational scalar field.
    pub const P1: Self = Self { dim: 1, rational: true };
    /// Rational planar points.
    pub const P2: Self = Self { dim: 2, rational: true };
    /// Rational spatial points.
    pub const P3: Self = Self { dim: 3, rational: true };

    /// Create a point type with `dim` Euclidean coordinates.
    pub fn new(dim: usize, rational: bool) -> Result<Self> {
        if dim == 0 || dim > MAX_PT_COORD {
            return Err(CagdError::invalid(format!(
                "point dimension {dim} not in 1..={MAX_PT_COORD}"
            )));
        }
        Ok(Self {
            dim: dim as u8,
            rational,
        })
    }

    /// Number of Euclidean coordinates.
    pub fn dim(self) -> usize {
        self.dim as usize
    }

    /// Whether a weight coordinate is present.
    pub fn is_rational(self) -> bool {
        self.rational
    }

    /// Index of the first stored coordinate: 0 if rational, 1 otherwise.
    pub fn first_coord(self) -> usize {
        if self.rational {
            0
        } else {
            1
        }
    }

    /// Range of stored coordinate indices.
    pub fn coords(self) -> RangeInclusive<usize> {
        self.first_coord()..=self.dim()
    }

    /// Number of stored coordinates (including the weight if rational).
    pub fn num_coords(self) -> usize {
        self.dim() + self.rational as usize
    }

    /// Same dimension, rational.
    pub fn to_rational(self) -> Self {
        Self {
            rational: true,
            ..self
        }
    }

    /// Same dimension, non-rational.
    pub fn to_non_rational(self) -> Self {
        Self {
            rational: false,
            ..self
        }
    }
}

/// Parametric direction of a surface.
///
/// For isoparametric extraction the direction names the parameter held
/// constant: `U` extracts the curve `S(t, v)`, which runs along V.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SrfDir {
    /// The U parameter.
    U,
    /// The V parameter.
    V,
}

impl SrfDir {
    /// The other direction.
    pub fn other(self) -> Self {
        match self {
            SrfDir::U => SrfDir::V,
            SrfDir::V => SrfDir::U,
        }
    }
}

impl TryFrom<char> for SrfDir {
    type Error = CagdError;

    fn try_from(c: char) -> Result<Self> {
        match c {
            'u' | 'U' => Ok(SrfDir::U),
            'v' | 'V' => Ok(SrfDir::V),
            other => Err(CagdError::DirNotConstUv(other)),
        }
    }
}

/// One of the four boundaries of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SrfBndry {
    /// `u = u_min`.
    UMin,
    /// `u = u_max`.
    UMax,
    /// `v = v_min`.
    VMin,
    /// `v = v_max`.
    VMax,
}

impl SrfBndry {
    /// All boundaries in the canonical order U-min, U-max, V-min, V-max.
    pub const ALL: [SrfBndry; 4] = [SrfBndry::UMin, SrfBndry::UMax, SrfBndry::VMin, SrfBndry::VMax];
}

/// Control point rows: one `Vec<f64>` per control point holding the stored
/// coordinates in order (weight first when rational).
pub(crate) type Rows = Vec<Vec<f64>>;

/// Gather coordinate arrays into per-point rows.
pub(crate) fn to_rows(points: &[Vec<f64>], ptype: PointType, len: usize) -> Rows {
    (0..len)
        .map(|i| ptype.coords().map(|c| points[c][i]).collect())
        .collect()
}

/// Scatter per-point rows back into coordinate arrays.
pub(crate) fn from_rows(rows: &[Vec<f64>], ptype: PointType) -> Vec<Vec<f64>> {
    let first = ptype.first_coord();
    let mut points = vec![Vec::new(); ptype.dim() + 1];
    for c in ptype.coords() {
        points[c] = rows.iter().map(|r| r[c - first]).collect();
    }
    points
}

/// `(1 - t) * a + t * b`.
pub(crate) fn lerp(a: &[f64], b: &[f64], t: f64) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| (1.0 - t) * x + t * y).collect()
}

/// `a * s`.
pub(crate) fn scaled(a: &[f64], s: f64) -> Vec<f64> {
    a.iter().map(|x| x * s).collect()
}

/// `acc += a * s`.
pub(crate) fn add_scaled(acc: &mut [f64], a: &[f64], s: f64) {
    for (x, y) in acc.iter_mut().zip(a) {
        *x += y * s;
    }
}

/// `a - b`.
pub(crate) fn sub(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| x - y).collect()
}
