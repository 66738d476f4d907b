//! Trisectors: points equidistant from three curves or surfaces.

use crate::bisect::{lift, spatial_point, Primitive};
use crate::error::{MvarError, Result};
use crate::mvar::Mvar;
use crate::trace::{univar_inter, Polyline};
use crate::zeros::{solve_zeros, SolverConfig};
use freeform_cagd::PointType;

/// Solution of a trisector problem.
///
/// Every vertex lists the foot parameters of the three primitives in input
/// order, followed by the spatial coordinates of the trisector point.
#[derive(Debug, Clone, PartialEq)]
pub enum Trisector {
    /// Isolated points, from planar input.
    Points(Vec<Vec<f64>>),
    /// Traced curves, from spatial input.
    Curves(Vec<Polyline>),
}

impl Trisector {
    /// Spatial coordinates of every solution vertex.
    pub fn spatial(&self, space_dim: usize) -> Vec<Vec<f64>> {
        let tail = |v: &Vec<f64>| v[v.len().saturating_sub(space_dim)..].to_vec();
        match self {
            Self::Points(pts) => pts.iter().map(tail).collect(),
            Self::Curves(lines) => lines.iter().flatten().map(tail).collect(),
        }
    }
}

/// The constraint system of a trisector: one tangency condition per
/// primitive parameter and two chained equidistance conditions.
pub fn trisector_equations(prims: &[Primitive; 3], bbox: &[(f64, f64)]) -> Result<Vec<Mvar>> {
    let ptype = match bbox.len() {
        2 => PointType::E2,
        3 => PointType::E3,
        n => return Err(MvarError::no_support(format!("trisectors in {n} dimensions"))),
    };
    let refs: Vec<&Primitive> = prims.iter().collect();
    let lifted = lift(&refs, ptype, bbox)?;
    let p = spatial_point(&lifted, bbox.len())?;

    let diffs = lifted
        .points
        .iter()
        .map(|x| p.sub(x))
        .collect::<Result<Vec<_>>>()?;
    let mut eqs = Vec::new();
    for ((x, axes), d) in lifted.points.iter().zip(&lifted.axes).zip(&diffs) {
        for axis in axes.clone() {
            eqs.push(d.dot(&x.derive(axis)?)?);
        }
    }
    let sq = diffs.iter().map(|d| d.dot(d)).collect::<Result<Vec<_>>>()?;
    eqs.push(sq[0].sub(&sq[1])?);
    eqs.push(sq[1].sub(&sq[2])?);
    log::debug!(
        "trisector system: {} constraints over {} unknowns",
        eqs.len(),
        lifted.domains.len()
    );
    Ok(eqs)
}

/// Trisector of three primitives within `bbox`.
///
/// Planar primitives (`bbox` of two intervals) yield isolated points;
/// spatial ones (three intervals) yield traced curves.
pub fn trisector(prims: &[Primitive; 3], bbox: &[(f64, f64)], cfg: &SolverConfig) -> Result<Trisector> {
    let eqs = trisector_equations(prims, bbox)?;
    let unknowns = eqs.first().map_or(0, Mvar::dim);
    if eqs.len() == unknowns {
        Ok(Trisector::Points(solve_zeros(&eqs, cfg)?))
    } else {
        Ok(Trisector::Curves(univar_inter(&eqs, cfg)?))
    }
}
