//! Bisectors of curves and surfaces.
//!
//! A bisector point `P` has a foot point `X` on every primitive where
//! `P - X` is normal to the primitive, and all foot points are equally far
//! from `P`. For two primitives in space these conditions are linear in `P`:
//!
//! - one tangency row per parameter: `dX/da . P = dX/da . X`
//! - one equidistance row: `(X1 - X2) . P = (|X1|^2 - |X2|^2) / 2`
//!
//! With three rows the system is square and Cramer's rule gives `P` as a
//! rational function of the foot parameters. Extra rows get slack unknowns
//! on unit columns; the bisector is where every slack vanishes.

use crate::algebra::{align_all, determinant};
use crate::error::{MvarError, Result};
use crate::mvar::Mvar;
use crate::trace::{univar_inter, Polyline};
use crate::zeros::{solve_on_slices, SolverConfig};
use freeform_cagd::{Curve, GeomType, PointType, Surface};
use freeform_math::{solve_square, DMat, DVec, Vec3, UEPS};
use std::ops::Range;

/// A curve or a surface taking part in a bisector computation.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// A curve, contributing one parameter.
    Curve(Curve),
    /// A surface, contributing two parameters.
    Surface(Surface),
}

impl From<Curve> for Primitive {
    fn from(crv: Curve) -> Self {
        Self::Curve(crv)
    }
}

impl From<Surface> for Primitive {
    fn from(srf: Surface) -> Self {
        Self::Surface(srf)
    }
}

impl Primitive {
    /// Number of parameters.
    pub fn param_dim(&self) -> usize {
        match self {
            Self::Curve(_) => 1,
            Self::Surface(_) => 2,
        }
    }

    /// Basis type.
    pub fn gtype(&self) -> GeomType {
        match self {
            Self::Curve(c) => c.gtype,
            Self::Surface(s) => s.gtype,
        }
    }

    /// Point type.
    pub fn ptype(&self) -> PointType {
        match self {
            Self::Curve(c) => c.ptype,
            Self::Surface(s) => s.ptype,
        }
    }

    fn to_mvar(&self) -> Result<Mvar> {
        match self {
            Self::Curve(c) => Ok(Mvar::from_curve(c)),
            Self::Surface(s) => Mvar::from_surface(s),
        }
    }
}

// =============================================================================
// Lifting
// =============================================================================

/// Primitives placed side by side in one parameter space.
pub(crate) struct Lifted {
    /// Each primitive as a multivariate over the whole space.
    pub(crate) points: Vec<Mvar>,
    /// Parameter axes owned by each primitive.
    pub(crate) axes: Vec<Range<usize>>,
    /// Domain of every axis, spatial axes last.
    pub(crate) domains: Vec<(f64, f64)>,
}

/// Lift `prims` into a shared space whose axes are the primitives'
/// parameters in order, followed by one axis per entry of `spatial`.
///
/// Spatial axes force B-spline form so that the parameter of a spatial axis
/// is the coordinate itself.
pub(crate) fn lift(prims: &[&Primitive], ptype: PointType, spatial: &[(f64, f64)]) -> Result<Lifted> {
    let gtype = prims.first().map_or(GeomType::BSpline, |p| p.gtype());
    if prims.iter().any(|p| p.gtype() != gtype) {
        return Err(MvarError::SameGtypeExpected);
    }
    for p in prims {
        if p.ptype().is_rational() {
            return Err(MvarError::RationalNoSupport("bisector construction"));
        }
        if p.ptype() != ptype {
            return Err(MvarError::no_support(format!(
                "{:?} primitive where {:?} is required",
                p.ptype(),
                ptype
            )));
        }
    }

    let mut mvs = Vec::with_capacity(prims.len());
    let mut axes = Vec::with_capacity(prims.len());
    let mut domains = Vec::new();
    let mut shift = 0;
    for p in prims {
        let mut mv = p.to_mvar()?;
        if !spatial.is_empty() || mv.gtype == GeomType::Power {
            mv = if spatial.is_empty() { mv.to_bezier()? } else { mv.to_bspline()? };
        }
        domains.extend(mv.domains());
        axes.push(shift..shift + mv.dim());
        shift += mv.dim();
        mvs.push(mv);
    }
    domains.extend_from_slice(spatial);

    let total = domains.len();
    let points = mvs
        .iter()
        .zip(&axes)
        .map(|(mv, range)| mv.promote(total, range.start, &domains))
        .collect::<Result<Vec<_>>>()?;
    Ok(Lifted {
        points,
        axes,
        domains,
    })
}

/// The spatial point `P` as a vector field over the lifted space.
pub(crate) fn spatial_point(lifted: &Lifted, dim: usize) -> Result<Mvar> {
    let total = lifted.domains.len();
    let coords: Vec<Mvar> = (total - dim..total)
        .map(|axis| {
            let (min, max) = lifted.domains[axis];
            Mvar::linear(GeomType::BSpline, &lifted.domains, axis, min, max)
        })
        .collect();
    Mvar::merge_scalar(&align_all(&coords)?, false)
}

// =============================================================================
// Linear systems in P
// =============================================================================

/// `normal . P = rhs`.
struct Row {
    normal: Vec<Mvar>,
    rhs: Mvar,
}

fn tangency_rows(x: &Mvar, axes: Range<usize>) -> Result<Vec<Row>> {
    axes.map(|a| {
        let d = x.derive(a)?;
        Ok(Row {
            rhs: d.dot(x)?,
            normal: d.split_scalar(),
        })
    })
    .collect()
}

fn equidistance_row(x1: &Mvar, x2: &Mvar) -> Result<Row> {
    let rhs = x1.dot(x1)?.sub(&x2.dot(x2)?)?.scale(0.5);
    Ok(Row {
        normal: x1.sub(x2)?.split_scalar(),
        rhs,
    })
}

/// Cramer's rule over rows in `(x, y, z)` plus slack unknowns.
///
/// Slack `j` has a unit coefficient on row `R - 1 - j`. Returns the
/// denominator followed by the numerator of every unknown, aligned.
fn cramer(rows: &[Row]) -> Result<Vec<Mvar>> {
    let r = rows.len();
    let slack = r.saturating_sub(3);
    let template = &rows[0].rhs;
    let one = Mvar::constant_like(template, 1.0);
    let matrix: Vec<Vec<Option<Mvar>>> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut m: Vec<Option<Mvar>> = row.normal.iter().cloned().map(Some).collect();
            m.extend((0..slack).map(|j| (i == r - 1 - j).then(|| one.clone())));
            m
        })
        .collect();
    log::debug!("{r} x {r} bisector system with {slack} slack unknowns");

    let denom = determinant(&matrix)?
        .ok_or_else(|| MvarError::DegenerateSystem("structurally singular bisector system".into()))?;
    let mut dets = vec![denom];
    for c in 0..r {
        let mut m = matrix.clone();
        for (entries, row) in m.iter_mut().zip(rows) {
            entries[c] = Some(row.rhs.clone());
        }
        let num = determinant(&m)?.unwrap_or_else(|| Mvar::constant_like(template, 0.0));
        dets.push(num);
    }
    align_all(&dets)
}

// =============================================================================
// Curve and surface bisectors in space
// =============================================================================

/// Bisector of two primitives in space.
#[derive(Debug, Clone, PartialEq)]
pub enum Bisector {
    /// Curve-curve bisector as a rational surface over the two curve
    /// parameters.
    Surface(Surface),
    /// Curve-surface and surface-surface bisectors as an implicit system.
    System(BisectorSystem),
}

/// The bisector as the zero set of slack numerators.
///
/// `merged` is rational with weight `D`, coordinates `Nx, Ny, Nz` and one
/// slack numerator per surplus row. Its axes are the curve parameter (if
/// any) followed by the surface parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct BisectorSystem {
    /// Denominator, point numerators and slack numerators in one multivariate.
    pub merged: Mvar,
    /// Number of slack numerators.
    pub slack: usize,
}

/// A solved bisector point with the foot parameters it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct BisectorPoint {
    /// Foot parameters on the primitives.
    pub params: Vec<f64>,
    /// Point in space.
    pub point: Vec3,
}

impl BisectorSystem {
    /// The constraints whose common zero set is the bisector.
    pub fn zero_equations(&self) -> Vec<Mvar> {
        self.merged.split_scalar().split_off(4)
    }

    /// Bisector point for the foot parameters `params`.
    pub fn point_at(&self, params: &[f64]) -> Result<Vec3> {
        let p = self.merged.eval(params)?;
        if p[0].abs() < UEPS {
            return Err(MvarError::DegenerateSystem(format!("vanishing denominator at {params:?}")));
        }
        Ok(Vec3::new(p[1], p[2], p[3]) / p[0])
    }

    /// Sample the bisector with `samples` values per sliced axis.
    pub fn solve(&self, samples: usize, cfg: &SolverConfig) -> Result<Vec<BisectorPoint>> {
        let params = solve_on_slices(&self.zero_equations(), samples, cfg)?;
        let mut out = Vec::with_capacity(params.len());
        for p in params {
            match self.point_at(&p) {
                Ok(point) => out.push(BisectorPoint { params: p, point }),
                Err(e) => log::debug!("bisector sample dropped: {e}"),
            }
        }
        Ok(out)
    }
}

/// Bisector of two curves or surfaces in Euclidean space.
///
/// Both primitives must be polynomial, share a basis type and have point
/// type E3. A (surface, curve) pair is answered with the curve parameter on
/// axis 0, as for (curve, surface).
pub fn bisector(a: &Primitive, b: &Primitive) -> Result<Bisector> {
    let lifted = lift(&[a, b], PointType::E3, &[])?;
    let (x1, x2) = (&lifted.points[0], &lifted.points[1]);
    let mut rows = tangency_rows(x1, lifted.axes[0].clone())?;
    rows.extend(tangency_rows(x2, lifted.axes[1].clone())?);
    rows.push(equidistance_row(x1, x2)?);
    let dets = cramer(&rows)?;
    let slack = rows.len() - 3;
    let merged = Mvar::merge_scalar(&dets, true)?;

    match (a, b) {
        (Primitive::Curve(_), Primitive::Curve(_)) => Ok(Bisector::Surface(merged.to_surface()?)),
        (Primitive::Surface(_), Primitive::Curve(_)) => Ok(Bisector::System(BisectorSystem {
            merged: merged.reverse_axes(0, 2).reverse_axes(1, 2),
            slack,
        })),
        _ => Ok(Bisector::System(BisectorSystem { merged, slack })),
    }
}

// =============================================================================
// Planar curve-curve bisector
// =============================================================================

/// Intersection of the normal lines of two planar curves at `t1` and `t2`.
fn normals_meet(c1: &Curve, t1: f64, c2: &Curve, t2: f64) -> Result<Option<[f64; 2]>> {
    let (p1, p2) = (c1.eval_e(t1)?, c2.eval_e(t2)?);
    let (n1, n2) = (c1.normal_xy(t1, false)?, c2.normal_xy(t2, false)?);
    let a = DMat::from_row_slice(2, 2, &[n1.x, -n2.x, n1.y, -n2.y]);
    let b = DVec::from_vec(vec![p2[0] - p1[0], p2[1] - p1[1]]);
    Ok(solve_square(a, &b).map(|s| [p1[0] + s[0] * n1.x, p1[1] + s[0] * n1.y]))
}

/// Trace the bisector of two planar curves inside `bbox`.
///
/// Every polyline vertex is the bisector point `[x, y]`, recovered from the
/// normal lines at the traced foot parameters; with `support_params` the
/// foot parameters `t1, t2` follow.
pub fn planar_bisector(
    c1: &Curve,
    c2: &Curve,
    bbox: [(f64, f64); 2],
    cfg: &SolverConfig,
    support_params: bool,
) -> Result<Vec<Polyline>> {
    let (p1, p2) = (Primitive::Curve(c1.clone()), Primitive::Curve(c2.clone()));
    let lifted = lift(&[&p1, &p2], PointType::E2, &bbox)?;
    let p = spatial_point(&lifted, 2)?;
    let (x1, x2) = (&lifted.points[0], &lifted.points[1]);

    let d1 = p.sub(x1)?;
    let d2 = p.sub(x2)?;
    let eqs = [
        d1.dot(&x1.derive(0)?)?,
        d2.dot(&x2.derive(1)?)?,
        d1.dot(&d1)?.sub(&d2.dot(&d2)?)?,
    ];
    let lines = univar_inter(&eqs, cfg)?;

    lines
        .into_iter()
        .map(|line| {
            line.into_iter()
                .map(|v| {
                    let (t1, t2) = (v[0], v[1]);
                    let [x, y] = normals_meet(c1, t1, c2, t2)?.unwrap_or([v[2], v[3]]);
                    let mut out = vec![x, y];
                    if support_params {
                        out.extend([t1, t2]);
                    }
                    Ok(out)
                })
                .collect::<Result<Polyline>>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn line3(a: [f64; 3], b: [f64; 3]) -> Curve {
        Curve::bezier(PointType::E3, &[a.to_vec(), b.to_vec()]).unwrap()
    }

    fn plane(origin: [f64; 3], du: [f64; 3], dv: [f64; 3]) -> Surface {
        let mut ctl = Vec::new();
        for j in 0..2 {
            for i in 0..2 {
                ctl.push((0..3).map(|k| origin[k] + i as f64 * du[k] + j as f64 * dv[k]).collect());
            }
        }
        Surface::bezier(PointType::E3, 2, 2, &ctl).unwrap()
    }

    fn dist(a: &Vec3, b: &[f64]) -> f64 {
        ((a.x - b[0]).powi(2) + (a.y - b[1]).powi(2) + (a.z - b[2]).powi(2)).sqrt()
    }

    #[test]
    fn test_skew_lines() {
        let c1 = line3([0.0, 0.0, -1.0], [1.0, 0.0, -1.0]);
        let c2 = line3([0.0, 0.0, 1.0], [0.0, 1.0, 1.0]);
        let Bisector::Surface(srf) = bisector(&c1.clone().into(), &c2.clone().into()).unwrap() else {
            panic!("expected a surface");
        };
        assert!(srf.is_rational());
        for (t, s) in [(0.3, 0.6), (0.9, 0.1)] {
            let p = srf.eval_e(t, s).unwrap();
            assert_abs_diff_eq!(p[0], t, epsilon = 1e-10);
            assert_abs_diff_eq!(p[1], s, epsilon = 1e-10);
            assert_abs_diff_eq!(p[2], (t * t - s * s) / 4.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_curve_surface_cone() {
        let crv = line3([0.0, 0.0, 1.0], [0.0, 0.0, 2.0]);
        let srf = plane([0.0; 3], [2.0, 0.0, 0.0], [0.0, 2.0, 0.0]);
        let Bisector::System(sys) = bisector(&crv.clone().into(), &srf.clone().into()).unwrap() else {
            panic!("expected an implicit system");
        };
        assert_eq!(sys.slack, 1);
        assert_eq!(sys.merged.dim(), 3);
        let pts = sys.solve(3, &SolverConfig::default()).unwrap();
        assert!(pts.len() >= 3);
        for bp in &pts {
            let foot1 = crv.eval_e(bp.params[0]).unwrap();
            let foot2 = srf.eval_e(bp.params[1], bp.params[2]).unwrap();
            assert_abs_diff_eq!(dist(&bp.point, &foot1), dist(&bp.point, &foot2), epsilon = 1e-6);
        }

        // Swapped operands keep the curve parameter first.
        let Bisector::System(swapped) = bisector(&srf.into(), &crv.into()).unwrap() else {
            panic!("expected an implicit system");
        };
        let p = sys.point_at(&[0.4, 0.3, 0.2]).unwrap();
        let q = swapped.point_at(&[0.4, 0.3, 0.2]).unwrap();
        assert_abs_diff_eq!((p - q).norm(), 0.0, epsilon = 1e-10);
    }

    #[test]
    fn test_surface_surface_planes() {
        let s1 = plane([0.0; 3], [2.0, 0.0, 0.0], [0.0, 2.0, 0.0]);
        let s2 = plane([2.0, 0.0, 0.0], [0.0, 0.0, 2.0], [0.0, 2.0, 0.0]);
        let Bisector::System(sys) = bisector(&s1.clone().into(), &s2.clone().into()).unwrap() else {
            panic!("expected an implicit system");
        };
        assert_eq!(sys.slack, 2);
        assert_eq!(sys.zero_equations().len(), 2);
        let pts = sys.solve(3, &SolverConfig::default()).unwrap();
        assert!(pts.len() >= 6);
        for bp in &pts {
            let f1 = s1.eval_e(bp.params[0], bp.params[1]).unwrap();
            let f2 = s2.eval_e(bp.params[2], bp.params[3]).unwrap();
            assert_abs_diff_eq!(dist(&bp.point, &f1), dist(&bp.point, &f2), epsilon = 1e-6);
            // The planes z = 0 and x = 2 bisect along x + z = 2.
            assert_abs_diff_eq!(bp.point.x + bp.point.z, 2.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_rejected_inputs() {
        let c = line3([0.0; 3], [1.0, 0.0, 0.0]);
        let b = c.to_bspline().unwrap();
        assert_eq!(
            bisector(&c.clone().into(), &b.into()),
            Err(MvarError::SameGtypeExpected)
        );
        let flat = Curve::bezier(PointType::E2, &[vec![0.0, 0.0], vec![1.0, 1.0]]).unwrap();
        assert!(matches!(
            bisector(&c.into(), &flat.into()),
            Err(MvarError::GeomNoSupport(_))
        ));
    }

    #[test]
    fn test_planar_bisector_of_two_segments() {
        let c1 = Curve::bezier(PointType::E2, &[vec![1.0, 0.0], vec![3.0, 0.0]]).unwrap();
        let c2 = Curve::bezier(PointType::E2, &[vec![0.0, 1.0], vec![0.0, 3.0]]).unwrap();
        let cfg = SolverConfig {
            step: 2e-2,
            ..SolverConfig::default()
        };
        let lines = planar_bisector(&c1, &c2, [(0.0, 4.0), (0.0, 4.0)], &cfg, true).unwrap();
        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        assert!(line.len() > 10);
        for v in line {
            assert_eq!(v.len(), 4);
            assert_abs_diff_eq!(v[0], v[1], epsilon = 1e-6);
            assert_abs_diff_eq!(v[0], 1.0 + 2.0 * v[2], epsilon = 1e-6);
        }
        let ends = [line[0][0], line[line.len() - 1][0]];
        assert_abs_diff_eq!(ends[0].min(ends[1]), 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(ends[0].max(ends[1]), 3.0, epsilon = 1e-6);
    }
}
