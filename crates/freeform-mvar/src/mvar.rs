//! N-variate tensor product objects.
//!
//! A multivariate generalizes curves (one axis) and surfaces (two axes) to
//! any number of parametric axes. Per-axis operations run strip by strip:
//! every line of control points along the axis is a [`Curve`], so basis
//! dispatch stays in `freeform-cagd`.

use crate::error::{MvarError, Result};
use freeform_cagd::{knots, Curve, GeomType, PointType, Surface};
use serde::{Deserialize, Serialize};

/// A tensor product multivariate in Bezier, B-spline or power basis.
///
/// `points[c][flat]` is coordinate `c` (weight first, empty when
/// non-rational) of the control point with multi-index `(i_0, i_1, ...)`,
/// where `flat = i_0 + i_1 * len_0 + i_2 * len_0 * len_1 + ...`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMvar")]
pub struct Mvar {
    /// Basis type shared by all axes.
    pub gtype: GeomType,
    /// Point type of the coefficients.
    pub ptype: PointType,
    /// Order per axis.
    pub orders: Vec<usize>,
    /// Number of control points per axis.
    pub lengths: Vec<usize>,
    /// Knot vector per axis, B-spline only.
    #[serde(default)]
    pub knots: Vec<Option<Vec<f64>>>,
    /// Coordinate arrays, weight first.
    pub points: Vec<Vec<f64>>,
}

#[derive(Deserialize)]
struct RawMvar {
    gtype: GeomType,
    ptype: PointType,
    orders: Vec<usize>,
    lengths: Vec<usize>,
    #[serde(default)]
    knots: Vec<Option<Vec<f64>>>,
    points: Vec<Vec<f64>>,
}

impl TryFrom<RawMvar> for Mvar {
    type Error = MvarError;

    fn try_from(raw: RawMvar) -> Result<Self> {
        Self::new(raw.gtype, raw.ptype, raw.orders, raw.lengths, raw.points, raw.knots)
    }
}

/// Stored coordinates of a curve's control points, one row per point.
pub(crate) fn curve_rows(crv: &Curve) -> Vec<Vec<f64>> {
    (0..crv.length)
        .map(|i| crv.ptype.coords().map(|c| crv.points[c][i]).collect())
        .collect()
}

/// Coordinate arrays from rows of stored coordinates.
pub(crate) fn rows_to_points(rows: &[Vec<f64>], ptype: PointType) -> Vec<Vec<f64>> {
    let first = ptype.first_coord();
    let mut points = vec![Vec::new(); ptype.dim() + 1];
    for c in ptype.coords() {
        points[c] = rows.iter().map(|r| r[c - first]).collect();
    }
    points
}

impl Mvar {
    /// Create a multivariate, validating the data model.
    pub fn new(
        gtype: GeomType,
        ptype: PointType,
        orders: Vec<usize>,
        lengths: Vec<usize>,
        points: Vec<Vec<f64>>,
        knots: Vec<Option<Vec<f64>>>,
    ) -> Result<Self> {
        let mv = Self {
            gtype,
            ptype,
            orders,
            lengths,
            knots,
            points,
        };
        mv.validate()?;
        Ok(mv)
    }

    /// Check the data model invariants on every axis.
    pub fn validate(&self) -> Result<()> {
        let dim = self.dim();
        if dim == 0 || self.lengths.len() != dim || self.knots.len() != dim {
            return Err(MvarError::incompatible("axis attribute counts differ"));
        }
        let size = self.size();
        if self.points.len() != self.ptype.dim() + 1
            || self.points[0].is_empty() == self.ptype.is_rational()
            || self.ptype.coords().any(|c| self.points[c].len() != size)
        {
            return Err(MvarError::incompatible(format!(
                "coefficients do not form a {:?} mesh of type {:?}",
                self.lengths, self.ptype
            )));
        }
        for axis in 0..dim {
            let (order, len) = (self.orders[axis], self.lengths[axis]);
            match (self.gtype, &self.knots[axis]) {
                (GeomType::BSpline, Some(kv)) => {
                    if order == 0 || order > len {
                        return Err(MvarError::incompatible(format!(
                            "axis {axis}: order {order} with length {len}"
                        )));
                    }
                    knots::validate(kv, len, order)?;
                }
                (GeomType::Bezier | GeomType::Power, None) if order == len && len > 0 => {}
                _ => {
                    return Err(MvarError::incompatible(format!(
                        "axis {axis} does not fit a {:?} multivariate",
                        self.gtype
                    )))
                }
            }
        }
        Ok(())
    }

    /// Number of parametric axes.
    pub fn dim(&self) -> usize {
        self.orders.len()
    }

    /// Total number of control points.
    pub fn size(&self) -> usize {
        self.lengths.iter().product()
    }

    /// Whether the coefficients carry weights.
    pub fn is_rational(&self) -> bool {
        self.ptype.is_rational()
    }

    /// Flat index step of each axis.
    pub fn strides(&self) -> Vec<usize> {
        let mut s = Vec::with_capacity(self.dim());
        let mut acc = 1;
        for &len in &self.lengths {
            s.push(acc);
            acc *= len;
        }
        s
    }

    /// Parametric domain of `axis`.
    pub fn domain(&self, axis: usize) -> (f64, f64) {
        match (&self.knots[axis], self.gtype) {
            (Some(kv), GeomType::BSpline) => knots::domain(kv, self.orders[axis], self.lengths[axis]),
            _ => (0.0, 1.0),
        }
    }

    /// Parametric domains of all axes.
    pub fn domains(&self) -> Vec<(f64, f64)> {
        (0..self.dim()).map(|a| self.domain(a)).collect()
    }

    /// Stored coordinates of the control point at flat index `idx`.
    pub(crate) fn row(&self, idx: usize) -> Vec<f64> {
        self.ptype.coords().map(|c| self.points[c][idx]).collect()
    }

    // =========================================================================
    // Construction
    // =========================================================================

    /// Univariate from a curve. Periodic curves are unrolled.
    pub fn from_curve(crv: &Curve) -> Self {
        let crv = crv.to_float();
        Self {
            gtype: crv.gtype,
            ptype: crv.ptype,
            orders: vec![crv.order],
            lengths: vec![crv.length],
            knots: vec![crv.knots.clone()],
            points: crv.points,
        }
    }

    /// Bivariate from a surface. Periodic directions are unrolled.
    pub fn from_surface(srf: &Surface) -> Result<Self> {
        let srf = srf.to_float()?;
        Ok(Self {
            gtype: srf.gtype,
            ptype: srf.ptype,
            orders: vec![srf.u_order, srf.v_order],
            lengths: vec![srf.u_length, srf.v_length],
            knots: vec![srf.u_knots, srf.v_knots],
            points: srf.points,
        })
    }

    /// Convert a univariate back to a curve.
    pub fn to_curve(&self) -> Result<Curve> {
        if self.dim() != 1 {
            return Err(MvarError::incompatible(format!("{}-variate is not a curve", self.dim())));
        }
        Ok(Curve::new(
            self.gtype,
            self.ptype,
            self.orders[0],
            self.points.clone(),
            self.knots[0].clone(),
        )?)
    }

    /// Convert a bivariate back to a surface.
    pub fn to_surface(&self) -> Result<Surface> {
        if self.dim() != 2 {
            return Err(MvarError::incompatible(format!("{}-variate is not a surface", self.dim())));
        }
        let srf = Surface {
            gtype: self.gtype,
            ptype: self.ptype,
            u_order: self.orders[0],
            v_order: self.orders[1],
            u_length: self.lengths[0],
            v_length: self.lengths[1],
            u_periodic: false,
            v_periodic: false,
            points: self.points.clone(),
            u_knots: self.knots[0].clone(),
            v_knots: self.knots[1].clone(),
        };
        srf.validate()?;
        Ok(srf)
    }

    /// Scalar constant over the axes and domains of `template`.
    pub fn constant_like(template: &Mvar, value: f64) -> Self {
        let knots = template
            .domains()
            .into_iter()
            .map(|(a, b)| (template.gtype == GeomType::BSpline).then(|| vec![a, b]))
            .collect();
        Self {
            gtype: template.gtype,
            ptype: PointType::E1,
            orders: vec![1; template.dim()],
            lengths: vec![1; template.dim()],
            knots,
            points: vec![Vec::new(), vec![value]],
        }
    }

    /// Scalar that runs linearly from `from` to `to` across `axis` and is
    /// constant along the others.
    ///
    /// `domains` gives every axis domain; only B-splines honour it, other
    /// bases live on `[0, 1]`.
    pub fn linear(gtype: GeomType, domains: &[(f64, f64)], axis: usize, from: f64, to: f64) -> Self {
        let dim = domains.len();
        let bspline = gtype == GeomType::BSpline;
        let mut orders = vec![1; dim];
        orders[axis] = 2;
        let knots = domains
            .iter()
            .enumerate()
            .map(|(a, &(min, max))| {
                bspline.then(|| if a == axis { vec![min, min, max, max] } else { vec![min, max] })
            })
            .collect();
        let coefs = match gtype {
            GeomType::Power => vec![from, to - from],
            _ => vec![from, to],
        };
        Self {
            gtype,
            ptype: PointType::E1,
            lengths: orders.clone(),
            orders,
            knots,
            points: vec![Vec::new(), coefs],
        }
    }

    // =========================================================================
    // Strips
    // =========================================================================

    /// Flat indices of the first control point of every strip along `axis`.
    fn strip_bases(&self, axis: usize) -> Vec<usize> {
        let stride = self.strides()[axis];
        let len = self.lengths[axis];
        (0..self.size()).filter(|i| (i / stride) % len == 0).collect()
    }

    fn strip_curve(&self, axis: usize, rows: &[Vec<f64>]) -> Result<Curve> {
        Ok(Curve::new(
            self.gtype,
            self.ptype,
            self.orders[axis],
            rows_to_points(rows, self.ptype),
            self.knots[axis].clone(),
        )?)
    }

    /// Control point lines along `axis` as curves.
    pub fn strips(&self, axis: usize) -> Result<Vec<Curve>> {
        let stride = self.strides()[axis];
        self.strip_bases(axis)
            .into_iter()
            .map(|base| {
                let rows: Vec<_> = (0..self.lengths[axis]).map(|i| self.row(base + i * stride)).collect();
                self.strip_curve(axis, &rows)
            })
            .collect()
    }

    /// Reassemble from strips produced by [`Mvar::strips`], possibly of a new
    /// length, order or basis along `axis`.
    pub fn from_strips(&self, axis: usize, strips: &[Curve]) -> Result<Mvar> {
        let first = strips.first().ok_or_else(|| MvarError::incompatible("no strips"))?;
        if strips
            .iter()
            .any(|s| s.length != first.length || s.order != first.order || s.ptype != first.ptype)
        {
            return Err(MvarError::incompatible("strips differ in layout"));
        }
        let bspline = first.gtype == GeomType::BSpline || self.gtype == GeomType::BSpline;
        let mut out = Mvar {
            gtype: if bspline { GeomType::BSpline } else { first.gtype },
            ptype: first.ptype,
            orders: self.orders.clone(),
            lengths: self.lengths.clone(),
            knots: self.knots.clone(),
            points: Vec::new(),
        };
        out.orders[axis] = first.order;
        out.lengths[axis] = first.length;
        out.knots[axis] = bspline.then(|| first.knot_vector());
        if bspline {
            for (a, kv) in out.knots.iter_mut().enumerate() {
                if kv.is_none() {
                    *kv = Some(knots::bezier_knots(self.orders[a]));
                }
            }
        }

        let stride = out.strides()[axis];
        let mut rows = vec![Vec::new(); out.size()];
        for (base, strip) in out.strip_bases(axis).into_iter().zip(strips) {
            for (i, r) in curve_rows(strip).into_iter().enumerate() {
                rows[base + i * stride] = r;
            }
        }
        out.points = rows_to_points(&rows, out.ptype);
        Ok(out)
    }

    /// Apply a curve operation to every strip along `axis`.
    pub fn map_strips<F>(&self, axis: usize, f: F) -> Result<Mvar>
    where
        F: Fn(&Curve) -> freeform_cagd::Result<Curve>,
    {
        let strips = self
            .strips(axis)?
            .iter()
            .map(&f)
            .collect::<freeform_cagd::Result<Vec<_>>>()?;
        self.from_strips(axis, &strips)
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Evaluate at one parameter per axis, returning `[W, X, ...]` with
    /// `W = 1` when non-rational.
    pub fn eval(&self, params: &[f64]) -> Result<Vec<f64>> {
        if params.len() != self.dim() {
            return Err(MvarError::incompatible(format!(
                "{} parameters for a {}-variate",
                params.len(),
                self.dim()
            )));
        }
        let mut mv = self.clone();
        while mv.dim() > 1 {
            let axis = mv.dim() - 1;
            mv = mv.restrict(axis, params[axis])?;
        }
        Ok(mv.to_curve()?.eval(params[0])?)
    }

    /// The `(dim - 1)`-variate with `axis` held at `t`.
    pub fn restrict(&self, axis: usize, t: f64) -> Result<Mvar> {
        if self.dim() < 2 {
            return Err(MvarError::incompatible("cannot restrict a univariate"));
        }
        let rows = self
            .strips(axis)?
            .iter()
            .map(|s| {
                let p = s.eval(t)?;
                Ok(if self.is_rational() { p } else { p[1..].to_vec() })
            })
            .collect::<Result<Vec<_>>>()?;
        let mut out = self.clone();
        out.orders.remove(axis);
        out.lengths.remove(axis);
        out.knots.remove(axis);
        out.points = rows_to_points(&rows, self.ptype);
        Ok(out)
    }

    /// Differentiate every coefficient along `axis`.
    pub fn derive(&self, axis: usize) -> Result<Mvar> {
        self.map_strips(axis, Curve::derive_scalar)
    }

    /// Split at `t` along `axis`.
    pub fn subdiv(&self, t: f64, axis: usize) -> Result<(Mvar, Mvar)> {
        let mut left = Vec::new();
        let mut right = Vec::new();
        for strip in self.strips(axis)? {
            let (l, r) = strip.subdiv_at_param(t)?;
            left.push(l);
            right.push(r);
        }
        Ok((self.from_strips(axis, &left)?, self.from_strips(axis, &right)?))
    }

    /// The part over `[t1, t2]` along `axis`.
    pub fn region(&self, axis: usize, t1: f64, t2: f64) -> Result<Mvar> {
        self.map_strips(axis, |c| c.region(t1, t2))
    }

    /// Insert knots along `axis`.
    pub fn refine(&self, axis: usize, knots: &[f64]) -> Result<Mvar> {
        self.map_strips(axis, |c| c.refine_at_params(false, knots))
    }

    /// Raise the order along `axis` to `order`.
    pub fn degree_raise(&self, axis: usize, order: usize) -> Result<Mvar> {
        if order == self.orders[axis] {
            return Ok(self.clone());
        }
        self.map_strips(axis, |c| c.degree_raise_n(order))
    }

    /// Convert to B-spline form.
    pub fn to_bspline(&self) -> Result<Mvar> {
        match self.gtype {
            GeomType::BSpline => Ok(self.clone()),
            GeomType::Bezier => self.map_strips(0, Curve::to_bspline),
            GeomType::Power => self.to_bezier()?.to_bspline(),
        }
    }

    /// Convert to Bezier form. B-spline axes must be single segments.
    pub fn to_bezier(&self) -> Result<Mvar> {
        if self.gtype == GeomType::Bezier {
            return Ok(self.clone());
        }
        let mut mv = self.clone();
        for axis in 0..self.dim() {
            // Axes not converted yet still hold the original basis.
            mv.gtype = self.gtype;
            mv = mv.map_strips(axis, Curve::to_bezier)?;
        }
        mv.gtype = GeomType::Bezier;
        mv.knots = vec![None; mv.dim()];
        Ok(mv)
    }

    /// Rewrite the domain of `axis`, promoting to B-spline.
    pub fn set_domain(&self, axis: usize, min: f64, max: f64) -> Result<Mvar> {
        let mut mv = self.to_bspline()?;
        let old = mv.domain(axis);
        if let Some(kv) = mv.knots[axis].as_mut() {
            knots::affine_map(kv, old, min, max);
        }
        Ok(mv)
    }

    /// Swap axes `a` and `b`.
    pub fn reverse_axes(&self, a: usize, b: usize) -> Mvar {
        if a == b {
            return self.clone();
        }
        let mut out = self.clone();
        out.orders.swap(a, b);
        out.lengths.swap(a, b);
        out.knots.swap(a, b);
        let old_strides = self.strides();
        let new_strides = out.strides();
        let size = self.size();
        for c in self.ptype.coords() {
            let mut coords = vec![0.0; size];
            for (flat, &x) in self.points[c].iter().enumerate() {
                let mut dst = 0;
                for axis in 0..self.dim() {
                    let idx = (flat / old_strides[axis]) % self.lengths[axis];
                    let target = if axis == a {
                        b
                    } else if axis == b {
                        a
                    } else {
                        axis
                    };
                    dst += idx * new_strides[target];
                }
                coords[dst] = x;
            }
            out.points[c] = coords;
        }
        out
    }

    /// Lift into a `new_dim`-variate whose axes `start..start + dim` are this
    /// one's; the remaining axes are constant.
    ///
    /// `domains` lists every axis domain of the result and sets the knots of
    /// the constant B-spline axes.
    pub fn promote(&self, new_dim: usize, start: usize, domains: &[(f64, f64)]) -> Result<Mvar> {
        if start + self.dim() > new_dim || domains.len() != new_dim {
            return Err(MvarError::incompatible(format!(
                "cannot place a {}-variate at axis {start} of {new_dim}",
                self.dim()
            )));
        }
        let bspline = self.gtype == GeomType::BSpline;
        let mut orders = vec![1; new_dim];
        let mut lengths = vec![1; new_dim];
        let mut kvs: Vec<Option<Vec<f64>>> = domains
            .iter()
            .map(|&(min, max)| bspline.then(|| vec![min, max]))
            .collect();
        for a in 0..self.dim() {
            orders[start + a] = self.orders[a];
            lengths[start + a] = self.lengths[a];
            kvs[start + a] = self.knots[a].clone();
        }
        // Length one axes leave the flat layout untouched.
        Mvar::new(self.gtype, self.ptype, orders, lengths, self.points.clone(), kvs)
    }

    /// Split into scalar multivariates, one per stored coordinate.
    pub fn split_scalar(&self) -> Vec<Mvar> {
        self.ptype
            .coords()
            .map(|c| Mvar {
                ptype: PointType::E1,
                points: vec![Vec::new(), self.points[c].clone()],
                ..self.clone()
            })
            .collect()
    }

    /// Merge scalar multivariates of identical layout into one.
    ///
    /// With `rational` set, the first part becomes the weight.
    pub fn merge_scalar(parts: &[Mvar], rational: bool) -> Result<Mvar> {
        let first = parts.first().ok_or_else(|| MvarError::incompatible("nothing to merge"))?;
        if parts.iter().any(|p| {
            p.ptype.dim() != 1
                || p.is_rational()
                || p.gtype != first.gtype
                || p.orders != first.orders
                || p.lengths != first.lengths
                || p.knots != first.knots
        }) {
            return Err(MvarError::incompatible("scalar parts differ in layout"));
        }
        let dim = parts.len() - usize::from(rational);
        let ptype = PointType::new(dim, rational)?;
        let mut points = vec![Vec::new(); dim + 1];
        for (c, p) in ptype.coords().zip(parts) {
            points[c] = p.points[1].clone();
        }
        Ok(Mvar {
            ptype,
            points,
            ..first.clone()
        })
    }

    /// Numerator of a rational scalar, or the scalar itself.
    pub fn numerator(&self) -> Result<Mvar> {
        if self.ptype.dim() != 1 {
            return Err(MvarError::incompatible("numerator of a non-scalar"));
        }
        Ok(Mvar {
            ptype: PointType::E1,
            points: vec![Vec::new(), self.points[1].clone()],
            ..self.clone()
        })
    }

    /// Smallest and largest stored coefficient of coordinate `c`.
    pub fn coef_range(&self, c: usize) -> (f64, f64) {
        self.points[c]
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| (lo.min(x), hi.max(x)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// z = u * v^2 as a Bezier patch.
    fn patch() -> Surface {
        let mut ctl = Vec::new();
        for (j, z) in [0.0, 0.0, 1.0].into_iter().enumerate() {
            for i in 0..2 {
                ctl.push(vec![i as f64, j as f64 / 2.0, i as f64 * z]);
            }
        }
        Surface::bezier(PointType::E3, 2, 3, &ctl).unwrap()
    }

    #[test]
    fn test_surface_round_trip_and_eval() {
        let srf = patch();
        let mv = Mvar::from_surface(&srf).unwrap();
        assert_eq!(mv.dim(), 2);
        let p = mv.eval(&[0.5, 0.5]).unwrap();
        let q = srf.eval(0.5, 0.5).unwrap();
        for (a, b) in p.iter().zip(&q) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-12);
        }
        assert_eq!(mv.to_surface().unwrap(), srf);
        assert!(mv.to_curve().is_err());
    }

    #[test]
    fn test_promote_and_restrict() {
        let srf = patch();
        let mv = Mvar::from_surface(&srf).unwrap();
        let lifted = mv.promote(3, 1, &[(0.0, 1.0); 3]).unwrap();
        assert_eq!(lifted.orders, vec![1, 2, 3]);
        let p = lifted.eval(&[0.9, 0.3, 0.7]).unwrap();
        let q = srf.eval(0.3, 0.7).unwrap();
        for (a, b) in p.iter().zip(&q) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-12);
        }
        let r = mv.restrict(0, 0.3).unwrap();
        let c = r.to_curve().unwrap();
        assert_abs_diff_eq!(c.eval(0.7).unwrap()[3], q[3], epsilon = 1e-12);
    }

    #[test]
    fn test_reverse_axes() {
        let mv = Mvar::from_surface(&patch()).unwrap();
        let rev = mv.reverse_axes(0, 1);
        assert_eq!(rev.lengths, vec![3, 2]);
        let p = rev.eval(&[0.7, 0.3]).unwrap();
        let q = mv.eval(&[0.3, 0.7]).unwrap();
        for (a, b) in p.iter().zip(&q) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-12);
        }
        assert_eq!(rev.reverse_axes(1, 0), mv);
    }

    #[test]
    fn test_derive_and_subdiv() {
        let mv = Mvar::from_surface(&patch()).unwrap();
        let dv = mv.derive(1).unwrap();
        // d/dv (u v^2) = 2 u v
        assert_abs_diff_eq!(dv.eval(&[0.5, 0.5]).unwrap()[3], 0.5, epsilon = 1e-12);
        let (a, b) = mv.subdiv(0.25, 1).unwrap();
        let p = mv.eval(&[0.6, 0.25]).unwrap();
        assert_abs_diff_eq!(a.eval(&[0.6, 1.0]).unwrap()[3], p[3], epsilon = 1e-12);
        assert_abs_diff_eq!(b.eval(&[0.6, 0.0]).unwrap()[3], p[3], epsilon = 1e-12);
    }

    #[test]
    fn test_bspline_domains() {
        let mv = Mvar::from_surface(&patch()).unwrap().set_domain(1, 2.0, 4.0).unwrap();
        assert_eq!(mv.gtype, GeomType::BSpline);
        assert_eq!(mv.domains(), vec![(0.0, 1.0), (2.0, 4.0)]);
        let lifted = mv.promote(3, 0, &[(0.0, 1.0), (2.0, 4.0), (-1.0, 1.0)]).unwrap();
        assert_eq!(lifted.domain(2), (-1.0, 1.0));
        let p = lifted.eval(&[0.5, 3.0, 0.0]).unwrap();
        assert_abs_diff_eq!(p[3], 0.5 * 0.25, epsilon = 1e-12);
        let back = mv.to_bezier().unwrap();
        assert_eq!(back.gtype, GeomType::Bezier);
        assert_abs_diff_eq!(back.eval(&[0.5, 0.5]).unwrap()[3], 0.125, epsilon = 1e-12);
    }

    #[test]
    fn test_split_merge_scalar() {
        let mv = Mvar::from_surface(&patch()).unwrap();
        let parts = mv.split_scalar();
        assert_eq!(parts.len(), 3);
        let merged = Mvar::merge_scalar(&parts, false).unwrap();
        assert_eq!(merged, mv);
        let rational = Mvar::merge_scalar(&parts, true).unwrap();
        assert_eq!(rational.ptype, PointType::P2);
    }

    #[test]
    fn test_linear_and_constant() {
        let doms = [(0.0, 1.0), (-2.0, 2.0)];
        for gtype in [GeomType::Bezier, GeomType::BSpline, GeomType::Power] {
            let x = Mvar::linear(gtype, &doms, 1, -2.0, 2.0);
            x.validate().unwrap();
            let (min, max) = x.domain(1);
            let mid = x.eval(&[0.3, 0.5 * (min + max)]).unwrap();
            assert_abs_diff_eq!(mid[1], 0.0, epsilon = 1e-12);
            let c = Mvar::constant_like(&x, 3.0);
            c.validate().unwrap();
            assert_eq!(c.domains(), x.domains());
        }
    }

    #[test]
    fn test_serde_round_trip() {
        let mv = Mvar::from_surface(&patch()).unwrap().to_bspline().unwrap();
        let json = serde_json::to_string(&mv).unwrap();
        let back: Mvar = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mv);
    }

    #[test]
    fn test_deserialize_validates() {
        let mut value = serde_json::to_value(Mvar::from_surface(&patch()).unwrap()).unwrap();
        value["lengths"] = serde_json::json!([2, 5]);
        assert!(serde_json::from_value::<Mvar>(value).is_err());

        let mut value = serde_json::to_value(Mvar::from_surface(&patch()).unwrap()).unwrap();
        value["orders"] = serde_json::json!([2]);
        assert!(serde_json::from_value::<Mvar>(value).is_err());
    }
}
