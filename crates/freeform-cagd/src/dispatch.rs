//! Uniform curve operations dispatched on the basis type.
//!
//! Each operation matches on [`GeomType`] and forwards to the basis kernel.
//! Power curves route the operations their kernel lacks through
//! [`BezierCoercion`]; operations that are undefined for a basis surface the
//! kernel's `*NoSupport` error unchanged.

use crate::basis::{bezier, bspline, BezierBasis, BsplineBasis, CurveKernel, PowerBasis};
use crate::coerce::BezierCoercion;
use crate::curve::Curve;
use crate::error::Result;
use crate::types::GeomType;
use freeform_math::{apx_eq, Tolerance, KNOT_EPS};

impl Curve {
    /// Parametric domain `(min, max)`.
    pub fn domain(&self) -> (f64, f64) {
        match self.gtype {
            GeomType::Bezier => BezierBasis::domain(self),
            GeomType::BSpline => BsplineBasis::domain(self),
            GeomType::Power => PowerBasis::domain(self),
        }
    }

    /// Rewrite the parametric domain in place.
    ///
    /// Bezier and power curves are converted to B-spline form unless the
    /// requested domain is `[0, 1]`.
    pub fn set_domain(&mut self, min: f64, max: f64) -> Result<()> {
        if self.gtype != GeomType::BSpline && apx_eq(min, 0.0, KNOT_EPS) && apx_eq(max, 1.0, KNOT_EPS) {
            return Ok(());
        }
        let out = match self.gtype {
            GeomType::Bezier => BezierBasis::set_domain(self, min, max),
            GeomType::BSpline => BsplineBasis::set_domain(self, min, max),
            GeomType::Power => PowerBasis::set_domain(self, min, max),
        }?;
        *self = out;
        Ok(())
    }

    /// Evaluate at `t`, returning `[W, X, Y, ...]` with `W = 1` when non-rational.
    ///
    /// Rational coordinates are homogeneous; see [`Curve::eval_e`].
    pub fn eval(&self, t: f64) -> Result<Vec<f64>> {
        let stored = self.eval_stored(t)?;
        Ok(self.with_weight(stored))
    }

    /// Evaluate the stored coordinates only (no unit weight prefix).
    pub(crate) fn eval_stored(&self, t: f64) -> Result<Vec<f64>> {
        match self.gtype {
            GeomType::Bezier => BezierBasis::eval(self, t),
            GeomType::BSpline => BsplineBasis::eval(self, t),
            GeomType::Power => PowerBasis::eval(self, t),
        }
    }

    /// Evaluate the Euclidean point at `t`.
    pub fn eval_e(&self, t: f64) -> Result<Vec<f64>> {
        let p = self.eval(t)?;
        Ok(p[1..].iter().map(|x| x / p[0]).collect())
    }

    /// Prefix a unit weight to non-rational stored coordinates.
    pub(crate) fn with_weight(&self, mut stored: Vec<f64>) -> Vec<f64> {
        if !self.is_rational() {
            stored.insert(0, 1.0);
        }
        stored
    }

    /// Euclidean derivative curve.
    ///
    /// Identical to [`Curve::derive_scalar`] for polynomial curves. Rational
    /// curves differentiate through the quotient rule, producing a rational
    /// curve of order `2k - 1`; rational B-splines come back as piecewise
    /// Bezier segments with discontinuous knots.
    pub fn derive(&self) -> Result<Curve> {
        if !self.is_rational() {
            return self.derive_scalar();
        }
        match self.gtype {
            GeomType::Bezier => {
                let rows = bezier::rational_derive_rows(&self.rows());
                Ok(Curve::from_parts(GeomType::Bezier, self.ptype, rows.len(), &rows, None))
            }
            GeomType::BSpline => {
                let mut rows = Vec::new();
                let mut kv = Vec::new();
                let mut order = 1;
                let mut end = 0.0;
                for (a, b, seg) in self.bezier_segments()? {
                    let mut d = bezier::rational_derive_rows(&seg.rows());
                    for row in &mut d {
                        for x in &mut row[1..] {
                            *x /= b - a;
                        }
                    }
                    order = d.len();
                    kv.extend(std::iter::repeat(a).take(order));
                    rows.extend(d);
                    end = b;
                }
                kv.extend(std::iter::repeat(end).take(order));
                Ok(Curve::from_parts(GeomType::BSpline, self.ptype, order, &rows, Some(kv)))
            }
            GeomType::Power => BezierCoercion::apply(self, "rational derivative", Curve::derive),
        }
    }

    /// Differentiate every stored coefficient, the weight included.
    pub fn derive_scalar(&self) -> Result<Curve> {
        match self.gtype {
            GeomType::Bezier => BezierBasis::derive_scalar(self),
            GeomType::BSpline => BsplineBasis::derive_scalar(self),
            GeomType::Power => BezierCoercion::apply(self, "derivative", BezierBasis::derive_scalar),
        }
    }

    /// Antiderivative of a polynomial curve.
    pub fn integrate(&self) -> Result<Curve> {
        match self.gtype {
            GeomType::Bezier => BezierBasis::integrate(self),
            GeomType::BSpline => BsplineBasis::integrate(self),
            GeomType::Power => BezierCoercion::apply(self, "integration", BezierBasis::integrate),
        }
    }

    /// Split at `t` into the pieces before and after it.
    ///
    /// Bezier and power pieces are each reparametrized to `[0, 1]`.
    pub fn subdiv_at_param(&self, t: f64) -> Result<(Curve, Curve)> {
        self.subdiv_at_param_with(t, &Tolerance::DEFAULT)
    }

    /// [`Curve::subdiv_at_param`] with explicit domain and knot tolerances.
    pub fn subdiv_at_param_with(&self, t: f64, tol: &Tolerance) -> Result<(Curve, Curve)> {
        log::trace!("subdividing {:?} curve at {t}", self.gtype);
        match self.gtype {
            GeomType::Bezier => BezierBasis::subdiv(self, t),
            GeomType::BSpline => bspline::subdiv_with(self, t, tol),
            GeomType::Power => {
                BezierCoercion::apply_pair(self, "subdivision", |b| BezierBasis::subdiv(b, t))
            }
        }
    }

    /// Insert `knots`, or replace the knot vector when `replace` is set.
    ///
    /// Bezier curves are promoted to B-splines first.
    pub fn refine_at_params(&self, replace: bool, knots: &[f64]) -> Result<Curve> {
        match self.gtype {
            GeomType::Bezier => BezierBasis::refine(self, replace, knots),
            GeomType::BSpline => BsplineBasis::refine(self, replace, knots),
            GeomType::Power => PowerBasis::refine(self, replace, knots),
        }
    }

    /// Raise the order by one.
    pub fn degree_raise(&self) -> Result<Curve> {
        self.degree_raise_n(self.order + 1)
    }

    /// Raise the order to `order`.
    pub fn degree_raise_n(&self, order: usize) -> Result<Curve> {
        match self.gtype {
            GeomType::Bezier => BezierBasis::degree_raise_n(self, order),
            GeomType::BSpline => BsplineBasis::degree_raise_n(self, order),
            GeomType::Power => PowerBasis::degree_raise_n(self, order),
        }
    }

    /// Lower the order by one. Defined for Bezier curves only.
    pub fn degree_reduce(&self) -> Result<Curve> {
        match self.gtype {
            GeomType::Bezier => BezierBasis::degree_reduce(self),
            GeomType::BSpline => BsplineBasis::degree_reduce(self),
            GeomType::Power => PowerBasis::degree_reduce(self),
        }
    }

    /// Moebius reparametrization with ratio `c`.
    ///
    /// `c == 0` picks the ratio that makes the first and last weights equal.
    /// The result is always rational.
    pub fn moebius(&self, c: f64) -> Result<Curve> {
        match self.gtype {
            GeomType::Bezier => BezierBasis::moebius(self, c),
            GeomType::BSpline => BsplineBasis::moebius(self, c),
            GeomType::Power => {
                BezierCoercion::apply(self, "Moebius transformation", |b| BezierBasis::moebius(b, c))
            }
        }
    }

    /// Reverse the parametrization.
    pub fn reverse(&self) -> Result<Curve> {
        match self.gtype {
            GeomType::Bezier => BezierBasis::reverse(self),
            GeomType::BSpline => BsplineBasis::reverse(self),
            GeomType::Power => BezierCoercion::apply(self, "reversal", BezierBasis::reverse),
        }
    }
}
