//! Freeform curve data model and basis conversions.

use crate::error::{CagdError, Result};
use crate::knots;
use crate::types::{from_rows, to_rows, GeomType, PointType, Rows};
use freeform_math::binomial;
use serde::{Deserialize, Serialize};

/// A freeform curve in Bezier, B-spline or power basis.
///
/// `points[c][i]` is coordinate `c` of control point `i`. Index 0 holds the
/// weight and is empty for non-rational curves. Rational curves store
/// homogeneous coordinates `(W, W*x, W*y, ...)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCurve")]
pub struct Curve {
    /// Basis type.
    pub gtype: GeomType,
    /// Point type of the control points.
    pub ptype: PointType,
    /// Order (degree + 1). Equals `length` for Bezier and power curves.
    pub order: usize,
    /// Number of control points.
    pub length: usize,
    /// Periodic B-spline: the first `order - 1` points wrap around.
    #[serde(default)]
    pub periodic: bool,
    /// Coordinate arrays, weight first.
    pub points: Vec<Vec<f64>>,
    /// Knot vector, B-spline only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knots: Option<Vec<f64>>,
}

/// Serialized curve, validated before it becomes a [`Curve`].
#[derive(Deserialize)]
struct RawCurve {
    gtype: String,
    ptype: PointType,
    order: usize,
    length: usize,
    #[serde(default)]
    periodic: bool,
    points: Vec<Vec<f64>>,
    #[serde(default)]
    knots: Option<Vec<f64>>,
}

impl TryFrom<RawCurve> for Curve {
    type Error = CagdError;

    fn try_from(raw: RawCurve) -> Result<Self> {
        let crv = Self {
            gtype: GeomType::from_tag(&raw.gtype).ok_or(CagdError::UndefCrv)?,
            ptype: raw.ptype,
            order: raw.order,
            length: raw.length,
            periodic: raw.periodic,
            points: raw.points,
            knots: raw.knots,
        };
        crv.validate()?;
        Ok(crv)
    }
}

impl Curve {
    /// Create a curve from coordinate arrays, validating the data model.
    pub fn new(
        gtype: GeomType,
        ptype: PointType,
        order: usize,
        points: Vec<Vec<f64>>,
        knots: Option<Vec<f64>>,
    ) -> Result<Self> {
        let length = points.get(ptype.dim()).map_or(0, Vec::len);
        let crv = Self {
            gtype,
            ptype,
            order,
            length,
            periodic: false,
            points,
            knots,
        };
        crv.validate()?;
        Ok(crv)
    }

    /// Create a periodic B-spline curve.
    ///
    /// The knot vector has `order + length + order - 1` entries.
    pub fn new_periodic(
        ptype: PointType,
        order: usize,
        points: Vec<Vec<f64>>,
        knots: Vec<f64>,
    ) -> Result<Self> {
        let length = points.get(ptype.dim()).map_or(0, Vec::len);
        let crv = Self {
            gtype: GeomType::BSpline,
            ptype,
            order,
            length,
            periodic: true,
            points,
            knots: Some(knots),
        };
        crv.validate()?;
        Ok(crv)
    }

    /// Bezier curve from control points given as rows (weight first if rational).
    pub fn bezier(ptype: PointType, ctl: &[Vec<f64>]) -> Result<Self> {
        Self::new(GeomType::Bezier, ptype, ctl.len(), from_rows(ctl, ptype), None)
    }

    /// B-spline curve from control point rows and a knot vector.
    pub fn bspline(ptype: PointType, order: usize, ctl: &[Vec<f64>], knots: Vec<f64>) -> Result<Self> {
        Self::new(GeomType::BSpline, ptype, order, from_rows(ctl, ptype), Some(knots))
    }

    /// B-spline curve with an open uniform knot vector over `[0, 1]`.
    pub fn bspline_uniform(ptype: PointType, order: usize, ctl: &[Vec<f64>]) -> Result<Self> {
        if order == 0 || order > ctl.len() {
            return Err(CagdError::WrongOrder(format!(
                "order {order} with {} control points",
                ctl.len()
            )));
        }
        let kv = knots::uniform_open(ctl.len(), order, 0.0, 1.0);
        Self::bspline(ptype, order, ctl, kv)
    }

    /// Power basis curve from coefficient rows `a_0, a_1, ...`.
    pub fn power(ptype: PointType, coefs: &[Vec<f64>]) -> Result<Self> {
        Self::new(GeomType::Power, ptype, coefs.len(), from_rows(coefs, ptype), None)
    }

    /// Assemble a curve from rows without validation.
    pub(crate) fn from_parts(
        gtype: GeomType,
        ptype: PointType,
        order: usize,
        rows: &[Vec<f64>],
        knots: Option<Vec<f64>>,
    ) -> Self {
        Self {
            gtype,
            ptype,
            order,
            length: rows.len(),
            periodic: false,
            points: from_rows(rows, ptype),
            knots,
        }
    }

    /// Check the data model invariants.
    pub fn validate(&self) -> Result<()> {
        if self.points.len() != self.ptype.dim() + 1 {
            return Err(CagdError::invalid(format!(
                "expected {} coordinate arrays, got {}",
                self.ptype.dim() + 1,
                self.points.len()
            )));
        }
        if self.points[0].is_empty() == self.ptype.is_rational() {
            return Err(CagdError::invalid("weights must be present iff the curve is rational"));
        }
        if self.ptype.coords().any(|c| self.points[c].len() != self.length) {
            return Err(CagdError::invalid("coordinate arrays differ in length"));
        }
        if self.length == 0 || self.order == 0 {
            return Err(CagdError::WrongOrder("empty curve".into()));
        }
        match self.gtype {
            GeomType::Bezier | GeomType::Power => {
                if self.order != self.length {
                    return Err(CagdError::WrongOrder(format!(
                        "order {} != length {} for {:?} curve",
                        self.order, self.length, self.gtype
                    )));
                }
                if self.knots.is_some() || self.periodic {
                    return Err(CagdError::invalid("only B-spline curves carry knots"));
                }
            }
            GeomType::BSpline => {
                if self.order > self.length {
                    return Err(CagdError::WrongOrder(format!(
                        "order {} exceeds length {}",
                        self.order, self.length
                    )));
                }
                let kv = self.knots.as_deref().ok_or_else(|| CagdError::knots("missing"))?;
                knots::validate(kv, self.float_length(), self.order)?;
            }
        }
        Ok(())
    }

    /// Control points as rows, one per point, weight first if rational.
    pub(crate) fn rows(&self) -> Rows {
        to_rows(&self.points, self.ptype, self.length)
    }

    /// Control point `i` in the `[W, X, Y, ...]` layout; `W = 1` if non-rational.
    pub fn ctl_point(&self, i: usize) -> Vec<f64> {
        let mut p = vec![1.0; self.ptype.dim() + 1];
        for c in self.ptype.coords() {
            p[c] = self.points[c][i];
        }
        p
    }

    /// Euclidean control point `i` (weight divided out).
    pub fn ctl_point_e(&self, i: usize) -> Vec<f64> {
        let p = self.ctl_point(i);
        p[1..].iter().map(|x| x / p[0]).collect()
    }

    /// Whether the curve is rational.
    pub fn is_rational(&self) -> bool {
        self.ptype.is_rational()
    }

    /// Knot vector, or the implicit Bezier knot vector.
    pub fn knot_vector(&self) -> Vec<f64> {
        match &self.knots {
            Some(kv) => kv.clone(),
            None => knots::bezier_knots(self.order),
        }
    }

    /// Number of control points once periodic wrapping is unrolled.
    pub(crate) fn float_length(&self) -> usize {
        if self.periodic {
            self.length + self.order - 1
        } else {
            self.length
        }
    }

    /// Whether both end conditions are open (always true off B-spline).
    pub fn has_open_ec(&self) -> bool {
        match (&self.knots, self.periodic) {
            (Some(kv), false) => knots::has_open_ec(kv, self.order),
            (Some(_), true) => false,
            (None, _) => true,
        }
    }

    // =========================================================================
    // Representation changes
    // =========================================================================

    /// Unroll a periodic B-spline into a floating one with the same image.
    pub fn to_float(&self) -> Curve {
        if !self.periodic {
            return self.clone();
        }
        let mut rows = self.rows();
        let wrap: Vec<_> = rows[..self.order - 1].to_vec();
        rows.extend(wrap);
        log::trace!("periodic curve of length {} unrolled to {}", self.length, rows.len());
        Curve::from_parts(GeomType::BSpline, self.ptype, self.order, &rows, self.knots.clone())
    }

    /// Same curve with unit weights added if it is not rational yet.
    pub fn coerce_to_rational(&self) -> Curve {
        if self.is_rational() {
            return self.clone();
        }
        let mut crv = self.clone();
        crv.ptype = self.ptype.to_rational();
        crv.points[0] = vec![1.0; self.length];
        crv
    }

    /// Convert to B-spline form. Bezier curves get knots `[0,..,0,1,..,1]`.
    pub fn to_bspline(&self) -> Result<Curve> {
        match self.gtype {
            GeomType::BSpline => Ok(self.clone()),
            GeomType::Bezier => {
                let mut crv = self.clone();
                crv.gtype = GeomType::BSpline;
                crv.knots = Some(knots::bezier_knots(self.order));
                Ok(crv)
            }
            GeomType::Power => self.to_bezier()?.to_bspline(),
        }
    }

    /// Convert to Bezier form.
    ///
    /// B-spline input must consist of a single polynomial segment; its
    /// parametric domain is dropped in favour of `[0, 1]`.
    pub fn to_bezier(&self) -> Result<Curve> {
        match self.gtype {
            GeomType::Bezier => Ok(self.clone()),
            GeomType::Power => Ok(Curve::from_parts(
                GeomType::Bezier,
                self.ptype,
                self.order,
                &power_to_bezier(&self.rows()),
                None,
            )),
            GeomType::BSpline => {
                let crv = self.to_float();
                let kv = crv.knot_vector();
                if crv.length != crv.order || !knots::has_open_ec(&kv, crv.order) {
                    let open = crate::region::open_ends(&crv)?;
                    if open.length != open.order {
                        return Err(CagdError::BsplineNoSupport(
                            "conversion of a multi-segment curve to Bezier",
                        ));
                    }
                    return open.to_bezier();
                }
                let mut out = crv;
                out.gtype = GeomType::Bezier;
                out.knots = None;
                Ok(out)
            }
        }
    }

    /// Convert to power basis form.
    pub fn to_power(&self) -> Result<Curve> {
        if self.gtype == GeomType::Power {
            return Ok(self.clone());
        }
        let bzr = self.to_bezier()?;
        Ok(Curve::from_parts(
            GeomType::Power,
            self.ptype,
            bzr.order,
            &bezier_to_power(&bzr.rows()),
            None,
        ))
    }

    /// Split a B-spline into its Bezier segments, each with its parameter interval.
    pub fn bezier_segments(&self) -> Result<Vec<(f64, f64, Curve)>> {
        if self.gtype != GeomType::BSpline {
            return Ok(vec![(0.0, 1.0, self.to_bezier()?)]);
        }
        let open = crate::region::open_ends(&self.to_float())?;
        let k = open.order;
        let (rows, kv) = crate::basis::bspline::decompose(&open.rows(), open.knot_vector(), k);
        let segments = rows
            .chunks(k)
            .enumerate()
            .map(|(i, seg)| {
                let crv = Curve::from_parts(GeomType::Bezier, self.ptype, k, seg, None);
                (kv[i * k], kv[(i + 1) * k], crv)
            })
            .collect();
        Ok(segments)
    }
}

/// Bezier coefficients of a power basis polynomial.
///
/// `b_j = sum_{i <= j} C(j, i) / C(n, i) * a_i`.
pub(crate) fn power_to_bezier(coefs: &[Vec<f64>]) -> Rows {
    let n = coefs.len() - 1;
    (0..=n)
        .map(|j| {
            let mut b = vec![0.0; coefs[0].len()];
            for (i, a) in coefs.iter().enumerate().take(j + 1) {
                crate::types::add_scaled(&mut b, a, binomial(j, i) / binomial(n, i));
            }
            b
        })
        .collect()
}

/// Power basis coefficients of a Bezier polynomial.
///
/// `a_i = C(n, i) * sum_{j <= i} (-1)^(i-j) C(i, j) b_j`.
pub(crate) fn bezier_to_power(ctl: &[Vec<f64>]) -> Rows {
    let n = ctl.len() - 1;
    (0..=n)
        .map(|i| {
            let mut a = vec![0.0; ctl[0].len()];
            for (j, b) in ctl.iter().enumerate().take(i + 1) {
                let sign = if (i - j) % 2 == 0 { 1.0 } else { -1.0 };
                crate::types::add_scaled(&mut a, b, sign * binomial(n, i) * binomial(i, j));
            }
            a
        })
        .collect()
}
