//! Tensor product surfaces.
//!
//! Surface operations in one direction are carried out strip by strip: every
//! row (for U) or column (for V) of the control mesh is treated as a curve,
//! the curve operation runs on each, and the mesh is reassembled. This keeps
//! the basis dispatch in one place ([`crate::dispatch`]).

use crate::curve::Curve;
use crate::error::{CagdError, Result};
use crate::knots;
use crate::types::{from_rows, GeomType, PointType, Rows, SrfDir};
use freeform_math::{apx_eq, Tolerance, KNOT_EPS};
use serde::{Deserialize, Serialize};

/// A tensor product surface in Bezier, B-spline or power basis.
///
/// `points[c][row * u_length + col]` is coordinate `c` of the control point
/// in V-row `row` and U-column `col`. Index 0 holds the weight and is empty
/// for non-rational surfaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSurface")]
pub struct Surface {
    /// Basis type.
    pub gtype: GeomType,
    /// Point type of the control points.
    pub ptype: PointType,
    /// Order in U.
    pub u_order: usize,
    /// Order in V.
    pub v_order: usize,
    /// Number of control points in U.
    pub u_length: usize,
    /// Number of control points in V.
    pub v_length: usize,
    /// Periodic in U.
    #[serde(default)]
    pub u_periodic: bool,
    /// Periodic in V.
    #[serde(default)]
    pub v_periodic: bool,
    /// Coordinate arrays, weight first.
    pub points: Vec<Vec<f64>>,
    /// U knot vector, B-spline only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub u_knots: Option<Vec<f64>>,
    /// V knot vector, B-spline only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v_knots: Option<Vec<f64>>,
}

/// Serialized surface, validated before it becomes a [`Surface`].
#[derive(Deserialize)]
struct RawSurface {
    gtype: String,
    ptype: PointType,
    u_order: usize,
    v_order: usize,
    u_length: usize,
    v_length: usize,
    #[serde(default)]
    u_periodic: bool,
    #[serde(default)]
    v_periodic: bool,
    points: Vec<Vec<f64>>,
    #[serde(default)]
    u_knots: Option<Vec<f64>>,
    #[serde(default)]
    v_knots: Option<Vec<f64>>,
}

impl TryFrom<RawSurface> for Surface {
    type Error = CagdError;

    fn try_from(raw: RawSurface) -> Result<Self> {
        let srf = Self {
            gtype: GeomType::from_tag(&raw.gtype).ok_or(CagdError::UndefSrf)?,
            ptype: raw.ptype,
            u_order: raw.u_order,
            v_order: raw.v_order,
            u_length: raw.u_length,
            v_length: raw.v_length,
            u_periodic: raw.u_periodic,
            v_periodic: raw.v_periodic,
            points: raw.points,
            u_knots: raw.u_knots,
            v_knots: raw.v_knots,
        };
        srf.validate()?;
        Ok(srf)
    }
}

/// Order, length, knots and periodicity of one direction.
#[derive(Debug, Clone)]
struct DirAttrs {
    order: usize,
    length: usize,
    knots: Option<Vec<f64>>,
    periodic: bool,
}

impl Surface {
    /// Bezier surface from a row-major grid of control points
    /// (`u_length` points per row, weight first if rational).
    pub fn bezier(ptype: PointType, u_length: usize, v_length: usize, ctl: &[Vec<f64>]) -> Result<Self> {
        let srf = Self::from_parts(
            GeomType::Bezier,
            ptype,
            (u_length, v_length),
            (u_length, v_length),
            ctl,
            (None, None),
        );
        srf.validate()?;
        Ok(srf)
    }

    /// B-spline surface from a row-major grid and both knot vectors.
    pub fn bspline(
        ptype: PointType,
        (u_order, v_order): (usize, usize),
        (u_length, v_length): (usize, usize),
        ctl: &[Vec<f64>],
        u_knots: Vec<f64>,
        v_knots: Vec<f64>,
    ) -> Result<Self> {
        let srf = Self::from_parts(
            GeomType::BSpline,
            ptype,
            (u_order, v_order),
            (u_length, v_length),
            ctl,
            (Some(u_knots), Some(v_knots)),
        );
        srf.validate()?;
        Ok(srf)
    }

    /// Power basis surface from a row-major grid of coefficients.
    pub fn power(ptype: PointType, u_length: usize, v_length: usize, ctl: &[Vec<f64>]) -> Result<Self> {
        let srf = Self::from_parts(
            GeomType::Power,
            ptype,
            (u_length, v_length),
            (u_length, v_length),
            ctl,
            (None, None),
        );
        srf.validate()?;
        Ok(srf)
    }

    pub(crate) fn from_parts(
        gtype: GeomType,
        ptype: PointType,
        (u_order, v_order): (usize, usize),
        (u_length, v_length): (usize, usize),
        rows: &[Vec<f64>],
        (u_knots, v_knots): (Option<Vec<f64>>, Option<Vec<f64>>),
    ) -> Self {
        Self {
            gtype,
            ptype,
            u_order,
            v_order,
            u_length,
            v_length,
            u_periodic: false,
            v_periodic: false,
            points: from_rows(rows, ptype),
            u_knots,
            v_knots,
        }
    }

    /// Check the data model invariants in both directions.
    pub fn validate(&self) -> Result<()> {
        let size = self.u_length * self.v_length;
        if self.points.len() != self.ptype.dim() + 1
            || self.points[0].is_empty() == self.ptype.is_rational()
            || self.ptype.coords().any(|c| self.points[c].len() != size)
        {
            return Err(CagdError::invalid(format!(
                "control mesh does not hold {} x {} points of type {:?}",
                self.u_length, self.v_length, self.ptype
            )));
        }
        for dir in [SrfDir::U, SrfDir::V] {
            self.strip_curve(dir, &vec![vec![0.0; self.ptype.num_coords()]; self.dir_length(dir)])
                .validate()?;
        }
        Ok(())
    }

    /// Whether the surface is rational.
    pub fn is_rational(&self) -> bool {
        self.ptype.is_rational()
    }

    /// Number of control points along `dir`.
    pub fn dir_length(&self, dir: SrfDir) -> usize {
        match dir {
            SrfDir::U => self.u_length,
            SrfDir::V => self.v_length,
        }
    }

    /// Order along `dir`.
    pub fn dir_order(&self, dir: SrfDir) -> usize {
        match dir {
            SrfDir::U => self.u_order,
            SrfDir::V => self.v_order,
        }
    }

    /// Knot vector along `dir`, or the implicit Bezier one.
    pub fn dir_knots(&self, dir: SrfDir) -> Vec<f64> {
        let kv = match dir {
            SrfDir::U => &self.u_knots,
            SrfDir::V => &self.v_knots,
        };
        kv.clone().unwrap_or_else(|| knots::bezier_knots(self.dir_order(dir)))
    }

    fn attrs(&self, dir: SrfDir) -> DirAttrs {
        match dir {
            SrfDir::U => DirAttrs {
                order: self.u_order,
                length: self.u_length,
                knots: self.u_knots.clone(),
                periodic: self.u_periodic,
            },
            SrfDir::V => DirAttrs {
                order: self.v_order,
                length: self.v_length,
                knots: self.v_knots.clone(),
                periodic: self.v_periodic,
            },
        }
    }

    /// Stored coordinates of mesh point `(col, row)`.
    pub(crate) fn mesh_point(&self, col: usize, row: usize) -> Vec<f64> {
        let idx = row * self.u_length + col;
        self.ptype.coords().map(|c| self.points[c][idx]).collect()
    }

    // =========================================================================
    // Strips
    // =========================================================================

    /// A curve carrying the basis attributes of direction `dir` and the given rows.
    pub(crate) fn strip_curve(&self, dir: SrfDir, rows: &[Vec<f64>]) -> Curve {
        let a = self.attrs(dir);
        let mut crv = Curve::from_parts(self.gtype, self.ptype, a.order, rows, a.knots);
        crv.periodic = a.periodic;
        crv
    }

    /// Control mesh rows (U) or columns (V) as curves along `dir`.
    pub(crate) fn strips(&self, dir: SrfDir) -> Vec<Curve> {
        match dir {
            SrfDir::U => (0..self.v_length)
                .map(|row| {
                    let rows: Rows = (0..self.u_length).map(|col| self.mesh_point(col, row)).collect();
                    self.strip_curve(SrfDir::U, &rows)
                })
                .collect(),
            SrfDir::V => (0..self.u_length)
                .map(|col| {
                    let rows: Rows = (0..self.v_length).map(|row| self.mesh_point(col, row)).collect();
                    self.strip_curve(SrfDir::V, &rows)
                })
                .collect(),
        }
    }

    /// Reassemble a surface from strips produced by [`Surface::strips`].
    ///
    /// The direction `dir` takes its attributes from the strips, the other
    /// direction keeps this surface's. A B-spline strip forces the whole
    /// surface into B-spline form.
    pub(crate) fn from_strips(&self, dir: SrfDir, strips: &[Curve]) -> Result<Surface> {
        let first = strips.first().ok_or_else(|| CagdError::invalid("no strips"))?;
        if strips
            .iter()
            .any(|s| s.length != first.length || s.ptype != first.ptype || s.order != first.order)
        {
            return Err(CagdError::invalid("strips differ in layout"));
        }
        let bspline = first.gtype == GeomType::BSpline || self.gtype == GeomType::BSpline;
        let gtype = if bspline { GeomType::BSpline } else { first.gtype };
        let along = DirAttrs {
            order: first.order,
            length: first.length,
            knots: bspline.then(|| first.knot_vector()),
            periodic: first.periodic,
        };
        let mut across = self.attrs(dir.other());
        across.length = strips.len();
        if bspline && across.knots.is_none() {
            across.knots = Some(knots::bezier_knots(across.order));
        }
        let (ua, va) = match dir {
            SrfDir::U => (along, across),
            SrfDir::V => (across, along),
        };

        let ptype = first.ptype;
        let mut rows: Rows = vec![Vec::new(); ua.length * va.length];
        for (s, strip) in strips.iter().enumerate() {
            for (i, r) in strip.rows().into_iter().enumerate() {
                let (col, row) = match dir {
                    SrfDir::U => (i, s),
                    SrfDir::V => (s, i),
                };
                rows[row * ua.length + col] = r;
            }
        }
        let mut srf = Surface::from_parts(
            gtype,
            ptype,
            (ua.order, va.order),
            (ua.length, va.length),
            &rows,
            (ua.knots, va.knots),
        );
        srf.u_periodic = ua.periodic;
        srf.v_periodic = va.periodic;
        Ok(srf)
    }

    /// Apply a curve operation to every strip along `dir`.
    pub(crate) fn map_strips<F>(&self, dir: SrfDir, f: F) -> Result<Surface>
    where
        F: Fn(&Curve) -> Result<Curve>,
    {
        let strips = self
            .strips(dir)
            .iter()
            .map(f)
            .collect::<Result<Vec<_>>>()?;
        self.from_strips(dir, &strips)
    }

    // =========================================================================
    // Representation changes
    // =========================================================================

    /// Convert to B-spline form.
    pub fn to_bspline(&self) -> Result<Surface> {
        match self.gtype {
            GeomType::BSpline => Ok(self.clone()),
            GeomType::Bezier => self.map_strips(SrfDir::U, Curve::to_bspline),
            GeomType::Power => self.to_bezier()?.to_bspline(),
        }
    }

    /// Convert to Bezier form. B-splines must be a single patch.
    pub fn to_bezier(&self) -> Result<Surface> {
        match self.gtype {
            GeomType::Bezier => Ok(self.clone()),
            GeomType::Power => {
                let mut srf = self.map_strips(SrfDir::U, Curve::to_bezier)?;
                // V still holds power coefficients.
                srf.gtype = GeomType::Power;
                srf.map_strips(SrfDir::V, Curve::to_bezier)
            }
            GeomType::BSpline => {
                let mut srf = self
                    .map_strips(SrfDir::U, Curve::to_bezier)?
                    .map_strips(SrfDir::V, Curve::to_bezier)?;
                srf.gtype = GeomType::Bezier;
                srf.u_knots = None;
                srf.v_knots = None;
                srf.u_periodic = false;
                srf.v_periodic = false;
                Ok(srf)
            }
        }
    }

    /// Convert to power basis form.
    pub fn to_power(&self) -> Result<Surface> {
        if self.gtype == GeomType::Power {
            return Ok(self.clone());
        }
        let mut srf = self.to_bezier()?.map_strips(SrfDir::U, Curve::to_power)?;
        // V still holds Bezier coefficients.
        srf.gtype = GeomType::Bezier;
        srf.map_strips(SrfDir::V, Curve::to_power)
    }

    /// Same surface with unit weights added if it is not rational yet.
    pub fn coerce_to_rational(&self) -> Surface {
        if self.is_rational() {
            return self.clone();
        }
        let mut srf = self.clone();
        srf.ptype = self.ptype.to_rational();
        srf.points[0] = vec![1.0; self.u_length * self.v_length];
        srf
    }

    /// Unroll periodic directions into floating ones with the same image.
    pub fn to_float(&self) -> Result<Surface> {
        let mut srf = self.clone();
        if srf.u_periodic {
            srf = srf.map_strips(SrfDir::U, |c| Ok(c.to_float()))?;
        }
        if srf.v_periodic {
            srf = srf.map_strips(SrfDir::V, |c| Ok(c.to_float()))?;
        }
        Ok(srf)
    }

    // =========================================================================
    // Dispatched operations
    // =========================================================================

    /// Parametric domain along `dir`.
    pub fn dir_domain(&self, dir: SrfDir) -> (f64, f64) {
        let a = self.attrs(dir);
        match (self.gtype, a.knots) {
            (GeomType::BSpline, Some(kv)) => {
                let len = if a.periodic { a.length + a.order - 1 } else { a.length };
                knots::domain(&kv, a.order, len)
            }
            _ => (0.0, 1.0),
        }
    }

    /// Parametric domain `(u_min, u_max, v_min, v_max)`.
    pub fn domain(&self) -> (f64, f64, f64, f64) {
        let (u0, u1) = self.dir_domain(SrfDir::U);
        let (v0, v1) = self.dir_domain(SrfDir::V);
        (u0, u1, v0, v1)
    }

    /// Rewrite the parametric domain in place, promoting to B-spline unless
    /// the request is the unit square.
    pub fn set_domain(&mut self, u_min: f64, u_max: f64, v_min: f64, v_max: f64) -> Result<()> {
        let unit = [u_min, v_min].iter().all(|&x| apx_eq(x, 0.0, KNOT_EPS))
            && [u_max, v_max].iter().all(|&x| apx_eq(x, 1.0, KNOT_EPS));
        if self.gtype != GeomType::BSpline && unit {
            return Ok(());
        }
        if u_min >= u_max || v_min >= v_max {
            return Err(CagdError::invalid("empty surface domain"));
        }
        let mut srf = self.to_bspline()?;
        let (u0, u1, v0, v1) = srf.domain();
        let mut ukv = srf.dir_knots(SrfDir::U);
        let mut vkv = srf.dir_knots(SrfDir::V);
        knots::affine_map(&mut ukv, (u0, u1), u_min, u_max);
        knots::affine_map(&mut vkv, (v0, v1), v_min, v_max);
        srf.u_knots = Some(ukv);
        srf.v_knots = Some(vkv);
        *self = srf;
        Ok(())
    }

    /// Evaluate at `(u, v)`, returning `[W, X, Y, ...]` with `W = 1` when non-rational.
    pub fn eval(&self, u: f64, v: f64) -> Result<Vec<f64>> {
        let rows = self
            .strips(SrfDir::U)
            .iter()
            .map(|s| s.eval_stored(u))
            .collect::<Result<Rows>>()?;
        self.strip_curve(SrfDir::V, &rows).eval(v)
    }

    /// Evaluate the Euclidean point at `(u, v)`.
    pub fn eval_e(&self, u: f64, v: f64) -> Result<Vec<f64>> {
        let p = self.eval(u, v)?;
        Ok(p[1..].iter().map(|x| x / p[0]).collect())
    }

    /// Differentiate every stored coefficient along `dir`.
    pub fn derive_scalar(&self, dir: SrfDir) -> Result<Surface> {
        self.map_strips(dir, Curve::derive_scalar)
    }

    /// Euclidean partial derivative along `dir`. Not defined for rational surfaces.
    pub fn derive(&self, dir: SrfDir) -> Result<Surface> {
        if self.is_rational() {
            return Err(CagdError::RationalNoSupport("Euclidean surface derivative"));
        }
        self.derive_scalar(dir)
    }

    /// Split at `t` along `dir` into the pieces before and after it.
    pub fn subdiv_at_param(&self, t: f64, dir: SrfDir) -> Result<(Surface, Surface)> {
        self.subdiv_at_param_with(t, dir, &Tolerance::DEFAULT)
    }

    /// [`Surface::subdiv_at_param`] with explicit domain and knot tolerances.
    pub fn subdiv_at_param_with(&self, t: f64, dir: SrfDir, tol: &Tolerance) -> Result<(Surface, Surface)> {
        let mut left = Vec::new();
        let mut right = Vec::new();
        for strip in self.strips(dir) {
            let (l, r) = strip.subdiv_at_param_with(t, tol)?;
            left.push(l);
            right.push(r);
        }
        Ok((self.from_strips(dir, &left)?, self.from_strips(dir, &right)?))
    }

    /// Insert knots along `dir`, or replace that knot vector when `replace` is set.
    pub fn refine_at_params(&self, dir: SrfDir, replace: bool, knots: &[f64]) -> Result<Surface> {
        self.map_strips(dir, |c| c.refine_at_params(replace, knots))
    }

    /// Raise the order along `dir` by one.
    pub fn degree_raise(&self, dir: SrfDir) -> Result<Surface> {
        self.degree_raise_n(dir, self.dir_order(dir) + 1)
    }

    /// Raise the order along `dir` to `order`.
    pub fn degree_raise_n(&self, dir: SrfDir, order: usize) -> Result<Surface> {
        self.map_strips(dir, |c| c.degree_raise_n(order))
    }

    /// Moebius reparametrization along `dir`.
    ///
    /// `c == 0` uses the geometric mean of the per-strip equalizing ratios.
    pub fn moebius(&self, c: f64, dir: SrfDir) -> Result<Surface> {
        let c = if c == 0.0 {
            let strips = self.coerce_to_rational().strips(dir);
            let n = self.dir_length(dir) - 1;
            let mut log_sum = 0.0;
            for s in &strips {
                let w = &s.points[0];
                log_sum += crate::basis::moebius_equalizing_ratio(w[0], w[w.len() - 1], n)?.ln();
            }
            (log_sum / strips.len() as f64).exp()
        } else {
            c
        };
        self.map_strips(dir, |s| s.moebius(c))
    }

    /// Reverse the U direction.
    pub fn reverse(&self) -> Result<Surface> {
        self.reverse_dir(SrfDir::U)
    }

    /// Reverse the parametrization along `dir`.
    pub fn reverse_dir(&self, dir: SrfDir) -> Result<Surface> {
        self.map_strips(dir, Curve::reverse)
    }

    /// Swap the roles of U and V, transposing the control mesh.
    pub fn reverse2(&self) -> Surface {
        let mut rows: Rows = Vec::with_capacity(self.u_length * self.v_length);
        for col in 0..self.u_length {
            for row in 0..self.v_length {
                rows.push(self.mesh_point(col, row));
            }
        }
        let mut srf = Surface::from_parts(
            self.gtype,
            self.ptype,
            (self.v_order, self.u_order),
            (self.v_length, self.u_length),
            &rows,
            (self.v_knots.clone(), self.u_knots.clone()),
        );
        srf.u_periodic = self.v_periodic;
        srf.v_periodic = self.u_periodic;
        srf
    }
}
