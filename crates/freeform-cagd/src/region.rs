//! Sub-curve and sub-surface extraction.

use crate::curve::Curve;
use crate::error::{CagdError, Result};
use crate::knots;
use crate::surface::Surface;
use crate::types::{GeomType, SrfDir};
use freeform_math::{apx_eq, Tolerance};

/// Clip a B-spline to open end conditions without changing its image over
/// the domain. Open or non-B-spline curves come back as plain copies.
pub(crate) fn open_ends(crv: &Curve) -> Result<Curve> {
    if crv.gtype != GeomType::BSpline || crv.has_open_ec() {
        return Ok(crv.clone());
    }
    let mut out = crv.to_float();
    let (min, max) = out.domain();
    if !knots::has_open_start(&out.knot_vector(), out.order) {
        out = out.subdiv_at_param(min)?.1;
    }
    if !knots::has_open_end(&out.knot_vector(), out.order) {
        out = out.subdiv_at_param(max)?.0;
    }
    Ok(out)
}

fn ordered(t1: f64, t2: f64) -> (f64, f64) {
    if t1 > t2 {
        (t2, t1)
    } else {
        (t1, t2)
    }
}

/// Reject bounds outside the domain by more than `tol.param`, then clamp.
fn verify_range(t1: f64, t2: f64, (min, max): (f64, f64), tol: &Tolerance) -> Result<(f64, f64)> {
    for t in [t1, t2] {
        if !tol.in_domain(t, min, max) {
            return Err(CagdError::domain(t, (min, max)));
        }
    }
    Ok((t1.clamp(min, max), t2.clamp(min, max)))
}

impl Curve {
    /// Same curve with open end conditions.
    pub fn open_end(&self) -> Result<Curve> {
        open_ends(self)
    }

    /// The part of the curve over `[t1, t2]`. The bounds may come in either order.
    ///
    /// Bezier curves accept any parameters; other bases must stay inside the
    /// domain. Extracting the full domain of an open curve is a plain copy.
    pub fn region(&self, t1: f64, t2: f64) -> Result<Curve> {
        self.region_with(t1, t2, &Tolerance::DEFAULT)
    }

    /// [`Curve::region`] with explicit domain and knot tolerances.
    ///
    /// Bounds up to `tol.param` outside the domain are clamped onto it, and
    /// bounds within `tol.knot` of an open end need no subdivision there.
    pub fn region_with(&self, t1: f64, t2: f64, tol: &Tolerance) -> Result<Curve> {
        let (mut t1, mut t2) = ordered(t1, t2);
        let (tmin, tmax) = self.domain();
        if self.gtype != GeomType::Bezier {
            (t1, t2) = verify_range(t1, t2, (tmin, tmax), tol)?;
        }
        let open = self.has_open_ec();
        let at_min = open && apx_eq(t1, tmin, tol.knot);
        let at_max = open && apx_eq(t2, tmax, tol.knot);
        if at_min && at_max {
            log::debug!("region [{t1}, {t2}] covers the whole domain, copying");
            return Ok(self.clone());
        }

        let mut crv = self.to_float();
        if !at_min {
            crv = crv.subdiv_at_param_with(t1, tol)?.1;
        }
        if !at_max {
            if self.gtype == GeomType::BSpline || at_min {
                crv = crv.subdiv_at_param_with(t2, tol)?.0;
            } else if !apx_eq(tmax, t1, tol.knot) {
                // The right piece was remapped onto [0, 1].
                crv = crv.subdiv_at_param_with((t2 - t1) / (tmax - t1), tol)?.0;
            }
        }
        Ok(crv)
    }
}

impl Surface {
    /// Whether direction `dir` has open end conditions (always true off B-spline).
    pub fn dir_has_open_ec(&self, dir: SrfDir) -> bool {
        if self.gtype != GeomType::BSpline {
            return true;
        }
        let periodic = match dir {
            SrfDir::U => self.u_periodic,
            SrfDir::V => self.v_periodic,
        };
        !periodic && knots::has_open_ec(&self.dir_knots(dir), self.dir_order(dir))
    }

    /// Same surface with open end conditions in both directions.
    pub fn open_end(&self) -> Result<Surface> {
        let mut srf = self.clone();
        for dir in [SrfDir::U, SrfDir::V] {
            if !srf.dir_has_open_ec(dir) {
                srf = srf.map_strips(dir, open_ends)?;
            }
        }
        Ok(srf)
    }

    /// The part of the surface over `[t1, t2]` along `dir`.
    pub fn region(&self, t1: f64, t2: f64, dir: SrfDir) -> Result<Surface> {
        self.region_with(t1, t2, dir, &Tolerance::DEFAULT)
    }

    /// [`Surface::region`] with explicit domain and knot tolerances.
    pub fn region_with(&self, t1: f64, t2: f64, dir: SrfDir, tol: &Tolerance) -> Result<Surface> {
        let (mut t1, mut t2) = ordered(t1, t2);
        let (tmin, tmax) = self.dir_domain(dir);
        if self.gtype != GeomType::Bezier {
            (t1, t2) = verify_range(t1, t2, (tmin, tmax), tol)?;
        }
        let open = self.dir_has_open_ec(dir);
        let at_min = open && apx_eq(t1, tmin, tol.knot);
        let at_max = open && apx_eq(t2, tmax, tol.knot);
        if at_min && at_max {
            log::debug!("surface region [{t1}, {t2}] along {dir:?} covers the whole domain, copying");
            return Ok(self.clone());
        }

        let mut srf = self.to_float()?;
        if !at_min {
            srf = srf.subdiv_at_param_with(t1, dir, tol)?.1;
        }
        if !at_max {
            if self.gtype == GeomType::BSpline || at_min {
                srf = srf.subdiv_at_param_with(t2, dir, tol)?.0;
            } else if !apx_eq(1.0 - t1, 0.0, tol.knot) {
                srf = srf.subdiv_at_param_with(1.0 - (1.0 - t2) / (1.0 - t1), dir, tol)?.0;
            }
        }
        Ok(srf)
    }
}
