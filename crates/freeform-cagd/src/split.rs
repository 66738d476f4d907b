//! Splitting a curve at many parameters at once.

use crate::curve::Curve;
use crate::error::{CagdError, Result};
use crate::types::GeomType;
use freeform_math::Tolerance;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Status bits reporting split parameters that were dropped for being too
/// close to the domain ends or to each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Proximity(u8);

impl Proximity {
    /// No parameter was dropped.
    pub const NONE: Self = Self(0);
    /// The first parameter collapsed onto the domain start.
    pub const NEAR_MIN: Self = Self(0x01);
    /// A parameter reached the domain end; the scan stopped there.
    pub const NEAR_MAX: Self = Self(0x02);
    /// An interior parameter collapsed onto the previous split.
    pub const COLLAPSED: Self = Self(0x04);

    /// Raw bit field.
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Whether every bit of `other` is set.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether no bit is set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Proximity {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Proximity {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for Proximity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#05b}", self.0)
    }
}

impl Curve {
    /// Split at every parameter of the ascending list `params`.
    ///
    /// Returns the fragments in domain order together with the proximity
    /// bits. Bezier curves are promoted to B-splines so that every split is
    /// expressed in the original parametrization.
    pub fn subdiv_at_params(&self, params: &[f64], eps: f64) -> Result<(Vec<Curve>, Proximity)> {
        self.subdiv_at_params_with(params, eps, &Tolerance::DEFAULT)
    }

    /// [`Curve::subdiv_at_params`] with explicit domain and knot tolerances.
    ///
    /// A parameter counts as touching a domain end or the previous split
    /// when it lies within `eps` of it, or within `tol.knot` when that is
    /// wider, since the subdivision would snap it there anyway.
    pub fn subdiv_at_params_with(
        &self,
        params: &[f64],
        eps: f64,
        tol: &Tolerance,
    ) -> Result<(Vec<Curve>, Proximity)> {
        let mut work = match self.gtype {
            GeomType::BSpline => self.to_float(),
            GeomType::Bezier => self.to_bspline()?,
            GeomType::Power => return Err(CagdError::PowerNoSupport("subdivision at many parameters")),
        };
        let (tmin, tmax) = work.domain();
        let near = eps.max(tol.knot);
        let mut t = tmin;
        let mut prox = Proximity::NONE;
        let mut pieces = Vec::with_capacity(params.len() + 1);

        for &v in params {
            if v >= tmax || tmax - v < near {
                prox |= Proximity::NEAR_MAX;
                break;
            }
            if (v - t).abs() < near {
                prox |= if pieces.is_empty() {
                    Proximity::NEAR_MIN
                } else {
                    Proximity::COLLAPSED
                };
            } else if v > t {
                let (left, right) = work.subdiv_at_param_with(v, tol)?;
                pieces.push(left);
                work = right;
                t = v;
            } else {
                log::warn!("split parameter {v} is below the previous split {t}, ignored");
            }
        }
        pieces.push(work);

        if !prox.is_empty() {
            log::debug!("split into {} pieces with proximity {prox}", pieces.len());
        }
        Ok((pieces, prox))
    }

    /// Split at parameters taken from coordinate `axis` of unordered points.
    ///
    /// Parameters are sorted first and values within `eps` of an earlier one
    /// are merged.
    pub fn subdiv_at_params2(&self, pts: &[Vec<f64>], axis: usize, eps: f64) -> Result<(Vec<Curve>, Proximity)> {
        self.subdiv_at_params2_with(pts, axis, eps, &Tolerance::DEFAULT)
    }

    /// [`Curve::subdiv_at_params2`] with explicit domain and knot tolerances.
    pub fn subdiv_at_params2_with(
        &self,
        pts: &[Vec<f64>],
        axis: usize,
        eps: f64,
        tol: &Tolerance,
    ) -> Result<(Vec<Curve>, Proximity)> {
        let mut params = Vec::with_capacity(pts.len());
        for p in pts {
            let v = *p.get(axis).ok_or_else(|| {
                CagdError::WrongSize(format!("point of {} coordinates has no axis {axis}", p.len()))
            })?;
            insert_sorted(&mut params, v, eps);
        }
        self.subdiv_at_params_with(&params, eps, tol)
    }
}

/// Insert `v` into the ascending list unless a value within `eps` is present.
fn insert_sorted(list: &mut Vec<f64>, v: f64, eps: f64) {
    let pos = list.partition_point(|&x| x < v);
    let near = |i: usize| list.get(i).is_some_and(|&x| (x - v).abs() < eps);
    if near(pos) || (pos > 0 && near(pos - 1)) {
        return;
    }
    list.insert(pos, v);
}
