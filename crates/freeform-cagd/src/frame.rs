//! Tangent, normal and binormal vectors of curves and surfaces.

use crate::curve::Curve;
use crate::error::Result;
use crate::surface::Surface;
use crate::types::SrfDir;
use freeform_math::{Vec3, UEPS};

/// First three Euclidean coordinates of a `[W, X, Y, ...]` vector, padded with zeros.
fn xyz(p: &[f64]) -> Vec3 {
    let c = |i: usize| p.get(i).copied().unwrap_or(0.0);
    Vec3::new(c(1), c(2), c(3))
}

fn maybe_normalize(v: Vec3, normalize: bool) -> Vec3 {
    let n = v.norm();
    if normalize && n > UEPS {
        v / n
    } else {
        v
    }
}

/// Homogeneous value and derivatives of `crv` at `t`, in `[W, X, ...]` layout.
///
/// Non-rational curves get `W = 1` and zero weight derivatives.
fn homogeneous_derivatives(crv: &Curve, t: f64, count: usize) -> Result<Vec<Vec<f64>>> {
    let mut out = vec![crv.eval(t)?];
    let mut d = crv.clone();
    for _ in 0..count {
        d = d.derive_scalar()?;
        let mut v = d.eval(t)?;
        if !crv.is_rational() {
            v[0] = 0.0;
        }
        out.push(v);
    }
    Ok(out)
}

/// Euclidean position, velocity and acceleration from homogeneous derivatives.
fn euclidean(h: &[Vec<f64>]) -> (Vec3, Vec3, Vec3) {
    let w = h[0][0];
    let x = xyz(&h[0]) / w;
    let (w1, x1) = (h[1][0], xyz(&h[1]));
    let v = (x1 - x * w1) / w;
    let a = match h.get(2) {
        Some(h2) => (xyz(h2) - v * (2.0 * w1) - x * h2[0]) / w,
        None => Vec3::zeros(),
    };
    (x, v, a)
}

impl Curve {
    /// Tangent (velocity) vector at `t`.
    pub fn tangent(&self, t: f64, normalize: bool) -> Result<Vec3> {
        let (_, v, _) = euclidean(&homogeneous_derivatives(self, t, 1)?);
        Ok(maybe_normalize(v, normalize))
    }

    /// Binormal `T x C''` at `t`.
    pub fn binormal(&self, t: f64, normalize: bool) -> Result<Vec3> {
        let (_, v, a) = euclidean(&homogeneous_derivatives(self, t, 2)?);
        Ok(maybe_normalize(v.cross(&a), normalize))
    }

    /// Principal normal `B x T` at `t`.
    pub fn normal(&self, t: f64, normalize: bool) -> Result<Vec3> {
        let (_, v, a) = euclidean(&homogeneous_derivatives(self, t, 2)?);
        Ok(maybe_normalize(v.cross(&a).cross(&v), normalize))
    }

    /// Planar normal: the tangent rotated by `(x, y) -> (y, -x)`.
    ///
    /// Unlike [`Curve::normal`] this stays continuous through inflections.
    pub fn normal_xy(&self, t: f64, normalize: bool) -> Result<Vec3> {
        let tan = self.tangent(t, false)?;
        Ok(maybe_normalize(Vec3::new(tan.y, -tan.x, 0.0), normalize))
    }
}

impl Surface {
    /// Homogeneous value and first partial along `dir` at `(u, v)`.
    fn partial(&self, u: f64, v: f64, dir: SrfDir) -> Result<Vec3> {
        let p = self.eval(u, v)?;
        let mut d = self.derive_scalar(dir)?.eval(u, v)?;
        if !self.is_rational() {
            d[0] = 0.0;
        }
        let x = xyz(&p) / p[0];
        Ok((xyz(&d) - x * d[0]) / p[0])
    }

    /// Partial derivative along `dir` at `(u, v)`.
    pub fn tangent(&self, u: f64, v: f64, dir: SrfDir, normalize: bool) -> Result<Vec3> {
        Ok(maybe_normalize(self.partial(u, v, dir)?, normalize))
    }

    /// Surface normal `S_u x S_v` at `(u, v)`.
    pub fn normal(&self, u: f64, v: f64, normalize: bool) -> Result<Vec3> {
        let su = self.partial(u, v, SrfDir::U)?;
        let sv = self.partial(u, v, SrfDir::V)?;
        Ok(maybe_normalize(su.cross(&sv), normalize))
    }
}
