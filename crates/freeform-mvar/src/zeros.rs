//! Zero-set solver for systems of scalar multivariate constraints.
//!
//! Subdivision prunes every sub-domain in which some constraint's control
//! coefficients share one sign (the convex hull cannot contain a zero).
//! Surviving boxes below the subdivision tolerance seed Newton-Raphson
//! polishing to the numeric tolerance.

use crate::error::{MvarError, Result};
use crate::mvar::Mvar;
use freeform_cagd::GeomType;
use freeform_math::{solve_min_norm, solve_square, DMat, DVec};
use serde::{Deserialize, Serialize};

/// Tolerances and limits of the numeric solvers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Sub-domains narrower than this stop subdividing.
    pub subdiv_tol: f64,
    /// Residual at which Newton iterations stop.
    pub numeric_tol: f64,
    /// Step length of the curve tracer, in parameter space.
    pub step: f64,
    /// Subdivision depth limit.
    pub max_depth: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            subdiv_tol: 1e-2,
            numeric_tol: 1e-10,
            step: 1e-2,
            max_depth: 40,
        }
    }
}

pub(crate) const NEWTON_ITERATIONS: usize = 30;

/// A constraint system ready for solving, with its Jacobian.
pub(crate) struct System {
    pub(crate) eqs: Vec<Mvar>,
    jac: Vec<Vec<Mvar>>,
    pub(crate) domains: Vec<(f64, f64)>,
}

impl System {
    /// Scalar polynomial B-splines over one shared domain.
    ///
    /// Rational constraints are replaced by their numerators, which vanish
    /// where the constraint does.
    pub(crate) fn new(eqs: &[Mvar]) -> Result<Self> {
        let first = eqs.first().ok_or_else(|| MvarError::incompatible("empty constraint system"))?;
        let domains = first.domains();
        let mut prepared = Vec::with_capacity(eqs.len());
        for eq in eqs {
            if eq.dim() != first.dim() {
                return Err(MvarError::incompatible("constraints differ in dimension"));
            }
            let mut eq = eq.numerator()?;
            if eq.gtype != GeomType::BSpline {
                eq = eq.to_bspline()?;
            }
            if eq.domains() != domains {
                return Err(MvarError::incompatible("constraints differ in domain"));
            }
            prepared.push(eq);
        }
        let jac = prepared
            .iter()
            .map(|e| (0..e.dim()).map(|a| e.derive(a)).collect::<Result<Vec<_>>>())
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            eqs: prepared,
            jac,
            domains,
        })
    }

    pub(crate) fn dim(&self) -> usize {
        self.domains.len()
    }

    pub(crate) fn clamp(&self, x: &mut [f64]) {
        for (v, &(a, b)) in x.iter_mut().zip(&self.domains) {
            *v = v.clamp(a, b);
        }
    }

    /// Constraint values at `x`.
    pub(crate) fn values(&self, x: &[f64]) -> Result<DVec> {
        let f = self
            .eqs
            .iter()
            .map(|e| Ok(e.eval(x)?[1]))
            .collect::<Result<Vec<_>>>()?;
        Ok(DVec::from_vec(f))
    }

    /// Jacobian at `x`, one row per constraint.
    pub(crate) fn jacobian(&self, x: &[f64]) -> Result<DMat> {
        let n = self.dim();
        let mut j = DMat::zeros(self.eqs.len(), n);
        for (r, row) in self.jac.iter().enumerate() {
            for (c, d) in row.iter().enumerate() {
                j[(r, c)] = d.eval(x)?[1];
            }
        }
        Ok(j)
    }

    /// Newton-Raphson from `start`, kept inside the domain.
    ///
    /// Under- and over-determined systems take minimum norm steps. Returns
    /// `None` when the iteration stalls or never reaches `tol`.
    pub(crate) fn polish(&self, start: Vec<f64>, tol: f64) -> Result<Option<Vec<f64>>> {
        let mut x = start;
        for _ in 0..NEWTON_ITERATIONS {
            let f = self.values(&x)?;
            if f.norm() < tol {
                return Ok(Some(x));
            }
            let j = self.jacobian(&x)?;
            let step = if j.is_square() {
                solve_square(j.clone(), &(-&f)).or_else(|| solve_min_norm(j, &(-&f)))
            } else {
                solve_min_norm(j, &(-&f))
            };
            let Some(dx) = step else {
                return Ok(None);
            };
            for (v, d) in x.iter_mut().zip(dx.iter()) {
                *v += d;
            }
            self.clamp(&mut x);
        }
        let f = self.values(&x)?;
        Ok((f.norm() < tol).then_some(x))
    }
}

/// Whether the control coefficients of a scalar exclude zero.
fn excludes_zero(eq: &Mvar) -> bool {
    let (lo, hi) = eq.coef_range(1);
    lo > 0.0 || hi < 0.0
}

/// Add `x` unless a point within `tol` is already present.
pub(crate) fn push_unique(out: &mut Vec<Vec<f64>>, x: Vec<f64>, tol: f64) {
    let near = |p: &Vec<f64>| p.iter().zip(&x).map(|(a, b)| (a - b).powi(2)).sum::<f64>().sqrt() < tol;
    if !out.iter().any(near) {
        out.push(x);
    }
}

/// Isolated common zeros of scalar constraints over their shared domain.
///
/// Needs at least as many constraints as parameters; see
/// [`solve_on_slices`] for systems with a positive dimensional zero set.
pub fn solve_zeros(eqs: &[Mvar], cfg: &SolverConfig) -> Result<Vec<Vec<f64>>> {
    let system = System::new(eqs)?;
    let dim = system.dim();
    if system.eqs.len() < dim {
        return Err(MvarError::incompatible(format!(
            "{} constraints in {dim} unknowns have no isolated zeros",
            system.eqs.len()
        )));
    }

    let mut zeros = Vec::new();
    let mut visited = 0usize;
    let mut stack = vec![(system.eqs.clone(), 0usize)];
    while let Some((part, depth)) = stack.pop() {
        visited += 1;
        if part.iter().any(excludes_zero) {
            continue;
        }
        let domains = part[0].domains();
        let (axis, width) = domains
            .iter()
            .map(|(a, b)| b - a)
            .enumerate()
            .fold((0, 0.0), |best, (i, w)| if w > best.1 { (i, w) } else { best });

        if width < cfg.subdiv_tol || depth >= cfg.max_depth {
            let center = domains.iter().map(|(a, b)| 0.5 * (a + b)).collect();
            if let Some(x) = system.polish(center, cfg.numeric_tol)? {
                push_unique(&mut zeros, x, cfg.subdiv_tol);
            }
            continue;
        }

        let mid = 0.5 * (domains[axis].0 + domains[axis].1);
        let mut lo = Vec::with_capacity(part.len());
        let mut hi = Vec::with_capacity(part.len());
        for eq in &part {
            let (l, h) = eq.subdiv(mid, axis)?;
            lo.push(l);
            hi.push(h);
        }
        stack.push((hi, depth + 1));
        stack.push((lo, depth + 1));
    }
    log::debug!(
        "zero set solver: {} constraints in {dim} unknowns, {visited} boxes, {} zeros",
        system.eqs.len(),
        zeros.len()
    );
    Ok(zeros)
}

/// Sample the zero set of an under-determined system.
///
/// The trailing surplus axes are fixed on a regular grid of `samples` values
/// each and the remaining square system is solved per grid node. Returned
/// points carry all coordinates, the fixed ones included.
pub fn solve_on_slices(eqs: &[Mvar], samples: usize, cfg: &SolverConfig) -> Result<Vec<Vec<f64>>> {
    let first = eqs.first().ok_or_else(|| MvarError::incompatible("empty constraint system"))?;
    let dim = first.dim();
    if eqs.len() >= dim {
        return solve_zeros(eqs, cfg);
    }
    let free = eqs.len();
    let surplus = dim - free;
    if samples < 2 {
        return Err(MvarError::incompatible(format!("{samples} samples per slice axis")));
    }
    let domains = first.domains();

    let nodes = samples.pow(surplus as u32);
    let mut out = Vec::new();
    for node in 0..nodes {
        let mut rem = node;
        let fixed: Vec<f64> = (free..dim)
            .map(|axis| {
                let i = rem % samples;
                rem /= samples;
                let (a, b) = domains[axis];
                a + (b - a) * i as f64 / (samples - 1) as f64
            })
            .collect();
        let sliced = eqs
            .iter()
            .map(|eq| {
                let mut eq = eq.clone();
                for axis in (free..dim).rev() {
                    eq = eq.restrict(axis, fixed[axis - free])?;
                }
                Ok(eq)
            })
            .collect::<Result<Vec<_>>>()?;
        for mut x in solve_zeros(&sliced, cfg)? {
            x.extend_from_slice(&fixed);
            out.push(x);
        }
    }
    log::debug!("sliced {surplus} surplus axes on {nodes} nodes, {} points", out.len());
    Ok(out)
}
