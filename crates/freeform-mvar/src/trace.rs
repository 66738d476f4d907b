//! Tracing the univariate zero set of `n - 1` constraints in `n` unknowns.
//!
//! Start points are the zeros on the faces of the domain. From each, a
//! predictor-corrector walk follows the curve: the predictor steps along the
//! null vector of the Jacobian, the corrector pulls back with minimum norm
//! Newton steps.

use crate::error::{MvarError, Result};
use crate::mvar::Mvar;
use crate::zeros::{push_unique, solve_zeros, SolverConfig, System, NEWTON_ITERATIONS};
use freeform_math::{null_vector, solve_min_norm, DVec};

/// A traced curve as a sequence of parameter space points.
pub type Polyline = Vec<Vec<f64>>;

/// Point where a trace touches the domain boundary.
#[derive(Debug, Clone)]
struct Start {
    point: Vec<f64>,
    axis: usize,
    at_max: bool,
    used: bool,
}

fn dist(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum::<f64>().sqrt()
}

/// Zeros of the constraints on every face of the domain.
fn boundary_starts(eqs: &[Mvar], domains: &[(f64, f64)], cfg: &SolverConfig) -> Result<Vec<Start>> {
    let mut found: Vec<Vec<f64>> = Vec::new();
    let mut starts = Vec::new();
    for (axis, &(min, max)) in domains.iter().enumerate() {
        for (value, at_max) in [(min, false), (max, true)] {
            let face = eqs
                .iter()
                .map(|e| e.restrict(axis, value))
                .collect::<Result<Vec<_>>>()?;
            for mut p in solve_zeros(&face, cfg)? {
                p.insert(axis, value);
                let before = found.len();
                push_unique(&mut found, p.clone(), cfg.subdiv_tol);
                if found.len() > before {
                    starts.push(Start {
                        point: p,
                        axis,
                        at_max,
                        used: false,
                    });
                }
            }
        }
    }
    Ok(starts)
}

/// Minimum norm Newton correction, optionally pinning one coordinate.
fn correct(system: &System, start: Vec<f64>, pin: Option<(usize, f64)>, tol: f64) -> Result<Option<Vec<f64>>> {
    let mut x = start;
    if let Some((axis, value)) = pin {
        x[axis] = value;
    }
    for _ in 0..NEWTON_ITERATIONS {
        let mut f = system.values(&x)?;
        let mut j = system.jacobian(&x)?;
        if let Some((axis, value)) = pin {
            let f_rows = f.nrows();
            f = f.insert_row(f_rows, x[axis] - value);
            let j_rows = j.nrows();
            j = j.insert_row(j_rows, 0.0);
            let last = j.nrows() - 1;
            j[(last, axis)] = 1.0;
        }
        if f.norm() < tol {
            return Ok(Some(x));
        }
        let Some(dx) = solve_min_norm(j, &(-f)) else {
            return Ok(None);
        };
        for (v, d) in x.iter_mut().zip(dx.iter()) {
            *v += d;
        }
        system.clamp(&mut x);
    }
    let f = system.values(&x)?;
    Ok((f.norm() < tol).then_some(x))
}

/// Unit tangent of the zero set at `x`.
fn tangent(system: &System, x: &[f64]) -> Result<Option<DVec>> {
    Ok(null_vector(&system.jacobian(x)?))
}

/// Fraction of the step `x + h * t` that stays inside the domain, with the
/// axis and bound hit first.
fn boundary_hit(domains: &[(f64, f64)], x: &[f64], t: &DVec, h: f64) -> Option<(f64, usize, f64)> {
    let mut hit: Option<(f64, usize, f64)> = None;
    for (axis, &(min, max)) in domains.iter().enumerate() {
        let y = x[axis] + h * t[axis];
        let bound = if y < min {
            min
        } else if y > max {
            max
        } else {
            continue;
        };
        let s = ((bound - x[axis]) / (h * t[axis])).clamp(0.0, 1.0);
        if hit.map_or(true, |(best, _, _)| s < best) {
            hit = Some((s, axis, bound));
        }
    }
    hit
}

fn trace_from(system: &System, start: &Start, cfg: &SolverConfig) -> Result<Polyline> {
    let domains = &system.domains;
    let mut x = start.point.clone();
    let mut line = vec![x.clone()];
    let Some(mut t) = tangent(system, &x)? else {
        log::warn!("singular start point {x:?}, not traced");
        return Ok(line);
    };
    // Head into the domain.
    let inward = if start.at_max { -1.0 } else { 1.0 };
    if t[start.axis] * inward < 0.0 {
        t = -t;
    }

    let diagonal: f64 = domains.iter().map(|(a, b)| (b - a).powi(2)).sum::<f64>().sqrt();
    let max_steps = (4.0 * diagonal / cfg.step) as usize + 100;
    let mut left_start = false;
    for _ in 0..max_steps {
        let mut h = cfg.step;
        let next = loop {
            if let Some((s, axis, bound)) = boundary_hit(domains, &x, &t, h) {
                let guess: Vec<f64> = x.iter().zip(t.iter()).map(|(v, d)| v + s * h * d).collect();
                if let Some(end) = correct(system, guess, Some((axis, bound)), cfg.numeric_tol)? {
                    line.push(end);
                    return Ok(line);
                }
            } else {
                let guess: Vec<f64> = x.iter().zip(t.iter()).map(|(v, d)| v + h * d).collect();
                if let Some(p) = correct(system, guess, None, cfg.numeric_tol)? {
                    break p;
                }
            }
            h *= 0.5;
            if h < cfg.step * 1e-3 {
                log::warn!("tracing stalled at {x:?} after {} points", line.len());
                return Ok(line);
            }
        };

        let Some(mut t_next) = tangent(system, &next)? else {
            log::warn!("singular point {next:?} reached while tracing");
            line.push(next);
            return Ok(line);
        };
        if t_next.dot(&t) < 0.0 {
            t_next = -t_next;
        }
        let back = dist(&next, &start.point);
        line.push(next.clone());
        if left_start && back < cfg.step {
            line.push(start.point.clone());
            log::debug!("closed loop of {} points", line.len());
            return Ok(line);
        }
        left_start |= back > 2.0 * cfg.step;
        x = next;
        t = t_next;
    }
    log::warn!("trace from {:?} hit the step limit {max_steps}", start.point);
    Ok(line)
}

/// Trace the one dimensional zero set of `n - 1` scalar constraints in `n`
/// unknowns, stepping by `cfg.step`.
///
/// Every branch that meets the domain boundary is returned once, as a
/// polyline running from one boundary point to another. Closed components
/// that never touch the boundary are not found.
pub fn univar_inter(eqs: &[Mvar], cfg: &SolverConfig) -> Result<Vec<Polyline>> {
    let system = System::new(eqs)?;
    let n = system.dim();
    if n < 2 || system.eqs.len() + 1 != n {
        return Err(MvarError::incompatible(format!(
            "{} constraints in {n} unknowns do not define a curve",
            system.eqs.len()
        )));
    }
    let mut starts = boundary_starts(&system.eqs, &system.domains, cfg)?;
    log::debug!("{} boundary start points for tracing", starts.len());

    let mut lines = Vec::new();
    for i in 0..starts.len() {
        if starts[i].used {
            continue;
        }
        starts[i].used = true;
        let line = trace_from(&system, &starts[i], cfg)?;
        if let Some(end) = line.last() {
            for s in starts.iter_mut().filter(|s| !s.used) {
                if dist(&s.point, end) < cfg.step.max(cfg.subdiv_tol) {
                    s.used = true;
                }
            }
        }
        if line.len() > 1 {
            lines.push(line);
        }
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use freeform_cagd::GeomType;

    #[test]
    fn test_quarter_circle() {
        let doms = [(0.0, 2.0), (0.0, 2.0)];
        let x = Mvar::linear(GeomType::BSpline, &doms, 0, 0.0, 2.0);
        let y = Mvar::linear(GeomType::BSpline, &doms, 1, 0.0, 2.0);
        let r2 = x.mult(&x).unwrap().add(&y.mult(&y).unwrap()).unwrap();
        let circle = r2.sub(&Mvar::constant_like(&r2, 1.0)).unwrap();

        let lines = univar_inter(&[circle], &SolverConfig::default()).unwrap();
        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        assert!(line.len() > 100);
        for p in line {
            assert_abs_diff_eq!(p[0] * p[0] + p[1] * p[1], 1.0, epsilon = 1e-8);
        }
        let (first, last) = (&line[0], &line[line.len() - 1]);
        assert_abs_diff_eq!(first[0] * last[0] + first[1] * last[1], 0.0, epsilon = 1e-8);
    }

    #[test]
    fn test_wrong_shape() {
        let doms = [(0.0, 1.0)];
        let x = Mvar::linear(GeomType::BSpline, &doms, 0, 0.0, 1.0);
        assert!(matches!(
            univar_inter(&[x], &SolverConfig::default()),
            Err(MvarError::Incompatible(_))
        ));
    }
}
