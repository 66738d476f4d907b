//! Knot vector utilities.
//!
//! Knot vectors follow the order convention: a B-spline with `len` control
//! points and order `k` has `len + k` knots and the parametric domain
//! `[knots[k - 1], knots[len]]`.

use crate::error::{CagdError, Result};
use crate::types::lerp;
use freeform_math::{KNOT_EPS, UEPS};

/// Validate a knot vector: non-decreasing, length `n_points + order`.
pub fn validate(knots: &[f64], n_points: usize, order: usize) -> Result<()> {
    if knots.len() != n_points + order {
        return Err(CagdError::knots(format!(
            "len={} but expected {} (n={}, k={})",
            knots.len(),
            n_points + order,
            n_points,
            order
        )));
    }
    if let Some(k) = knots.iter().find(|k| !k.is_finite()) {
        return Err(CagdError::knots(format!("non-finite knot {k}")));
    }
    if knots.windows(2).any(|w| w[1] < w[0]) {
        return Err(CagdError::knots("knots must be non-decreasing"));
    }
    if knots[order - 1] >= knots[n_points] {
        return Err(CagdError::knots("empty parametric domain"));
    }
    Ok(())
}

/// Parametric domain of a knot vector with `len` control points.
pub fn domain(knots: &[f64], order: usize, len: usize) -> (f64, f64) {
    (knots[order - 1], knots[len])
}

/// Index `i` of the knot interval `[knots[i], knots[i + 1])` holding `t`,
/// restricted to the domain spans `order - 1 ..= len - 1`.
///
/// Parameters within `KNOT_EPS` below a knot count as lying on it, so a
/// value that misses a breakpoint by rounding evaluates on the far side.
/// The domain end belongs to the last span.
pub fn find_span(knots: &[f64], order: usize, len: usize, t: f64) -> usize {
    let above = knots[..=len].partition_point(|&k| k <= t + KNOT_EPS);
    above.saturating_sub(1).clamp(order - 1, len - 1)
}

/// Span used for knot insertion: the largest `i` in `[degree, n]` with a
/// non-degenerate interval `knots[i] < knots[i+1]` and `knots[i] <= t`.
///
/// Unlike [`find_span`] this never lands on a zero length interval, which
/// keeps repeated insertion at a domain end well defined.
pub(crate) fn insertion_span(knots: &[f64], n: usize, degree: usize, t: f64) -> usize {
    (degree..=n)
        .rev()
        .find(|&i| knots[i] <= t && knots[i] < knots[i + 1])
        .unwrap_or_else(|| find_span(knots, degree + 1, n + 1, t))
}

/// Values of the `order` basis functions that are non-zero on `span`,
/// that is `N[span + 1 - order ..= span]` at `t`.
///
/// Built up one degree at a time; an empty knot interval contributes zero.
pub fn basis_functions(knots: &[f64], span: usize, order: usize, t: f64) -> Vec<f64> {
    let mut values = vec![0.0; order];
    values[0] = 1.0;
    for j in 1..order {
        let mut carry = 0.0;
        for r in 0..j {
            let lo = knots[span + 1 + r - j];
            let hi = knots[span + 1 + r];
            let w = if hi - lo < UEPS { 0.0 } else { values[r] / (hi - lo) };
            values[r] = carry + (hi - t) * w;
            carry = (t - lo) * w;
        }
        values[j] = carry;
    }
    values
}

/// Open (clamped) uniform knot vector over `[min, max]`.
pub fn uniform_open(len: usize, order: usize, min: f64, max: f64) -> Vec<f64> {
    let m = len + order;
    let n_internal = m - 2 * order;
    let mut knots = Vec::with_capacity(m);
    knots.extend(std::iter::repeat(min).take(order));
    for i in 1..=n_internal {
        knots.push(min + (max - min) * i as f64 / (n_internal + 1) as f64);
    }
    knots.extend(std::iter::repeat(max).take(order));
    knots
}

/// Uniform floating (unclamped) knot vector `0, 1, 2, ...` of `count` knots.
pub fn uniform_float(count: usize) -> Vec<f64> {
    (0..count).map(|i| i as f64).collect()
}

/// The implicit knot vector of a Bezier of the given order.
pub fn bezier_knots(order: usize) -> Vec<f64> {
    uniform_open(order, order, 0.0, 1.0)
}

/// Whether the first `order` knots coincide.
pub fn has_open_start(knots: &[f64], order: usize) -> bool {
    knots[..order].iter().all(|&k| (k - knots[0]).abs() < KNOT_EPS)
}

/// Whether the last `order` knots coincide.
pub fn has_open_end(knots: &[f64], order: usize) -> bool {
    let last = knots[knots.len() - 1];
    knots[knots.len() - order..]
        .iter()
        .all(|&k| (k - last).abs() < KNOT_EPS)
}

/// Whether both ends of the knot vector are open.
pub fn has_open_ec(knots: &[f64], order: usize) -> bool {
    has_open_start(knots, order) && has_open_end(knots, order)
}

/// Whether the knot vector is that of a single Bezier segment.
pub fn is_bezier_knots(knots: &[f64], order: usize) -> bool {
    knots.len() == 2 * order && has_open_ec(knots, order)
}

/// Affinely map knots so that `[old_min, old_max]` becomes `[min, max]`.
pub fn affine_map(knots: &mut [f64], (old_min, old_max): (f64, f64), min: f64, max: f64) {
    let scale = (max - min) / (old_max - old_min);
    for k in knots.iter_mut() {
        *k = min + (*k - old_min) * scale;
    }
}

/// Reverse a knot vector, preserving its overall range.
pub fn reverse(knots: &[f64]) -> Vec<f64> {
    let (first, last) = (knots[0], knots[knots.len() - 1]);
    knots.iter().rev().map(|k| first + last - k).collect()
}

/// Number of knots within `eps` of `v`.
pub fn multiplicity(knots: &[f64], v: f64, eps: f64) -> usize {
    knots.iter().filter(|&&k| (k - v).abs() < eps).count()
}

/// Distinct knot values inside `[min, max]`, merged within `eps`.
pub fn distinct_values(knots: &[f64], min: f64, max: f64, eps: f64) -> Vec<f64> {
    let mut out: Vec<f64> = Vec::new();
    for &k in knots {
        if k < min - eps || k > max + eps {
            continue;
        }
        if out.last().map_or(true, |&last| (k - last).abs() >= eps) {
            out.push(k);
        }
    }
    out
}

/// Largest multiplicity of a knot strictly inside the domain.
pub fn max_interior_multiplicity(knots: &[f64], order: usize, len: usize) -> usize {
    let (min, max) = domain(knots, order, len);
    distinct_values(knots, min, max, KNOT_EPS)
        .into_iter()
        .filter(|&v| v > min + KNOT_EPS && v < max - KNOT_EPS)
        .map(|v| multiplicity(knots, v, KNOT_EPS))
        .max()
        .unwrap_or(0)
}

/// Insert a knot into control point rows using Boehm's algorithm.
///
/// Returns the new rows (one more than before) and the new knot vector.
/// Rows are homogeneous, so the rational case needs no special handling.
pub(crate) fn insert_knot(rows: &[Vec<f64>], knots: &[f64], order: usize, t: f64) -> (Vec<Vec<f64>>, Vec<f64>) {
    let n = rows.len() - 1;
    let p = order - 1;
    if p == 0 {
        // Order 1: the new knot splits a constant piece into two equal ones.
        let span = insertion_span(knots, n, 0, t);
        let mut new_knots = knots.to_vec();
        new_knots.insert(span + 1, t);
        let mut new_rows = rows.to_vec();
        new_rows.insert(span, rows[span].clone());
        return (new_rows, new_knots);
    }
    let span = insertion_span(knots, n, p, t);

    let mut new_knots = Vec::with_capacity(knots.len() + 1);
    new_knots.extend_from_slice(&knots[..=span]);
    new_knots.push(t);
    new_knots.extend_from_slice(&knots[span + 1..]);

    let mut new_rows = Vec::with_capacity(rows.len() + 1);
    for row in &rows[..=(span - p)] {
        new_rows.push(row.clone());
    }
    for i in (span - p + 1)..=span {
        let denom = knots[i + p] - knots[i];
        let alpha = if denom.abs() < UEPS {
            0.0
        } else {
            (t - knots[i]) / denom
        };
        new_rows.push(lerp(&rows[i - 1], &rows[i], alpha));
    }
    for row in &rows[span..=n] {
        new_rows.push(row.clone());
    }
    (new_rows, new_knots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_validate() {
        assert!(validate(&[0.0, 0.0, 1.0, 1.0], 2, 2).is_ok());
        assert!(validate(&[0.0, 0.0, 1.0], 2, 2).is_err());
        assert!(validate(&[0.0, 1.0, 0.5, 1.0], 2, 2).is_err());
        assert!(validate(&[0.0, 0.0, 0.0, 0.0], 2, 2).is_err());
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                validate(&[0.0, 0.0, bad, 1.0], 2, 2),
                Err(CagdError::InvalidKnots(_))
            ));
        }
        assert!(validate(&[f64::NAN, 0.0, 1.0, 1.0], 2, 2).is_err());
    }

    #[test]
    fn test_find_span() {
        let knots = vec![0.0, 0.0, 0.0, 0.5, 1.0, 1.0, 1.0];
        assert_eq!(find_span(&knots, 3, 4, 0.0), 2);
        assert_eq!(find_span(&knots, 3, 4, 0.25), 2);
        assert_eq!(find_span(&knots, 3, 4, 0.5), 3);
        assert_eq!(find_span(&knots, 3, 4, 0.5 - 1e-12), 3);
        assert_eq!(find_span(&knots, 3, 4, 1.0), 3);

        // A double interior knot is skipped over, never landed on.
        let double = vec![0.0, 0.0, 0.0, 0.5, 0.5, 1.0, 1.0, 1.0];
        assert_eq!(find_span(&double, 3, 5, 0.5), 4);
        assert_eq!(find_span(&double, 3, 5, 0.4), 2);
    }

    #[test]
    fn test_insertion_span_skips_degenerate_intervals() {
        let knots = vec![0.0, 1.0, 2.0, 3.0, 4.0, 4.0, 5.0, 6.0, 7.0];
        // Five points, order 4; inserting at 4 must use [3, 4].
        assert_eq!(insertion_span(&knots, 4, 3, 4.0), 3);
        assert_eq!(insertion_span(&knots, 4, 3, 3.5), 3);
    }

    #[test]
    fn test_basis_partition_of_unity() {
        let knots = vec![0.0, 0.0, 0.0, 0.25, 0.5, 0.5, 1.0, 1.0, 1.0];
        for i in 0..=20 {
            let t = i as f64 / 20.0;
            let span = find_span(&knots, 3, 6, t);
            let basis = basis_functions(&knots, span, 3, t);
            assert_eq!(basis.len(), 3);
            assert!(basis.iter().all(|&b| b >= -1e-12));
            assert_abs_diff_eq!(basis.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        }
        // Quadratic Bezier weights at the middle.
        let bzr = basis_functions(&bezier_knots(3), 2, 3, 0.5);
        assert_abs_diff_eq!(bzr[0], 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(bzr[1], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(bzr[2], 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_uniform_open() {
        let knots = uniform_open(5, 4, 0.0, 4.0);
        assert_eq!(knots, vec![0.0, 0.0, 0.0, 0.0, 2.0, 4.0, 4.0, 4.0, 4.0]);
        assert!(has_open_ec(&knots, 4));
        assert!(!is_bezier_knots(&knots, 4));
        assert!(is_bezier_knots(&bezier_knots(3), 3));
        assert!(validate(&knots, 5, 4).is_ok());
        assert!(validate(&knots, 4, 4).is_err());
    }

    #[test]
    fn test_reverse_and_multiplicity() {
        let knots = vec![0.0, 0.0, 0.0, 1.0, 3.0, 3.0, 3.0];
        let rev = reverse(&knots);
        assert_eq!(rev, vec![0.0, 0.0, 0.0, 2.0, 3.0, 3.0, 3.0]);
        assert_eq!(reverse(&rev), knots);
        assert_eq!(multiplicity(&knots, 3.0, KNOT_EPS), 3);
        assert_eq!(distinct_values(&knots, 0.0, 3.0, KNOT_EPS), vec![0.0, 1.0, 3.0]);
    }

    #[test]
    fn test_max_interior_multiplicity() {
        let knots = vec![0.0, 0.0, 0.0, 0.5, 0.5, 1.0, 1.0, 1.0];
        assert_eq!(max_interior_multiplicity(&knots, 3, 5), 2);
        assert_eq!(max_interior_multiplicity(&bezier_knots(3), 3, 3), 0);
    }
}
