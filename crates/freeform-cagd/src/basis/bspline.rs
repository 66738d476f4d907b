//! B-spline basis kernel.
//!
//! Evaluation uses De Boor's basis functions, refinement and subdivision use
//! Boehm knot insertion, and degree elevation follows the NURBS Book
//! algorithm A5.9 (Bezier decomposition, elevation and knot removal in one
//! sweep).

use super::{bezier, moebius_equalizing_ratio, moebius_rows, CurveKernel};
use crate::curve::Curve;
use crate::error::{CagdError, Result};
use crate::knots::{self, insert_knot};
use crate::types::{add_scaled, lerp, scaled, sub, GeomType, Rows};
use freeform_math::{binomial, Tolerance, KNOT_EPS, UEPS};
use std::borrow::Cow;

pub(crate) struct BsplineBasis;

impl CurveKernel for BsplineBasis {
    const GTYPE: GeomType = GeomType::BSpline;

    fn domain(crv: &Curve) -> (f64, f64) {
        match crv.knots.as_deref() {
            Some(kv) => knots::domain(kv, crv.order, crv.float_length()),
            None => (0.0, 1.0),
        }
    }

    fn eval(crv: &Curve, t: f64) -> Result<Vec<f64>> {
        let crv = floated(crv);
        let t = verify_param(&crv, t, &Tolerance::DEFAULT)?;
        Ok(eval_rows(&crv.rows(), &crv.knot_vector(), crv.order, t))
    }

    fn set_domain(crv: &Curve, min: f64, max: f64) -> Result<Curve> {
        if min >= max {
            return Err(CagdError::invalid(format!("empty domain [{min}, {max}]")));
        }
        let old = Self::domain(crv);
        let mut out = crv.clone();
        let mut kv = crv.knot_vector();
        knots::affine_map(&mut kv, old, min, max);
        out.knots = Some(kv);
        Ok(out)
    }

    fn derive_scalar(crv: &Curve) -> Result<Curve> {
        let crv = floated(crv);
        let (rows, kv) = derive_rows(&crv.rows(), &crv.knot_vector(), crv.order);
        let order = crv.order.saturating_sub(1).max(1);
        Ok(Curve::from_parts(GeomType::BSpline, crv.ptype, order, &rows, Some(kv)))
    }

    fn integrate(crv: &Curve) -> Result<Curve> {
        if crv.is_rational() {
            return Err(CagdError::RationalNoSupport("integration"));
        }
        let crv = floated(crv);
        let rows = crv.rows();
        let kv = crv.knot_vector();
        let k = crv.order;
        let mut out = Vec::with_capacity(rows.len() + 1);
        let mut acc = vec![0.0; rows[0].len()];
        out.push(acc.clone());
        for (i, row) in rows.iter().enumerate() {
            add_scaled(&mut acc, row, (kv[i + k] - kv[i]) / k as f64);
            out.push(acc.clone());
        }
        let mut new_kv = Vec::with_capacity(kv.len() + 2);
        new_kv.push(kv[0]);
        new_kv.extend_from_slice(&kv);
        new_kv.push(kv[kv.len() - 1]);
        Ok(Curve::from_parts(GeomType::BSpline, crv.ptype, k + 1, &out, Some(new_kv)))
    }

    fn subdiv(crv: &Curve, t: f64) -> Result<(Curve, Curve)> {
        subdiv_with(crv, t, &Tolerance::DEFAULT)
    }

    fn refine(crv: &Curve, replace: bool, new_knots: &[f64]) -> Result<Curve> {
        if replace {
            if new_knots.len() != crv.knot_vector().len() {
                return Err(CagdError::knots(format!(
                    "replacement has {} knots, curve has {}",
                    new_knots.len(),
                    crv.knot_vector().len()
                )));
            }
            knots::validate(new_knots, crv.float_length(), crv.order)?;
            let mut out = crv.clone();
            out.knots = Some(new_knots.to_vec());
            return Ok(out);
        }
        let crv = floated(crv);
        let mut sorted = new_knots.to_vec();
        sorted.sort_by(f64::total_cmp);
        let mut rows = crv.rows();
        let mut kv = crv.knot_vector();
        for &t in &sorted {
            let t = verify_param(&crv, t, &Tolerance::DEFAULT)?;
            (rows, kv) = insert_knot(&rows, &kv, crv.order, t);
        }
        Ok(Curve::from_parts(GeomType::BSpline, crv.ptype, crv.order, &rows, Some(kv)))
    }

    fn degree_raise_n(crv: &Curve, order: usize) -> Result<Curve> {
        if order < crv.order {
            return Err(CagdError::WrongOrder(format!(
                "cannot raise order {} to {order}",
                crv.order
            )));
        }
        if order == crv.order {
            return Ok(crv.clone());
        }
        let open = crate::region::open_ends(&crv.to_float())?;
        let k = open.order;
        let kv = open.knot_vector();

        if open.length == k {
            let mut rows = open.rows();
            while rows.len() < order {
                rows = bezier::raise_rows(&rows);
            }
            let (a, b) = knots::domain(&kv, k, open.length);
            let new_kv = [vec![a; order], vec![b; order]].concat();
            return Ok(Curve::from_parts(GeomType::BSpline, open.ptype, order, &rows, Some(new_kv)));
        }

        if knots::max_interior_multiplicity(&kv, k, open.length) >= k {
            // Discontinuous: raise each continuous piece on its own.
            let (min, max) = knots::domain(&kv, k, open.length);
            let cut = knots::distinct_values(&kv, min, max, KNOT_EPS)
                .into_iter()
                .find(|&v| {
                    v > min + KNOT_EPS && v < max - KNOT_EPS && knots::multiplicity(&kv, v, KNOT_EPS) >= k
                });
            if let Some(v) = cut {
                let (left, right) = Self::subdiv(&open, v)?;
                let left = Self::degree_raise_n(&left, order)?;
                let right = Self::degree_raise_n(&right, order)?;
                return Ok(append(&left, &right));
            }
        }

        let (rows, new_kv) = elevate(&open.rows(), &kv, k - 1, order - k);
        Ok(Curve::from_parts(GeomType::BSpline, open.ptype, order, &rows, Some(new_kv)))
    }

    fn moebius(crv: &Curve, c: f64) -> Result<Curve> {
        let kv = crv.knot_vector();
        if crv.periodic || !knots::is_bezier_knots(&kv, crv.order) {
            return Err(CagdError::BsplineNoSupport(
                "Moebius transformation of a multi-segment curve",
            ));
        }
        let rat = crv.coerce_to_rational();
        let mut rows = rat.rows();
        let c = if c == 0.0 {
            moebius_equalizing_ratio(rows[0][0], rows[rows.len() - 1][0], rows.len() - 1)?
        } else {
            c
        };
        moebius_rows(&mut rows, c);
        Ok(Curve::from_parts(GeomType::BSpline, rat.ptype, rat.order, &rows, Some(kv)))
    }

    fn reverse(crv: &Curve) -> Result<Curve> {
        let float = crv.to_float();
        let mut rows = float.rows();
        rows.reverse();
        let kv = knots::reverse(&float.knot_vector());
        if crv.periodic {
            rows.truncate(crv.length);
        }
        let mut out = Curve::from_parts(GeomType::BSpline, crv.ptype, crv.order, &rows, Some(kv));
        out.periodic = crv.periodic;
        Ok(out)
    }
}

/// Borrow the curve, unrolling it first when periodic.
fn floated(crv: &Curve) -> Cow<'_, Curve> {
    if crv.periodic {
        Cow::Owned(crv.to_float())
    } else {
        Cow::Borrowed(crv)
    }
}

/// Check `t` against the curve domain and clamp it inside.
fn verify_param(crv: &Curve, t: f64, tol: &Tolerance) -> Result<f64> {
    let (min, max) = BsplineBasis::domain(crv);
    if !tol.in_domain(t, min, max) {
        return Err(CagdError::domain(t, (min, max)));
    }
    Ok(t.clamp(min, max))
}

/// Subdivision at `t`, verifying the parameter and snapping it onto
/// existing knots with the tolerances of `tol`.
pub(crate) fn subdiv_with(crv: &Curve, t: f64, tol: &Tolerance) -> Result<(Curve, Curve)> {
    let crv = floated(crv);
    let t = verify_param(&crv, t, tol)?;
    let ((lr, lk), (rr, rk)) = split_rows(&crv.rows(), &crv.knot_vector(), crv.order, t, tol.knot)?;
    Ok((
        Curve::from_parts(GeomType::BSpline, crv.ptype, crv.order, &lr, Some(lk)),
        Curve::from_parts(GeomType::BSpline, crv.ptype, crv.order, &rr, Some(rk)),
    ))
}

// =============================================================================
// Row algorithms
// =============================================================================

/// De Boor evaluation of non-periodic control rows.
pub(crate) fn eval_rows(rows: &[Vec<f64>], kv: &[f64], order: usize, t: f64) -> Vec<f64> {
    let span = knots::find_span(kv, order, rows.len(), t);
    let basis = knots::basis_functions(kv, span, order, t);
    let mut out = vec![0.0; rows[0].len()];
    for (i, b) in basis.iter().enumerate() {
        add_scaled(&mut out, &rows[span + 1 - order + i], *b);
    }
    out
}

/// Hodograph rows and knots. Order one curves differentiate to zero.
pub(crate) fn derive_rows(rows: &[Vec<f64>], kv: &[f64], order: usize) -> (Rows, Vec<f64>) {
    let k = order;
    if k < 2 {
        return (vec![vec![0.0; rows[0].len()]; rows.len()], kv.to_vec());
    }
    let out = rows
        .windows(2)
        .enumerate()
        .map(|(i, w)| {
            let dt = kv[i + k] - kv[i + 1];
            if dt.abs() < UEPS {
                vec![0.0; w[0].len()]
            } else {
                scaled(&sub(&w[1], &w[0]), (k - 1) as f64 / dt)
            }
        })
        .collect();
    (out, kv[1..kv.len() - 1].to_vec())
}

/// Insert `t` until it has full multiplicity, then cut the rows there.
///
/// Knots within `knot_eps` of `t` count towards its multiplicity. Cutting
/// at an end of an open knot vector leaves an empty piece and fails.
#[allow(clippy::type_complexity)]
pub(crate) fn split_rows(
    rows: &[Vec<f64>],
    kv: &[f64],
    order: usize,
    t: f64,
    knot_eps: f64,
) -> Result<((Rows, Vec<f64>), (Rows, Vec<f64>))> {
    // Snap onto an existing knot so multiplicities are counted right.
    let t = kv
        .iter()
        .copied()
        .find(|k| (k - t).abs() < knot_eps)
        .unwrap_or(t);
    let mut rows = rows.to_vec();
    let mut kv = kv.to_vec();
    for _ in knots::multiplicity(&kv, t, knot_eps)..order {
        (rows, kv) = insert_knot(&rows, &kv, order, t);
    }
    let j = kv
        .iter()
        .position(|k| (k - t).abs() < knot_eps)
        .unwrap_or(0);
    if j == 0 || j >= rows.len() {
        let (min, max) = knots::domain(&kv, order, rows.len());
        return Err(CagdError::domain(t, (min, max)));
    }
    let right_rows = rows.split_off(j);
    let right_kv = kv[j..].to_vec();
    kv.truncate(j + order);
    Ok(((rows, kv), (right_rows, right_kv)))
}

/// Insert every interior knot to full multiplicity, leaving Bezier segments
/// of `order` rows each. The input must have open end conditions.
pub(crate) fn decompose(rows: &[Vec<f64>], kv: Vec<f64>, order: usize) -> (Rows, Vec<f64>) {
    let (min, max) = knots::domain(&kv, order, rows.len());
    let interior: Vec<f64> = knots::distinct_values(&kv, min, max, KNOT_EPS)
        .into_iter()
        .filter(|&v| v > min + KNOT_EPS && v < max - KNOT_EPS)
        .collect();
    let mut rows = rows.to_vec();
    let mut kv = kv;
    for v in interior {
        for _ in knots::multiplicity(&kv, v, KNOT_EPS)..order {
            (rows, kv) = insert_knot(&rows, &kv, order, v);
        }
    }
    (rows, kv)
}

/// Join two curves of equal order whose domains meet at a full multiplicity knot.
pub(crate) fn append(left: &Curve, right: &Curve) -> Curve {
    let k = left.order;
    let mut rows = left.rows();
    rows.extend(right.rows());
    let mut kv = left.knot_vector();
    kv.extend_from_slice(&right.knot_vector()[k..]);
    Curve::from_parts(GeomType::BSpline, left.ptype, k, &rows, Some(kv))
}

/// Raise the degree `p` of an open B-spline by `t` (NURBS Book A5.9).
///
/// Interior knot multiplicities must not exceed `p`.
pub(crate) fn elevate(pw: &[Vec<f64>], u: &[f64], p: usize, t: usize) -> (Rows, Vec<f64>) {
    let n = pw.len() - 1;
    let m = n + p + 1;
    let ph = p + t;
    let ph2 = ph / 2;
    let zero = vec![0.0; pw[0].len()];

    // Degree elevation coefficients of a single Bezier segment.
    let mut bezalfs = vec![vec![0.0; p + 1]; ph + 1];
    bezalfs[0][0] = 1.0;
    bezalfs[ph][p] = 1.0;
    for i in 1..=ph2 {
        let inv = 1.0 / binomial(ph, i);
        for j in i.saturating_sub(t)..=p.min(i) {
            bezalfs[i][j] = inv * binomial(p, j) * binomial(t, i - j);
        }
    }
    for i in ph2 + 1..ph {
        for j in i.saturating_sub(t)..=p.min(i) {
            bezalfs[i][j] = bezalfs[ph - i][p - j];
        }
    }

    let cap = n + 1 + t * (m + 1);
    let mut qw = vec![zero.clone(); cap];
    let mut uh = vec![0.0; cap + ph + 1];
    let mut bpts: Rows = pw[..=p].to_vec();
    let mut ebpts = vec![zero.clone(); ph + 1];
    let mut next_bpts = vec![zero.clone(); p.max(1)];
    let mut alfs = vec![0.0; p.max(1)];

    let mut mh = ph;
    let mut kind = ph + 1;
    let mut r: isize = -1;
    let mut a = p;
    let mut b = p + 1;
    let mut cind = 1;
    let mut ua = u[0];
    qw[0] = pw[0].clone();
    for k in uh.iter_mut().take(ph + 1) {
        *k = ua;
    }

    while b < m {
        let i = b;
        while b < m && (u[b + 1] - u[b]).abs() < KNOT_EPS {
            b += 1;
        }
        let mul = b - i + 1;
        mh += mul + t;
        let ub = u[b];
        let oldr = r;
        r = p as isize - mul as isize;
        let lbz = if oldr > 0 { ((oldr + 2) / 2) as usize } else { 1 };
        let rbz = if r > 0 { ph - ((r + 1) / 2) as usize } else { ph };

        // Insert ub r times to isolate the current Bezier segment.
        if r > 0 {
            let numer = ub - ua;
            for k in (mul + 1..=p).rev() {
                alfs[k - mul - 1] = numer / (u[a + k] - ua);
            }
            for j in 1..=r as usize {
                let save = r as usize - j;
                let s = mul + j;
                for k in (s..=p).rev() {
                    bpts[k] = lerp(&bpts[k - 1], &bpts[k], alfs[k - s]);
                }
                next_bpts[save] = bpts[p].clone();
            }
        }

        for (i, e) in ebpts.iter_mut().enumerate().skip(lbz) {
            let mut acc = zero.clone();
            for j in i.saturating_sub(t)..=p.min(i) {
                add_scaled(&mut acc, &bpts[j], bezalfs[i][j]);
            }
            *e = acc;
        }

        // Remove the knot ua oldr - 1 times.
        if oldr > 1 {
            let mut first = kind - 2;
            let mut last = kind;
            let den = ub - ua;
            let bet = (ub - uh[kind - 1]) / den;
            for tr in 1..oldr as usize {
                let mut i = first;
                let mut j = last;
                let mut kj = j - kind + 1;
                while j - i > tr {
                    if i < cind {
                        let alf = (ub - uh[i]) / (ua - uh[i]);
                        qw[i] = lerp(&qw[i - 1], &qw[i], alf);
                    }
                    if j >= lbz {
                        if (j - tr) as isize <= kind as isize - ph as isize + oldr {
                            let gam = (ub - uh[j - tr]) / den;
                            ebpts[kj] = lerp(&ebpts[kj + 1], &ebpts[kj], gam);
                        } else {
                            ebpts[kj] = lerp(&ebpts[kj + 1], &ebpts[kj], bet);
                        }
                    }
                    i += 1;
                    j -= 1;
                    kj = kj.saturating_sub(1);
                }
                first -= 1;
                last += 1;
            }
        }

        if a != p {
            for _ in 0..(ph as isize - oldr) as usize {
                uh[kind] = ua;
                kind += 1;
            }
        }

        for e in &ebpts[lbz..=rbz] {
            qw[cind] = e.clone();
            cind += 1;
        }

        if b < m {
            let keep = r.max(0) as usize;
            bpts[..keep].clone_from_slice(&next_bpts[..keep]);
            for j in keep..=p {
                bpts[j] = pw[b - p + j].clone();
            }
            a = b;
            b += 1;
            ua = ub;
        } else {
            for k in 0..=ph {
                uh[kind + k] = ub;
            }
        }
    }

    let nh = mh - ph - 1;
    qw.truncate(nh + 1);
    uh.truncate(nh + ph + 2);
    (qw, uh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PointType;
    use approx::assert_abs_diff_eq;

    fn line_cubic() -> Curve {
        Curve::bspline(
            PointType::E2,
            4,
            &[vec![0.0, 0.0], vec![1.0, 0.0], vec![2.0, 0.0], vec![3.0, 0.0], vec![4.0, 0.0]],
            vec![0.0, 0.0, 0.0, 0.0, 2.0, 4.0, 4.0, 4.0, 4.0],
        )
        .unwrap()
    }

    fn wavy() -> Curve {
        Curve::bspline(
            PointType::E2,
            4,
            &[
                vec![0.0, 0.0],
                vec![1.0, 2.0],
                vec![2.0, -1.0],
                vec![3.0, 3.0],
                vec![4.0, 0.0],
                vec![5.0, 1.0],
            ],
            vec![0.0, 0.0, 0.0, 0.0, 0.3, 0.6, 1.0, 1.0, 1.0, 1.0],
        )
        .unwrap()
    }

    fn assert_same_image(a: &Curve, b: &Curve) {
        let (min, max) = BsplineBasis::domain(a);
        for i in 0..=20 {
            let t = min + (max - min) * i as f64 / 20.0;
            let p = BsplineBasis::eval(a, t).unwrap();
            let q = BsplineBasis::eval(b, t).unwrap();
            for (x, y) in p.iter().zip(&q) {
                assert_abs_diff_eq!(x, y, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_eval_rejects_out_of_domain() {
        let crv = line_cubic();
        assert!(BsplineBasis::eval(&crv, 4.0).is_ok());
        assert!(matches!(
            BsplineBasis::eval(&crv, 4.5),
            Err(CagdError::DomainTVerify { .. })
        ));
    }

    #[test]
    fn test_subdiv_agrees_with_parent() {
        let crv = wavy();
        let (l, r) = BsplineBasis::subdiv(&crv, 0.45).unwrap();
        assert_eq!(BsplineBasis::domain(&l), (0.0, 0.45));
        assert_eq!(BsplineBasis::domain(&r), (0.45, 1.0));
        let p = BsplineBasis::eval(&crv, 0.45).unwrap();
        let pl = BsplineBasis::eval(&l, 0.45).unwrap();
        let pr = BsplineBasis::eval(&r, 0.45).unwrap();
        for c in 0..2 {
            assert_abs_diff_eq!(p[c], pl[c], epsilon = 1e-12);
            assert_abs_diff_eq!(p[c], pr[c], epsilon = 1e-12);
        }
        let q = BsplineBasis::eval(&crv, 0.2).unwrap();
        let ql = BsplineBasis::eval(&l, 0.2).unwrap();
        assert_abs_diff_eq!(q[1], ql[1], epsilon = 1e-12);
    }

    #[test]
    fn test_subdiv_at_open_end_fails() {
        let crv = wavy();
        assert!(BsplineBasis::subdiv(&crv, 0.0).is_err());
        assert!(BsplineBasis::subdiv(&crv, 1.0).is_err());
    }

    #[test]
    fn test_subdiv_at_existing_knot() {
        let crv = wavy();
        let (l, r) = BsplineBasis::subdiv(&crv, 0.3).unwrap();
        assert_eq!(l.length, 4);
        assert_eq!(r.length, 5);
    }

    #[test]
    fn test_refine_preserves_image() {
        let crv = wavy();
        let refined = BsplineBasis::refine(&crv, false, &[0.1, 0.75, 0.3]).unwrap();
        assert_eq!(refined.length, crv.length + 3);
        assert_same_image(&crv, &refined);
    }

    #[test]
    fn test_derive_matches_finite_difference() {
        let crv = wavy();
        let d = BsplineBasis::derive_scalar(&crv).unwrap();
        assert_eq!(d.order, 3);
        let h = 1e-6;
        for &t in &[0.1, 0.45, 0.8] {
            let a = BsplineBasis::eval(&crv, t - h).unwrap();
            let b = BsplineBasis::eval(&crv, t + h).unwrap();
            let v = BsplineBasis::eval(&d, t).unwrap();
            for c in 0..2 {
                assert_abs_diff_eq!((b[c] - a[c]) / (2.0 * h), v[c], epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn test_integrate_inverts_derive() {
        let crv = wavy();
        let int = BsplineBasis::integrate(&crv).unwrap();
        let back = BsplineBasis::derive_scalar(&int).unwrap();
        assert_same_image(&crv, &back);
    }

    #[test]
    fn test_elevate_preserves_image() {
        let crv = wavy();
        let raised = BsplineBasis::degree_raise_n(&crv, 5).unwrap();
        assert_eq!(raised.order, 5);
        // Each distinct knot gains one multiplicity.
        assert_eq!(raised.knot_vector().len(), crv.knot_vector().len() + 4);
        assert_same_image(&crv, &raised);

        let twice = BsplineBasis::degree_raise_n(&crv, 6).unwrap();
        assert_same_image(&crv, &twice);
    }

    #[test]
    fn test_elevate_with_double_knot() {
        let crv = Curve::bspline(
            PointType::E1,
            3,
            &[vec![0.0], vec![1.0], vec![3.0], vec![2.0], vec![5.0]],
            vec![0.0, 0.0, 0.0, 0.5, 0.5, 1.0, 1.0, 1.0],
        )
        .unwrap();
        let raised = BsplineBasis::degree_raise_n(&crv, 4).unwrap();
        assert_same_image(&crv, &raised);
    }

    #[test]
    fn test_reverse_involution() {
        let crv = wavy();
        let rev = BsplineBasis::reverse(&crv).unwrap();
        let p = BsplineBasis::eval(&crv, 0.2).unwrap();
        let q = BsplineBasis::eval(&rev, 0.8).unwrap();
        assert_abs_diff_eq!(p[0], q[0], epsilon = 1e-12);
        assert_abs_diff_eq!(p[1], q[1], epsilon = 1e-12);
        let back = BsplineBasis::reverse(&rev).unwrap();
        assert_eq!(back.points, crv.points);
        for (a, b) in back.knot_vector().iter().zip(crv.knot_vector()) {
            assert_abs_diff_eq!(*a, b, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_periodic_reverse_keeps_image() {
        let ctl = vec![vec![0.0, 0.0], vec![2.0, 0.0], vec![2.0, 2.0], vec![0.0, 2.0]];
        let crv = Curve::new_periodic(
            PointType::E2,
            3,
            crate::types::from_rows(&ctl, PointType::E2),
            knots::uniform_float(9),
        )
        .unwrap();
        let rev = BsplineBasis::reverse(&crv).unwrap();
        assert!(rev.periodic);
        assert_eq!(rev.length, 4);
        let (min, max) = BsplineBasis::domain(&crv);
        let p = BsplineBasis::eval(&crv, min + 0.25).unwrap();
        let q = BsplineBasis::eval(&rev, max - 0.25).unwrap();
        assert_abs_diff_eq!(p[0], q[0], epsilon = 1e-12);
        assert_abs_diff_eq!(p[1], q[1], epsilon = 1e-12);
    }

    #[test]
    fn test_moebius_requires_single_segment() {
        assert!(matches!(
            BsplineBasis::moebius(&wavy(), 2.0),
            Err(CagdError::BsplineNoSupport(_))
        ));
        let seg = Curve::bezier(PointType::E1, &[vec![0.0], vec![1.0], vec![4.0]])
            .unwrap()
            .to_bspline()
            .unwrap();
        let out = BsplineBasis::moebius(&seg, 2.0).unwrap();
        assert!(out.is_rational());
        assert_eq!(out.points[0], vec![1.0, 2.0, 4.0]);
    }
}
