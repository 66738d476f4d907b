//! Bernstein basis kernel.

use super::{moebius_equalizing_ratio, moebius_rows, BsplineBasis, CurveKernel};
use crate::curve::Curve;
use crate::error::{CagdError, Result};
use crate::types::{add_scaled, lerp, scaled, sub, GeomType, Rows};
use freeform_math::binomial;

pub(crate) struct BezierBasis;

impl CurveKernel for BezierBasis {
    const GTYPE: GeomType = GeomType::Bezier;

    fn domain(_crv: &Curve) -> (f64, f64) {
        (0.0, 1.0)
    }

    fn eval(crv: &Curve, t: f64) -> Result<Vec<f64>> {
        Ok(de_casteljau(&crv.rows(), t))
    }

    fn set_domain(crv: &Curve, min: f64, max: f64) -> Result<Curve> {
        BsplineBasis::set_domain(&crv.to_bspline()?, min, max)
    }

    fn derive_scalar(crv: &Curve) -> Result<Curve> {
        let rows = derive_rows(&crv.rows());
        Ok(Curve::from_parts(GeomType::Bezier, crv.ptype, rows.len(), &rows, None))
    }

    fn integrate(crv: &Curve) -> Result<Curve> {
        if crv.is_rational() {
            return Err(CagdError::RationalNoSupport("integration"));
        }
        let rows = crv.rows();
        let k = rows.len() as f64;
        let mut out = Vec::with_capacity(rows.len() + 1);
        let mut acc = vec![0.0; rows[0].len()];
        out.push(acc.clone());
        for row in &rows {
            add_scaled(&mut acc, row, 1.0 / k);
            out.push(acc.clone());
        }
        Ok(Curve::from_parts(GeomType::Bezier, crv.ptype, out.len(), &out, None))
    }

    fn subdiv(crv: &Curve, t: f64) -> Result<(Curve, Curve)> {
        let (left, right) = split_rows(&crv.rows(), t);
        Ok((
            Curve::from_parts(GeomType::Bezier, crv.ptype, crv.order, &left, None),
            Curve::from_parts(GeomType::Bezier, crv.ptype, crv.order, &right, None),
        ))
    }

    fn refine(crv: &Curve, replace: bool, knots: &[f64]) -> Result<Curve> {
        BsplineBasis::refine(&crv.to_bspline()?, replace, knots)
    }

    fn degree_raise_n(crv: &Curve, order: usize) -> Result<Curve> {
        if order < crv.order {
            return Err(CagdError::WrongOrder(format!(
                "cannot raise order {} to {order}",
                crv.order
            )));
        }
        let mut rows = crv.rows();
        while rows.len() < order {
            rows = raise_rows(&rows);
        }
        Ok(Curve::from_parts(GeomType::Bezier, crv.ptype, order, &rows, None))
    }

    fn degree_reduce(crv: &Curve) -> Result<Curve> {
        if crv.order < 2 {
            return Err(CagdError::WrongOrder("cannot reduce a constant curve".into()));
        }
        let rows = reduce_rows(&crv.rows());
        Ok(Curve::from_parts(GeomType::Bezier, crv.ptype, rows.len(), &rows, None))
    }

    fn moebius(crv: &Curve, c: f64) -> Result<Curve> {
        let rat = crv.coerce_to_rational();
        let mut rows = rat.rows();
        let c = if c == 0.0 {
            moebius_equalizing_ratio(rows[0][0], rows[rows.len() - 1][0], rows.len() - 1)?
        } else {
            c
        };
        moebius_rows(&mut rows, c);
        Ok(Curve::from_parts(GeomType::Bezier, rat.ptype, rat.order, &rows, None))
    }

    fn reverse(crv: &Curve) -> Result<Curve> {
        let mut rows = crv.rows();
        rows.reverse();
        Ok(Curve::from_parts(GeomType::Bezier, crv.ptype, crv.order, &rows, None))
    }
}

// =============================================================================
// Row algorithms
// =============================================================================

/// De Casteljau evaluation.
pub(crate) fn de_casteljau(rows: &[Vec<f64>], t: f64) -> Vec<f64> {
    let mut pts = rows.to_vec();
    let n = pts.len();
    for level in 1..n {
        for i in 0..n - level {
            pts[i] = lerp(&pts[i], &pts[i + 1], t);
        }
    }
    pts.swap_remove(0)
}

/// De Casteljau subdivision into the `[0, t]` and `[t, 1]` pieces.
pub(crate) fn split_rows(rows: &[Vec<f64>], t: f64) -> (Rows, Rows) {
    let n = rows.len();
    let mut pts = rows.to_vec();
    let mut left = Vec::with_capacity(n);
    let mut right = Vec::with_capacity(n);
    left.push(pts[0].clone());
    right.push(pts[n - 1].clone());
    for level in 1..n {
        for i in 0..n - level {
            pts[i] = lerp(&pts[i], &pts[i + 1], t);
        }
        left.push(pts[0].clone());
        right.push(pts[n - level - 1].clone());
    }
    right.reverse();
    (left, right)
}

/// Hodograph coefficients `(k - 1) * (P_{i+1} - P_i)`. A constant yields zero.
pub(crate) fn derive_rows(rows: &[Vec<f64>]) -> Rows {
    let k = rows.len();
    if k < 2 {
        return vec![vec![0.0; rows[0].len()]];
    }
    rows.windows(2)
        .map(|w| scaled(&sub(&w[1], &w[0]), (k - 1) as f64))
        .collect()
}

/// Elevate by one degree.
pub(crate) fn raise_rows(rows: &[Vec<f64>]) -> Rows {
    let k = rows.len();
    let mut out = Vec::with_capacity(k + 1);
    out.push(rows[0].clone());
    for i in 1..k {
        let a = i as f64 / k as f64;
        out.push(lerp(&rows[i], &rows[i - 1], a));
    }
    out.push(rows[k - 1].clone());
    out
}

/// Reduce by one degree blending the forward and backward recursions.
///
/// Exact when the input is a degree raised curve.
pub(crate) fn reduce_rows(rows: &[Vec<f64>]) -> Rows {
    let n = rows.len() - 1;
    let m = n - 1;
    let mut fwd: Rows = Vec::with_capacity(n);
    fwd.push(rows[0].clone());
    for i in 1..=m {
        let nf = n as f64;
        let r: Vec<f64> = rows[i]
            .iter()
            .zip(&fwd[i - 1])
            .map(|(p, q)| (nf * p - i as f64 * q) / (nf - i as f64))
            .collect();
        fwd.push(r);
    }
    let mut bwd: Rows = vec![Vec::new(); n];
    bwd[m] = rows[n].clone();
    for i in (1..=m).rev() {
        let nf = n as f64;
        bwd[i - 1] = rows[i]
            .iter()
            .zip(&bwd[i])
            .map(|(p, q)| (nf * p - (nf - i as f64) * q) / i as f64)
            .collect();
    }
    let mid = m / 2;
    (0..=m)
        .map(|i| match i.cmp(&mid) {
            std::cmp::Ordering::Less => fwd[i].clone(),
            std::cmp::Ordering::Greater => bwd[i].clone(),
            std::cmp::Ordering::Equal => lerp(&fwd[i], &bwd[i], 0.5),
        })
        .collect()
}

/// Product of a vector valued Bezier with a scalar Bezier.
pub(crate) fn mult_scalar_rows(a: &[Vec<f64>], b: &[f64]) -> Rows {
    let m = a.len() - 1;
    let n = b.len() - 1;
    let mut out = vec![vec![0.0; a[0].len()]; m + n + 1];
    for (i, ai) in a.iter().enumerate() {
        for (j, bj) in b.iter().enumerate() {
            let w = binomial(m, i) * binomial(n, j) / binomial(m + n, i + j);
            add_scaled(&mut out[i + j], ai, w * bj);
        }
    }
    out
}

/// Euclidean hodograph of a rational Bezier via the quotient rule.
///
/// Input rows are homogeneous `(W, X, ...)`. The output is rational with
/// weight `W^2` and coordinates `X' W - X W'`, of order `2k - 1`.
pub(crate) fn rational_derive_rows(rows: &[Vec<f64>]) -> Rows {
    let k = rows.len();
    let dim = rows[0].len() - 1;
    if k < 2 {
        let mut zero = vec![0.0; dim + 1];
        zero[0] = 1.0;
        return vec![zero];
    }
    let w: Vec<f64> = rows.iter().map(|r| r[0]).collect();
    let x: Rows = rows.iter().map(|r| r[1..].to_vec()).collect();
    let dw: Vec<f64> = derive_rows(&w.iter().map(|&v| vec![v]).collect::<Rows>())
        .into_iter()
        .map(|r| r[0])
        .collect();
    let dx = derive_rows(&x);

    let a = mult_scalar_rows(&dx, &w);
    let b = mult_scalar_rows(&x, &dw);
    let num: Rows = a.iter().zip(&b).map(|(p, q)| sub(p, q)).collect();
    let num = raise_rows(&num);
    let den = mult_scalar_rows(&w.iter().map(|&v| vec![v]).collect::<Rows>(), &w);

    num.into_iter()
        .zip(den)
        .map(|(n, d)| {
            let mut row = Vec::with_capacity(dim + 1);
            row.push(d[0]);
            row.extend(n);
            row
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PointType;
    use approx::assert_abs_diff_eq;

    fn cubic() -> Curve {
        Curve::bezier(
            PointType::E2,
            &[vec![0.0, 0.0], vec![1.0, 2.0], vec![3.0, 2.0], vec![4.0, 0.0]],
        )
        .unwrap()
    }

    #[test]
    fn test_de_casteljau_endpoints() {
        let rows = cubic().rows();
        assert_eq!(de_casteljau(&rows, 0.0), vec![0.0, 0.0]);
        assert_eq!(de_casteljau(&rows, 1.0), vec![4.0, 0.0]);
        let mid = de_casteljau(&rows, 0.5);
        assert_abs_diff_eq!(mid[0], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(mid[1], 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_split_matches_eval() {
        let rows = cubic().rows();
        let (l, r) = split_rows(&rows, 0.3);
        let p = de_casteljau(&rows, 0.3);
        assert_eq!(l.last().unwrap(), &p);
        assert_eq!(r[0], p);
        let q = de_casteljau(&rows, 0.3 * 0.5);
        let ql = de_casteljau(&l, 0.5);
        assert_abs_diff_eq!(q[0], ql[0], epsilon = 1e-12);
        assert_abs_diff_eq!(q[1], ql[1], epsilon = 1e-12);
    }

    #[test]
    fn test_raise_then_reduce() {
        let rows = cubic().rows();
        let raised = raise_rows(&rows);
        assert_eq!(raised.len(), 5);
        for i in 0..=10 {
            let t = i as f64 / 10.0;
            let a = de_casteljau(&rows, t);
            let b = de_casteljau(&raised, t);
            assert_abs_diff_eq!(a[0], b[0], epsilon = 1e-12);
            assert_abs_diff_eq!(a[1], b[1], epsilon = 1e-12);
        }
        let reduced = reduce_rows(&raised);
        for (a, b) in reduced.iter().zip(&rows) {
            assert_abs_diff_eq!(a[0], b[0], epsilon = 1e-10);
            assert_abs_diff_eq!(a[1], b[1], epsilon = 1e-10);
        }
    }

    #[test]
    fn test_product_of_lines() {
        // t * t = t^2
        let t = vec![vec![0.0], vec![1.0]];
        let sq = mult_scalar_rows(&t, &[0.0, 1.0]);
        assert_eq!(sq.len(), 3);
        for i in 0..=4 {
            let s = i as f64 / 4.0;
            assert_abs_diff_eq!(de_casteljau(&sq, s)[0], s * s, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_rational_derive_of_quarter_circle() {
        let h = std::f64::consts::FRAC_1_SQRT_2;
        let rows = vec![vec![1.0, 1.0, 0.0], vec![h, h, h], vec![1.0, 0.0, 1.0]];
        let d = rational_derive_rows(&rows);
        assert_eq!(d.len(), 5);
        for i in 0..=8 {
            let t = i as f64 / 8.0;
            let p = de_casteljau(&rows, t);
            let v = de_casteljau(&d, t);
            // Velocity is perpendicular to the radius.
            let (x, y) = (p[1] / p[0], p[2] / p[0]);
            let (vx, vy) = (v[1] / v[0], v[2] / v[0]);
            assert_abs_diff_eq!(x * vx + y * vy, 0.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_moebius_equalizes_end_weights() {
        let crv = Curve::bezier(
            PointType::P2,
            &[vec![1.0, 0.0, 0.0], vec![2.0, 2.0, 2.0], vec![4.0, 8.0, 0.0]],
        )
        .unwrap();
        let out = BezierBasis::moebius(&crv, 0.0).unwrap();
        assert_abs_diff_eq!(out.points[0][0], out.points[0][2], epsilon = 1e-12);
        // Same image: the Euclidean midpoint of the result lies on the input.
        let p = BezierBasis::eval(&out, 0.5).unwrap();
        let (x, y) = (p[1] / p[0], p[2] / p[0]);
        let mut found = false;
        for i in 0..=10000 {
            let q = BezierBasis::eval(&crv, i as f64 / 10000.0).unwrap();
            if (q[1] / q[0] - x).abs() < 1e-3 && (q[2] / q[0] - y).abs() < 1e-3 {
                found = true;
                break;
            }
        }
        assert!(found);
    }
}
