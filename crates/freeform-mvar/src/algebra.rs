//! Symbolic arithmetic on multivariates.
//!
//! Operands are first brought to a common layout: equal orders per axis and,
//! for B-splines, identical piecewise Bezier knot vectors. Products are then
//! formed patch by patch in the Bernstein basis.

use crate::error::{MvarError, Result};
use crate::mvar::{curve_rows, rows_to_points, Mvar};
use freeform_cagd::{knots, Curve, GeomType, PointType};
use freeform_math::{apx_eq, binomial, KNOT_EPS};
use std::collections::HashMap;

/// Distinct knot values of `axis`, domain ends included.
fn breakpoints(mv: &Mvar, axis: usize) -> Vec<f64> {
    let (min, max) = mv.domain(axis);
    match &mv.knots[axis] {
        Some(kv) if mv.gtype == GeomType::BSpline => knots::distinct_values(kv, min, max, KNOT_EPS),
        _ => vec![min, max],
    }
}

fn merge_breaks(into: &mut Vec<f64>, values: &[f64]) {
    for &v in values {
        let pos = into.partition_point(|&x| x < v);
        let near = |i: usize| into.get(i).is_some_and(|&x| apx_eq(x, v, KNOT_EPS));
        if !(near(pos) || (pos > 0 && near(pos - 1))) {
            into.insert(pos, v);
        }
    }
}

/// Knot vector of C^-1 Bezier pieces of `order` between `breaks`.
fn piecewise_knots(breaks: &[f64], order: usize) -> Vec<f64> {
    breaks.iter().flat_map(|&b| std::iter::repeat(b).take(order)).collect()
}

/// Bezier pieces of `strip` between consecutive `breaks`, raised to `order`.
fn segment_strip(strip: &Curve, breaks: &[f64], order: usize) -> Result<Curve> {
    let mut rows = Vec::new();
    for (a, b, seg) in strip.bezier_segments()? {
        let mut rest = seg;
        let mut start = a;
        for &t in breaks.iter().filter(|&&t| t > a + KNOT_EPS && t < b - KNOT_EPS) {
            let (left, right) = rest.subdiv_at_param((t - start) / (b - start))?;
            rows.extend(curve_rows(&left.degree_raise_n(order)?));
            rest = right;
            start = t;
        }
        rows.extend(curve_rows(&rest.degree_raise_n(order)?));
    }
    Ok(Curve::new(
        GeomType::BSpline,
        strip.ptype,
        order,
        rows_to_points(&rows, strip.ptype),
        Some(piecewise_knots(breaks, order)),
    )?)
}

/// Whether `axis` already holds C^-1 pieces of `order` between `breaks`.
fn is_segmented(mv: &Mvar, axis: usize, breaks: &[f64], order: usize) -> bool {
    mv.gtype == GeomType::BSpline
        && mv.orders[axis] == order
        && mv.knots[axis]
            .as_ref()
            .is_some_and(|kv| kv.len() == breaks.len() * order
                && kv.iter().zip(piecewise_knots(breaks, order)).all(|(a, b)| apx_eq(*a, b, KNOT_EPS)))
}

/// Bring multivariates to a common layout so their coefficients can be
/// combined index by index.
///
/// Power basis operands become Bezier. All-Bezier input is degree raised to
/// the largest order per axis. Otherwise every operand becomes a B-spline of
/// C^-1 Bezier pieces over the union of all breakpoints.
pub fn align_all(mvs: &[Mvar]) -> Result<Vec<Mvar>> {
    let first = mvs.first().ok_or_else(|| MvarError::incompatible("nothing to align"))?;
    let dim = first.dim();
    if mvs.iter().any(|m| m.dim() != dim) {
        return Err(MvarError::incompatible("multivariates differ in dimension"));
    }
    let mut out = mvs
        .iter()
        .map(|m| match m.gtype {
            GeomType::Power => m.to_bezier(),
            _ => Ok(m.clone()),
        })
        .collect::<Result<Vec<_>>>()?;
    let bezier = out.iter().all(|m| m.gtype == GeomType::Bezier);

    for axis in 0..dim {
        let order = out.iter().map(|m| m.orders[axis]).max().unwrap_or(1);
        if bezier {
            for m in &mut out {
                *m = m.degree_raise(axis, order)?;
            }
            continue;
        }
        let (min, max) = out[0].domain(axis);
        let mut breaks = Vec::new();
        for m in &out {
            let (a, b) = m.domain(axis);
            if !apx_eq(a, min, KNOT_EPS) || !apx_eq(b, max, KNOT_EPS) {
                return Err(MvarError::incompatible(format!(
                    "axis {axis} domains [{min}, {max}] and [{a}, {b}] differ"
                )));
            }
            merge_breaks(&mut breaks, &breakpoints(m, axis));
        }
        for m in &mut out {
            if !is_segmented(m, axis, &breaks, order) {
                let strips = m
                    .strips(axis)?
                    .iter()
                    .map(|s| segment_strip(s, &breaks, order))
                    .collect::<Result<Vec<_>>>()?;
                *m = m.from_strips(axis, &strips)?;
            }
        }
    }
    Ok(out)
}

/// [`align_all`] for a pair.
pub fn align(a: &Mvar, b: &Mvar) -> Result<(Mvar, Mvar)> {
    let mut out = align_all(&[a.clone(), b.clone()])?;
    let b = out.pop().ok_or_else(|| MvarError::incompatible("alignment lost an operand"))?;
    let a = out.pop().ok_or_else(|| MvarError::incompatible("alignment lost an operand"))?;
    Ok((a, b))
}

fn polynomial(mv: &Mvar, op: &'static str) -> Result<()> {
    if mv.is_rational() {
        return Err(MvarError::RationalNoSupport(op));
    }
    Ok(())
}

/// Number of Bezier pieces and their order along every axis of an aligned operand.
fn patch_layout(mv: &Mvar) -> Vec<(usize, usize)> {
    mv.orders
        .iter()
        .zip(&mv.lengths)
        .map(|(&k, &len)| (len / k, k))
        .collect()
}

/// Bernstein product of two aligned operands.
///
/// `op` combines one control row of each operand and must be bilinear.
fn product<F>(a: &Mvar, b: &Mvar, ptype: PointType, op: F) -> Result<Mvar>
where
    F: Fn(&[f64], &[f64]) -> Vec<f64>,
{
    let (a, b) = align(a, b)?;
    let dim = a.dim();
    let layout = patch_layout(&a);
    let out_orders: Vec<usize> = layout.iter().map(|&(_, k)| 2 * k - 1).collect();
    let out_lengths: Vec<usize> = layout.iter().zip(&out_orders).map(|(&(n, _), &k)| n * k).collect();
    let out_size: usize = out_lengths.iter().product();

    let in_strides = a.strides();
    let mut out_strides = Vec::with_capacity(dim);
    let mut acc = 1;
    for &len in &out_lengths {
        out_strides.push(acc);
        acc *= len;
    }

    // Multi-indices of one input patch and the Bernstein weights they carry.
    let patch_size: usize = layout.iter().map(|&(_, k)| k).product();
    let local: Vec<Vec<usize>> = (0..patch_size)
        .map(|flat| {
            let mut rem = flat;
            layout
                .iter()
                .map(|&(_, k)| {
                    let i = rem % k;
                    rem /= k;
                    i
                })
                .collect()
        })
        .collect();

    let width = ptype.num_coords();
    let mut rows = vec![vec![0.0; width]; out_size];
    let num_patches: usize = layout.iter().map(|&(n, _)| n).product();
    for patch in 0..num_patches {
        let mut rem = patch;
        let seg: Vec<usize> = layout
            .iter()
            .map(|&(n, _)| {
                let s = rem % n;
                rem /= n;
                s
            })
            .collect();
        let in_base: usize = (0..dim).map(|d| seg[d] * layout[d].1 * in_strides[d]).sum();
        let out_base: usize = (0..dim).map(|d| seg[d] * out_orders[d] * out_strides[d]).sum();

        for li in &local {
            let ia = in_base + (0..dim).map(|d| li[d] * in_strides[d]).sum::<usize>();
            let ra = a.row(ia);
            for lj in &local {
                let ib = in_base + (0..dim).map(|d| lj[d] * in_strides[d]).sum::<usize>();
                let mut weight = 1.0;
                let mut io = out_base;
                for d in 0..dim {
                    let m = layout[d].1 - 1;
                    let (i, j) = (li[d], lj[d]);
                    weight *= binomial(m, i) * binomial(m, j) / binomial(2 * m, i + j);
                    io += (i + j) * out_strides[d];
                }
                for (o, x) in rows[io].iter_mut().zip(op(&ra, &b.row(ib))) {
                    *o += weight * x;
                }
            }
        }
    }

    let knots = match a.gtype {
        GeomType::BSpline => (0..dim)
            .map(|d| Some(piecewise_knots(&breakpoints(&a, d), out_orders[d])))
            .collect(),
        _ => vec![None; dim],
    };
    Mvar::new(a.gtype, ptype, out_orders, out_lengths, rows_to_points(&rows, ptype), knots)
}

/// Apply `f` to the coefficients of aligned operands, index by index.
fn zip_with<F>(a: &Mvar, b: &Mvar, f: F) -> Result<Mvar>
where
    F: Fn(f64, f64) -> f64,
{
    if a.ptype != b.ptype {
        return Err(MvarError::incompatible(format!(
            "point types {:?} and {:?} differ",
            a.ptype, b.ptype
        )));
    }
    let (mut a, b) = align(a, b)?;
    for c in a.ptype.coords() {
        for (x, y) in a.points[c].iter_mut().zip(&b.points[c]) {
            *x = f(*x, *y);
        }
    }
    Ok(a)
}

impl Mvar {
    /// Sum of two polynomial multivariates of the same point type.
    pub fn add(&self, other: &Mvar) -> Result<Mvar> {
        polynomial(self, "addition")?;
        polynomial(other, "addition")?;
        zip_with(self, other, |x, y| x + y)
    }

    /// Difference of two polynomial multivariates of the same point type.
    pub fn sub(&self, other: &Mvar) -> Result<Mvar> {
        polynomial(self, "subtraction")?;
        polynomial(other, "subtraction")?;
        zip_with(self, other, |x, y| x - y)
    }

    /// Scale every stored coefficient, weights excluded.
    pub fn scale(&self, s: f64) -> Mvar {
        let mut out = self.clone();
        for c in 1..=self.ptype.dim() {
            for x in &mut out.points[c] {
                *x *= s;
            }
        }
        out
    }

    /// Product of two polynomial scalars.
    pub fn mult(&self, other: &Mvar) -> Result<Mvar> {
        polynomial(self, "multiplication")?;
        polynomial(other, "multiplication")?;
        if self.ptype != PointType::E1 || other.ptype != PointType::E1 {
            return Err(MvarError::incompatible("product of non-scalars"));
        }
        product(self, other, PointType::E1, |x, y| vec![x[0] * y[0]])
    }

    /// This polynomial scalar times every coordinate of `other`.
    pub fn mult_scalar(&self, other: &Mvar) -> Result<Mvar> {
        polynomial(self, "multiplication")?;
        polynomial(other, "multiplication")?;
        if self.ptype != PointType::E1 {
            return Err(MvarError::incompatible("scaling by a non-scalar"));
        }
        product(self, other, other.ptype, |s, v| v.iter().map(|x| s[0] * x).collect())
    }

    /// Inner product of two polynomial vector fields of equal dimension.
    pub fn dot(&self, other: &Mvar) -> Result<Mvar> {
        polynomial(self, "inner product")?;
        polynomial(other, "inner product")?;
        if self.ptype != other.ptype {
            return Err(MvarError::incompatible(format!(
                "inner product of {:?} and {:?}",
                self.ptype, other.ptype
            )));
        }
        product(self, other, PointType::E1, |x, y| {
            vec![x.iter().zip(y).map(|(a, b)| a * b).sum()]
        })
    }
}

/// Determinant of a square matrix of scalar multivariates.
///
/// `None` entries are structural zeros and are skipped by the expansion, so
/// sparse systems cost far less than a full Laplace expansion. Returns `None`
/// when every term vanishes structurally.
pub fn determinant(m: &[Vec<Option<Mvar>>]) -> Result<Option<Mvar>> {
    let n = m.len();
    if m.iter().any(|row| row.len() != n) {
        return Err(MvarError::incompatible("determinant of a non-square matrix"));
    }
    if n > 31 {
        return Err(MvarError::incompatible(format!("{n} x {n} determinant")));
    }
    let mut memo = HashMap::new();
    minor(m, 0, (1u32 << n) - 1, &mut memo)
}

/// Expansion of rows `row..` over the columns left in `cols`.
fn minor(
    m: &[Vec<Option<Mvar>>],
    row: usize,
    cols: u32,
    memo: &mut HashMap<(usize, u32), Option<Mvar>>,
) -> Result<Option<Mvar>> {
    if row == m.len() {
        return Ok(None);
    }
    if let Some(hit) = memo.get(&(row, cols)) {
        return Ok(hit.clone());
    }
    let mut acc: Option<Mvar> = None;
    let mut sign = 1.0;
    for c in 0..m.len() {
        if cols & (1 << c) == 0 {
            continue;
        }
        if let Some(entry) = &m[row][c] {
            let term = if row + 1 == m.len() {
                Some(entry.clone())
            } else {
                minor(m, row + 1, cols & !(1 << c), memo)?
                    .map(|sub| entry.mult(&sub))
                    .transpose()?
            };
            if let Some(term) = term {
                let term = if sign < 0.0 { term.scale(-1.0) } else { term };
                acc = Some(match acc {
                    Some(a) => a.add(&term)?,
                    None => term,
                });
            }
        }
        sign = -sign;
    }
    memo.insert((row, cols), acc.clone());
    Ok(acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use freeform_cagd::Surface;

    fn scalar_curve(gtype: GeomType, coefs: &[f64]) -> Mvar {
        let pts = vec![Vec::new(), coefs.to_vec()];
        let knots = (gtype == GeomType::BSpline)
            .then(|| knots::uniform_open(coefs.len(), 3.min(coefs.len()), 0.0, 1.0));
        let order = if gtype == GeomType::BSpline { 3.min(coefs.len()) } else { coefs.len() };
        Mvar::new(gtype, PointType::E1, vec![order], vec![coefs.len()], pts, vec![knots]).unwrap()
    }

    fn at(mv: &Mvar, params: &[f64]) -> f64 {
        mv.eval(params).unwrap()[1]
    }

    #[test]
    fn test_bezier_product() {
        let a = scalar_curve(GeomType::Bezier, &[1.0, 3.0]);
        let b = scalar_curve(GeomType::Bezier, &[0.0, 2.0, -1.0]);
        let p = a.mult(&b).unwrap();
        assert_eq!(p.orders, vec![4]);
        for t in [0.0, 0.2, 0.7, 1.0] {
            assert_abs_diff_eq!(at(&p, &[t]), at(&a, &[t]) * at(&b, &[t]), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_bspline_product_with_bezier() {
        let a = scalar_curve(GeomType::BSpline, &[1.0, -2.0, 0.5, 3.0, 1.0]);
        let b = scalar_curve(GeomType::Power, &[0.5, 1.0]);
        let p = a.mult(&b).unwrap();
        assert_eq!(p.gtype, GeomType::BSpline);
        for t in [0.0, 0.1, 0.33, 0.5, 0.9, 1.0] {
            assert_abs_diff_eq!(at(&p, &[t]), at(&a, &[t]) * at(&b, &[t]), epsilon = 1e-10);
        }
        let s = a.add(&b).unwrap();
        let d = a.sub(&b).unwrap();
        for t in [0.25, 0.75] {
            assert_abs_diff_eq!(at(&s, &[t]), at(&a, &[t]) + at(&b, &[t]), epsilon = 1e-10);
            assert_abs_diff_eq!(at(&d, &[t]), at(&a, &[t]) - at(&b, &[t]), epsilon = 1e-10);
        }
    }

    #[test]
    fn test_bivariate_dot() {
        let ctl = vec![
            vec![0.0, 0.0, 1.0],
            vec![1.0, 0.0, 2.0],
            vec![0.0, 1.0, 0.0],
            vec![1.0, 1.0, -1.0],
        ];
        let srf = Surface::bezier(PointType::E3, 2, 2, &ctl).unwrap();
        let mv = Mvar::from_surface(&srf).unwrap();
        let sq = mv.dot(&mv).unwrap();
        for (u, v) in [(0.2, 0.3), (0.9, 0.5)] {
            let p = srf.eval_e(u, v).unwrap();
            let expect: f64 = p.iter().map(|x| x * x).sum();
            assert_abs_diff_eq!(at(&sq, &[u, v]), expect, epsilon = 1e-12);
        }
        let x = Mvar::linear(GeomType::Bezier, &[(0.0, 1.0); 2], 0, 0.0, 1.0);
        let scaled = x.mult_scalar(&mv).unwrap();
        let p = scaled.eval(&[0.5, 0.5]).unwrap();
        assert_abs_diff_eq!(p[1], 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_rational_rejected() {
        let a = scalar_curve(GeomType::Bezier, &[1.0, 2.0]);
        let mut r = a.clone();
        r.ptype = PointType::P1;
        r.points[0] = vec![1.0, 1.0];
        assert_eq!(a.mult(&r), Err(MvarError::RationalNoSupport("multiplication")));
    }

    #[test]
    fn test_domains_must_match() {
        let a = scalar_curve(GeomType::BSpline, &[1.0, 2.0, 3.0]);
        let b = a.set_domain(0, 0.0, 2.0).unwrap();
        assert!(matches!(a.add(&b), Err(MvarError::Incompatible(_))));
    }

    #[test]
    fn test_determinant() {
        let c = |v: f64| Some(Mvar::constant_like(&scalar_curve(GeomType::Bezier, &[0.0, 1.0]), v));
        let t = Some(scalar_curve(GeomType::Bezier, &[0.0, 1.0]));
        // | t 2 0 |
        // | 1 t 0 |
        // | 0 0 3 |  = 3 (t^2 - 2)
        let m = vec![
            vec![t.clone(), c(2.0), None],
            vec![c(1.0), t, None],
            vec![None, None, c(3.0)],
        ];
        let d = determinant(&m).unwrap().unwrap();
        for s in [0.0, 0.4, 1.0] {
            assert_abs_diff_eq!(at(&d, &[s]), 3.0 * (s * s - 2.0), epsilon = 1e-12);
        }
        let empty = vec![vec![None, c(1.0)], vec![None, c(2.0)]];
        assert!(determinant(&empty).unwrap().is_none());
    }
}
