//! Monomial (power) basis kernel.
//!
//! Only evaluation, the domain and degree raising are native. The remaining
//! operations go through [`crate::coerce::BezierCoercion`].

use super::{BezierBasis, CurveKernel};
use crate::curve::Curve;
use crate::error::{CagdError, Result};
use crate::types::{add_scaled, GeomType};

pub(crate) struct PowerBasis;

impl CurveKernel for PowerBasis {
    const GTYPE: GeomType = GeomType::Power;

    fn domain(_crv: &Curve) -> (f64, f64) {
        (0.0, 1.0)
    }

    /// Horner evaluation.
    fn eval(crv: &Curve, t: f64) -> Result<Vec<f64>> {
        let rows = crv.rows();
        let mut acc = vec![0.0; rows[0].len()];
        for row in rows.iter().rev() {
            for x in acc.iter_mut() {
                *x *= t;
            }
            add_scaled(&mut acc, row, 1.0);
        }
        Ok(acc)
    }

    fn set_domain(crv: &Curve, min: f64, max: f64) -> Result<Curve> {
        BezierBasis::set_domain(&crv.to_bezier()?, min, max)
    }

    /// Raising a power basis polynomial appends zero coefficients.
    fn degree_raise_n(crv: &Curve, order: usize) -> Result<Curve> {
        if order < crv.order {
            return Err(CagdError::WrongOrder(format!(
                "cannot raise order {} to {order}",
                crv.order
            )));
        }
        let mut rows = crv.rows();
        rows.resize(order, vec![0.0; rows[0].len()]);
        Ok(Curve::from_parts(GeomType::Power, crv.ptype, order, &rows, None))
    }
}
