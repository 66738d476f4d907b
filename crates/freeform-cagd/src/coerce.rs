//! Promote-operate-demote adapter for bases without a native operation.

use crate::curve::Curve;
use crate::error::Result;
use crate::types::GeomType;

/// Runs a Bezier operation on a power basis curve.
///
/// The input is converted to Bezier form, the operation runs on that, and
/// every resulting curve is converted back to power basis. Intermediates
/// are dropped before returning.
pub(crate) struct BezierCoercion;

impl BezierCoercion {
    /// Apply a curve to curve operation.
    pub(crate) fn apply<F>(crv: &Curve, op: &'static str, f: F) -> Result<Curve>
    where
        F: FnOnce(&Curve) -> Result<Curve>,
    {
        debug_assert_eq!(crv.gtype, GeomType::Power);
        log::trace!("power basis coerced to Bezier for {op}");
        let bzr = crv.to_bezier()?;
        f(&bzr)?.to_power()
    }

    /// Apply an operation producing two curves.
    pub(crate) fn apply_pair<F>(crv: &Curve, op: &'static str, f: F) -> Result<(Curve, Curve)>
    where
        F: FnOnce(&Curve) -> Result<(Curve, Curve)>,
    {
        debug_assert_eq!(crv.gtype, GeomType::Power);
        log::trace!("power basis coerced to Bezier for {op}");
        let bzr = crv.to_bezier()?;
        let (a, b) = f(&bzr)?;
        Ok((a.to_power()?, b.to_power()?))
    }
}
