#![warn(missing_docs)]

//! Session facade for the freeform geometry kernel.
//!
//! A [`Kernel`] carries one [`KernelConfig`] and one [`ErrorSink`]. Every
//! fallible call made through it reports its error to the sink before
//! returning it, so a host decides in one place whether errors are logged,
//! collected or fatal.
//!
//! # Example
//!
//! ```
//! use freeform_kernel::{CollectingSink, Kernel, KernelConfig};
//! use freeform_kernel::freeform_cagd::{Curve, PointType};
//!
//! let sink = CollectingSink::new();
//! let kernel = Kernel::new(KernelConfig::default()).with_sink(Box::new(sink.clone()));
//! let crv = Curve::bspline_uniform(PointType::E1, 2, &[vec![0.0], vec![1.0], vec![0.0]]).unwrap();
//! assert!(kernel.curve_region(&crv, 0.0, 9.0).is_err());
//! assert_eq!(sink.len(), 1);
//! ```

pub use freeform_cagd;
pub use freeform_math;
pub use freeform_mvar;

pub mod config;
pub mod error;
pub mod sink;

pub use config::{ErrorPolicy, KernelConfig};
pub use error::{KernelError, Result};
pub use sink::{sink_for, CollectingSink, ErrorSink, LogSink, PanicSink};

use freeform_cagd::{Curve, Proximity, SrfDir, Surface, TriMesh};
use freeform_math::Vec3;
use freeform_mvar::{Bisector, BisectorPoint, BisectorSystem, Polyline, Primitive, Trisector};

/// A kernel session: configuration plus the error-reporting seam.
pub struct Kernel {
    config: KernelConfig,
    sink: Box<dyn ErrorSink>,
    collected: Option<CollectingSink>,
}

impl Default for Kernel {
    fn default() -> Self {
        Self::new(KernelConfig::default())
    }
}

impl std::fmt::Debug for Kernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kernel").field("config", &self.config).finish_non_exhaustive()
    }
}

impl Kernel {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Create a session whose sink follows `config.error_policy`.
    ///
    /// Under [`ErrorPolicy::Collect`] the recorded messages are available
    /// through [`Kernel::collected_errors`].
    pub fn new(config: KernelConfig) -> Self {
        let collected = (config.error_policy == ErrorPolicy::Collect).then(CollectingSink::new);
        let sink: Box<dyn ErrorSink> = match &collected {
            Some(c) => Box::new(c.clone()),
            None => sink_for(config.error_policy),
        };
        Self {
            config,
            sink,
            collected,
        }
    }

    /// Replace the error sink.
    ///
    /// Errors reported after this go only to `sink`; a host that wants to
    /// read them back keeps its own handle, as with a cloned
    /// [`CollectingSink`].
    pub fn with_sink(mut self, sink: Box<dyn ErrorSink>) -> Self {
        self.sink = sink;
        self.collected = None;
        self
    }

    /// Messages recorded under [`ErrorPolicy::Collect`], oldest first.
    ///
    /// Empty for every other policy and after [`Kernel::with_sink`].
    pub fn collected_errors(&self) -> Vec<String> {
        self.collected.as_ref().map(CollectingSink::messages).unwrap_or_default()
    }

    /// Create a session from a TOML configuration document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(Self::new(KernelConfig::from_toml_str(text)?))
    }

    /// The session configuration.
    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    fn check<T, E: Into<KernelError>>(&self, result: std::result::Result<T, E>) -> Result<T> {
        result.map_err(|e| {
            let err = e.into();
            self.sink.report(&err);
            err
        })
    }

    // =========================================================================
    // Curves
    // =========================================================================

    /// Euclidean point of `crv` at `t`.
    pub fn eval_curve(&self, crv: &Curve, t: f64) -> Result<Vec<f64>> {
        self.check(crv.eval_e(t))
    }

    /// Change the parameter domain of `crv` in place.
    pub fn set_curve_domain(&self, crv: &mut Curve, min: f64, max: f64) -> Result<()> {
        self.check(crv.set_domain(min, max))
    }

    /// Hodograph of `crv`.
    pub fn derive_curve(&self, crv: &Curve) -> Result<Curve> {
        self.check(crv.derive())
    }

    /// Derivative of every homogeneous coordinate of `crv`, weights included.
    pub fn derive_curve_scalar(&self, crv: &Curve) -> Result<Curve> {
        self.check(crv.derive_scalar())
    }

    /// Antiderivative of a non-rational `crv`.
    pub fn integrate_curve(&self, crv: &Curve) -> Result<Curve> {
        self.check(crv.integrate())
    }

    /// Split `crv` at `t` into the parts before and after it.
    pub fn subdiv_curve(&self, crv: &Curve, t: f64) -> Result<(Curve, Curve)> {
        self.check(crv.subdiv_at_param_with(t, &self.config.tolerance))
    }

    /// Insert `knots` into `crv`, or replace its interior knots when `replace`.
    pub fn refine_curve(&self, crv: &Curve, replace: bool, knots: &[f64]) -> Result<Curve> {
        self.check(crv.refine_at_params(replace, knots))
    }

    /// Raise the order of `crv` by one.
    pub fn raise_curve(&self, crv: &Curve) -> Result<Curve> {
        self.check(crv.degree_raise())
    }

    /// Raise `crv` to `order`.
    pub fn raise_curve_to(&self, crv: &Curve, order: usize) -> Result<Curve> {
        self.check(crv.degree_raise_n(order))
    }

    /// Lower the order of a Bezier or power `crv` by one.
    pub fn reduce_curve(&self, crv: &Curve) -> Result<Curve> {
        self.check(crv.degree_reduce())
    }

    /// Moebius reparametrization of `crv` with ratio `c`.
    pub fn moebius_curve(&self, crv: &Curve, c: f64) -> Result<Curve> {
        self.check(crv.moebius(c))
    }

    /// `crv` traversed backwards.
    pub fn reverse_curve(&self, crv: &Curve) -> Result<Curve> {
        self.check(crv.reverse())
    }

    /// Tangent of `crv` at `t`.
    pub fn curve_tangent(&self, crv: &Curve, t: f64, normalize: bool) -> Result<Vec3> {
        self.check(crv.tangent(t, normalize))
    }

    /// Principal normal of `crv` at `t`.
    pub fn curve_normal(&self, crv: &Curve, t: f64, normalize: bool) -> Result<Vec3> {
        self.check(crv.normal(t, normalize))
    }

    /// Binormal of `crv` at `t`.
    pub fn curve_binormal(&self, crv: &Curve, t: f64, normalize: bool) -> Result<Vec3> {
        self.check(crv.binormal(t, normalize))
    }

    /// In-plane normal of `crv` at `t`.
    pub fn curve_normal_xy(&self, crv: &Curve, t: f64, normalize: bool) -> Result<Vec3> {
        self.check(crv.normal_xy(t, normalize))
    }

    /// Split `crv` at every parameter in `params`, merging parameters closer
    /// than the configured parameter tolerance.
    pub fn split_curve(&self, crv: &Curve, params: &[f64]) -> Result<(Vec<Curve>, Proximity)> {
        let tol = &self.config.tolerance;
        let out = self.check(crv.subdiv_at_params_with(params, tol.param, tol))?;
        if !out.1.is_empty() {
            log::debug!("split of {} params raised proximity {:#05b}", params.len(), out.1.bits());
        }
        Ok(out)
    }

    /// Split `crv` at the parameters held in coordinate `axis` of `pts`.
    pub fn split_curve_at_points(
        &self,
        crv: &Curve,
        pts: &[Vec<f64>],
        axis: usize,
    ) -> Result<(Vec<Curve>, Proximity)> {
        let tol = &self.config.tolerance;
        self.check(crv.subdiv_at_params2_with(pts, axis, tol.param, tol))
    }

    /// The part of `crv` over `[t1, t2]`.
    pub fn curve_region(&self, crv: &Curve, t1: f64, t2: f64) -> Result<Curve> {
        self.check(crv.region_with(t1, t2, &self.config.tolerance))
    }

    // =========================================================================
    // Surfaces
    // =========================================================================

    /// Euclidean point of `srf` at `(u, v)`.
    pub fn eval_surface(&self, srf: &Surface, u: f64, v: f64) -> Result<Vec<f64>> {
        self.check(srf.eval_e(u, v))
    }

    /// Change both parameter domains of `srf` in place.
    pub fn set_surface_domain(
        &self,
        srf: &mut Surface,
        (u_min, u_max): (f64, f64),
        (v_min, v_max): (f64, f64),
    ) -> Result<()> {
        self.check(srf.set_domain(u_min, u_max, v_min, v_max))
    }

    /// Partial derivative surface of `srf` along `dir`.
    pub fn derive_surface(&self, srf: &Surface, dir: SrfDir) -> Result<Surface> {
        self.check(srf.derive(dir))
    }

    /// Coordinate-wise derivative of `srf` along `dir`, weights included.
    pub fn derive_surface_scalar(&self, srf: &Surface, dir: SrfDir) -> Result<Surface> {
        self.check(srf.derive_scalar(dir))
    }

    /// Split `srf` at `t` along `dir`.
    pub fn subdiv_surface(&self, srf: &Surface, t: f64, dir: SrfDir) -> Result<(Surface, Surface)> {
        self.check(srf.subdiv_at_param_with(t, dir, &self.config.tolerance))
    }

    /// Insert or replace knots of `srf` along `dir`.
    pub fn refine_surface(&self, srf: &Surface, dir: SrfDir, replace: bool, knots: &[f64]) -> Result<Surface> {
        self.check(srf.refine_at_params(dir, replace, knots))
    }

    /// Raise the order of `srf` along `dir` by one.
    pub fn raise_surface(&self, srf: &Surface, dir: SrfDir) -> Result<Surface> {
        self.check(srf.degree_raise(dir))
    }

    /// Raise `srf` along `dir` to `order`.
    pub fn raise_surface_to(&self, srf: &Surface, dir: SrfDir, order: usize) -> Result<Surface> {
        self.check(srf.degree_raise_n(dir, order))
    }

    /// Moebius reparametrization of `srf` along `dir`.
    pub fn moebius_surface(&self, srf: &Surface, c: f64, dir: SrfDir) -> Result<Surface> {
        self.check(srf.moebius(c, dir))
    }

    /// `srf` with the parametrization along `dir` reversed.
    pub fn reverse_surface(&self, srf: &Surface, dir: SrfDir) -> Result<Surface> {
        self.check(srf.reverse_dir(dir))
    }

    /// `srf` with U and V swapped.
    pub fn transpose_surface(&self, srf: &Surface) -> Surface {
        srf.reverse2()
    }

    /// Partial derivative vector of `srf` along `dir` at `(u, v)`.
    pub fn surface_tangent(&self, srf: &Surface, u: f64, v: f64, dir: SrfDir, normalize: bool) -> Result<Vec3> {
        self.check(srf.tangent(u, v, dir, normalize))
    }

    /// Normal of `srf` at `(u, v)`.
    pub fn surface_normal(&self, srf: &Surface, u: f64, v: f64, normalize: bool) -> Result<Vec3> {
        self.check(srf.normal(u, v, normalize))
    }

    /// Isoparametric curve of `srf` with the `dir` parameter held at `t`.
    pub fn iso_curve(&self, srf: &Surface, t: f64, dir: SrfDir) -> Result<Curve> {
        self.check(srf.crv_from_srf(t, dir))
    }

    /// The four boundary curves of `srf`.
    pub fn boundary_curves(&self, srf: &Surface) -> Result<[Curve; 4]> {
        self.check(srf.bndry_crvs())
    }

    /// Samples of `srf` on an `nu x nv` parameter grid.
    pub fn tri_mesh(&self, srf: &Surface, nu: usize, nv: usize) -> Result<TriMesh> {
        self.check(srf.to_tri_mesh(nu, nv))
    }

    /// The part of `srf` over `[t1, t2]` in direction `dir`.
    pub fn surface_region(&self, srf: &Surface, t1: f64, t2: f64, dir: SrfDir) -> Result<Surface> {
        self.check(srf.region_with(t1, t2, dir, &self.config.tolerance))
    }

    // =========================================================================
    // Bisectors and trisectors
    // =========================================================================

    /// Bisector of two spatial curves or surfaces.
    pub fn bisector(&self, a: &Primitive, b: &Primitive) -> Result<Bisector> {
        self.check(freeform_mvar::bisector(a, b))
    }

    /// Sample an implicit bisector with the configured solver.
    pub fn solve_bisector(&self, sys: &BisectorSystem, samples: usize) -> Result<Vec<BisectorPoint>> {
        self.check(sys.solve(samples, &self.config.solver))
    }

    /// Trace the bisector of two planar curves inside `bbox`.
    pub fn planar_bisector(
        &self,
        c1: &Curve,
        c2: &Curve,
        bbox: [(f64, f64); 2],
        support_params: bool,
    ) -> Result<Vec<Polyline>> {
        self.check(freeform_mvar::planar_bisector(
            c1,
            c2,
            bbox,
            &self.config.solver,
            support_params,
        ))
    }

    /// Trisector of three primitives inside `bbox`.
    pub fn trisector(&self, prims: &[Primitive; 3], bbox: &[(f64, f64)]) -> Result<Trisector> {
        self.check(freeform_mvar::trisector(prims, bbox, &self.config.solver))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use freeform_cagd::{CagdError, PointType};
    use freeform_math::Tolerance;
    use freeform_mvar::{MvarError, SolverConfig};

    fn wavy() -> Curve {
        let ctl = vec![vec![0.0], vec![2.0], vec![-1.0], vec![3.0], vec![1.0]];
        Curve::bspline_uniform(PointType::E1, 3, &ctl).unwrap()
    }

    fn collecting() -> (Kernel, CollectingSink) {
        let sink = CollectingSink::new();
        let kernel = Kernel::default().with_sink(Box::new(sink.clone()));
        (kernel, sink)
    }

    fn line3(a: [f64; 3], b: [f64; 3]) -> Curve {
        Curve::bezier(PointType::E3, &[a.to_vec(), b.to_vec()]).unwrap()
    }

    #[test]
    fn test_errors_reach_sink() {
        let (kernel, sink) = collecting();
        let crv = wavy();
        let (tmin, tmax) = crv.domain();
        let err = kernel.curve_region(&crv, tmin - 1.0, tmax).unwrap_err();
        assert!(matches!(err, KernelError::Cagd(CagdError::DomainTVerify { .. })));
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.messages()[0], err.to_string());
    }

    #[test]
    fn test_success_reports_nothing() {
        let (kernel, sink) = collecting();
        let crv = wavy();
        let (tmin, tmax) = crv.domain();
        let mid = 0.5 * (tmin + tmax);
        let part = kernel.curve_region(&crv, tmin, mid).unwrap();
        let a = kernel.eval_curve(&part, mid).unwrap();
        let b = kernel.eval_curve(&crv, mid).unwrap();
        assert_abs_diff_eq!(a[0], b[0], epsilon = 1e-10);

        let (pieces, prox) = kernel.split_curve(&crv, &[mid, mid + 1e-9]).unwrap();
        assert_eq!(pieces.len(), 2);
        assert_eq!(prox, Proximity::COLLAPSED);
        assert!(sink.is_empty());
    }

    #[test]
    #[should_panic(expected = "fatal kernel error")]
    fn test_panic_policy() {
        let config = KernelConfig {
            error_policy: ErrorPolicy::Panic,
            ..KernelConfig::default()
        };
        let kernel = Kernel::new(config);
        let crv = wavy();
        let _ = kernel.curve_region(&crv, -10.0, 0.5);
    }

    #[test]
    fn test_collect_policy_keeps_messages() {
        let kernel = Kernel::from_toml_str("error_policy = \"collect\"").unwrap();
        let crv = wavy();
        assert!(kernel.collected_errors().is_empty());
        let err = kernel.curve_region(&crv, -10.0, 0.5).unwrap_err();
        assert!(kernel.subdiv_curve(&crv, 1.5).is_err());
        let messages = kernel.collected_errors();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], err.to_string());

        // An injected sink takes over; the built-in record is dropped.
        let sink = CollectingSink::new();
        let kernel = kernel.with_sink(Box::new(sink.clone()));
        assert!(kernel.reverse_surface(&patch(), SrfDir::U).is_ok());
        assert!(kernel.curve_region(&crv, -10.0, 0.5).is_err());
        assert!(kernel.collected_errors().is_empty());
        assert_eq!(sink.len(), 1);

        assert!(Kernel::default().collected_errors().is_empty());
    }

    #[test]
    fn test_from_toml() {
        let kernel = Kernel::from_toml_str("[tolerance]\nparam = 1e-3\n").unwrap();
        assert_eq!(kernel.config().tolerance.param, 1e-3);
        assert!(matches!(
            Kernel::from_toml_str("[tolerance]\nparam = 0.0\n"),
            Err(KernelError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_bisector_through_kernel() {
        let (kernel, sink) = collecting();
        let c1 = line3([0.0, 0.0, -1.0], [1.0, 0.0, -1.0]);
        let c2 = line3([0.0, 0.0, 1.0], [0.0, 1.0, 1.0]);
        let Bisector::Surface(srf) = kernel.bisector(&c1.into(), &c2.into()).unwrap() else {
            panic!("expected a surface");
        };
        let p = kernel.eval_surface(&srf, 0.5, 0.5).unwrap();
        assert_abs_diff_eq!(p[2], 0.0, epsilon = 1e-10);

        let planar = Curve::bezier(PointType::E2, &[vec![0.0, 0.0], vec![1.0, 0.0]]).unwrap();
        let err = kernel.bisector(&planar.clone().into(), &planar.into()).unwrap_err();
        assert!(matches!(err, KernelError::Mvar(MvarError::GeomNoSupport(_))));
        assert_eq!(sink.len(), 1);
    }

    fn patch() -> Surface {
        let mut ctl = Vec::new();
        for row in 0..2 {
            for col in 0..3 {
                ctl.push(vec![col as f64, row as f64, (col * row) as f64]);
            }
        }
        Surface::bezier(PointType::E3, 3, 2, &ctl).unwrap()
    }

    fn kernel_with(config: KernelConfig) -> (Kernel, CollectingSink) {
        let sink = CollectingSink::new();
        let kernel = Kernel::new(config).with_sink(Box::new(sink.clone()));
        (kernel, sink)
    }

    #[test]
    fn test_curve_operations() {
        let (kernel, sink) = collecting();
        let crv = wavy();
        let (left, right) = kernel.subdiv_curve(&crv, 0.4).unwrap();
        assert_eq!(left.domain(), (0.0, 0.4));
        assert_eq!(right.domain(), (0.4, 1.0));
        let a = kernel.eval_curve(&right, 0.7).unwrap();
        let b = kernel.eval_curve(&crv, 0.7).unwrap();
        assert_abs_diff_eq!(a[0], b[0], epsilon = 1e-12);

        let raised = kernel.raise_curve(&crv).unwrap();
        assert_eq!(raised.order, 4);
        let rev = kernel.reverse_curve(&crv).unwrap();
        let a = kernel.eval_curve(&rev, 0.25).unwrap();
        let b = kernel.eval_curve(&crv, 0.75).unwrap();
        assert_abs_diff_eq!(a[0], b[0], epsilon = 1e-12);
        assert!(sink.is_empty());

        let err = kernel.raise_curve_to(&crv, 2).unwrap_err();
        assert!(matches!(err, KernelError::Cagd(CagdError::WrongOrder(_))));
        assert!(kernel.subdiv_curve(&crv, 1.5).is_err());
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.messages()[0], err.to_string());
    }

    #[test]
    fn test_curve_frames() {
        let (kernel, sink) = collecting();
        let arc = Curve::bezier(PointType::E2, &[vec![0.0, 0.0], vec![1.0, 1.0], vec![2.0, 0.0]]).unwrap();
        let t = kernel.curve_tangent(&arc, 0.5, true).unwrap();
        assert_abs_diff_eq!(t.x, 1.0, epsilon = 1e-12);
        let n = kernel.curve_normal(&arc, 0.5, true).unwrap();
        assert_abs_diff_eq!(n.y, -1.0, epsilon = 1e-12);
        let nxy = kernel.curve_normal_xy(&arc, 0.5, true).unwrap();
        assert_abs_diff_eq!(nxy.y, -1.0, epsilon = 1e-12);
        let b = kernel.curve_binormal(&arc, 0.5, true).unwrap();
        assert_abs_diff_eq!(b.z, -1.0, epsilon = 1e-12);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_periodic_degree_raise() {
        let (kernel, sink) = collecting();
        let ctl = [[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0]];
        let points = vec![
            vec![],
            ctl.iter().map(|p| p[0]).collect(),
            ctl.iter().map(|p| p[1]).collect(),
        ];
        let knots = (0..9).map(|i| i as f64).collect();
        let crv = Curve::new_periodic(PointType::E2, 3, points, knots).unwrap();
        let raised = kernel.raise_curve(&crv).unwrap();
        assert_eq!(raised.order, 4);
        let (tmin, tmax) = crv.domain();
        assert_abs_diff_eq!(raised.domain().0, tmin, epsilon = 1e-12);
        assert_abs_diff_eq!(raised.domain().1, tmax, epsilon = 1e-12);
        for t in [tmin, tmin + 0.3, 0.5 * (tmin + tmax), tmax - 0.7, tmax] {
            let a = kernel.eval_curve(&crv, t).unwrap();
            let b = kernel.eval_curve(&raised, t).unwrap();
            assert_abs_diff_eq!(a[0], b[0], epsilon = 1e-10);
            assert_abs_diff_eq!(a[1], b[1], epsilon = 1e-10);
        }
        assert!(sink.is_empty());
    }

    #[test]
    fn test_surface_operations() {
        let (kernel, sink) = collecting();
        let srf = patch();
        let (lo, hi) = kernel.subdiv_surface(&srf, 0.5, SrfDir::U).unwrap();
        // Bezier pieces are reparametrized over [0, 1].
        for (piece, u) in [(&lo, 0.25), (&hi, 0.75)] {
            let a = kernel.eval_surface(piece, 0.5, 0.5).unwrap();
            let b = kernel.eval_surface(&srf, u, 0.5).unwrap();
            for (x, y) in a.iter().zip(&b) {
                assert_abs_diff_eq!(x, y, epsilon = 1e-12);
            }
        }

        let iso = kernel.iso_curve(&srf, 0.3, SrfDir::U).unwrap();
        let p = kernel.eval_curve(&iso, 0.6).unwrap();
        let q = kernel.eval_surface(&srf, 0.3, 0.6).unwrap();
        assert_abs_diff_eq!(p[2], q[2], epsilon = 1e-12);

        let [_, umax, _, _] = kernel.boundary_curves(&srf).unwrap();
        assert_eq!(umax.ctl_point_e(1), vec![2.0, 1.0, 2.0]);

        let flipped = kernel.reverse_surface(&srf, SrfDir::V).unwrap();
        let p = kernel.eval_surface(&flipped, 0.3, 0.2).unwrap();
        let q = kernel.eval_surface(&srf, 0.3, 0.8).unwrap();
        assert_abs_diff_eq!(p[2], q[2], epsilon = 1e-12);

        let n = kernel.surface_normal(&srf, 0.5, 0.5, true).unwrap();
        assert_abs_diff_eq!(n.norm(), 1.0, epsilon = 1e-12);
        let mesh = kernel.tri_mesh(&srf, 3, 3).unwrap();
        assert_eq!(mesh.num_triangles(), 8);
        assert!(sink.is_empty());

        assert!(matches!(
            kernel.tri_mesh(&srf, 1, 3),
            Err(KernelError::Cagd(CagdError::WrongSize(_)))
        ));
        assert!(kernel.raise_surface_to(&srf, SrfDir::U, 1).is_err());
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn test_tolerance_config_drives_operations() {
        let crv = wavy();
        let (kernel, sink) = collecting();
        let (pieces, prox) = kernel.split_curve(&crv, &[1e-4, 0.5]).unwrap();
        assert_eq!(pieces.len(), 3);
        assert_eq!(prox, Proximity::NONE);
        let part = kernel.curve_region(&crv, -1e-7, 0.5).unwrap();
        assert_eq!(part.domain(), (0.0, 0.5));
        assert!(sink.is_empty());

        let (coarse, _) = kernel_with(KernelConfig {
            tolerance: Tolerance {
                knot: 1e-3,
                ..Tolerance::DEFAULT
            },
            ..KernelConfig::default()
        });
        let (pieces, prox) = coarse.split_curve(&crv, &[1e-4, 0.5]).unwrap();
        assert_eq!(pieces.len(), 2);
        assert_eq!(prox, Proximity::NEAR_MIN);

        let (strict, sink) = kernel_with(KernelConfig {
            tolerance: Tolerance {
                param: 1e-9,
                ..Tolerance::DEFAULT
            },
            ..KernelConfig::default()
        });
        assert!(matches!(
            strict.curve_region(&crv, -1e-7, 0.5),
            Err(KernelError::Cagd(CagdError::DomainTVerify { .. }))
        ));
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_planar_bisector_through_kernel() {
        let (kernel, sink) = kernel_with(KernelConfig {
            solver: SolverConfig {
                step: 2e-2,
                ..SolverConfig::default()
            },
            ..KernelConfig::default()
        });
        let c1 = Curve::bezier(PointType::E2, &[vec![1.0, 0.0], vec![3.0, 0.0]]).unwrap();
        let c2 = Curve::bezier(PointType::E2, &[vec![0.0, 1.0], vec![0.0, 3.0]]).unwrap();
        let lines = kernel
            .planar_bisector(&c1, &c2, [(0.0, 4.0), (0.0, 4.0)], false)
            .unwrap();
        assert_eq!(lines.len(), 1);
        for v in &lines[0] {
            assert_abs_diff_eq!(v[0], v[1], epsilon = 1e-6);
        }

        let spatial = line3([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
        assert!(kernel
            .planar_bisector(&spatial, &c2, [(0.0, 4.0), (0.0, 4.0)], false)
            .is_err());
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_trisector_through_kernel() {
        let (kernel, sink) = kernel_with(KernelConfig {
            solver: SolverConfig {
                subdiv_tol: 5e-2,
                ..SolverConfig::default()
            },
            ..KernelConfig::default()
        });
        let segment = |a: [f64; 2], b: [f64; 2]| -> Primitive {
            Curve::bezier(PointType::E2, &[a.to_vec(), b.to_vec()]).unwrap().into()
        };
        let prims = [
            segment([0.0, 0.0], [4.0, 0.0]),
            segment([0.0, 0.0], [0.0, 4.0]),
            segment([4.0, 0.0], [0.0, 4.0]),
        ];
        let tri = kernel.trisector(&prims, &[(-1.0, 5.0), (-1.0, 5.0)]).unwrap();
        let pts = tri.spatial(2);
        assert_eq!(pts.len(), 1);
        let r = 4.0 - 2.0 * std::f64::consts::SQRT_2;
        assert_abs_diff_eq!(pts[0][0], r, epsilon = 1e-6);
        assert_abs_diff_eq!(pts[0][1], r, epsilon = 1e-6);
        assert!(sink.is_empty());

        let err = kernel.trisector(&prims, &[(0.0, 1.0)]).unwrap_err();
        assert!(matches!(err, KernelError::Mvar(MvarError::GeomNoSupport(_))));
        assert_eq!(sink.len(), 1);
    }
}
