#![warn(missing_docs)]

//! Multivariate constraints and bisectors for the freeform geometry kernel.
//!
//! - **Multivariates**: tensor product functions of any number of
//!   parameters, built from curves and surfaces and promoted into shared
//!   parameter spaces
//! - **Algebra**: sums, products, inner products and determinants of
//!   multivariates in Bezier or piecewise Bezier form
//! - **Solvers**: subdivision zero finding with Newton polishing, and
//!   predictor-corrector tracing of one dimensional zero sets
//! - **Bisectors**: curve and surface bisectors in space, traced planar
//!   curve bisectors and trisectors of three primitives

pub mod algebra;
pub mod bisect;
pub mod error;
pub mod mvar;
pub mod trace;
pub mod trisect;
pub mod zeros;

pub use algebra::{align, align_all, determinant};
pub use bisect::{bisector, planar_bisector, Bisector, BisectorPoint, BisectorSystem, Primitive};
pub use error::{MvarError, Result};
pub use mvar::Mvar;
pub use trace::{univar_inter, Polyline};
pub use trisect::{trisector, trisector_equations, Trisector};
pub use zeros::{solve_on_slices, solve_zeros, SolverConfig};
