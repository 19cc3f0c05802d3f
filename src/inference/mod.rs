//! inference — second-order quantities of the softmax log-likelihood.
//!
//! Purpose
//! -------
//! Provide the analytic Hessian in the flat θ layout, its in-place inverse
//! for Newton-type updates and session buffers, and classical standard
//! errors from the observed information.
//!
//! Conventions
//! -----------
//! - Errors are reported as [`CPDError`](crate::cpd::errors::CPDError);
//!   singular or non-square inputs never panic.
//! - Hessians are on the summed log-likelihood scale.

pub mod hessian;

pub use self::hessian::{invert_in_place, log_likelihood_hessian, standard_errors};

pub mod prelude {
    pub use super::hessian::{invert_in_place, log_likelihood_hessian, standard_errors};
}
