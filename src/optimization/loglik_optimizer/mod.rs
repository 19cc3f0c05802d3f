//! loglik_optimizer — argmin-backed maximization of log-likelihoods.
//!
//! Purpose
//! -------
//! Define the objective contract ([`LogLikelihood`]) shared by every
//! optimizer in the crate, and provide an L-BFGS maximizer ([`maximize`])
//! built on argmin for objectives that do not need the line-search ascent
//! loop in [`crate::optimization::ascent`].
//!
//! Key behaviors
//! -------------
//! - [`adapter::ArgMinAdapter`] turns `ℓ(θ)` into the argmin cost `-ℓ(θ)` and
//!   central-differences the cost when no analytic gradient exists.
//! - [`builders`] construct L-BFGS with a Hager–Zhang or More–Thuente line
//!   search; [`run::run_lbfgs`] executes it and normalizes the final state.
//! - [`validation`] holds the finiteness and shape checks used by both
//!   optimizer families.
//!
//! Invariants & assumptions
//! ------------------------
//! - Objectives report recoverable problems as [`OptError`] values and do
//!   not panic on bad inputs.
//! - [`OptimOutcome::value`] is always a log-likelihood, never a cost.
//!
//! Downstream usage
//! ----------------
//! - `SoftmaxObjective` implements [`LogLikelihood`] and is driven either by
//!   [`maximize`] (L-BFGS) or by the ascent optimizers.
//!
//! Testing notes
//! -------------
//! - Unit tests cover sign handling and the finite-difference fallback in
//!   [`adapter`], solver construction in [`builders`], quadratic optima in
//!   [`api`], and validators in [`validation`].
//!
//! [`OptError`]: crate::optimization::errors::OptError

pub mod adapter;
pub mod api;
pub mod builders;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

pub use self::api::maximize;
pub use self::traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, FnEvalMap, Grad, Hessian, Theta};

pub mod prelude {
    pub use super::api::maximize;
    pub use super::traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
    pub use super::types::{Cost, Grad, Hessian, Theta};
}
