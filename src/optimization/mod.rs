//! optimization — maximizers, numerical helpers, and the optimizer error surface.
//!
//! Purpose
//! -------
//! Fit softmax parameters by maximizing a log-likelihood `ℓ(θ)` over the flat
//! parameter vector. Two families share one objective trait and one outcome
//! type:
//!
//! - [`ascent`]: line-search gradient ascent, conjugate gradient and Newton
//!   directions with a persistent step.
//! - [`loglik_optimizer`]: argmin-backed L-BFGS.
//!
//! Key behaviors
//! -------------
//! - [`numerical_stability`] provides the overflow-safe softmax and
//!   log-sum-exp kernels used by the likelihood.
//! - [`errors::OptError`] normalizes configuration problems, numerical
//!   failures and argmin backend errors; [`errors::OptResult`] is the common
//!   result alias.
//!
//! Conventions
//! -----------
//! - User-facing values are log-likelihoods; only the argmin adapter works
//!   with the negated cost.
//! - Progress is reported through the `log` facade at `debug`/`trace`, and
//!   stalls at `warn`. No logger is installed here.

pub mod ascent;
pub mod errors;
pub mod loglik_optimizer;
pub mod numerical_stability;

pub mod prelude {
    pub use super::ascent::{
        AscentOptions, ConjugateGradient, DirectionStrategy, NewtonStep, SteepestAscent,
        maximize_ascent,
    };
    pub use super::errors::{OptError, OptResult};
    pub use super::loglik_optimizer::prelude::*;
    pub use super::numerical_stability::prelude::*;
}
