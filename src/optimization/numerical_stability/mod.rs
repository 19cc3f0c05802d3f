//! numerical_stability — overflow-safe softmax arithmetic and shared
//! numerical tolerances.
//!
//! Purpose
//! -------
//! Collect the small numeric kernels that every softmax likelihood,
//! gradient, and Hessian pass relies on, plus the tolerances shared by the
//! optimizers and the inference layer.
//!
//! Key behaviors
//! -------------
//! - `log1p_sum_exp`: stable `log(1 + Σ exp(z_k))` for pivoted logits.
//! - `pivoted_softmax_into`: per-observation class probabilities of the
//!   non-pivot states, written in place.
//! - `stable_softmax`: full softmax over all states for inference-time
//!   probabilities on unpivoted parameters.
//! - `EIGEN_EPS` and `MIN_LINE_SEARCH_STEP` centralize tolerances.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are finite; observation and parameter validation happen in the
//!   CPD layer.
//! - Every exponent evaluated here is `<= 0`, so results stay finite for
//!   arbitrarily large finite logits.
//!
//! Conventions
//! -----------
//! - Routines operate on `ndarray` views and write into caller buffers
//!   where they sit inside per-observation loops.
//! - No logging or I/O; these are pure helpers for tight inner loops.
//!
//! Testing notes
//! -------------
//! - Unit tests in [`transformations`] compare against naïve formulas on
//!   safe inputs and check finiteness far past the `exp` overflow point.

pub mod transformations;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::transformations::{
    EIGEN_EPS, MIN_LINE_SEARCH_STEP, log1p_sum_exp, pivoted_softmax_into, stable_softmax,
};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use pgm_softmax::optimization::numerical_stability::prelude::*;
//
// to import the numerical-stability surface in a single line.

pub mod prelude {
    pub use super::transformations::{
        EIGEN_EPS, MIN_LINE_SEARCH_STEP, log1p_sum_exp, pivoted_softmax_into, stable_softmax,
    };
}
