//! cpd — softmax conditional probability distributions.
//!
//! Purpose
//! -------
//! Represent a multinomial-logistic distribution of a discrete child given
//! continuous parents, and fit it by maximum likelihood.
//!
//! Key behaviors
//! -------------
//! - [`models::SoftmaxCPD`] owns weights `[K, P]` and offsets `[K]` with
//!   explicit private/shared clone semantics and unit-form support.
//! - [`models::FitSession`] fits deep learning copies with gradient ascent,
//!   conjugate gradient or L-BFGS, and computes Hessians and standard errors.
//! - [`errors::CPDError`] reports failures with a coarse
//!   [`errors::ErrorKind`] the surrounding framework dispatches on.
//!
//! Invariants & assumptions
//! ------------------------
//! - The last node is the discrete child; all other nodes are scalar
//!   continuous parents.
//! - Fitting pivots the parameters so the last state's logit is zero.
//!
//! Downstream usage
//! ----------------
//! - `use pgm_softmax::cpd::prelude::*;` imports the CPD, sessions, options
//!   and observation types in one line.
//!
//! Testing notes
//! -------------
//! - Unit tests live beside each module; `tests/integration_softmax_pipeline.rs`
//!   runs full fits.

pub mod core;
pub mod errors;
pub mod models;

pub mod prelude {
    pub use super::core::{
        DenseMatrix, FitOptions, MatrixHandle, NodeType, OptimizerKind, SoftmaxObservations,
        SoftmaxParams, SoftmaxShape,
    };
    pub use super::errors::{CPDError, CPDResult, ErrorKind};
    pub use super::models::{
        Comparison, DistribFun, DistributionType, FitSession, MatrixRole, SoftmaxCPD,
    };
}
