//! inference::hessian — analytic softmax Hessian, in-place inversion, and
//! standard errors.
//!
//! Purpose
//! -------
//! Provide the second-order quantities of a softmax CPD log-likelihood:
//! the analytic Hessian with respect to the flat θ layout, an in-place
//! inverse for Newton-type updates, and classical standard errors derived
//! from the observed information.
//!
//! Key behaviors
//! -------------
//! - [`log_likelihood_hessian`] accumulates
//!   `∂²ℓ/∂θ_(k,i)∂θ_(l,j) = −Σ_obs s_k (δ_kl − s_l) x_i x_j` with the bias
//!   slot treated as a parent of constant value 1.
//! - [`invert_in_place`] copies into a `nalgebra::DMatrix`, inverts with LU,
//!   and writes the inverse back into the `ndarray` buffer.
//! - [`standard_errors`] forms the observed information `J = −H` and takes
//!   the square roots of the diagonal of its eigen-truncated pseudoinverse.
//!
//! Invariants & assumptions
//! ------------------------
//! - Parameters are pivoted; the Hessian covers the `(K − 1)·(P + 1)` free
//!   entries only and is symmetric negative semi-definite.
//! - Eigenvalues of `J` at or below [`EIGEN_EPS`] are dropped, inflating
//!   standard errors along weakly identified directions instead of failing.
//!
//! Conventions
//! -----------
//! - Row/column index `k·(P + 1) + i` addresses state `k`, slot `i`, with
//!   `i == P` the bias, matching
//!   [`SoftmaxShape::theta_index`](crate::cpd::core::shape::SoftmaxShape::theta_index).
//! - The Hessian is on the **summed** log-likelihood scale.
//!
//! Downstream usage
//! ----------------
//! - `FitSession::calculate_hessian` writes [`log_likelihood_hessian`] into
//!   the session buffer and calls [`invert_in_place`].
//! - The Newton direction strategy in `optimization::ascent` uses the same
//!   pair to form `−H⁻¹ g`.
//! - `FitSession::standard_errors` calls [`standard_errors`] at the fitted
//!   parameters.
//!
//! Testing notes
//! -------------
//! - Unit tests compare the analytic Hessian with central finite
//!   differences of the analytic gradient, check inversion on known
//!   matrices, and check standard errors against a diagonal information
//!   matrix.
use nalgebra::DMatrix;
use ndarray::{Array1, Array2};

use crate::{
    cpd::{
        core::{
            likelihood::fill_pivoted_probabilities, observations::SoftmaxObservations,
            params::SoftmaxParams,
        },
        errors::{CPDError, CPDResult},
    },
    optimization::{loglik_optimizer::types::Hessian, numerical_stability::EIGEN_EPS},
};

/// log_likelihood_hessian — analytic Hessian of the softmax log-likelihood.
///
/// Parameters
/// ----------
/// - `params`: `&SoftmaxParams`
///   Pivoted parameters at which the Hessian is evaluated.
/// - `obs`: `&SoftmaxObservations`
///   Observation batch already checked against the CPD's shape.
///
/// Returns
/// -------
/// `Hessian`
///   Square matrix of side `(K − 1)·(P + 1)`.
///
/// Notes
/// -----
/// - Labels do not enter the Hessian; only parent values and the model's
///   class probabilities do.
/// - Cost is `O(n_obs · K² · P²)`.
pub fn log_likelihood_hessian(params: &SoftmaxParams, obs: &SoftmaxObservations) -> Hessian {
    let shape = params.shape();
    let free_states = shape.child_states.saturating_sub(1);
    let width = shape.node_count();
    let mut hessian = Hessian::zeros((shape.hessian_side(), shape.hessian_side()));
    let mut logits = Array1::zeros(free_states);
    let mut probs = Array1::zeros(free_states);
    let mut x_ext = Array1::<f64>::ones(width);
    for (x, _) in obs.iter() {
        fill_pivoted_probabilities(params, x, &mut logits, &mut probs);
        x_ext.slice_mut(ndarray::s![..shape.parent_count]).assign(&x);
        for k in 0..free_states {
            for l in 0..free_states {
                let delta = if k == l { 1.0 } else { 0.0 };
                let coeff = probs[k] * (delta - probs[l]);
                for i in 0..width {
                    let row = shape.theta_index(k, i);
                    for j in 0..width {
                        hessian[[row, shape.theta_index(l, j)]] -= coeff * x_ext[i] * x_ext[j];
                    }
                }
            }
        }
    }
    hessian
}

/// invert_in_place — replace a square matrix with its inverse.
///
/// Errors
/// ------
/// - [`CPDError::NonSquareMatrix`] if `matrix` is not square.
/// - [`CPDError::SingularHessian`] if LU inversion fails or produces
///   non-finite entries. `matrix` is left unchanged in both cases.
pub fn invert_in_place(matrix: &mut Array2<f64>) -> CPDResult<()> {
    let (rows, cols) = matrix.dim();
    if rows != cols {
        return Err(CPDError::NonSquareMatrix { rows, cols });
    }
    let mut nalg = DMatrix::<f64>::zeros(rows, cols);
    fill_dmatrix(matrix, &mut nalg, 1.0);
    let inverse = nalg.try_inverse().ok_or(CPDError::SingularHessian { dim: rows })?;
    if inverse.iter().any(|v| !v.is_finite()) {
        return Err(CPDError::SingularHessian { dim: rows });
    }
    for ((i, j), value) in matrix.indexed_iter_mut() {
        *value = inverse[(i, j)];
    }
    Ok(())
}

/// standard_errors — classical standard errors from a log-likelihood Hessian.
///
/// Purpose
/// -------
/// Turn the Hessian `H` of the summed log-likelihood at the MLE into
/// per-parameter standard errors using the observed information `J = −H`.
///
/// Returns
/// -------
/// `CPDResult<Array1<f64>>`
///   One standard error per θ entry, in θ order.
///
/// Errors
/// ------
/// - [`CPDError::NonSquareMatrix`] if `hessian` is not square.
///
/// Notes
/// -----
/// - Implements `Var(θ̂_i) = Σ_{k: λ_k > EIGEN_EPS} Q[i,k]² / λ_k` with
///   `J = Q Λ Qᵀ`; the return value is the element-wise square root.
pub fn standard_errors(hessian: &Hessian) -> CPDResult<Array1<f64>> {
    let (rows, cols) = hessian.dim();
    if rows != cols {
        return Err(CPDError::NonSquareMatrix { rows, cols });
    }
    let mut obs_info = DMatrix::<f64>::zeros(rows, cols);
    fill_dmatrix(hessian, &mut obs_info, -1.0);
    let eigen_decomp = obs_info.symmetric_eigen();
    let q = eigen_decomp.eigenvectors;
    let eigenvals = eigen_decomp.eigenvalues;
    let se = (0..rows)
        .map(|i| {
            eigenvals
                .iter()
                .enumerate()
                .filter(|(_, lambda)| **lambda > EIGEN_EPS)
                .map(|(k, &lambda)| q[(i, k)] * q[(i, k)] / lambda)
                .sum::<f64>()
                .sqrt()
        })
        .collect();
    Ok(se)
}

// ---- Helper methods ----

/// Copy `scale · source` into a preallocated `DMatrix`, column by column.
fn fill_dmatrix(source: &Array2<f64>, target: &mut DMatrix<f64>, scale: f64) {
    let (rows, cols) = source.dim();
    for j in 0..cols {
        for i in 0..rows {
            target[(i, j)] = scale * source[[i, j]];
        }
    }
}
