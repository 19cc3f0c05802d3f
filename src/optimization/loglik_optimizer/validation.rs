//! Consistency checks shared by the optimizers.
//!
//! Tolerances, gradients, Hessians and parameter vectors are validated here so
//! every optimizer reports the same [`OptError`] variants for the same
//! problems. Each check stops at the first offending entry.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{Grad, Theta, types::Hessian},
};

/// `Err(reason)` unless `tol` is finite and strictly positive.
fn positive_finite(tol: f64) -> Result<(), &'static str> {
    if !tol.is_finite() {
        return Err("Tolerance must be finite.");
    }
    if tol <= 0.0 {
        return Err("Tolerance must be positive.");
    }
    Ok(())
}

/// Validate an optional gradient-norm tolerance. `None` disables the rule.
///
/// # Errors
/// [`OptError::InvalidTolGrad`] for non-finite or non-positive values.
pub fn verify_tol_grad(tol: Option<f64>) -> OptResult<()> {
    match tol {
        Some(tol) => positive_finite(tol).map_err(|reason| OptError::InvalidTolGrad { tol, reason }),
        None => Ok(()),
    }
}

/// Validate an optional cost-change tolerance. `None` disables the rule.
///
/// # Errors
/// [`OptError::InvalidTolCost`] for non-finite or non-positive values.
pub fn verify_tol_cost(tol: Option<f64>) -> OptResult<()> {
    match tol {
        Some(tol) => positive_finite(tol).map_err(|reason| OptError::InvalidTolCost { tol, reason }),
        None => Ok(()),
    }
}

/// Validate an input parameter vector against its expected length.
///
/// # Errors
/// - [`OptError::ThetaLengthMismatch`] on a length mismatch.
/// - [`OptError::InvalidThetaInput`] for the first non-finite entry.
pub fn validate_theta(theta: &Theta, dim: usize) -> OptResult<()> {
    if theta.len() != dim {
        return Err(OptError::ThetaLengthMismatch { expected: dim, actual: theta.len() });
    }
    match theta.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        Some((index, &value)) => Err(OptError::InvalidThetaInput { index, value }),
        None => Ok(()),
    }
}

/// Validate a gradient's length and entries.
///
/// # Errors
/// - [`OptError::GradientDimMismatch`] on a length mismatch.
/// - [`OptError::InvalidGradient`] for the first non-finite entry.
pub fn validate_grad(grad: &Grad, dim: usize) -> OptResult<()> {
    if grad.len() != dim {
        return Err(OptError::GradientDimMismatch { expected: dim, found: grad.len() });
    }
    match grad.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        Some((index, &value)) => Err(OptError::InvalidGradient {
            index,
            value,
            reason: "Gradient elements must be finite.",
        }),
        None => Ok(()),
    }
}

/// Unwrap a final estimate, requiring every entry to be finite.
///
/// # Errors
/// - [`OptError::MissingThetaHat`] if the solver produced none.
/// - [`OptError::InvalidThetaHat`] for the first non-finite entry.
pub fn validate_theta_hat(theta_hat: Option<Theta>) -> OptResult<Theta> {
    let theta_hat = theta_hat.ok_or(OptError::MissingThetaHat)?;
    let offender = theta_hat.iter().position(|v| !v.is_finite());
    if let Some(index) = offender {
        return Err(OptError::InvalidThetaHat {
            index,
            value: theta_hat[index],
            reason: "Parameter estimates must be finite.",
        });
    }
    Ok(theta_hat)
}

/// Require a finite log-likelihood value.
///
/// # Errors
/// [`OptError::NonFiniteCost`] for NaN or ±∞.
pub fn validate_value(value: f64) -> OptResult<()> {
    if !value.is_finite() {
        return Err(OptError::NonFiniteCost { value });
    }
    Ok(())
}

/// Validate a Hessian's shape (`dim × dim`) and entries.
///
/// # Errors
/// - [`OptError::HessianDimMismatch`] on a shape mismatch.
/// - [`OptError::InvalidHessian`] for the first non-finite entry.
pub fn validate_hessian(hessian: &Hessian, dim: usize) -> OptResult<()> {
    if hessian.nrows() != dim || hessian.ncols() != dim {
        return Err(OptError::HessianDimMismatch {
            expected: dim,
            found: (hessian.nrows(), hessian.ncols()),
        });
    }
    match hessian.indexed_iter().find(|(_, v)| !v.is_finite()) {
        Some(((row, col), &value)) => Err(OptError::InvalidHessian { row, col, value }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // First-offender reporting for each validator.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Tolerance checks accept `None` and positive values only.
    //
    // Given
    // -----
    // - `None`, 1e-6, 0.0 and +∞.
    //
    // Expect
    // ------
    // - The first two pass; zero and ∞ fail with the matching variant.
    fn tolerance_checks_require_positive_finite_values() {
        assert!(verify_tol_grad(None).is_ok());
        assert!(verify_tol_cost(Some(1e-6)).is_ok());
        assert!(matches!(verify_tol_cost(Some(0.0)), Err(OptError::InvalidTolCost { .. })));
        assert!(matches!(
            verify_tol_grad(Some(f64::INFINITY)),
            Err(OptError::InvalidTolGrad { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Vector validators report the first bad index.
    //
    // Given
    // -----
    // - θ = [1, NaN, ∞] against dim 3 and a gradient of the wrong length.
    //
    // Expect
    // ------
    // - `InvalidThetaInput` at index 1 and `GradientDimMismatch`.
    fn vector_validators_report_first_offender() {
        let theta = array![1.0, f64::NAN, f64::INFINITY];

        assert!(matches!(
            validate_theta(&theta, 3),
            Err(OptError::InvalidThetaInput { index: 1, .. })
        ));
        assert_eq!(
            validate_grad(&array![0.0], 2),
            Err(OptError::GradientDimMismatch { expected: 2, found: 1 })
        );
        assert_eq!(validate_theta_hat(None), Err(OptError::MissingThetaHat));
    }

    #[test]
    // Purpose
    // -------
    // Hessian validation checks shape before entries.
    //
    // Given
    // -----
    // - A 2×3 matrix and a 2×2 matrix with NaN at (1, 0).
    //
    // Expect
    // ------
    // - `HessianDimMismatch`, then `InvalidHessian` at (1, 0).
    fn hessian_validation_checks_shape_then_entries() {
        let mut square = Array2::<f64>::zeros((2, 2));
        square[[1, 0]] = f64::NAN;

        assert!(matches!(
            validate_hessian(&Array2::zeros((2, 3)), 2),
            Err(OptError::HessianDimMismatch { expected: 2, found: (2, 3) })
        ));
        assert!(matches!(
            validate_hessian(&square, 2),
            Err(OptError::InvalidHessian { row: 1, col: 0, .. })
        ));
    }
}
