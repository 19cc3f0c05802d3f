//! Stopping rules and step configuration for the line-search ascent loop.
use crate::optimization::errors::{OptError, OptResult};

/// Configuration of a [`maximize_ascent`](super::run::maximize_ascent) run.
///
/// - `accuracy`: relative log-likelihood change below which the run stops.
/// - `initial_step`: first (and restored) line-search step; may be negative.
/// - `max_iter`: cap on outer iterations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AscentOptions {
    pub accuracy: f64,
    pub initial_step: f64,
    pub max_iter: usize,
}

impl AscentOptions {
    /// Build validated options.
    ///
    /// # Errors
    /// - [`OptError::InvalidTolCost`] unless `accuracy` is finite and positive.
    /// - [`OptError::InvalidStep`] unless `initial_step` is finite and non-zero.
    /// - [`OptError::InvalidMaxIter`] when `max_iter == 0`.
    pub fn new(accuracy: f64, initial_step: f64, max_iter: usize) -> OptResult<Self> {
        if !accuracy.is_finite() || accuracy <= 0.0 {
            return Err(OptError::InvalidTolCost {
                tol: accuracy,
                reason: "Accuracy must be finite and positive.",
            });
        }
        if !initial_step.is_finite() || initial_step == 0.0 {
            return Err(OptError::InvalidStep {
                step: initial_step,
                reason: "Initial step must be finite and non-zero.",
            });
        }
        if max_iter == 0 {
            return Err(OptError::InvalidMaxIter {
                max_iter,
                reason: "Maximum iterations must be greater than zero.",
            });
        }
        Ok(Self { accuracy, initial_step, max_iter })
    }
}

impl Default for AscentOptions {
    fn default() -> Self {
        Self { accuracy: 1e-4, initial_step: 0.1, max_iter: 100_000 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Invalid accuracies, steps and caps are rejected with distinct variants.
    //
    // Given
    // -----
    // - accuracy NaN, step 0, max_iter 0, and one valid set.
    //
    // Expect
    // ------
    // - `InvalidTolCost`, `InvalidStep`, `InvalidMaxIter`, then `Ok`.
    fn new_rejects_each_invalid_field() {
        assert!(matches!(AscentOptions::new(f64::NAN, 0.1, 10), Err(OptError::InvalidTolCost { .. })));
        assert!(matches!(AscentOptions::new(1e-4, 0.0, 10), Err(OptError::InvalidStep { .. })));
        assert!(matches!(AscentOptions::new(1e-4, 0.1, 0), Err(OptError::InvalidMaxIter { .. })));
        assert_eq!(AscentOptions::new(1e-4, -0.1, 10).unwrap().initial_step, -0.1);
    }
}
