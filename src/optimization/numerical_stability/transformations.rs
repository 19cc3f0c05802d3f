//! Numerically stable softmax primitives.
//!
//! Softmax CPDs evaluate `log(1 + Σ_k exp(z_k))` for every observation,
//! where the implicit `1` is the pivot state's `exp(0)`. Evaluating it
//! naïvely overflows once any logit exceeds ~709. The helpers here shift by
//! `m = max(0, max_k z_k)` first:
//!
//! `log(1 + Σ exp(z_k)) = m + log(exp(-m) + Σ exp(z_k - m))`
//!
//! so every exponent is `<= 0`.
use ndarray::{Array1, ArrayView1, ArrayViewMut1, Zip};

/// Eigenvalues at or below this magnitude are treated as zero when forming
/// pseudoinverse-based standard errors.
pub const EIGEN_EPS: f64 = 1e-12;

/// Line searches stop shrinking once `|step|` falls to this value.
pub const MIN_LINE_SEARCH_STEP: f64 = 1e-7;

/// Stable `log(1 + Σ_k exp(z_k))` over the non-pivot logits `z`.
///
/// Returns `0.0` for an empty slice (a single-state child).
pub fn log1p_sum_exp(logits: ArrayView1<'_, f64>) -> f64 {
    let shift = logits.fold(0.0_f64, |acc, &z| acc.max(z));
    let scaled: f64 = (-shift).exp() + logits.iter().map(|&z| (z - shift).exp()).sum::<f64>();
    shift + scaled.ln()
}

/// Pivoted softmax probabilities `s_k = exp(z_k) / (1 + Σ_j exp(z_j))`.
///
/// Writes one probability per non-pivot logit into `out` and returns the log
/// normalizer `log(1 + Σ_j exp(z_j))`. The pivot state's probability is
/// `1 - Σ_k s_k`.
///
/// # Panics
/// - If `out.len() != logits.len()`.
pub fn pivoted_softmax_into(logits: ArrayView1<'_, f64>, out: ArrayViewMut1<'_, f64>) -> f64 {
    let log_norm = log1p_sum_exp(logits);
    Zip::from(out).and(logits).for_each(|o, &z| *o = (z - log_norm).exp());
    log_norm
}

/// Full softmax over every logit, max-shifted.
///
/// Returns an empty vector for empty input.
pub fn stable_softmax(logits: ArrayView1<'_, f64>) -> Array1<f64> {
    let shift = logits.fold(f64::NEG_INFINITY, |acc, &z| acc.max(z));
    let mut probs = logits.mapv(|z| (z - shift).exp());
    let total = probs.sum();
    probs.mapv_inplace(|p| p / total);
    probs
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Agreement with naïve formulas on safe inputs.
    // - Finite results for logits far beyond the `exp` overflow threshold.
    // - Probability mass bookkeeping for the pivoted and full softmax.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // The shifted log-normalizer matches the naïve formula where the latter
    // is safe.
    //
    // Given
    // -----
    // - Moderate logits and an empty logit vector.
    //
    // Expect
    // ------
    // - Agreement to 1e-12 and `0` for the empty case.
    fn log1p_sum_exp_matches_naive_formula_on_safe_inputs() {
        // Arrange
        let z = array![0.5, -1.0, 2.0];
        let naive = (1.0 + z.iter().map(|v: &f64| v.exp()).sum::<f64>()).ln();

        // Act / Assert
        assert_relative_eq!(log1p_sum_exp(z.view()), naive, epsilon = 1e-12);
        assert_eq!(log1p_sum_exp(Array1::<f64>::zeros(0).view()), 0.0);
    }

    #[test]
    // Purpose
    // -------
    // Large logits neither overflow nor lose the dominant term.
    //
    // Given
    // -----
    // - Logits `[1000, 999]`.
    //
    // Expect
    // ------
    // - `1000 + ln(1 + e^-1)` within 1e-9, and pivoted probabilities finite
    //   with mass below one.
    fn pivoted_softmax_stays_finite_for_huge_logits() {
        // Arrange
        let z = array![1000.0, 999.0];
        let mut probs = Array1::zeros(2);

        // Act
        let log_norm = pivoted_softmax_into(z.view(), probs.view_mut());

        // Assert
        assert_relative_eq!(log_norm, 1000.0 + (-1.0_f64).exp().ln_1p(), epsilon = 1e-9);
        assert!(probs.iter().all(|p| p.is_finite()));
        assert!(probs.sum() <= 1.0 + 1e-12);
        assert_relative_eq!(probs[0] / probs[1], 1.0_f64.exp(), max_relative = 1e-9);
    }

    #[test]
    // Purpose
    // -------
    // The full softmax sums to one and is shift invariant.
    //
    // Given
    // -----
    // - Logits `z` and `z + 500`.
    //
    // Expect
    // ------
    // - Identical probability vectors summing to one.
    fn stable_softmax_is_normalized_and_shift_invariant() {
        // Arrange
        let z = array![0.1, -0.4, 1.3];
        let shifted = z.mapv(|v| v + 500.0);

        // Act
        let p = stable_softmax(z.view());
        let q = stable_softmax(shifted.view());

        // Assert
        assert_relative_eq!(p.sum(), 1.0, epsilon = 1e-12);
        for (a, b) in p.iter().zip(q.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-12);
        }
    }
}
