//! Log-likelihood and gradient of a softmax CPD over an observation batch.
//!
//! For observation `(x, y)` with non-pivot logits
//! `z_k = offset[k] + Σ_p w[k, p]·x_p` (`k < K - 1`):
//!
//! - `ℓ = Σ_obs [ z_y − log(1 + Σ_k exp(z_k)) ]`
//! - `∂ℓ/∂offset[k] = #{y = k} − Σ_obs s_k`
//! - `∂ℓ/∂w[k, p]  = Σ_{obs: y = k} x_p − Σ_obs x_p·s_k`
//!
//! where `s_k = exp(z_k) / (1 + Σ_j exp(z_j))`. The implicit `1` in the
//! normalizer is the pivot state's logit held at zero, so these formulas
//! assume pivoted parameters. `z_y` is read from the stored row of `y`,
//! which is zero for the pivot state once pivoted.
//!
//! Both passes cost `O(n_obs · K · P)`; they reuse one logit buffer and one
//! probability buffer for the whole batch.
use ndarray::{Array1, ArrayView1};

use crate::{
    cpd::core::{observations::SoftmaxObservations, params::SoftmaxParams},
    optimization::{
        loglik_optimizer::Grad,
        numerical_stability::{log1p_sum_exp, pivoted_softmax_into},
    },
};

/// Fill `logits` with the non-pivot logits of `params` at `x`.
#[inline]
pub fn fill_logits(params: &SoftmaxParams, x: ArrayView1<'_, f64>, logits: &mut Array1<f64>) {
    for (state, z) in logits.iter_mut().enumerate() {
        *z = params.logit(state, x);
    }
}

/// Pivoted class probabilities of the non-pivot states at `x`.
///
/// `logits` and `probs` are scratch buffers of length `K - 1`.
#[inline]
pub fn fill_pivoted_probabilities(
    params: &SoftmaxParams, x: ArrayView1<'_, f64>, logits: &mut Array1<f64>,
    probs: &mut Array1<f64>,
) {
    fill_logits(params, x, logits);
    pivoted_softmax_into(logits.view(), probs.view_mut());
}

/// Log-likelihood of the batch under `params`.
pub fn log_likelihood(params: &SoftmaxParams, obs: &SoftmaxObservations) -> f64 {
    let mut logits = Array1::zeros(params.child_states().saturating_sub(1));
    obs.iter()
        .map(|(x, label)| {
            fill_logits(params, x, &mut logits);
            params.logit(label, x) - log1p_sum_exp(logits.view())
        })
        .sum()
}

/// Gradient of [`log_likelihood`] in the flat θ layout of
/// [`SoftmaxShape`](crate::cpd::core::shape::SoftmaxShape).
pub fn gradient(params: &SoftmaxParams, obs: &SoftmaxObservations) -> Grad {
    let shape = params.shape();
    let free_states = shape.child_states.saturating_sub(1);
    let mut grad = Grad::zeros(shape.free_parameter_count());
    let mut logits = Array1::zeros(free_states);
    let mut probs = Array1::zeros(free_states);
    for (x, label) in obs.iter() {
        fill_pivoted_probabilities(params, x, &mut logits, &mut probs);
        for state in 0..free_states {
            let indicator = if label == state { 1.0 } else { 0.0 };
            let residual = indicator - probs[state];
            for (parent, &value) in x.iter().enumerate() {
                grad[shape.theta_index(state, parent)] += residual * value;
            }
            grad[shape.bias_index(state)] += residual;
        }
    }
    grad
}
