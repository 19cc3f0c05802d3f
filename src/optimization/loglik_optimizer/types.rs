//! Numeric aliases and solver wiring shared by the optimizers.
//!
//! Parameters, gradients and Hessians are `ndarray` containers over `f64`
//! laid out in the flat softmax parameter order (see
//! [`SoftmaxShape::theta_index`](crate::cpd::core::shape::SoftmaxShape::theta_index)).
//! `Cost` is whatever scalar the caller is optimizing; the argmin adapter
//! uses it for `-ℓ(θ)` while the ascent optimizers use it for `ℓ(θ)`.
use argmin::solver::{
    linesearch::{HagerZhangLineSearch, MoreThuenteLineSearch},
    quasinewton::LBFGS,
};
use ndarray::{Array1, Array2};
use std::collections::HashMap;

/// Flat parameter vector `θ`.
pub type Theta = Array1<f64>;

/// Gradient vector, same length as `Theta`.
pub type Grad = Array1<f64>;

/// Dense `θ.len() × θ.len()` second-derivative matrix.
pub type Hessian = Array2<f64>;

/// Scalar objective value.
pub type Cost = f64;

/// Function-evaluation counters keyed by name (e.g. `"cost_count"`).
pub type FnEvalMap = HashMap<String, u64>;

/// Default L-BFGS history size.
pub const DEFAULT_LBFGS_MEM: usize = 7;

pub type HagerZhangLS = HagerZhangLineSearch<Theta, Grad, Cost>;
pub type MoreThuenteLS = MoreThuenteLineSearch<Theta, Grad, Cost>;
pub type LbfgsHagerZhang = LBFGS<HagerZhangLS, Theta, Grad, Cost>;
pub type LbfgsMoreThuente = LBFGS<MoreThuenteLS, Theta, Grad, Cost>;
