//! Fitting configuration for softmax CPDs.
//!
//! Two pieces of configuration drive a fit:
//!
//! - [`OptimizerKind`], stored on the CPD and inherited by its fit sessions,
//!   selects the algorithm. It mirrors the integer codes used by the
//!   surrounding framework (`0` gradient ascent, `1` Newton, `2` conjugate
//!   gradient) and adds L-BFGS codes `3`/`4`. Unknown codes and names fall
//!   back to gradient ascent.
//! - [`FitOptions`] carries the numeric knobs: relative-change accuracy,
//!   initial line-search step, iteration cap, and L-BFGS memory.
use std::str::FromStr;

use crate::{
    cpd::errors::{CPDError, CPDResult},
    optimization::{
        ascent::AscentOptions,
        loglik_optimizer::{MLEOptions, Tolerances, traits::LineSearcher},
    },
};

/// Default relative-change accuracy.
pub const DEFAULT_ACCURACY: f64 = 1e-4;

/// Default initial line-search step.
pub const DEFAULT_INITIAL_STEP: f64 = 0.1;

/// Default cap on outer optimizer iterations.
pub const DEFAULT_MAX_ITER: usize = 100_000;

/// Maximum-likelihood algorithm used by a fit session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptimizerKind {
    /// Gradient ascent with a backtracking line search.
    #[default]
    Gradient,
    /// Newton steps through the inverse Hessian. Dispatch reports
    /// `NotImplemented`.
    Hessian,
    /// Conjugate gradient with the same line search. The new direction is
    /// `g − β·d` with `β = −‖g‖² / ‖d‖²`, `d` being the previous direction.
    ConjugateGradient,
    /// argmin L-BFGS on the negated log-likelihood.
    Lbfgs(LineSearcher),
}

impl OptimizerKind {
    /// Decode a framework integer code; unknown codes map to `Gradient`.
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => OptimizerKind::Gradient,
            1 => OptimizerKind::Hessian,
            2 => OptimizerKind::ConjugateGradient,
            3 => OptimizerKind::Lbfgs(LineSearcher::MoreThuente),
            4 => OptimizerKind::Lbfgs(LineSearcher::HagerZhang),
            other => {
                log::warn!("unknown optimizer code {other}; falling back to gradient ascent");
                OptimizerKind::Gradient
            }
        }
    }

    /// Framework integer code of this kind.
    pub fn code(&self) -> i64 {
        match self {
            OptimizerKind::Gradient => 0,
            OptimizerKind::Hessian => 1,
            OptimizerKind::ConjugateGradient => 2,
            OptimizerKind::Lbfgs(LineSearcher::MoreThuente) => 3,
            OptimizerKind::Lbfgs(LineSearcher::HagerZhang) => 4,
        }
    }
}

impl FromStr for OptimizerKind {
    type Err = CPDError;

    /// Parse a case-insensitive name.
    ///
    /// Accepts `"gradient"`, `"hessian"`/`"newton"`,
    /// `"conjgradient"`/`"conjugategradient"`, `"lbfgs"` (More–Thuente) and
    /// `"lbfgs-morethuente"`/`"lbfgs-hagerzhang"`. Anything else falls back
    /// to `Gradient`; parsing never fails.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.to_lowercase().as_str() {
            "gradient" => OptimizerKind::Gradient,
            "hessian" | "newton" => OptimizerKind::Hessian,
            "conjgradient" | "conjugategradient" | "conjugate_gradient" => {
                OptimizerKind::ConjugateGradient
            }
            "lbfgs" | "lbfgs-morethuente" => OptimizerKind::Lbfgs(LineSearcher::MoreThuente),
            "lbfgs-hagerzhang" => OptimizerKind::Lbfgs(LineSearcher::HagerZhang),
            other => {
                log::warn!("unknown optimizer '{other}'; falling back to gradient ascent");
                OptimizerKind::Gradient
            }
        };
        Ok(kind)
    }
}

/// Numeric configuration of a maximum-likelihood fit.
///
/// Fields:
/// - `accuracy` — stop once `|2(old − new)/(old + new)| <= accuracy`
///   (line-search methods) or the cost change falls below it (L-BFGS).
/// - `initial_step` — starting line-search step; restored after every
///   accepted step taken with a negative step.
/// - `max_iter` — cap on outer iterations.
/// - `lbfgs_mem` — L-BFGS history size; `None` uses the optimizer default.
///
/// Default: accuracy `1e-4`, step `0.1`, `100_000` iterations, default memory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOptions {
    pub accuracy: f64,
    pub initial_step: f64,
    pub max_iter: usize,
    pub lbfgs_mem: Option<usize>,
}

impl FitOptions {
    /// Construct validated fit options.
    ///
    /// # Errors
    /// - [`CPDError::InvalidAccuracy`] unless `accuracy` is finite and > 0.
    /// - [`CPDError::InvalidInitialStep`] unless `initial_step` is finite
    ///   and non-zero.
    /// - [`CPDError::InvalidMaxIter`] if `max_iter == 0`.
    /// - [`CPDError::InvalidLbfgsMem`] if `lbfgs_mem == Some(0)`.
    pub fn new(
        accuracy: f64, initial_step: f64, max_iter: usize, lbfgs_mem: Option<usize>,
    ) -> CPDResult<Self> {
        if !accuracy.is_finite() {
            return Err(CPDError::InvalidAccuracy {
                value: accuracy,
                reason: "Accuracy must be finite.",
            });
        }
        if accuracy <= 0.0 {
            return Err(CPDError::InvalidAccuracy {
                value: accuracy,
                reason: "Accuracy must be positive.",
            });
        }
        if !initial_step.is_finite() || initial_step == 0.0 {
            return Err(CPDError::InvalidInitialStep {
                value: initial_step,
                reason: "Initial step must be finite and non-zero.",
            });
        }
        if max_iter == 0 {
            return Err(CPDError::InvalidMaxIter { value: max_iter });
        }
        if lbfgs_mem == Some(0) {
            return Err(CPDError::InvalidLbfgsMem { value: 0 });
        }
        Ok(FitOptions { accuracy, initial_step, max_iter, lbfgs_mem })
    }

    /// Options for the line-search ascent optimizers.
    pub fn ascent_options(&self) -> AscentOptions {
        AscentOptions {
            accuracy: self.accuracy,
            initial_step: self.initial_step,
            max_iter: self.max_iter,
        }
    }

    /// Options for an L-BFGS run with `line_searcher`.
    ///
    /// # Errors
    /// Propagates tolerance validation from [`Tolerances::new`] /
    /// [`MLEOptions::new`].
    pub fn mle_options(&self, line_searcher: LineSearcher) -> CPDResult<MLEOptions> {
        let tols = Tolerances::new(None, Some(self.accuracy), Some(self.max_iter))?;
        Ok(MLEOptions::new(tols, line_searcher, false, self.lbfgs_mem)?)
    }
}

impl Default for FitOptions {
    fn default() -> Self {
        FitOptions {
            accuracy: DEFAULT_ACCURACY,
            initial_step: DEFAULT_INITIAL_STEP,
            max_iter: DEFAULT_MAX_ITER,
            lbfgs_mem: None,
        }
    }
}
