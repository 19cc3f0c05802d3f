//! ascent — line-search gradient-based maximizers.
//!
//! Purpose
//! -------
//! Maximize a [`LogLikelihood`](crate::optimization::loglik_optimizer::LogLikelihood)
//! with a persistent-step backtracking line search along directions chosen by
//! a [`DirectionStrategy`]: steepest ascent, conjugate gradient, or Newton.
//!
//! Key behaviors
//! -------------
//! - [`maximize_ascent`] runs the outer loop: gradient, direction, line
//!   search, relative-change stopping rule, iteration cap.
//! - [`backtracking_line_search`] applies cumulative trial moves with
//!   sign-flipping step halving and restores the start step after a
//!   backward acceptance.
//! - [`ConjugateGradient`] keeps the previous direction between iterations
//!   and restarts from the gradient when the correction is degenerate.
//!
//! Invariants & assumptions
//! ------------------------
//! - The log-likelihood at the returned `θ̂` is finite.
//! - A step strictly smaller than `MIN_LINE_SEARCH_STEP` in magnitude is
//!   never tried.
//!
//! Testing notes
//! -------------
//! - Unit tests use closed-form concave quadratics so optimum, step
//!   bookkeeping and direction formulas can be checked exactly.

pub mod direction;
pub mod line_search;
pub mod options;
pub mod run;

pub use self::direction::{ConjugateGradient, DirectionStrategy, NewtonStep, SteepestAscent};
pub use self::line_search::{LineSearchOutcome, backtracking_line_search, relative_change};
pub use self::options::AscentOptions;
pub use self::run::maximize_ascent;
