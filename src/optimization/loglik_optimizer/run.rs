//! Execution of a configured L-BFGS solver through argmin's `Executor`.
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        Grad, LogLikelihood, MLEOptions, OptimOutcome, Theta, adapter::ArgMinAdapter,
    },
};
#[cfg(feature = "obs_slog")]
use argmin::core::{CostFunction, Gradient};
use argmin::core::{Executor, IterState, Solver, State};
#[cfg(feature = "obs_slog")]
use argmin_math::ArgminL2Norm;

/// Run `solver` on `problem` from `theta0` and normalize the final state.
///
/// - Applies `opts.tols.max_iter` as the executor's iteration cap.
/// - With `obs_slog` and `opts.verbose`, logs the starting point and attaches
///   a terminal observer.
/// - The reported value is the best log-likelihood, `-best_cost`.
///
/// # Errors
/// Solver failures are mapped into [`OptError`](crate::optimization::errors::OptError);
/// non-finite results fail outcome validation.
pub fn run_lbfgs<'a, F, S>(
    theta0: Theta, opts: &MLEOptions, problem: ArgMinAdapter<'a, F>, solver: S,
) -> OptResult<OptimOutcome>
where
    F: LogLikelihood,
    S: Solver<ArgMinAdapter<'a, F>, IterState<Theta, Grad, (), (), (), f64>> + Send + 'static,
{
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        log_initial_state(&theta0, &problem)?;
    }
    let iter_cap = opts.tols.max_iter.map(|cap| cap as u64);
    let executor = Executor::new(problem, solver).configure(|state| match iter_cap {
        Some(cap) => state.param(theta0).max_iters(cap),
        None => state.param(theta0),
    });
    #[cfg(feature = "obs_slog")]
    let executor = if opts.verbose {
        executor.add_observer(
            argmin_observer_slog::SlogLogger::term_noblock(),
            argmin::core::observers::ObserverMode::Always,
        )
    } else {
        executor
    };

    let final_state = executor.run()?.state().clone();
    into_outcome(final_state)
}

/// Convert argmin's final state into an [`OptimOutcome`] on the
/// log-likelihood scale.
fn into_outcome(mut state: IterState<Theta, Grad, (), (), (), f64>) -> OptResult<OptimOutcome> {
    let status = state.get_termination_status().clone();
    let iterations = state.get_iter();
    log::debug!("L-BFGS finished after {iterations} iterations: {status:?}");
    let fn_evals = state.get_func_counts().clone();
    let best_value = -state.get_best_cost();
    let last_grad = state.take_gradient();
    OptimOutcome::new(state.take_best_param(), best_value, status, iterations, fn_evals, last_grad)
}

#[cfg(feature = "obs_slog")]
fn log_initial_state<F>(theta0: &Theta, problem: &ArgMinAdapter<'_, F>) -> OptResult<()>
where
    F: LogLikelihood,
{
    let ll0 = -problem.cost(theta0)?;
    let g0n = problem.gradient(theta0).ok().map(|g| g.l2_norm());
    log::info!(
        "L-BFGS start: log-likelihood {ll0:.6}{}",
        g0n.map(|n| format!(", gradient norm {n:.6}")).unwrap_or_default()
    );
    Ok(())
}
