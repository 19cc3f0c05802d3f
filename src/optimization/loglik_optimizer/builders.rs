//! Construction of argmin L-BFGS solvers from [`MLEOptions`].
//!
//! One builder per [`LineSearcher`](super::traits::LineSearcher) variant; both
//! share [`configure_lbfgs`] for tolerance wiring. Iteration limits are not a
//! solver property and are applied on the executor in [`super::run`].
use argmin::solver::quasinewton::LBFGS;

use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        traits::MLEOptions,
        types::{
            Cost, DEFAULT_LBFGS_MEM, Grad, HagerZhangLS, LbfgsHagerZhang, LbfgsMoreThuente,
            MoreThuenteLS, Theta,
        },
    },
};

/// L-BFGS with a Hager–Zhang line search.
pub fn build_optimizer_hager_zhang(opts: &MLEOptions) -> OptResult<LbfgsHagerZhang> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    configure_lbfgs(LbfgsHagerZhang::new(HagerZhangLS::new(), mem), opts)
}

/// L-BFGS with a More–Thuente line search.
pub fn build_optimizer_more_thuente(opts: &MLEOptions) -> OptResult<LbfgsMoreThuente> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    configure_lbfgs(LbfgsMoreThuente::new(MoreThuenteLS::new(), mem), opts)
}

/// Apply the optional gradient and cost tolerances to a solver.
///
/// # Errors
/// argmin rejects non-positive tolerances; those errors are mapped through
/// `From<argmin::core::Error> for OptError`.
pub fn configure_lbfgs<L>(
    mut solver: LBFGS<L, Theta, Grad, Cost>, opts: &MLEOptions,
) -> OptResult<LBFGS<L, Theta, Grad, Cost>> {
    if let Some(g) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(g)?;
    }
    if let Some(c) = opts.tols.tol_cost {
        solver = solver.with_tolerance_cost(c)?;
    }
    Ok(solver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::loglik_optimizer::traits::{LineSearcher, Tolerances};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Builders succeed for both line searches with default and explicit
    // memory, and with partially specified tolerances.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Both builders accept default memory and a full set of tolerances.
    //
    // Given
    // -----
    // - Tolerances (1e-6, 1e-8, 50) and `lbfgs_mem = None`.
    //
    // Expect
    // ------
    // - Both builders return `Ok`.
    fn builders_accept_default_memory() {
        let tols = Tolerances::new(Some(1e-6), Some(1e-8), Some(50)).unwrap();
        let hz = MLEOptions::new(tols, LineSearcher::HagerZhang, false, None).unwrap();
        let mt = MLEOptions::new(tols, LineSearcher::MoreThuente, false, None).unwrap();

        assert!(build_optimizer_hager_zhang(&hz).is_ok());
        assert!(build_optimizer_more_thuente(&mt).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // Configuration succeeds when only an iteration cap is provided.
    //
    // Given
    // -----
    // - Tolerances (None, None, 30) and explicit memory 11.
    //
    // Expect
    // ------
    // - `configure_lbfgs` returns `Ok`.
    fn configure_lbfgs_respects_absent_tolerances() {
        let tols = Tolerances::new(None, None, Some(30)).unwrap();
        let opts = MLEOptions::new(tols, LineSearcher::MoreThuente, false, Some(11)).unwrap();

        let configured = configure_lbfgs(LBFGS::new(MoreThuenteLS::new(), 11), &opts);

        assert!(configured.is_ok());
    }
}
