//! pgm_softmax — softmax conditional probability distributions with
//! maximum-likelihood fitting and optional Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that exposes
//! the softmax CPD to Python via the `_pgm_softmax` extension module. A
//! softmax CPD is a multinomial-logistic distribution over a discrete child
//! node conditioned on continuous parent nodes.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules (`cpd`, `inference`, `optimization`) as
//!   the public crate surface.
//! - Define `#[pyclass]` wrappers and the `#[pymodule]` initializer for the
//!   `_pgm_softmax` Python extension when `python-bindings` is enabled.
//! - Register the `cpd` submodule under `pgm_softmax` so that dotted imports
//!   work from Python.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work lives in the inner modules; this file performs only
//!   FFI glue, input conversion, and error mapping.
//! - The node list of a CPD is `P` scalar continuous parents followed by one
//!   discrete child with `K >= 1` states.
//! - Parameter vectors use the flat layout `θ[k·(P+1) + i]` over the `K − 1`
//!   non-pivot states, with `i == P` addressing the offset.
//!
//! Conventions
//! -----------
//! - Weight matrices are `[K, P]`, row-major when flattened; offsets have
//!   length `K`.
//! - Errors are rich enums internally ([`cpd::errors::CPDError`],
//!   [`optimization::errors::OptError`]) and become `ValueError` at the PyO3
//!   boundary.
//! - The crate logs through the `log` facade and never installs a logger.
//!
//! Downstream usage
//! ----------------
//! - Rust callers build a [`cpd::SoftmaxCPD`], open a fit session with
//!   `begin_learning`, run `maximum_likelihood`, and publish the result with
//!   `commit_learning`.
//! - The Python packaging layer imports `_pgm_softmax` and wraps
//!   `cpd.SoftmaxCPD`/`cpd.FitResult` in user-facing APIs.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to the code; the end-to-end fit scenario is covered
//!   in `tests/integration_softmax_pipeline.rs`.

pub mod cpd;
pub mod inference;
pub mod optimization;
pub mod utils;

#[cfg(feature = "python-bindings")]
use ndarray::ArrayView1;

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use rand::{SeedableRng, rngs::StdRng};

#[cfg(feature = "python-bindings")]
use crate::{
    cpd::models::{DistribFun, SoftmaxCPD},
    optimization::loglik_optimizer::traits::OptimOutcome,
    utils::{
        build_node_types, extract_f64_vec, extract_fit_options, extract_observations,
        extract_optimizer_kind,
    },
};

/// SoftmaxCPD — Python-facing wrapper for a softmax CPD.
///
/// Constructed from Python via
/// `SoftmaxCPD(parent_count, child_states, weights=None, offsets=None, optimizer=None)`
/// or `SoftmaxCPD.unit_form(parent_count, child_states)`. `weights` is a
/// flat row-major `[K, P]` buffer, `offsets` has length `K`, and
/// `optimizer` is a name (`"gradient"`, `"conjgradient"`, `"lbfgs"`, ...)
/// or a framework integer code.
///
/// `fit` runs a whole learning session (begin, fit, commit) and returns a
/// [`FitResult`]. The live parameters change only when the fit succeeds.
///
/// Shared matrix storage is reference counted with `Rc`, so the class is
/// `unsendable`.
#[cfg(feature = "python-bindings")]
#[pyclass(name = "SoftmaxCPD", module = "pgm_softmax.cpd", unsendable)]
pub struct PySoftmaxCPD {
    pub inner: SoftmaxCPD,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PySoftmaxCPD {
    #[new]
    #[pyo3(
        signature = (parent_count, child_states, weights = None, offsets = None, optimizer = None),
        text_signature = "(parent_count, child_states, /, weights=None, offsets=None, optimizer=None)"
    )]
    pub fn new<'py>(
        py: Python<'py>, parent_count: usize, child_states: usize,
        weights: Option<&Bound<'py, PyAny>>, offsets: Option<&Bound<'py, PyAny>>,
        optimizer: Option<&Bound<'py, PyAny>>,
    ) -> PyResult<Self> {
        let node_types = build_node_types(parent_count, child_states);
        let weights = weights.map(|w| extract_f64_vec(py, w)).transpose()?;
        let offsets = offsets.map(|o| extract_f64_vec(py, o)).transpose()?;
        let mut inner = SoftmaxCPD::new(&node_types, weights.as_deref(), offsets.as_deref())?;
        inner.set_maximizing_method(extract_optimizer_kind(optimizer)?);
        Ok(PySoftmaxCPD { inner })
    }

    #[staticmethod]
    #[pyo3(text_signature = "(parent_count, child_states, /)")]
    pub fn unit_form(parent_count: usize, child_states: usize) -> PyResult<Self> {
        let node_types = build_node_types(parent_count, child_states);
        Ok(PySoftmaxCPD { inner: SoftmaxCPD::unit_form(&node_types)? })
    }

    /// Fill unallocated weights/offsets with uniform draws from [-5, 5].
    #[pyo3(signature = (seed = None), text_signature = "(self, /, seed=None)")]
    pub fn create_default_matrices(&mut self, seed: Option<u64>) -> PyResult<()> {
        match seed {
            Some(seed) => self.inner.create_default_matrices(&mut StdRng::seed_from_u64(seed))?,
            None => self.inner.create_default_matrices(&mut rand::thread_rng())?,
        }
        Ok(())
    }

    #[pyo3(
        signature = (
            values,
            labels,
            accuracy = None,
            initial_step = None,
            max_iter = None,
            lbfgs_mem = None,
        ),
        text_signature = "(self, values, labels, /, accuracy=1e-4, initial_step=0.1, \
                          max_iter=100000, lbfgs_mem=None)"
    )]
    pub fn fit<'py>(
        &mut self, values: &Bound<'py, PyAny>, labels: &Bound<'py, PyAny>,
        accuracy: Option<f64>, initial_step: Option<f64>, max_iter: Option<usize>,
        lbfgs_mem: Option<usize>,
    ) -> PyResult<FitResult> {
        let obs = extract_observations(values, labels)?;
        let options = extract_fit_options(accuracy, initial_step, max_iter, lbfgs_mem)?;
        let mut session = self.inner.begin_learning()?;
        let outcome = session.maximum_likelihood_with(&obs, &options)?.clone();
        self.inner.commit_learning(session)?;
        Ok(FitResult { inner: outcome })
    }

    /// Child-state probabilities given one row of parent values.
    #[pyo3(text_signature = "(self, parents, /)")]
    pub fn probabilities<'py>(
        &self, py: Python<'py>, parents: &Bound<'py, PyAny>,
    ) -> PyResult<Vec<f64>> {
        let x = extract_f64_vec(py, parents)?;
        let probs = self.inner.probabilities(ArrayView1::from(x.as_slice()))?;
        Ok(probs.to_vec())
    }

    #[pyo3(text_signature = "(self, other, /, epsilon=0.0)", signature = (other, epsilon = 0.0))]
    pub fn is_equal(&self, other: PyRef<'_, PySoftmaxCPD>, epsilon: f64) -> PyResult<bool> {
        if epsilon.is_nan() || epsilon < 0.0 {
            return Err(PyValueError::new_err("epsilon must be non-negative"));
        }
        Ok(self.inner.is_equal(&other.inner, epsilon)?.equal)
    }

    pub fn dump(&self) -> String {
        self.inner.dump()
    }

    pub fn __repr__(&self) -> String {
        let shape = self.inner.shape();
        format!(
            "SoftmaxCPD(parent_count={}, child_states={}, unit_form={})",
            shape.parent_count,
            shape.child_states,
            self.inner.is_unit_form()
        )
    }

    #[getter]
    pub fn weights(&self) -> PyResult<Vec<Vec<f64>>> {
        let weights = self.inner.weights()?.to_array();
        Ok(weights.rows().into_iter().map(|row| row.to_vec()).collect())
    }

    #[getter]
    pub fn offsets(&self) -> PyResult<Vec<f64>> {
        Ok(self.inner.offsets()?.to_vec())
    }

    #[getter]
    pub fn optimizer(&self) -> i64 {
        self.inner.maximizing_method().code()
    }

    #[setter]
    pub fn set_optimizer<'py>(&mut self, optimizer: &Bound<'py, PyAny>) -> PyResult<()> {
        self.inner.set_maximizing_method(extract_optimizer_kind(Some(optimizer))?);
        Ok(())
    }

    #[getter]
    pub fn number_of_free_parameters(&self) -> usize {
        self.inner.number_of_free_parameters()
    }

    #[getter]
    pub fn is_valid(&self) -> bool {
        self.inner.is_valid()
    }
}

/// FitResult — read-only optimizer diagnostics from a `SoftmaxCPD.fit` call.
///
/// Instances are produced by `SoftmaxCPD.fit` and are not constructed by
/// user code. Accessors copy out of the wrapped [`OptimOutcome`].
#[cfg(feature = "python-bindings")]
#[pyclass(module = "pgm_softmax.cpd")]
pub struct FitResult {
    pub inner: OptimOutcome,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl FitResult {
    #[getter]
    pub fn theta_hat(&self) -> Vec<f64> {
        self.inner.theta_hat.to_vec()
    }

    /// Maximized log-likelihood.
    #[getter]
    pub fn log_likelihood(&self) -> f64 {
        self.inner.value
    }

    #[getter]
    pub fn converged(&self) -> bool {
        self.inner.converged
    }

    #[getter]
    pub fn status(&self) -> String {
        self.inner.status.clone()
    }

    #[getter]
    pub fn iterations(&self) -> usize {
        self.inner.iterations
    }

    #[getter]
    pub fn grad_norm(&self) -> Option<f64> {
        self.inner.grad_norm
    }

    #[getter]
    pub fn fn_evals(&self) -> Vec<(String, u64)> {
        self.inner.fn_evals.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }
}

/// _pgm_softmax — PyO3 module initializer.
///
/// Creates the `cpd` submodule, attaches it to the parent module, and
/// registers it in `sys.modules` as `pgm_softmax.cpd` so dotted imports
/// resolve. Failures are returned as `PyErr`.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _pgm_softmax<'py>(py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let cpd_mod = PyModule::new(py, "cpd")?;
    cpd_module(m, &cpd_mod)?;

    // Manually add the submodule into sys.modules to allow for dot notation.
    py.import("sys")?.getattr("modules")?.set_item("pgm_softmax.cpd", cpd_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn cpd_module<'py>(parent: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    m.add_class::<PySoftmaxCPD>()?;
    m.add_class::<FitResult>()?;
    parent.add_submodule(m)?;
    Ok(())
}

