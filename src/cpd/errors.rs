//! Errors for softmax CPDs (node-role validation, parameter shape checks,
//! observation validation, learning-session state, and optimizer failures).
//!
//! This module defines the distribution error type, [`CPDError`], together
//! with the coarse [`ErrorKind`] taxonomy the surrounding graphical-model
//! framework dispatches on. [`CPDError`] implements `Display`/`Error` and,
//! with the `python-bindings` feature, converts to `PyErr` for PyO3.
//!
//! ## Conventions
//! - **Indices are 0-based**. Node indices refer to positions in the
//!   node-type slice; the child is always the last node.
//! - Parameter shapes are reported as `(rows, cols)` with rows indexed by
//!   child state and columns by parent.
//! - Optimizer/backend errors are normalized to
//!   [`CPDError::OptimizationFailed`] with a human-readable status.
#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*};

use crate::optimization::errors::OptError;

/// Result alias for softmax CPD operations that may produce [`CPDError`].
pub type CPDResult<T> = Result<T, CPDError>;

/// Coarse error categories shared with the graphical-model framework.
///
/// Every [`CPDError`] maps onto exactly one kind via [`CPDError::kind`], so
/// callers can branch on the category without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Node-role violations, wrong distribution kind, or wrongly shaped inputs.
    InconsistentType,
    /// The distribution (or learning session) is not in a usable state.
    InconsistentState,
    /// The operation is not allowed for the current form of the distribution.
    InvalidOperation,
    /// The operation is not supported by this distribution kind.
    NotImplemented,
    /// A required parameter or input is missing.
    NullPointer,
    /// Caller-supplied data or options are out of range.
    BadArgument,
    /// Numerical breakdown during estimation.
    Numerical,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::InconsistentType => "inconsistent type",
            ErrorKind::InconsistentState => "inconsistent state",
            ErrorKind::InvalidOperation => "invalid operation",
            ErrorKind::NotImplemented => "not implemented",
            ErrorKind::NullPointer => "null pointer",
            ErrorKind::BadArgument => "bad argument",
            ErrorKind::Numerical => "numerical failure",
        };
        write!(f, "{name}")
    }
}

/// Unified error type for softmax CPDs.
///
/// Covers node-role validation, parameter storage and shape checks,
/// observation validation, learning-session state, fitting options, and
/// unsupported factor operations.
#[derive(Debug, Clone, PartialEq)]
pub enum CPDError {
    // ---- Node roles ----
    /// The node-type list is empty.
    EmptyDomain,

    /// The last node (the child) must be discrete.
    ChildNotDiscrete { index: usize },

    /// Every node except the last must be continuous.
    DiscreteParent { index: usize },

    /// Node sizes must be at least one.
    InvalidNodeSize { index: usize, size: usize },

    /// Continuous parents are scalar.
    NonScalarParent { index: usize, size: usize },

    // ---- Distribution kind ----
    /// The other distribution is not a softmax CPD.
    WrongDistributionKind { found: &'static str },

    /// Assignment between distributions over different node types.
    IncompatibleAssignment { reason: &'static str },

    // ---- Parameters ----
    /// Parameter access or mutation on a unit-form distribution.
    UnitForm { operation: &'static str },

    /// Weight matrix shape does not match `[child states, parents]`.
    WeightShapeMismatch { expected: (usize, usize), found: (usize, usize) },

    /// Raw weight buffer length does not match `child states * parents`.
    WeightDataLength { expected: usize, found: usize },

    /// Offset vector length does not match the number of child states.
    OffsetLengthMismatch { expected: usize, found: usize },

    /// Softmax CPDs only carry a weight matrix.
    UnsupportedMatrixRole { role: &'static str },

    /// Two matrices combined element-wise must share a shape.
    MatrixShapeMismatch { left: (usize, usize), right: (usize, usize) },

    /// Inversion requires a square matrix.
    NonSquareMatrix { rows: usize, cols: usize },

    /// A required parameter has not been allocated.
    MissingParameter { name: &'static str },

    /// Default matrices requested while weights already exist.
    MatricesAlreadyPresent,

    /// A stored parameter is NaN/±inf.
    NonFiniteParameter { name: &'static str, index: usize, value: f64 },

    /// The distribution failed its own validity check.
    InvalidDistribution { reason: String },

    // ---- Observations ----
    /// The observation batch is empty.
    EmptyObservations,

    /// A parent value is NaN/±inf.
    NonFiniteObservation { row: usize, col: usize, value: f64 },

    /// Number of parent-value rows differs from number of labels.
    ObservationLengthMismatch { values: usize, labels: usize },

    /// Number of parent columns differs from the CPD's parent count.
    ParentCountMismatch { expected: usize, found: usize },

    /// A child label is outside `0..child_states`.
    LabelOutOfRange { index: usize, label: usize, states: usize },

    /// A float-encoded child label is not a finite non-negative integer.
    InvalidLabel { index: usize, value: f64 },

    // ---- Learning ----
    /// Learning copies are missing (cleared or never set).
    LearningNotInitialized { what: &'static str },

    /// A fit session was committed into a CPD over different node types.
    SessionDomainMismatch,

    /// The Hessian could not be inverted.
    SingularHessian { dim: usize },

    /// Log-likelihood evaluated to NaN/±inf.
    NonFiniteLikelihood { value: f64 },

    /// Optimizer reported a failure.
    OptimizationFailed { status: String },

    // ---- Fit options ----
    /// Relative-change accuracy must be finite and > 0.
    InvalidAccuracy { value: f64, reason: &'static str },

    /// Initial line-search step must be finite and non-zero.
    InvalidInitialStep { value: f64, reason: &'static str },

    /// Iteration cap must be > 0.
    InvalidMaxIter { value: usize },

    /// L-BFGS memory must be > 0.
    InvalidLbfgsMem { value: usize },

    // ---- Capability ----
    /// Operation is not supported for softmax CPDs.
    NotImplemented { operation: &'static str },
}

impl CPDError {
    /// Map the error onto the framework's coarse [`ErrorKind`] taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CPDError::ChildNotDiscrete { .. }
            | CPDError::DiscreteParent { .. }
            | CPDError::NonScalarParent { .. }
            | CPDError::WrongDistributionKind { .. }
            | CPDError::WeightShapeMismatch { .. }
            | CPDError::WeightDataLength { .. }
            | CPDError::OffsetLengthMismatch { .. }
            | CPDError::UnsupportedMatrixRole { .. }
            | CPDError::MatrixShapeMismatch { .. }
            | CPDError::NonSquareMatrix { .. } => ErrorKind::InconsistentType,

            CPDError::NonFiniteParameter { .. }
            | CPDError::InvalidDistribution { .. }
            | CPDError::LearningNotInitialized { .. } => ErrorKind::InconsistentState,

            CPDError::IncompatibleAssignment { .. }
            | CPDError::UnitForm { .. }
            | CPDError::MatricesAlreadyPresent
            | CPDError::SessionDomainMismatch => ErrorKind::InvalidOperation,

            CPDError::NotImplemented { .. } => ErrorKind::NotImplemented,

            CPDError::MissingParameter { .. } => ErrorKind::NullPointer,

            CPDError::EmptyDomain
            | CPDError::InvalidNodeSize { .. }
            | CPDError::EmptyObservations
            | CPDError::NonFiniteObservation { .. }
            | CPDError::ObservationLengthMismatch { .. }
            | CPDError::ParentCountMismatch { .. }
            | CPDError::LabelOutOfRange { .. }
            | CPDError::InvalidLabel { .. }
            | CPDError::InvalidAccuracy { .. }
            | CPDError::InvalidInitialStep { .. }
            | CPDError::InvalidMaxIter { .. }
            | CPDError::InvalidLbfgsMem { .. } => ErrorKind::BadArgument,

            CPDError::SingularHessian { .. }
            | CPDError::NonFiniteLikelihood { .. }
            | CPDError::OptimizationFailed { .. } => ErrorKind::Numerical,
        }
    }
}

impl std::error::Error for CPDError {}

impl std::fmt::Display for CPDError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Node roles ----
            CPDError::EmptyDomain => {
                write!(f, "A softmax CPD needs at least one node (the discrete child)")
            }
            CPDError::ChildNotDiscrete { index } => {
                write!(f, "Child node at index {index} must be discrete")
            }
            CPDError::DiscreteParent { index } => {
                write!(f, "Parent node at index {index} must be continuous for a softmax CPD")
            }
            CPDError::InvalidNodeSize { index, size } => {
                write!(f, "Node at index {index} has invalid size {size}, must be >= 1")
            }
            CPDError::NonScalarParent { index, size } => {
                write!(f, "Continuous parent at index {index} has dimension {size}, must be 1")
            }

            // ---- Distribution kind ----
            CPDError::WrongDistributionKind { found } => {
                write!(f, "Expected a softmax distribution, found {found}")
            }
            CPDError::IncompatibleAssignment { reason } => {
                write!(f, "Cannot assign distribution: {reason}")
            }

            // ---- Parameters ----
            CPDError::UnitForm { operation } => {
                write!(f, "Cannot {operation} on a unit-form distribution")
            }
            CPDError::WeightShapeMismatch { expected, found } => {
                write!(f, "Weight matrix shape mismatch: expected {expected:?}, found {found:?}")
            }
            CPDError::WeightDataLength { expected, found } => {
                write!(f, "Weight data length mismatch: expected {expected}, found {found}")
            }
            CPDError::OffsetLengthMismatch { expected, found } => {
                write!(f, "Offset vector length mismatch: expected {expected}, found {found}")
            }
            CPDError::UnsupportedMatrixRole { role } => {
                write!(f, "Softmax CPDs have no {role} matrix")
            }
            CPDError::MatrixShapeMismatch { left, right } => {
                write!(f, "Matrix shapes differ: {left:?} vs {right:?}")
            }
            CPDError::NonSquareMatrix { rows, cols } => {
                write!(f, "Cannot invert a non-square {rows}x{cols} matrix")
            }
            CPDError::MissingParameter { name } => {
                write!(f, "The {name} have not been allocated")
            }
            CPDError::MatricesAlreadyPresent => {
                write!(f, "Default matrices requested but weights already exist")
            }
            CPDError::NonFiniteParameter { name, index, value } => {
                write!(f, "Non-finite {name} entry at flat index {index}: {value}")
            }
            CPDError::InvalidDistribution { reason } => {
                write!(f, "Distribution is not valid: {reason}")
            }

            // ---- Observations ----
            CPDError::EmptyObservations => {
                write!(f, "Observation batch is empty")
            }
            CPDError::NonFiniteObservation { row, col, value } => {
                write!(f, "Non-finite parent value at observation {row}, parent {col}: {value}")
            }
            CPDError::ObservationLengthMismatch { values, labels } => {
                write!(f, "Observation count mismatch: {values} value rows but {labels} labels")
            }
            CPDError::ParentCountMismatch { expected, found } => {
                write!(f, "Parent count mismatch: expected {expected}, found {found}")
            }
            CPDError::LabelOutOfRange { index, label, states } => {
                write!(
                    f,
                    "Child label {label} at observation {index} is out of range for {states} states"
                )
            }
            CPDError::InvalidLabel { index, value } => {
                write!(
                    f,
                    "Child label at observation {index} must be a non-negative integer, got {value}"
                )
            }

            // ---- Learning ----
            CPDError::LearningNotInitialized { what } => {
                write!(f, "Learning {what} are not initialized")
            }
            CPDError::SessionDomainMismatch => {
                write!(f, "Fit session was created for different node types")
            }
            CPDError::SingularHessian { dim } => {
                write!(f, "Hessian of dimension {dim} is singular and cannot be inverted")
            }
            CPDError::NonFiniteLikelihood { value } => {
                write!(f, "Non-finite log-likelihood: {value}")
            }
            CPDError::OptimizationFailed { status } => {
                write!(f, "Optimization failed: {status}")
            }

            // ---- Fit options ----
            CPDError::InvalidAccuracy { value, reason } => {
                write!(f, "Invalid accuracy {value}: {reason}")
            }
            CPDError::InvalidInitialStep { value, reason } => {
                write!(f, "Invalid initial step {value}: {reason}")
            }
            CPDError::InvalidMaxIter { value } => {
                write!(f, "Invalid maximum iterations {value}: must be greater than zero")
            }
            CPDError::InvalidLbfgsMem { value } => {
                write!(f, "Invalid L-BFGS memory {value}: must be greater than zero")
            }

            // ---- Capability ----
            CPDError::NotImplemented { operation } => {
                write!(f, "{operation} is not supported for softmax distributions")
            }
        }
    }
}

/// Convert a [`CPDError`] into a Python `ValueError` with the error message.
#[cfg(feature = "python-bindings")]
impl std::convert::From<CPDError> for PyErr {
    fn from(err: CPDError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

impl From<OptError> for CPDError {
    fn from(err: OptError) -> CPDError {
        CPDError::OptimizationFailed { status: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The mapping of representative variants onto `ErrorKind`.
    // - Conversion of optimizer errors into `OptimizationFailed`.
    //
    // They intentionally DO NOT cover:
    // - Every `Display` string; messages are free-form.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Check that node-role, state, access, and capability errors land in the
    // categories the framework dispatches on.
    //
    // Given
    // -----
    // - One variant per category.
    //
    // Expect
    // ------
    // - `kind()` returns the documented category for each.
    fn kind_maps_representative_variants_to_taxonomy() {
        // Arrange / Act / Assert
        assert_eq!(CPDError::ChildNotDiscrete { index: 2 }.kind(), ErrorKind::InconsistentType);
        assert_eq!(
            CPDError::WeightShapeMismatch { expected: (3, 2), found: (2, 3) }.kind(),
            ErrorKind::InconsistentType
        );
        assert_eq!(
            CPDError::InvalidDistribution { reason: "x".to_string() }.kind(),
            ErrorKind::InconsistentState
        );
        assert_eq!(CPDError::UnitForm { operation: "read weights" }.kind(), ErrorKind::InvalidOperation);
        assert_eq!(CPDError::NotImplemented { operation: "normalize" }.kind(), ErrorKind::NotImplemented);
        assert_eq!(CPDError::MissingParameter { name: "weights" }.kind(), ErrorKind::NullPointer);
    }

    #[test]
    // Purpose
    // -------
    // Ensure optimizer errors surface as `OptimizationFailed` carrying the
    // optimizer's message.
    //
    // Given
    // -----
    // - An `OptError::NonFiniteCost`.
    //
    // Expect
    // ------
    // - The converted error is `OptimizationFailed` and its status mentions
    //   the non-finite cost.
    fn from_opt_error_wraps_message_into_optimization_failed() {
        // Arrange
        let err = OptError::NonFiniteCost { value: f64::NAN };

        // Act
        let converted: CPDError = err.into();

        // Assert
        match converted {
            CPDError::OptimizationFailed { status } => assert!(status.contains("Non-finite cost")),
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
