//! Softmax CPD: state, ownership discipline, and lifecycle.
//!
//! Purpose
//! -------
//! Hold the parameters of a multinomial-logistic distribution of a discrete
//! child given continuous parents, and implement the construction, cloning,
//! attachment, comparison and assignment rules a graphical-model framework
//! expects from a conditional distribution.
//!
//! Key behaviors
//! -------------
//! - A CPD is either in **unit form** (parameter-free; every parameter
//!   accessor fails) or **parametric** with an optional weight matrix
//!   `[K, P]` and an optional offset vector `[K]`.
//! - Weights live behind a [`MatrixHandle`]: [`SoftmaxCPD::try_clone`] gives
//!   the clone private storage, [`SoftmaxCPD::clone_sharing_matrices`]
//!   registers the clone as another owner of the same storage. Offsets are
//!   always copied.
//! - Fitting happens on a [`FitSession`] created by
//!   [`SoftmaxCPD::begin_learning`]; [`SoftmaxCPD::commit_learning`] writes
//!   the fitted values back into the live parameters.
//!
//! Invariants & assumptions
//! ------------------------
//! - The last node is discrete and every other node is continuous; every
//!   constructor enforces this.
//! - Stored weights always have shape `[K, P]` and stored offsets length
//!   `K`. Failed allocations and attachments leave the CPD unchanged.
//! - Replacing or dropping a weight handle releases that owner; shared
//!   storage survives until its last owner is gone.
//!
//! Conventions
//! -----------
//! - Weights are indexed `[child_state, parent]`; raw weight buffers are
//!   row-major in that order.
//! - Tolerant comparisons are inclusive: a difference equal to `epsilon`
//!   still counts as equal, so `epsilon = 0` means exact equality.
//!
//! Testing notes
//! -------------
//! - Unit tests below cover construction rules, the ownership semantics of
//!   both clone flavours, equality across forms, assignment conversions,
//!   and inference-time probabilities.
//! - End-to-end fitting is covered in `tests/integration_softmax_pipeline.rs`.
use std::{any::Any, fmt};

use ndarray::{Array1, Array2, ArrayView1};
use rand::Rng;

use crate::{
    cpd::{
        core::{
            matrix::{DenseMatrix, MatrixHandle},
            node_type::NodeType,
            options::OptimizerKind,
            params::SoftmaxParams,
            shape::SoftmaxShape,
        },
        errors::{CPDError, CPDResult},
        models::{
            distrib_fun::{Comparison, DistribFun, DistributionType},
            fit_session::FitSession,
        },
    },
    optimization::numerical_stability::stable_softmax,
};

/// Half-width of the interval default parameters are drawn from.
const DEFAULT_PARAMETER_RANGE: f64 = 5.0;

/// Role a matrix is attached under. Softmax CPDs only carry weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixRole {
    Weights,
    Table,
    Mean,
    Covariance,
}

impl MatrixRole {
    pub fn name(&self) -> &'static str {
        match self {
            MatrixRole::Weights => "weights",
            MatrixRole::Table => "table",
            MatrixRole::Mean => "mean",
            MatrixRole::Covariance => "covariance",
        }
    }
}

#[derive(Debug)]
enum Form {
    Unit,
    Parametric { weights: Option<MatrixHandle>, offsets: Option<Array1<f64>> },
}

/// Softmax conditional distribution of a discrete child given continuous
/// parents.
#[derive(Debug)]
pub struct SoftmaxCPD {
    node_types: Vec<NodeType>,
    shape: SoftmaxShape,
    form: Form,
    optimizer_kind: OptimizerKind,
}

impl SoftmaxCPD {
    /// Build a parametric CPD, copying any provided parameter data.
    ///
    /// `weights` is a row-major `[K, P]` buffer and `offsets` has length `K`.
    /// Missing data leaves the corresponding parameter unallocated.
    ///
    /// # Errors
    /// - Node-role violations (`ChildNotDiscrete`, `DiscreteParent`,
    ///   `EmptyDomain`, `InvalidNodeSize`).
    /// - [`CPDError::WeightDataLength`] / [`CPDError::OffsetLengthMismatch`].
    pub fn new(
        node_types: &[NodeType], weights: Option<&[f64]>, offsets: Option<&[f64]>,
    ) -> CPDResult<Self> {
        let shape = SoftmaxShape::from_node_types(node_types)?;
        let weights = weights
            .map(|data| {
                let (rows, cols) = shape.weight_dims();
                DenseMatrix::from_row_major(rows, cols, data).map(MatrixHandle::unique)
            })
            .transpose()?;
        let offsets = offsets.map(|data| offsets_from_slice(&shape, data)).transpose()?;
        Ok(SoftmaxCPD {
            node_types: node_types.to_vec(),
            shape,
            form: Form::Parametric { weights, offsets },
            optimizer_kind: OptimizerKind::default(),
        })
    }

    /// Build a parameter-free unit-form CPD.
    ///
    /// # Errors
    /// Node-role violations, as for [`SoftmaxCPD::new`].
    pub fn unit_form(node_types: &[NodeType]) -> CPDResult<Self> {
        let shape = SoftmaxShape::from_node_types(node_types)?;
        Ok(SoftmaxCPD {
            node_types: node_types.to_vec(),
            shape,
            form: Form::Unit,
            optimizer_kind: OptimizerKind::default(),
        })
    }

    /// Deep copy of `other`, including its optimizer selection.
    pub fn copy(other: &SoftmaxCPD) -> Self {
        let form = match &other.form {
            Form::Unit => Form::Unit,
            Form::Parametric { weights, offsets } => Form::Parametric {
                weights: weights.as_ref().map(MatrixHandle::deep_clone),
                offsets: offsets.clone(),
            },
        };
        SoftmaxCPD {
            node_types: other.node_types.clone(),
            shape: other.shape,
            form,
            optimizer_kind: other.optimizer_kind,
        }
    }

    /// Clone with private weight storage.
    ///
    /// # Errors
    /// - Anything [`SoftmaxCPD::validate`] reports (kind `InconsistentState`).
    pub fn try_clone(&self) -> CPDResult<Self> {
        self.validate()?;
        Ok(Self::copy(self))
    }

    /// Clone that becomes another owner of this CPD's weight storage.
    ///
    /// Needs `&mut self` because exclusively owned weights are promoted to
    /// shared storage in place. Writes through either CPD's weights are
    /// visible through the other; offsets are copied.
    ///
    /// # Errors
    /// - Anything [`SoftmaxCPD::validate`] reports (kind `InconsistentState`).
    pub fn clone_sharing_matrices(&mut self) -> CPDResult<Self> {
        self.validate()?;
        let form = match &mut self.form {
            Form::Unit => Form::Unit,
            Form::Parametric { weights, offsets } => Form::Parametric {
                weights: weights.as_mut().map(MatrixHandle::share),
                offsets: offsets.clone(),
            },
        };
        Ok(SoftmaxCPD {
            node_types: self.node_types.clone(),
            shape: self.shape,
            form,
            optimizer_kind: self.optimizer_kind,
        })
    }

    // ---- Parameter storage ----

    /// Replace the weight matrix with a fresh copy of row-major `data`.
    ///
    /// # Errors
    /// - [`CPDError::UnitForm`] on a unit-form CPD.
    /// - [`CPDError::UnsupportedMatrixRole`] for any role but `Weights`.
    /// - [`CPDError::WeightDataLength`] if `data.len() != K * P`.
    pub fn alloc_matrix(&mut self, data: &[f64], role: MatrixRole) -> CPDResult<()> {
        self.check_weight_role("allocate matrix", role)?;
        let (rows, cols) = self.shape.weight_dims();
        let matrix = DenseMatrix::from_row_major(rows, cols, data)?;
        self.store_weights(MatrixHandle::unique(matrix))
    }

    /// Replace the weight matrix with `handle`, which may share storage with
    /// other owners.
    ///
    /// # Errors
    /// - [`CPDError::UnitForm`] on a unit-form CPD.
    /// - [`CPDError::UnsupportedMatrixRole`] for any role but `Weights`.
    /// - [`CPDError::WeightShapeMismatch`] unless the shape is exactly `[K, P]`.
    pub fn attach_matrix(&mut self, handle: MatrixHandle, role: MatrixRole) -> CPDResult<()> {
        self.check_weight_role("attach matrix", role)?;
        let expected = self.shape.weight_dims();
        let found = handle.dims();
        if found != expected {
            return Err(CPDError::WeightShapeMismatch { expected, found });
        }
        self.store_weights(handle)
    }

    /// Replace the offsets with a copy of `data`.
    ///
    /// # Errors
    /// - [`CPDError::UnitForm`] on a unit-form CPD.
    /// - [`CPDError::OffsetLengthMismatch`] if `data.len() != K`.
    pub fn alloc_offset_vector(&mut self, data: &[f64]) -> CPDResult<()> {
        self.check_parametric("allocate offset vector")?;
        let offsets = offsets_from_slice(&self.shape, data)?;
        self.attach_offset_vector(offsets)
    }

    /// Replace the offsets with `offsets`.
    ///
    /// # Errors
    /// As for [`SoftmaxCPD::alloc_offset_vector`].
    pub fn attach_offset_vector(&mut self, offsets: Array1<f64>) -> CPDResult<()> {
        let expected = self.shape.child_states;
        let Form::Parametric { offsets: slot, .. } = &mut self.form else {
            return Err(CPDError::UnitForm { operation: "attach offset vector" });
        };
        if offsets.len() != expected {
            return Err(CPDError::OffsetLengthMismatch { expected, found: offsets.len() });
        }
        *slot = Some(offsets);
        Ok(())
    }

    /// Fill weights and offsets with values drawn uniformly from `[-5, 5]`.
    ///
    /// # Errors
    /// - [`CPDError::UnitForm`] on a unit-form CPD.
    /// - [`CPDError::MatricesAlreadyPresent`] if weights are already stored.
    pub fn create_default_matrices<R: Rng + ?Sized>(&mut self, rng: &mut R) -> CPDResult<()> {
        let (rows, cols) = self.shape.weight_dims();
        let states = self.shape.child_states;
        match &mut self.form {
            Form::Unit => Err(CPDError::UnitForm { operation: "create default matrices" }),
            Form::Parametric { weights: Some(_), .. } => Err(CPDError::MatricesAlreadyPresent),
            Form::Parametric { weights, offsets } => {
                let range = -DEFAULT_PARAMETER_RANGE..=DEFAULT_PARAMETER_RANGE;
                let w = Array2::from_shape_fn((rows, cols), |_| rng.gen_range(range.clone()));
                let o = Array1::from_shape_fn(states, |_| rng.gen_range(range.clone()));
                *weights = Some(MatrixHandle::unique(DenseMatrix::from_array(w)));
                *offsets = Some(o);
                Ok(())
            }
        }
    }

    // ---- Accessors ----

    pub fn shape(&self) -> SoftmaxShape {
        self.shape
    }

    pub fn node_count(&self) -> usize {
        self.node_types.len()
    }

    /// Weight handle.
    ///
    /// # Errors
    /// - [`CPDError::UnitForm`] on a unit-form CPD.
    /// - [`CPDError::MissingParameter`] if no weights are stored.
    pub fn weights(&self) -> CPDResult<&MatrixHandle> {
        match &self.form {
            Form::Unit => Err(CPDError::UnitForm { operation: "read weights" }),
            Form::Parametric { weights, .. } => {
                weights.as_ref().ok_or(CPDError::MissingParameter { name: "weights" })
            }
        }
    }

    /// Mutable weight handle; writes are visible to every sharing owner.
    ///
    /// # Errors
    /// As for [`SoftmaxCPD::weights`].
    pub fn weights_mut(&mut self) -> CPDResult<&mut MatrixHandle> {
        match &mut self.form {
            Form::Unit => Err(CPDError::UnitForm { operation: "modify weights" }),
            Form::Parametric { weights, .. } => {
                weights.as_mut().ok_or(CPDError::MissingParameter { name: "weights" })
            }
        }
    }

    /// Offset vector.
    ///
    /// # Errors
    /// - [`CPDError::UnitForm`] on a unit-form CPD.
    /// - [`CPDError::MissingParameter`] if no offsets are stored.
    pub fn offsets(&self) -> CPDResult<&Array1<f64>> {
        match &self.form {
            Form::Unit => Err(CPDError::UnitForm { operation: "read offsets" }),
            Form::Parametric { offsets, .. } => {
                offsets.as_ref().ok_or(CPDError::MissingParameter { name: "offsets" })
            }
        }
    }

    /// Mutable offset vector.
    ///
    /// # Errors
    /// As for [`SoftmaxCPD::offsets`].
    pub fn offsets_mut(&mut self) -> CPDResult<&mut Array1<f64>> {
        match &mut self.form {
            Form::Unit => Err(CPDError::UnitForm { operation: "modify offsets" }),
            Form::Parametric { offsets, .. } => {
                offsets.as_mut().ok_or(CPDError::MissingParameter { name: "offsets" })
            }
        }
    }

    /// Snapshot of the live parameters.
    ///
    /// # Errors
    /// As for [`SoftmaxCPD::weights`] and [`SoftmaxCPD::offsets`].
    pub fn params(&self) -> CPDResult<SoftmaxParams> {
        let weights = self.weights()?.to_array();
        let offsets = self.offsets()?.clone();
        SoftmaxParams::from_parts(&self.shape, weights, offsets)
    }

    pub fn set_maximizing_method(&mut self, kind: OptimizerKind) {
        self.optimizer_kind = kind;
    }

    pub fn maximizing_method(&self) -> OptimizerKind {
        self.optimizer_kind
    }

    // ---- Validity ----

    /// Check stored parameter shapes and finiteness. Unit form and
    /// unallocated parameters are valid.
    ///
    /// # Errors
    /// - [`CPDError::InvalidDistribution`] for inconsistent shapes.
    /// - [`CPDError::NonFiniteParameter`] for the first NaN/±inf entry.
    pub fn validate(&self) -> CPDResult<()> {
        let Form::Parametric { weights, offsets } = &self.form else {
            return Ok(());
        };
        if let Some(handle) = weights {
            let dims = handle.dims();
            if dims != self.shape.weight_dims() {
                return Err(CPDError::InvalidDistribution {
                    reason: format!(
                        "weights have shape {dims:?}, expected {:?}",
                        self.shape.weight_dims()
                    ),
                });
            }
            let row_major = handle.read(DenseMatrix::to_row_major);
            if let Some((index, &value)) = row_major.iter().enumerate().find(|(_, v)| !v.is_finite())
            {
                return Err(CPDError::NonFiniteParameter { name: "weights", index, value });
            }
        }
        if let Some(offsets) = offsets {
            if offsets.len() != self.shape.child_states {
                return Err(CPDError::InvalidDistribution {
                    reason: format!(
                        "offsets have length {}, expected {}",
                        offsets.len(),
                        self.shape.child_states
                    ),
                });
            }
            if let Some((index, &value)) = offsets.iter().enumerate().find(|(_, v)| !v.is_finite())
            {
                return Err(CPDError::NonFiniteParameter { name: "offsets", index, value });
            }
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    // ---- Assignment ----

    /// Take over the value of `other`.
    ///
    /// - Both unit form: no-op.
    /// - Both parametric: weight data is copied into this CPD's existing
    ///   storage (so sharing owners observe it) and offsets are copied.
    /// - Differing forms: this CPD converts to `other`'s form, deep-copying
    ///   or releasing parameters.
    ///
    /// # Errors
    /// - [`CPDError::WrongDistributionKind`] if `other` is not a softmax CPD.
    /// - [`CPDError::IncompatibleAssignment`] for different node types.
    pub fn assign_from(&mut self, other: &dyn DistribFun) -> CPDResult<()> {
        let other = downcast(other)?;
        if other.node_types != self.node_types {
            return Err(CPDError::IncompatibleAssignment {
                reason: "node types of both distributions must be identical",
            });
        }
        match (&mut self.form, &other.form) {
            (Form::Unit, Form::Unit) => {}
            (
                Form::Parametric { weights, offsets },
                Form::Parametric { weights: src_w, offsets: src_o },
            ) => {
                match (weights.as_mut(), src_w) {
                    (Some(dst), Some(src)) if dst.same_storage(src) => {}
                    (Some(dst), Some(src)) => {
                        let data = src.read(DenseMatrix::clone);
                        dst.write(|m| m.copy_from(&data))?;
                    }
                    (None, Some(src)) => *weights = Some(src.deep_clone()),
                    (_, None) => *weights = None,
                }
                *offsets = src_o.clone();
            }
            (form, _) => *form = Self::copy(other).form,
        }
        Ok(())
    }

    // ---- Inference ----

    /// Class probabilities `P(child = k | x)` for one parent configuration,
    /// using all `K` live logits (pivoting is not required).
    ///
    /// A unit-form CPD returns the uniform distribution.
    ///
    /// # Errors
    /// - [`CPDError::ParentCountMismatch`] if `x.len() != P`.
    /// - [`CPDError::NonFiniteObservation`] for a NaN/±inf parent value.
    /// - Missing-parameter errors from [`SoftmaxCPD::params`].
    pub fn probabilities(&self, x: ArrayView1<'_, f64>) -> CPDResult<Array1<f64>> {
        if x.len() != self.shape.parent_count {
            return Err(CPDError::ParentCountMismatch {
                expected: self.shape.parent_count,
                found: x.len(),
            });
        }
        if let Some((col, &value)) = x.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(CPDError::NonFiniteObservation { row: 0, col, value });
        }
        if let Form::Unit = self.form {
            let k = self.shape.child_states;
            return Ok(Array1::from_elem(k, 1.0 / k as f64));
        }
        let params = self.params()?;
        let logits = Array1::from_shape_fn(self.shape.child_states, |k| params.logit(k, x));
        Ok(stable_softmax(logits.view()))
    }

    /// Most probable child state for one parent configuration; ties resolve
    /// to the lowest state.
    ///
    /// # Errors
    /// As for [`SoftmaxCPD::probabilities`].
    pub fn most_probable_state(&self, x: ArrayView1<'_, f64>) -> CPDResult<usize> {
        let probs = self.probabilities(x)?;
        let mut best = 0;
        for (k, &p) in probs.iter().enumerate().skip(1) {
            if p > probs[best] {
                best = k;
            }
        }
        Ok(best)
    }

    // ---- Learning ----

    /// Start a fit on deep copies of the live parameters.
    ///
    /// # Errors
    /// - [`CPDError::UnitForm`] on a unit-form CPD.
    /// - [`CPDError::MissingParameter`] if weights or offsets are missing.
    pub fn begin_learning(&self) -> CPDResult<FitSession> {
        let params = self.params()?;
        Ok(FitSession::new(self.node_types.clone(), params, self.optimizer_kind))
    }

    /// Refresh the live parameters from a finished session.
    ///
    /// Weight values are written into the existing storage, so every owner
    /// sharing it observes the fitted values.
    ///
    /// # Errors
    /// - [`CPDError::SessionDomainMismatch`] if the session was created for
    ///   other node types.
    /// - [`CPDError::LearningNotInitialized`] if the session's learning
    ///   copies were cleared.
    /// - [`CPDError::UnitForm`] on a unit-form CPD.
    pub fn commit_learning(&mut self, session: FitSession) -> CPDResult<()> {
        if session.node_types() != self.node_types.as_slice() {
            return Err(CPDError::SessionDomainMismatch);
        }
        let params = session.into_params()?;
        match &mut self.form {
            Form::Unit => Err(CPDError::UnitForm { operation: "commit learning" }),
            Form::Parametric { weights, offsets } => {
                let fitted = DenseMatrix::from_array(params.weights);
                match weights {
                    Some(handle) => handle.write(|m| m.copy_from(&fitted))?,
                    None => *weights = Some(MatrixHandle::unique(fitted)),
                }
                *offsets = Some(params.offsets);
                Ok(())
            }
        }
    }

    // ---- Helpers ----

    fn check_parametric(&self, operation: &'static str) -> CPDResult<()> {
        match self.form {
            Form::Unit => Err(CPDError::UnitForm { operation }),
            Form::Parametric { .. } => Ok(()),
        }
    }

    fn check_weight_role(&self, operation: &'static str, role: MatrixRole) -> CPDResult<()> {
        self.check_parametric(operation)?;
        if role != MatrixRole::Weights {
            return Err(CPDError::UnsupportedMatrixRole { role: role.name() });
        }
        Ok(())
    }

    /// Store `handle` as the weights, dropping (and so releasing) the old one.
    fn store_weights(&mut self, handle: MatrixHandle) -> CPDResult<()> {
        match &mut self.form {
            Form::Unit => Err(CPDError::UnitForm { operation: "store weights" }),
            Form::Parametric { weights, .. } => {
                *weights = Some(handle);
                Ok(())
            }
        }
    }

    fn compare_to_unit(&self, epsilon: f64) -> Comparison {
        let Form::Parametric { weights, offsets } = &self.form else {
            return Comparison::exact(true);
        };
        let w_sum = weights.as_ref().map_or(0.0, |h| h.read(|m| m.sum(true)));
        let o_sum = offsets.as_ref().map_or(0.0, |o| o.iter().map(|v| v.abs()).sum());
        let max_difference = w_sum.max(o_sum);
        Comparison { equal: w_sum <= epsilon && o_sum <= epsilon, max_difference }
    }
}

impl DistribFun for SoftmaxCPD {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn distribution_type(&self) -> DistributionType {
        DistributionType::SoftMax
    }

    fn node_types(&self) -> &[NodeType] {
        &self.node_types
    }

    fn is_unit_form(&self) -> bool {
        matches!(self.form, Form::Unit)
    }

    /// Tolerant comparison.
    ///
    /// - Different node types: unequal.
    /// - Unit vs unit: equal.
    /// - Unit vs parametric: equal iff the absolute weight sum and the
    ///   absolute offset sum are both within `epsilon`; the larger sum is
    ///   reported.
    /// - Parametric vs parametric: equal iff the mean absolute weight
    ///   difference and the mean absolute offset difference are both within
    ///   `epsilon`. A parameter present on one side only makes them unequal.
    ///
    /// # Errors
    /// - [`CPDError::WrongDistributionKind`] if `other` is not a softmax CPD.
    fn is_equal(&self, other: &dyn DistribFun, epsilon: f64) -> CPDResult<Comparison> {
        let other = downcast(other)?;
        if other.node_types != self.node_types {
            return Ok(Comparison::exact(false));
        }
        let (a, b) = match (&self.form, &other.form) {
            (Form::Unit, Form::Unit) => return Ok(Comparison::exact(true)),
            (Form::Unit, _) => return Ok(other.compare_to_unit(epsilon)),
            (_, Form::Unit) => return Ok(self.compare_to_unit(epsilon)),
            (
                Form::Parametric { weights: wa, offsets: oa },
                Form::Parametric { weights: wb, offsets: ob },
            ) => ((wa, oa), (wb, ob)),
        };
        let w_diff = match (a.0, b.0) {
            (Some(x), Some(y)) => mean_abs_diff(
                &x.read(DenseMatrix::to_row_major),
                &y.read(DenseMatrix::to_row_major),
            ),
            (None, None) => 0.0,
            _ => return Ok(Comparison::exact(false)),
        };
        let o_diff = match (a.1, b.1) {
            (Some(x), Some(y)) => mean_abs_diff(&x.to_vec(), &y.to_vec()),
            (None, None) => 0.0,
            _ => return Ok(Comparison::exact(false)),
        };
        Ok(Comparison {
            equal: w_diff <= epsilon && o_diff <= epsilon,
            max_difference: w_diff.max(o_diff),
        })
    }

    fn dump(&self) -> String {
        self.to_string()
    }

    fn number_of_free_parameters(&self) -> usize {
        match self.form {
            Form::Unit => 0,
            Form::Parametric { .. } => self.shape.free_parameter_count(),
        }
    }
}

impl fmt::Display for SoftmaxCPD {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Softmax distribution over {} nodes", self.node_types.len())?;
        match &self.form {
            Form::Unit => writeln!(f, "unit function distribution"),
            Form::Parametric { weights, offsets } => {
                let (rows, cols) = self.shape.weight_dims();
                match weights {
                    Some(handle) => {
                        writeln!(f, "weights [{rows} x {cols}]:")?;
                        for row in handle.to_array().rows() {
                            writeln!(f, "  {row}")?;
                        }
                    }
                    None => writeln!(f, "weights: not allocated")?,
                }
                match offsets {
                    Some(o) => writeln!(f, "offsets: {o}"),
                    None => writeln!(f, "offsets: not allocated"),
                }
            }
        }
    }
}

fn downcast(other: &dyn DistribFun) -> CPDResult<&SoftmaxCPD> {
    other
        .as_any()
        .downcast_ref::<SoftmaxCPD>()
        .ok_or(CPDError::WrongDistributionKind { found: other.distribution_type().name() })
}

fn offsets_from_slice(shape: &SoftmaxShape, data: &[f64]) -> CPDResult<Array1<f64>> {
    if data.len() != shape.child_states {
        return Err(CPDError::OffsetLengthMismatch {
            expected: shape.child_states,
            found: data.len(),
        });
    }
    Ok(Array1::from(data.to_vec()))
}

fn mean_abs_diff(a: &[f64], b: &[f64]) -> f64 {
    if a.is_empty() {
        return 0.0;
    }
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum::<f64>() / a.len() as f64
}
