//! Capability interface a graphical-model framework uses to talk to a CPD.
//!
//! [`DistribFun`] is object safe so heterogeneous distributions can be held
//! as `&dyn DistribFun`; concrete types are recovered with
//! [`DistribFun::as_any`]. Operations a distribution does not support have
//! default bodies that fail with [`CPDError::NotImplemented`], which callers
//! can tell apart from every other failure through
//! [`ErrorKind::NotImplemented`](crate::cpd::errors::ErrorKind::NotImplemented).
use std::any::Any;

use crate::cpd::{
    core::node_type::NodeType,
    errors::{CPDError, CPDResult},
};

/// Distribution families known to the framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DistributionType {
    SoftMax,
}

impl DistributionType {
    pub fn name(&self) -> &'static str {
        match self {
            DistributionType::SoftMax => "softmax",
        }
    }
}

/// Result of a tolerant equality check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison {
    pub equal: bool,
    /// Largest discrepancy measure that was compared against epsilon.
    pub max_difference: f64,
}

impl Comparison {
    pub fn exact(equal: bool) -> Self {
        Comparison { equal, max_difference: if equal { 0.0 } else { f64::INFINITY } }
    }
}

fn not_implemented<T>(operation: &'static str) -> CPDResult<T> {
    Err(CPDError::NotImplemented { operation })
}

/// Distribution-function capabilities.
pub trait DistribFun {
    fn as_any(&self) -> &dyn Any;

    fn distribution_type(&self) -> DistributionType;

    fn node_types(&self) -> &[NodeType];

    fn is_unit_form(&self) -> bool;

    /// Compare with another distribution within `epsilon`.
    fn is_equal(&self, other: &dyn DistribFun, epsilon: f64) -> CPDResult<Comparison>;

    /// Human-readable description of the parameters.
    fn dump(&self) -> String;

    fn number_of_free_parameters(&self) -> usize;

    // ---- Unsupported by default ----

    fn marginalize(&self, _dims_to_keep: &[usize]) -> CPDResult<Box<dyn DistribFun>> {
        not_implemented("marginalize")
    }

    fn multiply_in_self(&mut self, _other: &dyn DistribFun) -> CPDResult<()> {
        not_implemented("multiply_in_self")
    }

    fn sum_in_self(&mut self, _other: &dyn DistribFun) -> CPDResult<()> {
        not_implemented("sum_in_self")
    }

    fn divide_in_self(&mut self, _other: &dyn DistribFun) -> CPDResult<()> {
        not_implemented("divide_in_self")
    }

    fn normalize(&mut self) -> CPDResult<()> {
        not_implemented("normalize")
    }

    fn get_normalized(&self) -> CPDResult<Box<dyn DistribFun>> {
        not_implemented("get_normalized")
    }

    fn update_statistics_ml(&mut self, _evidence: &[Vec<f64>]) -> CPDResult<()> {
        not_implemented("update_statistics_ml")
    }

    fn update_statistics_em(&mut self, _evidence: &[Vec<f64>]) -> CPDResult<()> {
        not_implemented("update_statistics_em")
    }

    fn cpd_to_pi(&self, _other: &dyn DistribFun) -> CPDResult<Box<dyn DistribFun>> {
        not_implemented("cpd_to_pi")
    }

    fn cpd_to_lambda(&self, _other: &dyn DistribFun) -> CPDResult<Box<dyn DistribFun>> {
        not_implemented("cpd_to_lambda")
    }

    fn get_mpe(&self) -> CPDResult<Box<dyn DistribFun>> {
        not_implemented("get_mpe")
    }

    fn shrink_observed_nodes(&self, _observed: &[usize]) -> CPDResult<Box<dyn DistribFun>> {
        not_implemented("shrink_observed_nodes")
    }

    fn expand_data(&self, _dims: &[usize]) -> CPDResult<Box<dyn DistribFun>> {
        not_implemented("expand_data")
    }

    fn convert_to_potential(&self) -> CPDResult<Box<dyn DistribFun>> {
        not_implemented("convert_to_potential")
    }
}
