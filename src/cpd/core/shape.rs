//! Dimensions of a softmax CPD and the flat free-parameter layout.
//!
//! With `K` child states and `P` continuous parents the pivoted model has
//! `(K - 1) * (P + 1)` free parameters. They are flattened state-major:
//! for state `k < K - 1` and slot `i <= P`, the entry lives at
//! `k * (P + 1) + i`, where `i < P` addresses the weight of parent `i` and
//! `i == P` addresses the bias (offset). The Hessian uses the same layout on
//! both axes.
use crate::cpd::core::node_type::{NodeType, validate_node_types};
use crate::cpd::errors::CPDResult;

/// Child-state count `K` and parent count `P` of a softmax CPD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoftmaxShape {
    pub child_states: usize,
    pub parent_count: usize,
}

impl SoftmaxShape {
    /// Derive the shape from a validated node-type list.
    ///
    /// # Errors
    /// Propagates node-role violations from [`validate_node_types`].
    pub fn from_node_types(node_types: &[NodeType]) -> CPDResult<Self> {
        validate_node_types(node_types)?;
        let parent_count = node_types.len() - 1;
        Ok(SoftmaxShape { child_states: node_types[parent_count].size, parent_count })
    }

    /// Number of nodes (parents plus child).
    pub fn node_count(&self) -> usize {
        self.parent_count + 1
    }

    /// `(rows, cols)` of the weight matrix.
    pub fn weight_dims(&self) -> (usize, usize) {
        (self.child_states, self.parent_count)
    }

    /// Number of free parameters after pivoting, `(K - 1) * (P + 1)`.
    pub fn free_parameter_count(&self) -> usize {
        self.child_states.saturating_sub(1) * self.node_count()
    }

    /// Side length of the Hessian, `(K - 1) * node_count`.
    pub fn hessian_side(&self) -> usize {
        self.free_parameter_count()
    }

    /// Flat index of `slot` for `state`; `slot == parent_count` is the bias.
    #[inline]
    pub fn theta_index(&self, state: usize, slot: usize) -> usize {
        state * self.node_count() + slot
    }

    /// Flat index of the bias for `state`.
    #[inline]
    pub fn bias_index(&self, state: usize) -> usize {
        self.theta_index(state, self.parent_count)
    }

    /// Index of the pivot (last) child state.
    #[inline]
    pub fn pivot_state(&self) -> usize {
        self.child_states - 1
    }
}
