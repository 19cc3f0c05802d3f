//! Node-type descriptors for the nodes a CPD is defined over.
//!
//! A softmax CPD spans `P` continuous parents followed by one discrete child.
//! Each parent contributes a single scalar value per observation; the child's
//! `size` is its number of states.
use crate::cpd::errors::{CPDError, CPDResult};

/// Discreteness flag and size of a single node.
///
/// - `is_discrete`: `true` for discrete nodes (the softmax child).
/// - `size`: number of states for discrete nodes, dimension for continuous
///   nodes. Always `>= 1` when built through the constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeType {
    pub is_discrete: bool,
    pub size: usize,
}

impl NodeType {
    /// Discrete node with `states` states.
    pub fn discrete(states: usize) -> Self {
        NodeType { is_discrete: true, size: states }
    }

    /// Scalar continuous node.
    pub fn continuous() -> Self {
        NodeType { is_discrete: false, size: 1 }
    }
}

/// Validate the node roles required by a softmax CPD.
///
/// # Rules
/// - At least one node (the child) must be present.
/// - Every node size is `>= 1`.
/// - The last node is discrete; all preceding nodes are continuous scalars.
///
/// # Errors
/// - [`CPDError::EmptyDomain`] for an empty slice.
/// - [`CPDError::InvalidNodeSize`] for a zero-sized node.
/// - [`CPDError::ChildNotDiscrete`] / [`CPDError::DiscreteParent`] /
///   [`CPDError::NonScalarParent`] for role violations (all map to
///   `ErrorKind::InconsistentType`).
pub fn validate_node_types(node_types: &[NodeType]) -> CPDResult<()> {
    let child_index = match node_types.len() {
        0 => return Err(CPDError::EmptyDomain),
        n => n - 1,
    };
    for (index, node) in node_types.iter().enumerate() {
        if node.size == 0 {
            return Err(CPDError::InvalidNodeSize { index, size: node.size });
        }
    }
    if !node_types[child_index].is_discrete {
        return Err(CPDError::ChildNotDiscrete { index: child_index });
    }
    for (index, node) in node_types[..child_index].iter().enumerate() {
        if node.is_discrete {
            return Err(CPDError::DiscreteParent { index });
        }
        if node.size != 1 {
            return Err(CPDError::NonScalarParent { index, size: node.size });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpd::errors::ErrorKind;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Acceptance of continuous parents with a discrete child.
    // - Rejection of every role violation with `InconsistentType`, including
    //   continuous parents wider than one scalar.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Accept the canonical softmax domain and a child-only domain.
    //
    // Given
    // -----
    // - Two continuous parents plus a 3-state child.
    // - A single 2-state child with no parents.
    //
    // Expect
    // ------
    // - Both validate successfully.
    fn validate_node_types_accepts_continuous_parents_and_discrete_child() {
        // Arrange
        let full = [NodeType::continuous(), NodeType::continuous(), NodeType::discrete(3)];
        let child_only = [NodeType::discrete(2)];

        // Act / Assert
        assert!(validate_node_types(&full).is_ok());
        assert!(validate_node_types(&child_only).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // Reject domains whose child is continuous or whose parents are discrete.
    //
    // Given
    // -----
    // - A continuous last node.
    // - A discrete parent in front of a discrete child.
    //
    // Expect
    // ------
    // - `ChildNotDiscrete` / `DiscreteParent`, both `InconsistentType`.
    fn validate_node_types_rejects_role_violations_as_inconsistent_type() {
        // Arrange
        let continuous_child = [NodeType::continuous(), NodeType::continuous()];
        let discrete_parent = [NodeType::discrete(2), NodeType::discrete(3)];

        // Act
        let child_err = validate_node_types(&continuous_child).unwrap_err();
        let parent_err = validate_node_types(&discrete_parent).unwrap_err();

        // Assert
        assert_eq!(child_err, CPDError::ChildNotDiscrete { index: 1 });
        assert_eq!(parent_err, CPDError::DiscreteParent { index: 0 });
        assert_eq!(child_err.kind(), ErrorKind::InconsistentType);
        assert_eq!(parent_err.kind(), ErrorKind::InconsistentType);
    }

    #[test]
    // Purpose
    // -------
    // Reject empty domains and zero-sized nodes.
    //
    // Given
    // -----
    // - An empty slice and a 0-state child.
    //
    // Expect
    // ------
    // - `EmptyDomain` and `InvalidNodeSize`.
    fn validate_node_types_rejects_empty_and_zero_sized_domains() {
        assert_eq!(validate_node_types(&[]).unwrap_err(), CPDError::EmptyDomain);
        assert_eq!(
            validate_node_types(&[NodeType::discrete(0)]).unwrap_err(),
            CPDError::InvalidNodeSize { index: 0, size: 0 }
        );
    }

    #[test]
    // Purpose
    // -------
    // Reject continuous parents that carry more than one scalar.
    //
    // Given
    // -----
    // - A 2-dimensional continuous parent before a discrete child.
    //
    // Expect
    // ------
    // - `NonScalarParent { index: 1, size: 2 }`, kind `InconsistentType`.
    fn validate_node_types_rejects_multidimensional_parents() {
        // Arrange
        let wide = NodeType { is_discrete: false, size: 2 };
        let nodes = [NodeType::continuous(), wide, NodeType::discrete(3)];

        // Act
        let err = validate_node_types(&nodes).unwrap_err();

        // Assert
        assert_eq!(err, CPDError::NonScalarParent { index: 1, size: 2 });
        assert_eq!(err.kind(), ErrorKind::InconsistentType);
    }
}
