//! cpd::core::matrix — dense matrices and ownership-tagged handles.
//!
//! Purpose
//! -------
//! Provide the dense `f64` matrix used for softmax weights and an explicit
//! handle type that records whether the matrix is exclusively owned or
//! shared between several CPDs.
//!
//! Key behaviors
//! -------------
//! - [`DenseMatrix`] wraps an `ndarray::Array2<f64>` and offers the
//!   container operations the CPD layer needs: indexed get/set, a row-major
//!   buffer view, signed/absolute sum reduction, element-wise combine,
//!   shape-checked data copy, and in-place inversion.
//! - [`MatrixHandle::Unique`] owns its matrix outright; dropping the handle
//!   frees the storage.
//! - [`MatrixHandle::Shared`] holds one registration on reference-counted
//!   storage (`Rc<RefCell<_>>`). Cloning the `Rc` registers an owner and
//!   dropping a handle releases it; the last release frees the matrix.
//!
//! Invariants & assumptions
//! ------------------------
//! - There is no implicit `Clone` on [`MatrixHandle`]. Callers choose between
//!   [`MatrixHandle::deep_clone`] (always a fresh `Unique`) and
//!   [`MatrixHandle::share`] (another owner of the same storage).
//! - Writes through any `Shared` owner are visible through every other owner.
//! - Shared handles are `!Send`; a CPD and its sharing clones live on one
//!   thread.
//!
//! Conventions
//! -----------
//! - Shapes are `(rows, cols)`; for weights rows index child states and
//!   columns index parents.
//! - Row-major buffers follow `ndarray`'s standard layout.
//!
//! Testing notes
//! -------------
//! - Unit tests cover owner counting through share/drop, deep-clone
//!   independence, sum reductions, combine, and inversion.
use std::{cell::RefCell, rc::Rc};

use ndarray::{Array2, ArrayView2, ArrayViewMut2};

use crate::{
    cpd::errors::{CPDError, CPDResult},
    inference::hessian::invert_in_place,
};

/// Element-wise operation used by [`DenseMatrix::combine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombineOp {
    Add,
    Subtract,
    Multiply,
}

/// Dense row-major `f64` matrix.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DenseMatrix {
    data: Array2<f64>,
}

impl DenseMatrix {
    /// Zero-filled `rows x cols` matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        DenseMatrix { data: Array2::zeros((rows, cols)) }
    }

    /// Build a matrix by copying a row-major buffer.
    ///
    /// # Errors
    /// - [`CPDError::WeightDataLength`] if `data.len() != rows * cols`.
    pub fn from_row_major(rows: usize, cols: usize, data: &[f64]) -> CPDResult<Self> {
        if data.len() != rows * cols {
            return Err(CPDError::WeightDataLength { expected: rows * cols, found: data.len() });
        }
        let data = Array2::from_shape_vec((rows, cols), data.to_vec()).map_err(|_| {
            CPDError::WeightDataLength { expected: rows * cols, found: data.len() }
        })?;
        Ok(DenseMatrix { data })
    }

    /// Take ownership of an existing array.
    pub fn from_array(data: Array2<f64>) -> Self {
        DenseMatrix { data }
    }

    pub fn dims(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[[row, col]]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[[row, col]] = value;
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    pub fn view_mut(&mut self) -> ArrayViewMut2<'_, f64> {
        self.data.view_mut()
    }

    pub fn as_array(&self) -> &Array2<f64> {
        &self.data
    }

    pub fn into_array(self) -> Array2<f64> {
        self.data
    }

    /// Entries flattened in row-major order.
    pub fn to_row_major(&self) -> Vec<f64> {
        self.data.iter().copied().collect()
    }

    /// Sum of all entries, or of their absolute values when `absolute`.
    pub fn sum(&self, absolute: bool) -> f64 {
        if absolute { self.data.iter().map(|v| v.abs()).sum() } else { self.data.sum() }
    }

    /// Element-wise `self op other` into a new matrix.
    ///
    /// # Errors
    /// - [`CPDError::MatrixShapeMismatch`] if the shapes differ.
    pub fn combine(&self, other: &DenseMatrix, op: CombineOp) -> CPDResult<DenseMatrix> {
        self.check_same_dims(other)?;
        let data = match op {
            CombineOp::Add => &self.data + &other.data,
            CombineOp::Subtract => &self.data - &other.data,
            CombineOp::Multiply => &self.data * &other.data,
        };
        Ok(DenseMatrix { data })
    }

    /// Overwrite this matrix's entries with `other`'s, keeping the storage.
    ///
    /// # Errors
    /// - [`CPDError::MatrixShapeMismatch`] if the shapes differ.
    pub fn copy_from(&mut self, other: &DenseMatrix) -> CPDResult<()> {
        self.check_same_dims(other)?;
        self.data.assign(&other.data);
        Ok(())
    }

    /// Replace the matrix with its inverse.
    ///
    /// # Errors
    /// - [`CPDError::NonSquareMatrix`] for non-square matrices.
    /// - [`CPDError::SingularHessian`] if the matrix is singular.
    pub fn invert_in_place(&mut self) -> CPDResult<()> {
        invert_in_place(&mut self.data)
    }

    fn check_same_dims(&self, other: &DenseMatrix) -> CPDResult<()> {
        if self.dims() != other.dims() {
            return Err(CPDError::MatrixShapeMismatch { left: self.dims(), right: other.dims() });
        }
        Ok(())
    }
}

/// Ownership-tagged handle to a [`DenseMatrix`].
///
/// `Unique` handles are exclusive. `Shared` handles are one registered owner
/// of reference-counted storage; the storage lives until the last owner
/// drops.
#[derive(Debug)]
pub enum MatrixHandle {
    Unique(DenseMatrix),
    Shared(Rc<RefCell<DenseMatrix>>),
}

impl MatrixHandle {
    pub fn unique(matrix: DenseMatrix) -> Self {
        MatrixHandle::Unique(matrix)
    }

    /// Wrap a matrix in fresh shared storage with a single owner.
    pub fn shared(matrix: DenseMatrix) -> Self {
        MatrixHandle::Shared(Rc::new(RefCell::new(matrix)))
    }

    /// Copy the current contents into a new, exclusively owned handle.
    pub fn deep_clone(&self) -> MatrixHandle {
        MatrixHandle::Unique(self.read(DenseMatrix::clone))
    }

    /// Register another owner of this handle's storage and return it.
    ///
    /// A `Unique` handle is first promoted to `Shared` in place, so both the
    /// original and the returned handle refer to the same storage afterwards.
    pub fn share(&mut self) -> MatrixHandle {
        let storage = match self {
            MatrixHandle::Shared(storage) => Rc::clone(storage),
            MatrixHandle::Unique(matrix) => {
                let storage = Rc::new(RefCell::new(std::mem::take(matrix)));
                *self = MatrixHandle::Shared(Rc::clone(&storage));
                storage
            }
        };
        MatrixHandle::Shared(storage)
    }

    /// Number of registered owners of the underlying storage.
    pub fn owner_count(&self) -> usize {
        match self {
            MatrixHandle::Unique(_) => 1,
            MatrixHandle::Shared(storage) => Rc::strong_count(storage),
        }
    }

    pub fn is_shared(&self) -> bool {
        matches!(self, MatrixHandle::Shared(_))
    }

    /// `true` if both handles refer to the same shared storage.
    pub fn same_storage(&self, other: &MatrixHandle) -> bool {
        match (self, other) {
            (MatrixHandle::Shared(a), MatrixHandle::Shared(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Run `f` with shared access to the matrix.
    ///
    /// # Panics
    /// - If the shared storage is currently borrowed mutably (re-entrant
    ///   access from inside [`MatrixHandle::write`]).
    pub fn read<R>(&self, f: impl FnOnce(&DenseMatrix) -> R) -> R {
        match self {
            MatrixHandle::Unique(matrix) => f(matrix),
            MatrixHandle::Shared(storage) => f(&*storage.borrow()),
        }
    }

    /// Run `f` with mutable access to the matrix; visible to every owner.
    ///
    /// # Panics
    /// - If the shared storage is currently borrowed (re-entrant access).
    pub fn write<R>(&mut self, f: impl FnOnce(&mut DenseMatrix) -> R) -> R {
        match self {
            MatrixHandle::Unique(matrix) => f(matrix),
            MatrixHandle::Shared(storage) => f(&mut *storage.borrow_mut()),
        }
    }

    pub fn dims(&self) -> (usize, usize) {
        self.read(DenseMatrix::dims)
    }

    /// Owned copy of the current contents.
    pub fn to_array(&self) -> Array2<f64> {
        self.read(|m| m.as_array().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Owner registration and release across share/drop.
    // - Independence of deep clones.
    // - Sum reductions, element-wise combine, and inversion.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify that sharing promotes a unique handle and that dropping one
    // owner leaves the storage alive for the other.
    //
    // Given
    // -----
    // - A unique 2x2 matrix handle.
    //
    // Expect
    // ------
    // - After `share`, both handles are shared, report two owners, and alias.
    // - After dropping the second handle, the first reports one owner and
    //   still reads the original contents.
    fn share_registers_owner_and_drop_releases_it() {
        // Arrange
        let mut original = MatrixHandle::unique(DenseMatrix::from_array(array![[1.0, 2.0], [3.0, 4.0]]));

        // Act
        let second = original.share();

        // Assert
        assert!(original.is_shared());
        assert!(original.same_storage(&second));
        assert_eq!(original.owner_count(), 2);
        drop(second);
        assert_eq!(original.owner_count(), 1);
        assert_eq!(original.to_array(), array![[1.0, 2.0], [3.0, 4.0]]);
    }

    #[test]
    // Purpose
    // -------
    // Writes through one shared owner are observable through the other,
    // while a deep clone stays untouched.
    //
    // Given
    // -----
    // - A handle, a sharing owner, and a deep clone.
    //
    // Expect
    // ------
    // - Setting an entry through the sharing owner changes the original but
    //   not the deep clone.
    fn write_through_shared_owner_is_visible_but_deep_clone_is_independent() {
        // Arrange
        let mut original = MatrixHandle::unique(DenseMatrix::zeros(2, 2));
        let mut sharing = original.share();
        let deep = original.deep_clone();

        // Act
        sharing.write(|m| m.set(0, 1, 7.5));

        // Assert
        assert_eq!(original.read(|m| m.get(0, 1)), 7.5);
        assert_eq!(deep.read(|m| m.get(0, 1)), 0.0);
        assert!(!deep.is_shared());
        assert_eq!(deep.owner_count(), 1);
    }

    #[test]
    // Purpose
    // -------
    // Check the reductions and element-wise combine.
    //
    // Given
    // -----
    // - Matrices `a = [[1, -2], [3, -4]]` and `b = [[1, 1], [1, 1]]`.
    //
    // Expect
    // ------
    // - Signed sum -2, absolute sum 10; `a - b` and `a * b` element-wise.
    fn sum_and_combine_follow_elementwise_semantics() {
        // Arrange
        let a = DenseMatrix::from_row_major(2, 2, &[1.0, -2.0, 3.0, -4.0]).unwrap();
        let b = DenseMatrix::from_array(Array2::ones((2, 2)));

        // Act
        let diff = a.combine(&b, CombineOp::Subtract).unwrap();
        let prod = a.combine(&b, CombineOp::Multiply).unwrap();

        // Assert
        assert_eq!(a.sum(false), -2.0);
        assert_eq!(a.sum(true), 10.0);
        assert_eq!(diff.to_row_major(), vec![0.0, -3.0, 2.0, -5.0]);
        assert_eq!(prod, a);
        assert!(a.combine(&DenseMatrix::zeros(1, 2), CombineOp::Add).is_err());
    }

    #[test]
    // Purpose
    // -------
    // Inversion replaces the matrix with its inverse and rejects bad inputs.
    //
    // Given
    // -----
    // - `[[4, 7], [2, 6]]`, a singular matrix, and a non-square matrix.
    //
    // Expect
    // ------
    // - The inverse `[[0.6, -0.7], [-0.2, 0.4]]`; errors otherwise.
    fn invert_in_place_inverts_regular_and_rejects_singular_matrices() {
        // Arrange
        let mut m = DenseMatrix::from_array(array![[4.0, 7.0], [2.0, 6.0]]);
        let mut singular = DenseMatrix::from_array(array![[1.0, 2.0], [2.0, 4.0]]);
        let mut rect = DenseMatrix::zeros(2, 3);

        // Act
        m.invert_in_place().unwrap();

        // Assert
        assert_relative_eq!(m.get(0, 0), 0.6, epsilon = 1e-12);
        assert_relative_eq!(m.get(0, 1), -0.7, epsilon = 1e-12);
        assert_relative_eq!(m.get(1, 0), -0.2, epsilon = 1e-12);
        assert_relative_eq!(m.get(1, 1), 0.4, epsilon = 1e-12);
        assert_eq!(singular.invert_in_place(), Err(CPDError::SingularHessian { dim: 2 }));
        assert_eq!(rect.invert_in_place(), Err(CPDError::NonSquareMatrix { rows: 2, cols: 3 }));
    }
}
