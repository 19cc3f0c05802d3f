//! core — value types and numeric kernels shared by the softmax CPD.
//!
//! - [`node_type`]: node descriptors and role validation.
//! - [`shape`]: `K`/`P` dimensions and the flat θ layout.
//! - [`matrix`]: dense matrices and ownership-tagged handles.
//! - [`params`]: plain-array parameter pack with pivot/pack/unpack.
//! - [`observations`]: validated observation batches.
//! - [`likelihood`]: log-likelihood and gradient.
//! - [`options`]: optimizer selection and fit options.

pub mod likelihood;
pub mod matrix;
pub mod node_type;
pub mod observations;
pub mod options;
pub mod params;
pub mod shape;

pub use self::matrix::{CombineOp, DenseMatrix, MatrixHandle};
pub use self::node_type::NodeType;
pub use self::observations::SoftmaxObservations;
pub use self::options::{FitOptions, OptimizerKind};
pub use self::params::SoftmaxParams;
pub use self::shape::SoftmaxShape;
