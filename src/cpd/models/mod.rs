//! models — the softmax CPD, its fit sessions, and the framework interface.

pub mod distrib_fun;
pub mod fit_session;
pub mod objective;
pub mod softmax;

pub use self::distrib_fun::{Comparison, DistribFun, DistributionType};
pub use self::fit_session::FitSession;
pub use self::objective::SoftmaxObjective;
pub use self::softmax::{MatrixRole, SoftmaxCPD};
