use compact_squares_lib::{AlgorithmError, InstanceError};

/// Anything that can go wrong planning one instance, flattened for the
/// result line and the colored diagnostic.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Instance(#[from] InstanceError),
    #[error(transparent)]
    Algorithm(#[from] AlgorithmError),
}
