use crate::executor::ExecutorError;
use crate::model::{Digest, ModelError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolverError {
    #[error(
        "action {action} declares {available} outputs, but output index {index} was requested"
    )]
    MissingOutput {
        action: Digest,
        index: usize,
        available: usize,
    },

    #[error(transparent)]
    ModelError(ModelError),

    #[error(transparent)]
    ExecutorError(ExecutorError),

    #[error(transparent)]
    EngineError(Box<crate::engine::EngineError>),
}

impl From<ModelError> for ResolverError {
    fn from(value: ModelError) -> Self {
        ResolverError::ModelError(value)
    }
}

impl From<ExecutorError> for ResolverError {
    fn from(value: ExecutorError) -> Self {
        ResolverError::ExecutorError(value)
    }
}

impl From<crate::engine::EngineError> for ResolverError {
    fn from(value: crate::engine::EngineError) -> Self {
        ResolverError::EngineError(Box::new(value))
    }
}
