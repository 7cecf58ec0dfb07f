use crate::model::{Digest, ModelError};
use crate::resolver::ResolverError;
use crate::store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("no action in the store for digest {digest}")]
    NotFound { digest: Digest },

    #[error(transparent)]
    StoreError(StoreError),

    #[error(transparent)]
    ModelError(ModelError),

    #[error(transparent)]
    ResolverError(Box<ResolverError>),
}

impl From<StoreError> for EngineError {
    fn from(value: StoreError) -> Self {
        EngineError::StoreError(value)
    }
}

impl From<ModelError> for EngineError {
    fn from(value: ModelError) -> Self {
        EngineError::ModelError(value)
    }
}

impl From<ResolverError> for EngineError {
    fn from(value: ResolverError) -> Self {
        EngineError::ResolverError(Box::new(value))
    }
}
