use crate::model::Digest;
use crate::store::StoreError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("requested an unimplemented feature: {feature}")]
    Unimplemented { feature: String },

    #[error("input {path:?} (digest {digest}) could not be loaded from the store")]
    MissingInput { digest: Digest, path: PathBuf },

    #[error("a required pre-action exited with a nonzero code. stderr:\n\n{stderr}")]
    PreActionFailure { stderr: String },

    #[error(transparent)]
    StoreError(StoreError),

    #[error(transparent)]
    Unexpected(anyhow::Error),
}

impl From<StoreError> for ExecutorError {
    fn from(value: StoreError) -> Self {
        ExecutorError::StoreError(value)
    }
}

impl From<anyhow::Error> for ExecutorError {
    fn from(value: anyhow::Error) -> Self {
        ExecutorError::Unexpected(value)
    }
}
