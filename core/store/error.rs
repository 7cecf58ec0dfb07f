use crate::model::Digest;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("no object in the store for digest {digest}")]
    NotFound { digest: Digest },

    #[error("could not access {path:?} due to: {err:?}")]
    IoError {
        path: PathBuf,
        err: std::io::Error,
    },

    #[error("could not encode/decode tree manifest: {0}")]
    CodecError(#[from] bincode::Error),

    #[error(transparent)]
    Unknown(anyhow::Error),
}

impl From<anyhow::Error> for StoreError {
    fn from(value: anyhow::Error) -> Self {
        StoreError::Unknown(value)
    }
}
