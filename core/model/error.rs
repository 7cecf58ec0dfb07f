use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("could not encode/decode value: {0}")]
    CodecError(#[from] bincode::Error),
}
