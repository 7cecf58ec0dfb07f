mod default;
mod error;
mod tree;

pub use default::*;
pub use error::*;
pub use tree::*;

use crate::model::Digest;
use async_trait::async_trait;
use std::path::Path;

/// The content-addressable store every artifact, directory tree, and action in
/// a build lives in. Objects are retrieved by the digest of their content, so
/// writes of identical content are idempotent by construction and the store is
/// safe for unordered concurrent access.
///
#[async_trait]
pub trait CasStore: Sync + Send {
    /// Fetch the bytes stored under `digest`, or `None` if the store has never
    /// seen that content.
    async fn get(&self, digest: &Digest) -> Result<Option<Vec<u8>>, StoreError>;

    /// Store `bytes` and return the digest they are now addressable by.
    async fn put(&self, bytes: &[u8]) -> Result<Digest, StoreError>;

    /// Materialize the directory tree identified by `digest` at `dst`.
    async fn export_tree(&self, digest: &Digest, dst: &Path) -> Result<(), StoreError>;

    /// Import the directory at `path` into the store, returning the digest of
    /// its tree manifest.
    async fn import_tree(&self, path: &Path) -> Result<Digest, StoreError>;

    /// The digest of the tree with no entries. Used to represent a declared
    /// directory output that the command never created.
    async fn empty_tree(&self) -> Result<Digest, StoreError>;
}
