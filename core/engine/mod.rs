mod default;
mod error;

pub use default::*;
pub use error::*;

use crate::model::{ActionExecutionKey, ActionExecutionValue, ActionKey, ActionValue, Digest};
use async_trait::async_trait;
use std::sync::Arc;

/// The narrow contract this core consumes from the surrounding build
/// evaluation engine: resolve a key to a value, asynchronously, memoized per
/// key-equality within one build.
///
/// Scheduling, caching policy, and invalidation all live behind this seam.
///
#[async_trait]
pub trait Evaluator: Sync + Send {
    /// The action indirection cache: look up the serialized action bytes by
    /// digest, deserialize once, and share the structured value with every
    /// consumer. An absent digest is a dangling reference into the store and
    /// is fatal for the requesting evaluation.
    async fn action_key(&self, digest: &Digest) -> Result<Arc<ActionKey>, EngineError>;

    /// Resolve an action, by the digest of its serialized key, to its output
    /// digests. Resolving the same digest twice within one build executes the
    /// action at most once.
    async fn action_value(&self, action: &Digest) -> Result<ActionValue, EngineError>;

    /// Resolve a fully-concrete execution key by actually executing it,
    /// memoized per concrete-input-set.
    async fn execution_value(
        &self,
        key: &ActionExecutionKey,
    ) -> Result<ActionExecutionValue, EngineError>;
}
