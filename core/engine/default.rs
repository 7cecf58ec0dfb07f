use super::{EngineError, Evaluator};
use crate::executor::Executor;
use crate::model::{ActionExecutionKey, ActionExecutionValue, ActionKey, ActionValue, Digest};
use crate::resolver::{ActionResolver, ExecutionResolver};
use crate::store::CasStore;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::instrument;

type MemoTable<T> = DashMap<Digest, Arc<OnceCell<T>>>;

/// An in-process `Evaluator`: every key family gets a memo table of
/// once-cells, so concurrent requests for the same key share one in-flight
/// resolution and later requests share the finished result. Errors are not
/// cached; a failed resolution can be requested again.
///
/// The store and executor are explicit capabilities threaded through every
/// resolution, never ambient state.
///
pub struct DefaultEngine {
    store: Arc<dyn CasStore>,
    executor: Arc<dyn Executor>,
    action_keys: MemoTable<Arc<ActionKey>>,
    action_values: MemoTable<ActionValue>,
    execution_values: MemoTable<ActionExecutionValue>,
}

impl DefaultEngine {
    pub fn new(store: Arc<dyn CasStore>, executor: Arc<dyn Executor>) -> Self {
        Self {
            store,
            executor,
            action_keys: DashMap::new(),
            action_values: DashMap::new(),
            execution_values: DashMap::new(),
        }
    }

    pub fn store(&self) -> &Arc<dyn CasStore> {
        &self.store
    }

    /// Publish an action into the build: store its serialized form and prime
    /// the indirection cache, returning the digest other actions (and
    /// `ArtifactOwner`s) reference it by.
    #[instrument(name = "DefaultEngine::register_action", skip_all)]
    pub async fn register_action(&self, key: &ActionKey) -> Result<Digest, EngineError> {
        let bytes = key.encode()?;
        let digest = self.store.put(&bytes).await?;

        let cell = self.memo_cell(&self.action_keys, &digest);
        // a concurrent `action_key` may have deserialized it already
        let _ = cell.set(Arc::new(key.clone()));

        Ok(digest)
    }

    fn memo_cell<T: Clone>(&self, table: &MemoTable<T>, digest: &Digest) -> Arc<OnceCell<T>> {
        table
            .entry(digest.clone())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }
}

#[async_trait]
impl Evaluator for DefaultEngine {
    #[instrument(name = "DefaultEngine::action_key", skip(self))]
    async fn action_key(&self, digest: &Digest) -> Result<Arc<ActionKey>, EngineError> {
        let cell = self.memo_cell(&self.action_keys, digest);
        let key = cell
            .get_or_try_init(|| async {
                let bytes =
                    self.store
                        .get(digest)
                        .await?
                        .ok_or_else(|| EngineError::NotFound {
                            digest: digest.clone(),
                        })?;
                Ok::<_, EngineError>(Arc::new(ActionKey::decode(&bytes)?))
            })
            .await?;
        Ok(key.clone())
    }

    #[instrument(name = "DefaultEngine::action_value", skip(self))]
    async fn action_value(&self, action: &Digest) -> Result<ActionValue, EngineError> {
        let cell = self.memo_cell(&self.action_values, action);
        let value = cell
            .get_or_try_init(|| async {
                let key = self.action_key(action).await?;
                let value = ActionResolver::resolve(self, &key).await?;
                Ok::<_, EngineError>(value)
            })
            .await?;
        Ok(value.clone())
    }

    #[instrument(name = "DefaultEngine::execution_value", skip_all)]
    async fn execution_value(
        &self,
        key: &ActionExecutionKey,
    ) -> Result<ActionExecutionValue, EngineError> {
        let digest = key.digest()?;
        let cell = self.memo_cell(&self.execution_values, &digest);
        let value = cell
            .get_or_try_init(|| async {
                let value = ExecutionResolver::resolve(&*self.executor, key).await?;
                Ok::<_, EngineError>(value)
            })
            .await?;
        Ok(value.clone())
    }
}
