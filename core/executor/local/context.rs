use crate::store::CasStore;
use crate::Config;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Clone)]
pub struct LocalExecutorContext {
    pub(crate) store: Arc<dyn CasStore>,
    pub(crate) sandbox_root: PathBuf,
}

impl LocalExecutorContext {
    pub fn new(config: &Config, store: Arc<dyn CasStore>) -> Self {
        Self {
            store,
            sandbox_root: config.sandbox_root().clone(),
        }
    }
}
