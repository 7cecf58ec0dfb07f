use super::ResolverError;
use crate::executor::{ActionExecutionRequest, Executor};
use crate::model::{ActionExecutionKey, ActionExecutionValue};
use tracing::instrument;

/// Pure indirection between a concrete `ActionExecutionKey` and whichever
/// `Executor` is plugged in. It exists so the engine memoizes per
/// concrete-input-set rather than per caller, and so executors are
/// substitutable without touching action resolution.
///
pub struct ExecutionResolver;

impl ExecutionResolver {
    #[instrument(name = "ExecutionResolver::resolve", skip_all)]
    pub async fn resolve(
        executor: &dyn Executor,
        key: &ActionExecutionKey,
    ) -> Result<ActionExecutionValue, ResolverError> {
        let ActionExecutionKey::Command(cmd) = key;

        let request = ActionExecutionRequest::new(
            cmd.spec().clone(),
            cmd.inputs().to_vec(),
            cmd.outputs().to_vec(),
        );

        let response = executor.execute(&request).await?;

        Ok(ActionExecutionValue::new(
            response.outputs().to_vec(),
            response.exit_code(),
            response.stdout().clone(),
            response.stderr().clone(),
        ))
    }
}
