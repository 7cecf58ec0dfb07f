use super::ResolverError;
use crate::engine::Evaluator;
use crate::model::{
    ActionExecutionKey, ActionInput, ActionKey, ActionValue, ArtifactOrigin, Digest,
};
use tracing::instrument;

/// Resolves an action whose inputs may still be symbolic into a request for
/// its execution, and surfaces the execution's result as the action's value.
///
/// Derived inputs recurse through the evaluation engine, which is how
/// transitive dependencies get built; the engine's memoization guarantees each
/// owning action resolves at most once per build. A failed input makes the
/// whole action unresolved: no retries, no partial results.
///
pub struct ActionResolver;

impl ActionResolver {
    #[instrument(name = "ActionResolver::resolve", skip_all)]
    pub async fn resolve(
        engine: &dyn Evaluator,
        key: &ActionKey,
    ) -> Result<ActionValue, ResolverError> {
        let ActionKey::Command(cmd) = key;

        let mut inputs = Vec::with_capacity(cmd.inputs().len());
        for artifact in cmd.inputs() {
            let digest: Digest = match artifact.origin() {
                // Content already known; the indirection cache is never
                // consulted for these.
                ArtifactOrigin::Source(digest) => digest.clone(),

                ArtifactOrigin::Derived(owner) => {
                    let value = engine.action_value(owner.action()).await?;
                    value
                        .output(owner.output_index())
                        .cloned()
                        .ok_or_else(|| ResolverError::MissingOutput {
                            action: owner.action().clone(),
                            index: owner.output_index(),
                            available: value.outputs().len(),
                        })?
                }
            };
            inputs.push(ActionInput::new(digest, artifact.path(), artifact.kind()));
        }

        let execution_key =
            ActionExecutionKey::command(cmd.spec().clone(), inputs, cmd.outputs().to_vec());

        let value = engine.execution_value(&execution_key).await?;

        Ok(ActionValue::new(value.outputs().to_vec()))
    }
}
