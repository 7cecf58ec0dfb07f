mod error;
pub mod local;

pub use error::*;

use crate::model::{ActionInput, ActionOutput, ActionSpec, Digest};
use async_trait::async_trait;

/// A concrete request for execution: the action spec plus fully-resolved
/// inputs (digest, path, kind) and the declared outputs to capture.
#[derive(Clone, Debug)]
pub struct ActionExecutionRequest {
    spec: ActionSpec,
    inputs: Vec<ActionInput>,
    outputs: Vec<ActionOutput>,
}

impl ActionExecutionRequest {
    pub fn new(spec: ActionSpec, inputs: Vec<ActionInput>, outputs: Vec<ActionOutput>) -> Self {
        Self {
            spec,
            inputs,
            outputs,
        }
    }

    pub fn spec(&self) -> &ActionSpec {
        &self.spec
    }

    pub fn inputs(&self) -> &[ActionInput] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[ActionOutput] {
        &self.outputs
    }
}

/// The outcome of one execution: output digests in declared order (empty when
/// the command exited nonzero), the exit code, and the captured stdout/stderr
/// blobs.
#[derive(Clone, Debug)]
pub struct ActionExecutionResponse {
    outputs: Vec<Digest>,
    exit_code: i32,
    stdout: Digest,
    stderr: Digest,
}

impl ActionExecutionResponse {
    pub fn new(outputs: Vec<Digest>, exit_code: i32, stdout: Digest, stderr: Digest) -> Self {
        Self {
            outputs,
            exit_code,
            stdout,
            stderr,
        }
    }

    pub fn outputs(&self) -> &[Digest] {
        &self.outputs
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    pub fn stdout(&self) -> &Digest {
        &self.stdout
    }

    pub fn stderr(&self) -> &Digest {
        &self.stderr
    }
}

/// The seam at which actual execution is pluggable: the local executor and
/// any remote equivalent are substitutable behind this one operation.
///
#[async_trait]
pub trait Executor: Sync + Send {
    async fn execute(
        &self,
        request: &ActionExecutionRequest,
    ) -> Result<ActionExecutionResponse, ExecutorError>;
}
