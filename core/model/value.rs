use super::Digest;
use serde::{Deserialize, Serialize};

/// The result of resolving an `ActionKey`: one output digest per declared
/// output, in declaration order. Position, not name, correlates request to
/// result.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ActionValue {
    outputs: Vec<Digest>,
}

impl ActionValue {
    pub fn new(outputs: Vec<Digest>) -> Self {
        Self { outputs }
    }

    pub fn outputs(&self) -> &[Digest] {
        &self.outputs
    }

    pub fn output(&self, index: usize) -> Option<&Digest> {
        self.outputs.get(index)
    }
}

/// The result of executing an `ActionExecutionKey`: output digests in
/// declaration order, the process exit code, and the captured stdout/stderr
/// streams as blobs.
///
/// A nonzero exit code is a valid value, not an error: the action ran and
/// failed, so `outputs` is empty and callers interpret failure from
/// `exit_code`.
///
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ActionExecutionValue {
    outputs: Vec<Digest>,
    exit_code: i32,
    stdout: Digest,
    stderr: Digest,
}

impl ActionExecutionValue {
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

    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }

    pub fn stdout(&self) -> &Digest {
        &self.stdout
    }

    pub fn stderr(&self) -> &Digest {
        &self.stderr
    }
}
