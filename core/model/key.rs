use super::{ActionSpec, Artifact, ArtifactKind, Digest, ModelError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A fully-concrete action input: the content digest plus the path it gets
/// materialized at, relative to the execution root.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct ActionInput {
    digest: Digest,
    path: PathBuf,
    kind: ArtifactKind,
}

impl ActionInput {
    pub fn new(digest: Digest, path: PathBuf, kind: ArtifactKind) -> Self {
        Self { digest, path, kind }
    }

    pub fn digest(&self) -> &Digest {
        &self.digest
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }
}

/// A declared action output: where the executed command is expected to leave
/// it, relative to the execution root.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct ActionOutput {
    path: PathBuf,
    kind: ArtifactKind,
}

impl ActionOutput {
    pub fn new(path: PathBuf, kind: ArtifactKind) -> Self {
        Self { path, kind }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }
}

/// The identity of an action whose inputs may still be symbolic, referring to
/// the outputs of other not-yet-built actions. Identity is structural: the
/// digest of the serialized form.
///
/// New execution strategies get new variants; stored keys stay interpretable
/// as variants are added, and callers switch exhaustively on kind.
///
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum ActionKey {
    Command(CommandActionKey),
}

#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct CommandActionKey {
    spec: ActionSpec,
    inputs: Vec<Artifact>,
    outputs: Vec<ActionOutput>,
}

impl ActionKey {
    pub fn command(spec: ActionSpec, inputs: Vec<Artifact>, outputs: Vec<ActionOutput>) -> Self {
        Self::Command(CommandActionKey {
            spec,
            inputs,
            outputs,
        })
    }

    pub fn encode(&self) -> Result<Vec<u8>, ModelError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, ModelError> {
        Ok(bincode::deserialize(bytes)?)
    }

    pub fn digest(&self) -> Result<Digest, ModelError> {
        Ok(Digest::of_bytes(&self.encode()?))
    }
}

impl CommandActionKey {
    pub fn spec(&self) -> &ActionSpec {
        &self.spec
    }

    pub fn inputs(&self) -> &[Artifact] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[ActionOutput] {
        &self.outputs
    }
}

/// The identity of an action whose inputs are already concrete content
/// digests, never symbolic. This is the input to the executor boundary, and
/// the unit the engine memoizes executions by.
///
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum ActionExecutionKey {
    Command(CommandActionExecutionKey),
}

#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct CommandActionExecutionKey {
    spec: ActionSpec,
    inputs: Vec<ActionInput>,
    outputs: Vec<ActionOutput>,
}

impl ActionExecutionKey {
    pub fn command(
        spec: ActionSpec,
        inputs: Vec<ActionInput>,
        outputs: Vec<ActionOutput>,
    ) -> Self {
        Self::Command(CommandActionExecutionKey {
            spec,
            inputs,
            outputs,
        })
    }

    pub fn encode(&self) -> Result<Vec<u8>, ModelError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, ModelError> {
        Ok(bincode::deserialize(bytes)?)
    }

    pub fn digest(&self) -> Result<Digest, ModelError> {
        Ok(Digest::of_bytes(&self.encode()?))
    }
}

impl CommandActionExecutionKey {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ArtifactOwner, PreActionSpec};
    use std::collections::BTreeMap;

    fn sample_key() -> ActionKey {
        let spec = ActionSpec::builder()
            .args(["/bin/sh", "-c", "cp in.txt out.txt"])
            .env("PATH", "/usr/bin:/bin")
            .working_dir(PathBuf::from("."))
            .pre_action(PreActionSpec::new(
                vec!["/bin/mkdir".into(), "-p".into(), "scratch".into()],
                BTreeMap::new(),
                false,
            ))
            .build();

        let inputs = vec![
            Artifact::source(
                Digest::of_bytes(b"source content"),
                PathBuf::from("in.txt"),
                PathBuf::from("host"),
                ArtifactKind::File,
            ),
            Artifact::derived(
                ArtifactOwner::new(Digest::of_bytes(b"an upstream action"), 0),
                PathBuf::from("dep/lib.a"),
                PathBuf::from("host"),
                ArtifactKind::File,
            ),
        ];

        let outputs = vec![ActionOutput::new(
            PathBuf::from("out.txt"),
            ArtifactKind::File,
        )];

        ActionKey::command(spec, inputs, outputs)
    }

    #[test]
    fn action_key_round_trips() {
        let key = sample_key();
        let decoded = ActionKey::decode(&key.encode().unwrap()).unwrap();
        assert_eq!(key, decoded);
    }

    #[test]
    fn action_key_digest_is_deterministic() {
        let a = sample_key().digest().unwrap();
        let b = sample_key().digest().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn action_key_survives_the_json_edge() {
        // the CLI hands actions in as JSON; same schema, different codec
        let key = sample_key();
        let json = serde_json::to_string(&key).unwrap();
        let decoded: ActionKey = serde_json::from_str(&json).unwrap();
        assert_eq!(key, decoded);
    }

    #[test]
    fn execution_key_round_trips() {
        let key = ActionExecutionKey::command(
            ActionSpec::builder().args(["/bin/true"]).build(),
            vec![ActionInput::new(
                Digest::of_bytes(b"input"),
                PathBuf::from("host/in.txt"),
                ArtifactKind::ExecutableFile,
            )],
            vec![ActionOutput::new(
                PathBuf::from("out"),
                ArtifactKind::Directory,
            )],
        );
        let decoded = ActionExecutionKey::decode(&key.encode().unwrap()).unwrap();
        assert_eq!(key, decoded);
        assert_eq!(key.digest().unwrap(), decoded.digest().unwrap());
    }
}
