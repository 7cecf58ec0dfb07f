use super::Digest;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File vs. directory vs. executable-file classification of an artifact or a
/// declared output.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum ArtifactKind {
    File,
    Directory,
    ExecutableFile,
}

impl ArtifactKind {
    pub fn is_directory(&self) -> bool {
        matches!(self, ArtifactKind::Directory)
    }

    pub fn is_executable(&self) -> bool {
        matches!(self, ArtifactKind::ExecutableFile)
    }
}

/// A non-owning back-reference from a derived artifact to its producer: the
/// digest of the serialized `ActionKey` that produces it, and the zero-based
/// index of this artifact within that action's declared output list.
///
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct ArtifactOwner {
    action: Digest,
    output_index: usize,
}

impl ArtifactOwner {
    pub fn new(action: Digest, output_index: usize) -> Self {
        Self {
            action,
            output_index,
        }
    }

    pub fn action(&self) -> &Digest {
        &self.action
    }

    pub fn output_index(&self) -> usize {
        self.output_index
    }
}

/// Where an artifact's contents come from: either the content is already known
/// (`Source`), or it is produced by an action that may not have run yet
/// (`Derived`).
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum ArtifactOrigin {
    Source(Digest),
    Derived(ArtifactOwner),
}

/// A reference to a file or directory that will exist at some point in the
/// build. This is a name, not the contents: a `Source` artifact has its digest
/// eagerly available, a `Derived` one requires resolving the owning action
/// first.
///
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    origin: ArtifactOrigin,

    /// Configuration-independent relative path used to place the artifact on
    /// disk.
    short_path: PathBuf,

    /// Path prefix disambiguating artifacts produced under different build
    /// configurations.
    root: PathBuf,

    kind: ArtifactKind,
}

impl Artifact {
    pub fn source(digest: Digest, short_path: PathBuf, root: PathBuf, kind: ArtifactKind) -> Self {
        Self {
            origin: ArtifactOrigin::Source(digest),
            short_path,
            root,
            kind,
        }
    }

    pub fn derived(
        owner: ArtifactOwner,
        short_path: PathBuf,
        root: PathBuf,
        kind: ArtifactKind,
    ) -> Self {
        Self {
            origin: ArtifactOrigin::Derived(owner),
            short_path,
            root,
            kind,
        }
    }

    pub fn origin(&self) -> &ArtifactOrigin {
        &self.origin
    }

    pub fn short_path(&self) -> &Path {
        &self.short_path
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    /// The on-disk placement path of this artifact, relative to an execution
    /// root. `short_path` plus `root` must be unique within one action's
    /// input set.
    pub fn path(&self) -> PathBuf {
        self.root.join(&self.short_path)
    }
}
