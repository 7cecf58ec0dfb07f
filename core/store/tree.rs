use crate::model::{ArtifactKind, Digest};
use serde::{Deserialize, Serialize};

/// One entry in a tree manifest. File entries point at blobs, directory
/// entries at the manifest of the sub-tree.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TreeEntry {
    name: String,
    kind: ArtifactKind,
    digest: Digest,
}

impl TreeEntry {
    pub fn new(name: String, kind: ArtifactKind, digest: Digest) -> Self {
        Self { name, kind, digest }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    pub fn digest(&self) -> &Digest {
        &self.digest
    }
}

/// The stored form of a directory: its entries, sorted by name so the same
/// directory contents always encode to the same bytes and thus the same
/// digest.
///
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    entries: Vec<TreeEntry>,
}

impl Tree {
    pub fn new(mut entries: Vec<TreeEntry>) -> Self {
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Self { entries }
    }

    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn encode(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }
}
