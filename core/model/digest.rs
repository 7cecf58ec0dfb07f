use serde::{Deserialize, Serialize};
use sha2::{Digest as Sha2Digest, Sha256};
use std::path::PathBuf;
use thiserror::Error;

/// A content-derived identifier for a byte sequence stored in the store.
///
/// Equal content always yields equal digests, so a `Digest` is the sole way
/// artifacts, directory trees, and actions reference each other.
///
#[derive(Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct Digest(String);

impl Digest {
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut s = Sha256::new();
        s.update(bytes);
        Self(format!("{:x}", s.finalize()))
    }

    pub fn inner(&self) -> &str {
        &self.0
    }

    /// The first two hex characters, used as the on-disk shard directory.
    pub fn shard(&self) -> &str {
        &self.0[..2]
    }

    /// The relative path at which an object with this digest is laid out on
    /// disk, sharded by the first two hex characters.
    pub fn object_path(&self) -> PathBuf {
        PathBuf::from(self.shard()).join(&self.0[2..])
    }
}

impl std::fmt::Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for Digest {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 64 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(DigestError::MalformedDigest {
                digest: s.to_string(),
            });
        }
        Ok(Self(s.to_ascii_lowercase()))
    }
}

// Deserialization funnels through the same validation as parsing, so a digest
// arriving over the wire (or out of a user-written action file) is checked
// before anything slices it.
impl TryFrom<String> for Digest {
    type Error = DigestError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Error, Debug)]
pub enum DigestError {
    #[error("not a valid sha256 hex digest: {digest}")]
    MalformedDigest { digest: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_content_yields_equal_digests() {
        let a = Digest::of_bytes(b"hello");
        let b = Digest::of_bytes(b"hello");
        assert_eq!(a, b);
        assert_ne!(a, Digest::of_bytes(b"world"));
    }

    #[test]
    fn digest_is_stable() {
        // sha256 of the empty string, a fixed point of the format.
        assert_eq!(
            Digest::of_bytes(b"").inner(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn parses_and_shards() {
        let d: Digest = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
            .parse()
            .unwrap();
        assert_eq!(
            d.object_path(),
            PathBuf::from("e3")
                .join("b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")
        );
        assert_matches!(
            "not-a-digest".parse::<Digest>(),
            Err(DigestError::MalformedDigest { .. })
        );
    }

    #[test]
    fn deserialization_rejects_malformed_digests() {
        // a short digest must fail here, not panic later when it gets sharded
        assert!(serde_json::from_str::<Digest>("\"x\"").is_err());
        assert!(serde_json::from_str::<Digest>("\"\"").is_err());

        let ok: Digest = serde_json::from_str(
            "\"e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855\"",
        )
        .unwrap();
        assert_eq!(ok, Digest::of_bytes(b""));
        // round-trip through the serialized form stays valid
        assert_eq!(serde_json::to_string(&ok).unwrap().len(), 66);
    }
}
