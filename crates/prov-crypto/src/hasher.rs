use prov_types::BlockHash;

/// Domain-separated BLAKE3 content hasher.
///
/// Each hasher carries a domain tag (e.g. `"prov-block-v1"`) that is
/// prepended to every hash computation, so records of different kinds can
/// never collide even on identical bytes.
///
/// Canonicalization: values are serialized to JSON with a fixed field order
/// (struct declaration order; `BTreeMap` for maps) before hashing, so the
/// same logical block always yields the same digest regardless of platform
/// or storage backend.
///
/// Pure function: no side effects, no shared state, safe to call from any
/// number of threads without synchronization.
pub struct BlockHasher {
    domain: &'static str,
}

impl BlockHasher {
    /// Hasher for provenance blocks.
    pub const BLOCK: Self = Self {
        domain: "prov-block-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> BlockHash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        BlockHash::from_bytes(*hasher.finalize().as_bytes())
    }

    /// Hash a serializable value over its canonical JSON form.
    pub fn hash_canonical<T: serde::Serialize>(&self, value: &T) -> Result<BlockHash, HasherError> {
        let data =
            serde_json::to_vec(value).map_err(|e| HasherError::Serialization(e.to_string()))?;
        Ok(self.hash(&data))
    }

    /// Verify that data produces the expected digest.
    pub fn verify(&self, data: &[u8], expected: &BlockHash) -> bool {
        self.hash(data) == *expected
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }
}

/// Errors from hashing operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HasherError {
    #[error("serialization error: {0}")]
    Serialization(String),
}
