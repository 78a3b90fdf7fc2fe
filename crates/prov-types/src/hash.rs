use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// 256-bit BLAKE3 content hash of a block.
///
/// The all-zero value is reserved as [`BlockHash::SENTINEL`]: it is the
/// `previous_hash` of every genesis block and can never be produced as the
/// hash of a real block.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockHash([u8; 32]);

impl BlockHash {
    /// The well-known genesis sentinel (all-zero digest).
    pub const SENTINEL: Self = Self([0u8; 32]);

    /// Wrap raw digest bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// The raw 32-byte digest.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// `true` for the genesis sentinel.
    pub fn is_sentinel(&self) -> bool {
        *self == Self::SENTINEL
    }

    /// Full hex-encoded string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 hex characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse from a hex string (64 hex characters).
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockHash({})", self.short_hex())
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_is_all_zero() {
        assert_eq!(BlockHash::SENTINEL.as_bytes(), &[0u8; 32]);
        assert!(BlockHash::SENTINEL.is_sentinel());
    }

    #[test]
    fn non_zero_is_not_sentinel() {
        assert!(!BlockHash::from_bytes([1; 32]).is_sentinel());
    }

    #[test]
    fn hex_roundtrip() {
        let h = BlockHash::from_bytes([0xab; 32]);
        let parsed = BlockHash::from_hex(&h.to_hex()).unwrap();
        assert_eq!(h, parsed);
    }

    #[test]
    fn short_hex_length() {
        let h = BlockHash::from_bytes([0xcd; 32]);
        assert_eq!(h.short_hex(), "cdcdcdcd");
    }

    #[test]
    fn serde_roundtrip() {
        let h = BlockHash::from_bytes([7; 32]);
        let json = serde_json::to_string(&h).unwrap();
        let parsed: BlockHash = serde_json::from_str(&json).unwrap();
        assert_eq!(h, parsed);
    }
}
