//! Stable hashing helpers for temp-table names and manifests.
//!
//! These digests are deduplication keys, not a security boundary.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Hex characters of the digest kept in a short physical name.
pub const SHORT_NAME_HEX_LEN: usize = 16;

/// A BLAKE3 digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    pub fn to_hex(&self) -> String {
        blake3::Hash::from(self.0).to_hex().to_string()
    }
}

impl From<blake3::Hash> for Hash256 {
    fn from(h: blake3::Hash) -> Self {
        Hash256(*h.as_bytes())
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

pub fn hash_str(s: &str) -> Hash256 {
    blake3::hash(s.as_bytes()).into()
}

/// Digest of `v`'s JSON encoding. Field order follows the type's
/// declaration, so equal values hash equally.
pub fn hash_serde<T: Serialize>(v: &T) -> Result<Hash256, Error> {
    let bytes = serde_json::to_vec(v).map_err(|e| Error::Hash(e.to_string()))?;
    Ok(blake3::hash(&bytes).into())
}

/// Derive a short, stable SQL identifier from a human-readable name.
///
/// The same `name` always maps to the same identifier; distinct names collide
/// only if the first 64 bits of their BLAKE3 digests do.
pub fn short_name(prefix: &str, name: &str) -> String {
    let hex = hash_str(name).to_hex();
    format!("{}{}", prefix, &hex[..SHORT_NAME_HEX_LEN])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_name_is_stable_and_prefixed() {
        let a = short_name("_", "cohort");
        let b = short_name("_", "cohort");
        assert_eq!(a, b);
        assert!(a.starts_with('_'));
        assert_eq!(a.len(), 1 + SHORT_NAME_HEX_LEN);
    }

    #[test]
    fn distinct_names_get_distinct_identifiers() {
        assert_ne!(short_name("_", "cohort"), short_name("_", "cohort2"));
    }

    #[test]
    fn hex_matches_blake3() {
        let h = hash_str("cohort");
        assert_eq!(h.to_hex(), blake3::hash(b"cohort").to_hex().as_str());
        assert_eq!(h.to_hex().len(), 64);
        assert_eq!(h.to_string(), h.to_hex());
    }
}
