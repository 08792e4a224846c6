//! Content digest abstraction.
//!
//! Two chunks are "the same chunk" iff their content bytes are equal;
//! equality-by-digest is the operational test the planner uses for reuse.

use sha2::{Digest as _, Sha256};
use std::fmt;

/// A fixed-width content digest.
///
/// Stable across process invocations and platforms — never a randomized
/// hash. Compared bit-for-bit via `PartialEq`/`Hash`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest([u8; 32]);

impl Digest {
    /// Raw digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// A collision-resistant content hasher.
///
/// Any collision-resistant digest suffices for practical corpora; the
/// planner never inspects digest contents beyond equality.
pub trait Hasher: Send + Sync {
    /// Hash a byte string to a fixed-width digest.
    fn hash(&self, bytes: &[u8]) -> Digest;
}

/// Default hasher: SHA-256.
///
/// Prefers a modern cryptographic digest over the non-crypto-strong hash
/// used by some reference implementations, to foreclose adversarial
/// collisions in multi-tenant corpora. Not observable through the API.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl Hasher for Sha256Hasher {
    fn hash(&self, bytes: &[u8]) -> Digest {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let result = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&result);
        Digest(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let h = Sha256Hasher;
        assert_eq!(h.hash(b"hello"), h.hash(b"hello"));
    }

    #[test]
    fn test_distinguishes_content() {
        let h = Sha256Hasher;
        assert_ne!(h.hash(b"hello"), h.hash(b"world"));
    }

    #[test]
    fn test_display_is_hex() {
        let h = Sha256Hasher;
        let d = h.hash(b"x");
        let s = d.to_string();
        assert_eq!(s.len(), 64);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
