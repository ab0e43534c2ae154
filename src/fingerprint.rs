//! Content fingerprinting.
//!
//! Collapses extracted page text into a comparable hash that is robust
//! to whitespace and rendering-order noise but sensitive to real edits.

use sha2::{Digest, Sha256};

/// Normalized text and its content hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    /// Whitespace-collapsed text, kept for the change log only
    pub normalized: String,
    /// Lowercase hex SHA-256 of the normalized text
    pub hash: String,
}

/// Fingerprint already-extracted page text.
///
/// All runs of whitespace (including newlines) collapse to single ASCII
/// spaces and the ends are trimmed, so formatting noise never changes the
/// hash. The hash is SHA-256 over the normalized UTF-8 bytes; identical
/// normalized text produces an identical hash on any platform.
pub fn fingerprint(raw_text: &str) -> Fingerprint {
    let normalized = raw_text.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    let hash = format!("{:x}", hasher.finalize());

    Fingerprint { normalized, hash }
}
