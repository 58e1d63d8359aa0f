//! Time-seeded fingerprints for cache slot names

use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Hex characters in a slot fingerprint (16 digest bytes).
pub const FINGERPRINT_HEX_LEN: usize = 32;

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Digest of the current wall clock, a process-wide sequence number and `salt`.
///
/// The sequence keeps two calls within the same clock tick apart; the salt
/// keeps two processes apart.
pub(crate) fn time_digest(salt: u64) -> [u8; 32] {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);

    let mut hasher = Sha256::new();
    hasher.update(nanos.to_be_bytes());
    hasher.update(seq.to_be_bytes());
    hasher.update(salt.to_be_bytes());
    hasher.finalize().into()
}

/// Generate a filesystem-safe slot fingerprint (lowercase hex, no extension).
pub fn slot_fingerprint() -> String {
    let digest = time_digest(rand::random::<u64>());
    hex::encode(&digest[..FINGERPRINT_HEX_LEN / 2])
}

pub fn is_valid_fingerprint(s: &str) -> bool {
    s.len() == FINGERPRINT_HEX_LEN && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
