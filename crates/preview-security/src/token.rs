//! Session credential generation

use thiserror::Error;

use crate::fingerprint::time_digest;

/// Hex characters in an encoded session token (32 bytes).
pub const TOKEN_HEX_LEN: usize = 64;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token must be {TOKEN_HEX_LEN} characters, got {0}")]
    BadLength(usize),
    #[error("Token must be lowercase hex")]
    BadEncoding,
}

/// Generate a fresh session token.
///
/// A time-seeded digest whose upper half is then mixed with two independent
/// random 64-bit words, hex-encoded for transport.
pub fn generate_session_token() -> String {
    let mut digest = time_digest(rand::random::<u64>());

    for range in [16..24, 24..32] {
        let mut word = [0u8; 8];
        word.copy_from_slice(&digest[range.clone()]);
        let mixed = u64::from_be_bytes(word) ^ rand::random::<u64>();
        digest[range].copy_from_slice(&mixed.to_be_bytes());
    }

    hex::encode(digest)
}

pub fn validate_session_token(token: &str) -> Result<(), TokenError> {
    if token.len() != TOKEN_HEX_LEN {
        return Err(TokenError::BadLength(token.len()));
    }
    if !token.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
        return Err(TokenError::BadEncoding);
    }
    Ok(())
}

/// Short, log-safe prefix of a token.
pub fn token_hint(token: &str) -> &str {
    token.get(..8).unwrap_or(token)
}
