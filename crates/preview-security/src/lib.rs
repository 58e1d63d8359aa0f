//! # Preview Security
//! 
//! Session credentials and cache slot fingerprints.

pub mod fingerprint;
pub mod token;

pub use fingerprint::{slot_fingerprint, is_valid_fingerprint, FINGERPRINT_HEX_LEN};
pub use token::{generate_session_token, validate_session_token, token_hint, TokenError, TOKEN_HEX_LEN};
