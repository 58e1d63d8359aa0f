//! Domain errors

use thiserror::Error;

use crate::repositories::StoreError;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Session store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Session not found")]
    SessionNotFound,

    #[error("Invalid session token: {0}")]
    InvalidToken(String),

    #[error("Session encoding error: {0}")]
    SessionEncoding(String),

    #[error("Invalid slot id: {0}")]
    InvalidSlotId(String),

    #[error("Extension not allowed: {0}")]
    ExtensionNotAllowed(String),

    #[error("Slot not found: {0}")]
    SlotNotFound(String),

    #[error("Unable to allocate a unique slot")]
    UnableToAllocateSlot,

    #[error("Byte store error: {0}")]
    ByteStore(String),
}

impl From<StoreError> for DomainError {
    fn from(e: StoreError) -> Self {
        DomainError::StoreUnavailable(e.to_string())
    }
}
