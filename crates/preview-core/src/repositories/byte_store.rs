//! Byte store trait (port) for cache slot contents

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::io;
use std::pin::Pin;
use thiserror::Error;

use crate::domain::{SlotId, SlotNamespace};

pub type ByteStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>>;

/// Readable slot contents
pub struct SlotBody {
    pub stream: ByteStream,
    pub len: u64,
}

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("content exceeds {limit} bytes")]
    TooLarge { limit: u64 },

    #[error("source stream failed: {0}")]
    Source(io::Error),

    #[error("byte store io error: {0}")]
    Io(#[from] io::Error),
}

/// Filesystem-like store addressed by namespace + slot id.
///
/// `reserve` must be atomic create-or-fail and `delete` must be idempotent.
#[async_trait]
pub trait ByteStore: Send + Sync {
    /// Claim `id`. Returns false when it already exists.
    async fn reserve(&self, ns: SlotNamespace, id: &SlotId) -> io::Result<bool>;

    /// Stream `body` into a reserved slot, rejecting anything over `limit` bytes.
    async fn fill(&self, ns: SlotNamespace, id: &SlotId, body: ByteStream, limit: u64) -> Result<u64, WriteError>;

    async fn open(&self, ns: SlotNamespace, id: &SlotId) -> io::Result<Option<SlotBody>>;

    /// Returns whether anything was deleted.
    async fn delete(&self, ns: SlotNamespace, id: &SlotId) -> io::Result<bool>;

    async fn list(&self, ns: SlotNamespace) -> io::Result<Vec<SlotId>>;

    /// Move a slot from the cache namespace into the approved one.
    async fn promote(&self, id: &SlotId) -> io::Result<bool>;
}
