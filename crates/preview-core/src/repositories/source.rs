//! Ingestion source traits (ports)

use async_trait::async_trait;
use std::io;
use thiserror::Error;

use super::byte_store::ByteStream;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("source not found")]
    NotFound,

    #[error("source escapes sandbox: {0}")]
    OutsideSandbox(String),

    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("source io error: {0}")]
    Io(#[from] io::Error),
}

/// Files under a sandboxed root on the local host
#[async_trait]
pub trait LocalSource: Send + Sync {
    async fn open(&self, relative: &str) -> Result<ByteStream, SourceError>;
}

/// Outbound retrieval of an absolute URL
#[async_trait]
pub trait RemoteSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<ByteStream, SourceError>;
}
