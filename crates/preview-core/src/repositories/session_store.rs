//! Session store trait (port)

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// The backing key-value service could not be reached or answered with an error.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct StoreError(pub String);

/// TTL-capable key-value service holding serialized session records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;
    async fn ping(&self) -> Result<(), StoreError>;
}
