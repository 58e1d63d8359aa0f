// ============================================================================
// Preview Infrastructure - Redis Session Store
// File: crates/preview-infrastructure/src/session/redis_store.rs
// ============================================================================

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::time::Duration;
use tracing::info;

use preview_core::repositories::{SessionStore, StoreError};

const KEY_PREFIX: &str = "preview:session:";

/// Session store backed by Redis (`SET .. EX`, `GET`, `PING`).
///
/// The connection manager reconnects on its own and is cheap to clone per call.
#[derive(Clone)]
pub struct RedisSessionStore {
    conn: ConnectionManager,
}

impl RedisSessionStore {
    pub async fn connect(url: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        info!("Connected to Redis session store");
        Ok(Self { conn })
    }
}

fn session_key(token: &str) -> String {
    format!("{}{}", KEY_PREFIX, token)
}

fn store_err(e: redis::RedisError) -> StoreError {
    StoreError(e.to_string())
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        conn.get::<_, Option<String>>(session_key(key))
            .await
            .map_err(store_err)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let secs = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(session_key(key), value, secs)
            .await
            .map_err(store_err)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map(|_| ())
            .map_err(store_err)
    }
}
