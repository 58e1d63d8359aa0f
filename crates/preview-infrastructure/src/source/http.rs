// ============================================================================
// Preview Infrastructure - HTTP Remote Source
// File: crates/preview-infrastructure/src/source/http.rs
// ============================================================================

use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::Client;
use std::io;
use std::time::Duration;
use tracing::debug;

use preview_core::repositories::{ByteStream, RemoteSource, SourceError};

/// Streams remote http(s) bodies. Any non-2xx status is a fetch failure.
pub struct HttpRemoteSource {
    client: Client,
}

impl HttpRemoteSource {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("preview-server/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl RemoteSource for HttpRemoteSource {
    async fn fetch(&self, url: &str) -> Result<ByteStream, SourceError> {
        debug!("Fetching remote source {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::Fetch(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Fetch(format!("upstream answered {}", status)));
        }

        let stream = response.bytes_stream().map_err(io::Error::other);
        Ok(Box::pin(stream))
    }
}
