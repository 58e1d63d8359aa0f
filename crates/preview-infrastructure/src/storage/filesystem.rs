// ============================================================================
// Preview Infrastructure - Filesystem Byte Store
// File: crates/preview-infrastructure/src/storage/filesystem.rs
// ============================================================================
//! One directory per namespace under a common root:
//!
//! ```text
//! <root>/cache/<fingerprint>.<ext>
//! <root>/approved/<fingerprint>.<ext>
//! ```
//!
//! Slot ids are validated on parse, so joining them onto a namespace
//! directory cannot leave it.

use async_trait::async_trait;
use futures::StreamExt;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, instrument, warn};

use preview_core::domain::{SlotId, SlotNamespace};
use preview_core::repositories::{ByteStore, ByteStream, SlotBody, WriteError};

pub struct FilesystemByteStore {
    root: PathBuf,
}

impl FilesystemByteStore {
    /// Open (and create if needed) the namespace directories under `root`
    pub async fn new(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        for ns in [SlotNamespace::Cache, SlotNamespace::Approved] {
            fs::create_dir_all(root.join(ns.as_str())).await?;
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn slot_path(&self, ns: SlotNamespace, id: &SlotId) -> PathBuf {
        self.root.join(ns.as_str()).join(id.to_string())
    }
}

#[async_trait]
impl ByteStore for FilesystemByteStore {
    async fn reserve(&self, ns: SlotNamespace, id: &SlotId) -> io::Result<bool> {
        let path = self.slot_path(ns, id);
        match fs::OpenOptions::new().write(true).create_new(true).open(&path).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self, body), fields(backend = "filesystem"))]
    async fn fill(&self, ns: SlotNamespace, id: &SlotId, mut body: ByteStream, limit: u64) -> Result<u64, WriteError> {
        let path = self.slot_path(ns, id);
        let mut file = fs::OpenOptions::new().write(true).truncate(true).open(&path).await?;

        let mut written: u64 = 0;
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(WriteError::Source)?;
            written += chunk.len() as u64;
            if written > limit {
                return Err(WriteError::TooLarge { limit });
            }
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        file.sync_all().await?;

        debug!("Wrote {} bytes to {}", written, path.display());
        Ok(written)
    }

    async fn open(&self, ns: SlotNamespace, id: &SlotId) -> io::Result<Option<SlotBody>> {
        let path = self.slot_path(ns, id);
        let file = match fs::File::open(&path).await {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        let len = file.metadata().await?.len();
        Ok(Some(SlotBody {
            stream: Box::pin(ReaderStream::new(file)),
            len,
        }))
    }

    async fn delete(&self, ns: SlotNamespace, id: &SlotId) -> io::Result<bool> {
        match fs::remove_file(self.slot_path(ns, id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn list(&self, ns: SlotNamespace) -> io::Result<Vec<SlotId>> {
        let mut results = Vec::new();
        let mut entries = match fs::read_dir(self.root.join(ns.as_str())).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(results),
            Err(e) => return Err(e),
        };

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            match name.to_str().map(SlotId::parse) {
                Some(Ok(id)) => results.push(id),
                _ => warn!("Ignoring stray file in {} namespace: {:?}", ns.as_str(), name),
            }
        }
        results.sort_by_key(|id| id.to_string());
        Ok(results)
    }

    async fn promote(&self, id: &SlotId) -> io::Result<bool> {
        let from = self.slot_path(SlotNamespace::Cache, id);
        let to = self.slot_path(SlotNamespace::Approved, id);
        match fs::rename(&from, &to).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}
