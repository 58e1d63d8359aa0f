// ============================================================================
// Preview Core - Cache Slot Manager
// File: crates/preview-core/src/services/cache_slot_manager.rs
// ============================================================================
//! Slot allocation, ingestion, serving, reclamation and review.
//!
//! Ingestion walks `extension -> source -> fetch` and reports every terminal
//! state as an [`IngestOutcome`]. Only byte store failures are errors.

use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::{ExtensionAllowList, IngestOutcome, SlotId, SlotNamespace, SourceLocator};
use crate::error::DomainError;
use crate::repositories::{
    ByteStore, ByteStream, LocalSource, RemoteSource, SlotBody, SourceError, WriteError,
};

const MAX_ALLOCATION_ATTEMPTS: usize = 4;

#[derive(Debug, Clone)]
pub struct SlotPolicy {
    pub allowed_extensions: ExtensionAllowList,
    pub max_bytes: u64,
    pub reclaim_delay: Duration,
}

pub struct CacheSlotManager {
    store: Arc<dyn ByteStore>,
    local: Arc<dyn LocalSource>,
    remote: Arc<dyn RemoteSource>,
    policy: SlotPolicy,
}

impl CacheSlotManager {
    pub fn new(
        store: Arc<dyn ByteStore>,
        local: Arc<dyn LocalSource>,
        remote: Arc<dyn RemoteSource>,
        policy: SlotPolicy,
    ) -> Self {
        Self { store, local, remote, policy }
    }

    pub fn policy(&self) -> &SlotPolicy {
        &self.policy
    }

    /// Reserve a fresh, unique slot for an allowed extension
    pub async fn allocate(&self, extension_hint: &str) -> Result<SlotId, DomainError> {
        let ext = self
            .policy
            .allowed_extensions
            .accept(extension_hint)
            .ok_or_else(|| DomainError::ExtensionNotAllowed(extension_hint.to_string()))?;

        for attempt in 1..=MAX_ALLOCATION_ATTEMPTS {
            let id = SlotId::generate(&ext)?;
            let claimed = self
                .store
                .reserve(SlotNamespace::Cache, &id)
                .await
                .map_err(|e| DomainError::ByteStore(e.to_string()))?;
            if claimed {
                return Ok(id);
            }
            warn!("Slot id collision on attempt {}: {}", attempt, id);
        }
        Err(DomainError::UnableToAllocateSlot)
    }

    /// Ingest bytes received directly from the client
    pub async fn ingest_upload(&self, file_name: &str, data: Bytes) -> Result<IngestOutcome, DomainError> {
        if self.policy.allowed_extensions.accept(file_name).is_none() {
            debug!("Rejected upload {:?}: extension not allowed", file_name);
            return Ok(IngestOutcome::BadExtension);
        }
        if data.len() as u64 > self.policy.max_bytes {
            return Ok(IngestOutcome::TooLarge);
        }

        let body: ByteStream = Box::pin(futures::stream::once(async move { Ok(data) }));
        self.fill_new_slot(file_name, body, IngestOutcome::InvalidSource).await
    }

    /// Ingest from a `path` locator (loopback-prefixed local path or remote URL)
    pub async fn ingest_from_locator(&self, locator: &str) -> Result<IngestOutcome, DomainError> {
        if self.policy.allowed_extensions.accept(locator).is_none() {
            debug!("Rejected locator {:?}: extension not allowed", locator);
            return Ok(IngestOutcome::BadExtension);
        }

        match SourceLocator::parse(locator) {
            Some(SourceLocator::Local(relative)) => self.ingest_from_local(&relative).await,
            Some(SourceLocator::Remote(url)) => self.ingest_from_remote(&url).await,
            None => {
                debug!("Rejected locator {:?}: not a loopback path or http(s) url", locator);
                Ok(IngestOutcome::InvalidSource)
            }
        }
    }

    /// Copy a file from the sandboxed local source root into a new slot
    pub async fn ingest_from_local(&self, relative: &str) -> Result<IngestOutcome, DomainError> {
        if self.policy.allowed_extensions.accept(relative).is_none() {
            return Ok(IngestOutcome::BadExtension);
        }

        let body = match self.local.open(relative).await {
            Ok(body) => body,
            Err(SourceError::OutsideSandbox(path)) => {
                warn!("Local source escapes sandbox: {}", path);
                return Ok(IngestOutcome::InvalidSource);
            }
            Err(e) => {
                debug!("Local source {:?} unavailable: {}", relative, e);
                return Ok(IngestOutcome::NotExists);
            }
        };

        self.fill_new_slot(relative, body, IngestOutcome::NotExists).await
    }

    /// Retrieve a remote URL and stream its body into a new slot
    pub async fn ingest_from_remote(&self, url: &str) -> Result<IngestOutcome, DomainError> {
        if self.policy.allowed_extensions.accept(url).is_none() {
            return Ok(IngestOutcome::BadExtension);
        }

        let body = match self.remote.fetch(url).await {
            Ok(body) => body,
            Err(SourceError::NotFound) => return Ok(IngestOutcome::NotExists),
            Err(e) => {
                info!("Remote fetch of {} failed: {}", url, e);
                return Ok(IngestOutcome::FetchFailed);
            }
        };

        self.fill_new_slot(url, body, IngestOutcome::FetchFailed).await
    }

    async fn fill_new_slot(
        &self,
        name: &str,
        body: ByteStream,
        on_source_error: IngestOutcome,
    ) -> Result<IngestOutcome, DomainError> {
        let slot = self.allocate(name).await?;

        match self
            .store
            .fill(SlotNamespace::Cache, &slot, body, self.policy.max_bytes)
            .await
        {
            Ok(bytes) => {
                info!("Cached {} ({} bytes)", slot, bytes);
                Ok(IngestOutcome::Success { slot, bytes })
            }
            Err(e) => {
                self.discard(&slot).await;
                match e {
                    WriteError::TooLarge { limit } => {
                        debug!("Source for {} exceeded {} bytes", slot, limit);
                        Ok(IngestOutcome::TooLarge)
                    }
                    WriteError::Source(err) => {
                        info!("Source stream for {} failed: {}", slot, err);
                        Ok(on_source_error)
                    }
                    WriteError::Io(err) => Err(DomainError::ByteStore(err.to_string())),
                }
            }
        }
    }

    /// Open a cached slot for streaming
    pub async fn serve(&self, slot: &SlotId) -> Result<SlotBody, DomainError> {
        self.open(SlotNamespace::Cache, slot).await
    }

    /// Open an approved slot for streaming
    pub async fn serve_approved(&self, slot: &SlotId) -> Result<SlotBody, DomainError> {
        self.open(SlotNamespace::Approved, slot).await
    }

    async fn open(&self, ns: SlotNamespace, slot: &SlotId) -> Result<SlotBody, DomainError> {
        self.store
            .open(ns, slot)
            .await
            .map_err(|e| DomainError::ByteStore(e.to_string()))?
            .ok_or_else(|| DomainError::SlotNotFound(slot.to_string()))
    }

    pub fn reclaim_delay(&self) -> Duration {
        self.policy.reclaim_delay
    }

    /// Delete the cached slot after `delay`, detached from the caller.
    ///
    /// Repeated or late reclaims of the same slot are no-ops.
    pub fn schedule_reclaim(&self, slot: SlotId, delay: Duration) -> JoinHandle<()> {
        let store = self.store.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            reclaim(store.as_ref(), &slot).await;
        })
    }

    async fn discard(&self, slot: &SlotId) {
        reclaim(self.store.as_ref(), slot).await;
    }

    /// Slots awaiting administrative review
    pub async fn review_queue(&self) -> Result<Vec<SlotId>, DomainError> {
        self.store
            .list(SlotNamespace::Cache)
            .await
            .map_err(|e| DomainError::ByteStore(e.to_string()))
    }

    /// Move a slot out of reach of reclamation into the approved namespace
    pub async fn approve(&self, slot: &SlotId) -> Result<bool, DomainError> {
        let moved = self
            .store
            .promote(slot)
            .await
            .map_err(|e| DomainError::ByteStore(e.to_string()))?;
        if moved {
            info!("Approved {}", slot);
        }
        Ok(moved)
    }

    /// Reject a slot under review (deletes it)
    pub async fn flag(&self, slot: &SlotId) -> Result<bool, DomainError> {
        let deleted = self
            .store
            .delete(SlotNamespace::Cache, slot)
            .await
            .map_err(|e| DomainError::ByteStore(e.to_string()))?;
        if deleted {
            info!("Flagged and removed {}", slot);
        }
        Ok(deleted)
    }
}

async fn reclaim(store: &dyn ByteStore, slot: &SlotId) {
    match store.delete(SlotNamespace::Cache, slot).await {
        Ok(true) => debug!("Reclaimed {}", slot),
        Ok(false) => debug!("{} already reclaimed", slot),
        Err(e) => warn!("Failed to reclaim {}: {}", slot, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures::StreamExt;
    use std::collections::HashMap;
    use std::io;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryBytes {
        slots: Mutex<HashMap<(SlotNamespace, String), Vec<u8>>>,
        writes: Mutex<usize>,
    }

    #[async_trait]
    impl ByteStore for MemoryBytes {
        async fn reserve(&self, ns: SlotNamespace, id: &SlotId) -> io::Result<bool> {
            *self.writes.lock().unwrap() += 1;
            let mut slots = self.slots.lock().unwrap();
            let key = (ns, id.to_string());
            if slots.contains_key(&key) {
                return Ok(false);
            }
            slots.insert(key, Vec::new());
            Ok(true)
        }

        async fn fill(&self, ns: SlotNamespace, id: &SlotId, mut body: ByteStream, limit: u64) -> Result<u64, WriteError> {
            let mut buf = Vec::new();
            while let Some(chunk) = body.next().await {
                buf.extend_from_slice(&chunk.map_err(WriteError::Source)?);
                if buf.len() as u64 > limit {
                    return Err(WriteError::TooLarge { limit });
                }
            }
            let len = buf.len() as u64;
            self.slots.lock().unwrap().insert((ns, id.to_string()), buf);
            Ok(len)
        }

        async fn open(&self, ns: SlotNamespace, id: &SlotId) -> io::Result<Option<SlotBody>> {
            let data = self.slots.lock().unwrap().get(&(ns, id.to_string())).cloned();
            Ok(data.map(|d| SlotBody {
                len: d.len() as u64,
                stream: Box::pin(futures::stream::once(async move { Ok(Bytes::from(d)) })),
            }))
        }

        async fn delete(&self, ns: SlotNamespace, id: &SlotId) -> io::Result<bool> {
            Ok(self.slots.lock().unwrap().remove(&(ns, id.to_string())).is_some())
        }

        async fn list(&self, ns: SlotNamespace) -> io::Result<Vec<SlotId>> {
            Ok(self
                .slots
                .lock()
                .unwrap()
                .keys()
                .filter(|(n, _)| *n == ns)
                .filter_map(|(_, id)| SlotId::parse(id).ok())
                .collect())
        }

        async fn promote(&self, id: &SlotId) -> io::Result<bool> {
            let mut slots = self.slots.lock().unwrap();
            match slots.remove(&(SlotNamespace::Cache, id.to_string())) {
                Some(d) => {
                    slots.insert((SlotNamespace::Approved, id.to_string()), d);
                    Ok(true)
                }
                None => Ok(false),
            }
        }
    }

    struct FixedLocal(HashMap<String, Vec<u8>>);

    #[async_trait]
    impl LocalSource for FixedLocal {
        async fn open(&self, relative: &str) -> Result<ByteStream, SourceError> {
            if relative.contains("..") {
                return Err(SourceError::OutsideSandbox(relative.to_string()));
            }
            let data = self.0.get(relative).cloned().ok_or(SourceError::NotFound)?;
            Ok(Box::pin(futures::stream::once(async move { Ok(Bytes::from(data)) })))
        }
    }

    struct FailingRemote;

    #[async_trait]
    impl RemoteSource for FailingRemote {
        async fn fetch(&self, url: &str) -> Result<ByteStream, SourceError> {
            Err(SourceError::Fetch(format!("503 from {}", url)))
        }
    }

    fn manager(max_bytes: u64) -> (Arc<MemoryBytes>, CacheSlotManager) {
        let store = Arc::new(MemoryBytes::default());
        let local = FixedLocal(HashMap::from([("images/dog.jpg".to_string(), vec![7u8; 16])]));
        let mgr = CacheSlotManager::new(
            store.clone(),
            Arc::new(local),
            Arc::new(FailingRemote),
            SlotPolicy {
                allowed_extensions: ExtensionAllowList::new([".png", ".jpg"]),
                max_bytes,
                reclaim_delay: Duration::from_millis(20),
            },
        );
        (store, mgr)
    }

    #[tokio::test]
    async fn test_bad_extension_never_touches_store() {
        let (store, mgr) = manager(1024);
        let outcome = mgr.ingest_from_locator("evil.exe").await.unwrap();
        assert_eq!(outcome, IngestOutcome::BadExtension);
        let outcome = mgr.ingest_upload("evil.exe", Bytes::from_static(b"MZ")).await.unwrap();
        assert_eq!(outcome, IngestOutcome::BadExtension);
        assert_eq!(*store.writes.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_missing_local_source_is_not_exists() {
        let (store, mgr) = manager(1024);
        let outcome = mgr
            .ingest_from_locator("http://127.0.0.1/images/cat.jpg")
            .await
            .unwrap();
        assert_eq!(outcome, IngestOutcome::NotExists);
        assert_eq!(*store.writes.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_local_ingest_success() {
        let (_, mgr) = manager(1024);
        let outcome = mgr.ingest_from_locator("127.0.0.1/images/dog.jpg").await.unwrap();
        match outcome {
            IngestOutcome::Success { slot, bytes } => {
                assert_eq!(bytes, 16);
                assert_eq!(slot.ext(), ".jpg");
                assert_eq!(mgr.serve(&slot).await.unwrap().len, 16);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_traversal_is_invalid_source() {
        let (_, mgr) = manager(1024);
        let outcome = mgr.ingest_from_local("../secrets/key.png").await.unwrap();
        assert_eq!(outcome, IngestOutcome::InvalidSource);
    }

    #[tokio::test]
    async fn test_remote_failure_is_fetch_failed() {
        let (store, mgr) = manager(1024);
        let outcome = mgr.ingest_from_locator("https://example.com/a.png").await.unwrap();
        assert_eq!(outcome, IngestOutcome::FetchFailed);
        assert!(store.slots.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_oversized_upload_is_rejected() {
        let (store, mgr) = manager(4);
        let outcome = mgr.ingest_upload("big.png", Bytes::from_static(b"12345")).await.unwrap();
        assert_eq!(outcome, IngestOutcome::TooLarge);
        assert!(store.slots.lock().unwrap().is_empty());

        let outcome = mgr.ingest_from_locator("127.0.0.1/images/dog.jpg").await.unwrap();
        assert_eq!(outcome, IngestOutcome::TooLarge);
        assert!(store.slots.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reclaim_twice_is_single_deletion() {
        let (_, mgr) = manager(1024);
        let slot = match mgr.ingest_upload("cat.png", Bytes::from_static(b"png")).await.unwrap() {
            IngestOutcome::Success { slot, .. } => slot,
            other => panic!("unexpected outcome {:?}", other),
        };

        let first = mgr.schedule_reclaim(slot.clone(), Duration::from_millis(10));
        let second = mgr.schedule_reclaim(slot.clone(), Duration::from_millis(10));
        first.await.unwrap();
        second.await.unwrap();

        assert!(matches!(mgr.serve(&slot).await, Err(DomainError::SlotNotFound(_))));
    }

    #[tokio::test]
    async fn test_review_approve_and_flag() {
        let (_, mgr) = manager(1024);
        let mut slots = Vec::new();
        for name in ["a.png", "b.jpg"] {
            if let IngestOutcome::Success { slot, .. } = mgr.ingest_upload(name, Bytes::from_static(b"x")).await.unwrap() {
                slots.push(slot);
            }
        }
        assert_eq!(mgr.review_queue().await.unwrap().len(), 2);

        assert!(mgr.approve(&slots[0]).await.unwrap());
        assert!(mgr.serve_approved(&slots[0]).await.is_ok());
        assert!(mgr.serve(&slots[0]).await.is_err());

        assert!(mgr.flag(&slots[1]).await.unwrap());
        assert!(!mgr.flag(&slots[1]).await.unwrap());
        assert!(mgr.review_queue().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_allocate_rejects_unknown_extension() {
        let (_, mgr) = manager(1024);
        assert!(matches!(
            mgr.allocate("x.gif").await,
            Err(DomainError::ExtensionNotAllowed(_))
        ));
        let id = mgr.allocate(".png").await.unwrap();
        assert_eq!(id.ext(), ".png");
    }
}
