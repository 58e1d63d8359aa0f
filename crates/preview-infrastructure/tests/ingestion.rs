// ============================================================================
// Preview Infrastructure - Ingestion against real adapters
// File: crates/preview-infrastructure/tests/ingestion.rs
// ============================================================================

use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use preview_core::domain::{ExtensionAllowList, IngestOutcome};
use preview_core::services::{CacheSlotManager, SlotPolicy};
use preview_infrastructure::{FilesystemByteStore, HttpRemoteSource, SandboxedLocalSource};

struct Harness {
    _cache: tempfile::TempDir,
    sources: tempfile::TempDir,
    manager: CacheSlotManager,
}

async fn harness(max_bytes: u64) -> Harness {
    let cache = tempfile::tempdir().unwrap();
    let sources = tempfile::tempdir().unwrap();
    let store = FilesystemByteStore::new(cache.path()).await.unwrap();
    let manager = CacheSlotManager::new(
        Arc::new(store),
        Arc::new(SandboxedLocalSource::new(sources.path())),
        Arc::new(HttpRemoteSource::new(Duration::from_secs(5)).unwrap()),
        SlotPolicy {
            allowed_extensions: ExtensionAllowList::new([".png", ".jpg", ".jpeg"]),
            max_bytes,
            reclaim_delay: Duration::from_millis(10),
        },
    );
    Harness { _cache: cache, sources, manager }
}

#[tokio::test]
async fn test_remote_ingest_then_serve() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cat.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8; 64]))
        .mount(&server)
        .await;

    let h = harness(1024).await;
    let outcome = h
        .manager
        .ingest_from_locator(&format!("{}/cat.png", server.uri()))
        .await
        .unwrap();

    // mock server binds 127.0.0.1, so the locator resolves to the local root
    assert_eq!(outcome, IngestOutcome::NotExists);

    let outcome = h
        .manager
        .ingest_from_remote(&format!("{}/cat.png", server.uri()))
        .await
        .unwrap();
    let IngestOutcome::Success { slot, bytes } = outcome else {
        panic!("unexpected outcome {:?}", outcome);
    };
    assert_eq!(bytes, 64);
    assert_eq!(h.manager.serve(&slot).await.unwrap().len, 64);
}

#[tokio::test]
async fn test_remote_oversize_leaves_nothing_behind() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 4096]))
        .mount(&server)
        .await;

    let h = harness(1024).await;
    let outcome = h
        .manager
        .ingest_from_remote(&format!("{}/big.jpg", server.uri()))
        .await
        .unwrap();
    assert_eq!(outcome, IngestOutcome::TooLarge);
    assert!(h.manager.review_queue().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_remote_error_status_is_fetch_failed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let h = harness(1024).await;
    let outcome = h
        .manager
        .ingest_from_remote(&format!("{}/down.png", server.uri()))
        .await
        .unwrap();
    assert_eq!(outcome, IngestOutcome::FetchFailed);
    assert!(h.manager.review_queue().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_local_ingest_reclaim_cycle() {
    let h = harness(1024).await;
    std::fs::create_dir(h.sources.path().join("images")).unwrap();
    std::fs::write(h.sources.path().join("images/dog.jpg"), b"jpeg-bytes").unwrap();

    let outcome = h
        .manager
        .ingest_from_locator("127.0.0.1/images/dog.jpg")
        .await
        .unwrap();
    let IngestOutcome::Success { slot, .. } = outcome else {
        panic!("unexpected outcome {:?}", outcome);
    };
    assert_eq!(h.manager.review_queue().await.unwrap(), vec![slot.clone()]);

    h.manager
        .schedule_reclaim(slot.clone(), Duration::from_millis(5))
        .await
        .unwrap();
    assert!(h.manager.serve(&slot).await.is_err());
    assert!(h.manager.review_queue().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_and_approve() {
    let h = harness(1024).await;
    let outcome = h
        .manager
        .ingest_upload("photo.JPEG", Bytes::from_static(b"jpeg"))
        .await
        .unwrap();
    let IngestOutcome::Success { slot, .. } = outcome else {
        panic!("unexpected outcome {:?}", outcome);
    };
    assert_eq!(slot.ext(), ".jpeg");

    assert!(h.manager.approve(&slot).await.unwrap());
    h.manager
        .schedule_reclaim(slot.clone(), Duration::from_millis(1))
        .await
        .unwrap();
    assert_eq!(h.manager.serve_approved(&slot).await.unwrap().len, 4);
}

#[tokio::test]
async fn test_missing_local_file() {
    let h = harness(1024).await;
    let outcome = h
        .manager
        .ingest_from_locator("localhost/nothing/here.png")
        .await
        .unwrap();
    assert_eq!(outcome, IngestOutcome::NotExists);
}
