// ============================================================================
// Preview Server
// File: preview-app/preview-server/src/main.rs
// ============================================================================
//! Image intake and preview server: wires the session store, byte store and
//! sources into the HTTP router and serves it until ctrl+c.

mod bootstrap;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use preview_api::templates::PageContext;
use preview_api::{build_router, AppState, Templates};
use preview_core::domain::ExtensionAllowList;
use preview_core::repositories::SessionStore;
use preview_core::services::{CacheSlotManager, SessionManager, SessionPolicy, SlotPolicy};
use preview_infrastructure::{
    FilesystemByteStore, HttpRemoteSource, MemorySessionStore, RedisSessionStore,
    SandboxedLocalSource,
};
use preview_shared::config::{AppConfig, StoreBackend};
use preview_shared::constants::SESSION_COOKIE_NAME;

const MEMORY_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    // Initialize telemetry
    preview_shared::telemetry::init_telemetry();

    info!("Preview server starting...");

    // Load configuration
    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Session store
    let store: Arc<dyn SessionStore> = match config.store.backend {
        StoreBackend::Redis => {
            info!("Connecting to Redis session store...");
            Arc::new(RedisSessionStore::connect(&config.store.redis_url).await?)
        }
        StoreBackend::Memory => {
            info!("Using in-memory session store");
            let memory = Arc::new(MemorySessionStore::new());
            let sweeper = memory.clone();
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(MEMORY_SWEEP_INTERVAL);
                loop {
                    ticker.tick().await;
                    sweeper.cleanup_expired();
                }
            });
            memory
        }
    };

    let sessions = Arc::new(SessionManager::new(
        store,
        SessionPolicy {
            cookie_name: SESSION_COOKIE_NAME.to_string(),
            anonymous_ttl: config.session.anonymous_ttl(),
            admin_ttl: config.session.admin_ttl(),
            secure_cookies: config.server.secure_cookies,
        },
    ));

    // Admin bootstrap
    let admin_token = bootstrap::provision_admin_token(&config.admin).await?;
    sessions.bootstrap_admin(&admin_token).await?;
    drop(admin_token);

    // Cache slots
    let byte_store = FilesystemByteStore::new(&config.cache.root).await?;
    info!("Cache root at {}", byte_store.root().display());
    let slots = Arc::new(CacheSlotManager::new(
        Arc::new(byte_store),
        Arc::new(SandboxedLocalSource::new(config.cache.source_root.clone())),
        Arc::new(HttpRemoteSource::new(config.cache.fetch_timeout())?),
        SlotPolicy {
            allowed_extensions: ExtensionAllowList::new(&config.cache.allowed_extensions),
            max_bytes: config.cache.max_upload_bytes,
            reclaim_delay: config.cache.reclaim_delay(),
        },
    ));

    let templates = Templates::new(PageContext {
        extensions: slots.policy().allowed_extensions.as_slice().to_vec(),
        max_upload_mb: config.cache.max_upload_bytes >> 20,
    })?;

    // Build router
    let state = AppState::new(sessions, slots, templates);
    let app = build_router(state, &config.server.cors_origins, config.cache.max_upload_bytes);

    // Bind address
    let host: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::from((host, config.server.port));
    info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Preview server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}
