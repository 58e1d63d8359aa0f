// ============================================================================
// Preview API - Router
// File: crates/preview-api/src/routes.rs
// ============================================================================

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing::warn;

use crate::handlers;
use crate::middleware::session_middleware;
use crate::state::AppState;

/// Headroom for multipart boundaries and part headers on top of the file itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn build_router(state: AppState, cors_origins: &[String], max_upload_bytes: u64) -> Router {
    // Health routes (no session)
    let health_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/health/ready", get(handlers::health::readiness_check));

    // Everything else runs behind the session middleware
    let session_routes = Router::new()
        .route("/", get(handlers::pages::index))
        .route("/upload", get(handlers::pages::upload_form).post(handlers::upload::upload_image))
        .route("/getImage", get(handlers::pages::fetch_form).post(handlers::fetch::fetch_image))
        .route("/imagePreview", get(handlers::pages::not_found))
        .route("/cache/{slot_id}", get(handlers::cache::serve_cached_default))
        .route("/cache/{mode}/{slot_id}", get(handlers::cache::serve_cached))
        .route("/admin/queue", get(handlers::admin::review_queue))
        .route("/admin/slots/{slot_id}/approve", post(handlers::admin::approve_slot))
        .route("/admin/slots/{slot_id}/flag", post(handlers::admin::flag_slot))
        .route("/images/{slot_id}", get(handlers::admin::serve_approved))
        .layer(middleware::from_fn_with_state(state.clone(), session_middleware));

    let body_limit = usize::try_from(max_upload_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .merge(health_routes)
        .merge(session_routes)
        .fallback(handlers::pages::not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::new().include_headers(false)))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", o);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_credentials(true)
}
