// ============================================================================
// Preview API - Fetch-by-locator Handler
// File: crates/preview-api/src/handlers/fetch.rs
// ============================================================================

use axum::{
    extract::{Extension, Query, State},
    response::Html,
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::info;

use preview_core::domain::IngestOutcome;

use super::preview::respond_with_preview;
use crate::error::ApiError;
use crate::middleware::CurrentSession;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FetchQuery {
    pub path: Option<String>,
}

/// POST /getImage?path=<locator>
///
/// The form page posts `path` urlencoded in the body instead; the query wins
/// when both are present.
pub async fn fetch_image(
    State(state): State<AppState>,
    Extension(CurrentSession(session)): Extension<CurrentSession>,
    Query(query): Query<FetchQuery>,
    body: Bytes,
) -> Result<Html<String>, ApiError> {
    let locator = query.path.or_else(|| form_path(&body));

    let outcome = match locator.as_deref().map(str::trim) {
        Some(path) if !path.is_empty() => {
            info!("Fetch request for {}", path);
            state.slots.ingest_from_locator(path).await?
        }
        _ => IngestOutcome::InvalidSource,
    };

    respond_with_preview(&state, &session, outcome).await
}

fn form_path(body: &[u8]) -> Option<String> {
    url::form_urlencoded::parse(body)
        .find(|(k, _)| k == "path")
        .map(|(_, v)| v.into_owned())
}
