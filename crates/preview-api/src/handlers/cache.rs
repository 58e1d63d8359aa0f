// ============================================================================
// Preview API - Cache Retrieval Handlers
// File: crates/preview-api/src/handlers/cache.rs
// ============================================================================

use axum::{
    body::Body,
    extract::{Extension, Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use tracing::debug;

use preview_core::domain::{ConsumptionPolicy, SessionRecord, SlotId};
use preview_core::repositories::SlotBody;

use crate::error::ApiError;
use crate::middleware::CurrentSession;
use crate::state::AppState;

/// GET /cache/{mode}/{slot_id}
pub async fn serve_cached(
    State(state): State<AppState>,
    Extension(CurrentSession(session)): Extension<CurrentSession>,
    Path((mode, slot_id)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let policy = ConsumptionPolicy::from_mode(&mode)
        .ok_or_else(|| ApiError::NotFound(format!("unknown cache mode {}", mode)))?;
    serve_slot(&state, &session, &slot_id, policy).await
}

/// GET /cache/{slot_id}
pub async fn serve_cached_default(
    State(state): State<AppState>,
    Extension(CurrentSession(session)): Extension<CurrentSession>,
    Path(slot_id): Path<String>,
) -> Result<Response, ApiError> {
    serve_slot(&state, &session, &slot_id, ConsumptionPolicy::default()).await
}

async fn serve_slot(
    state: &AppState,
    session: &SessionRecord,
    slot_id: &str,
    policy: ConsumptionPolicy,
) -> Result<Response, ApiError> {
    let slot = SlotId::parse(slot_id)?;

    let decision = state.access.admit(session, &slot).await?;
    if !decision.is_allowed() {
        return Err(ApiError::NotFound(format!("access to {} denied", slot)));
    }

    let body = state.slots.serve(&slot).await?;
    debug!("Serving {} ({:?}, {:?})", slot, decision, policy);

    if policy == ConsumptionPolicy::OneShot {
        state.slots.schedule_reclaim(slot.clone(), state.slots.reclaim_delay());
    }

    Ok(stream_response(&slot, body))
}

/// Stream slot bytes with a content type guessed from the extension
pub(crate) fn stream_response(slot: &SlotId, body: SlotBody) -> Response {
    let mime = mime_guess::from_ext(slot.ext().trim_start_matches('.')).first_or_octet_stream();
    (
        [
            (header::CONTENT_TYPE, mime.to_string()),
            (header::CONTENT_LENGTH, body.len.to_string()),
            (header::CACHE_CONTROL, "no-store".to_string()),
        ],
        Body::from_stream(body.stream),
    )
        .into_response()
}
