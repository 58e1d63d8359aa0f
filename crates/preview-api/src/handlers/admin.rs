// ============================================================================
// Preview API - Review Handlers
// File: crates/preview-api/src/handlers/admin.rs
// ============================================================================
//! Review queue for administrators and public reads of approved slots.
//!
//! Non-admin sessions get the 404 page, never a 403.

use axum::{
    extract::{Extension, Path, State},
    response::Response,
    Json,
};
use serde::Serialize;
use tracing::info;

use preview_core::domain::{SessionRecord, SlotId};

use super::cache::stream_response;
use crate::error::ApiError;
use crate::middleware::CurrentSession;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ReviewAction {
    pub slot: SlotId,
    pub action: &'static str,
    pub changed: bool,
}

fn require_admin(session: &SessionRecord, route: &str) -> Result<(), ApiError> {
    if session.is_admin {
        Ok(())
    } else {
        Err(ApiError::NotFound(format!("{} requires an admin session", route)))
    }
}

/// GET /admin/queue
pub async fn review_queue(
    State(state): State<AppState>,
    Extension(CurrentSession(session)): Extension<CurrentSession>,
) -> Result<Json<ApiResponse<Vec<SlotId>>>, ApiError> {
    require_admin(&session, "review queue")?;
    let queue = state.slots.review_queue().await?;
    Ok(Json(ApiResponse::success(queue)))
}

/// POST /admin/slots/{slot_id}/approve
pub async fn approve_slot(
    State(state): State<AppState>,
    Extension(CurrentSession(session)): Extension<CurrentSession>,
    Path(slot_id): Path<String>,
) -> Result<Json<ApiResponse<ReviewAction>>, ApiError> {
    require_admin(&session, "approve")?;
    let slot = SlotId::parse(&slot_id)?;

    if !state.slots.approve(&slot).await? {
        return Err(ApiError::NotFound(format!("{} is not awaiting review", slot)));
    }
    info!("Slot {} approved by admin", slot);
    Ok(Json(ApiResponse::success(ReviewAction { slot, action: "approved", changed: true })))
}

/// POST /admin/slots/{slot_id}/flag
pub async fn flag_slot(
    State(state): State<AppState>,
    Extension(CurrentSession(session)): Extension<CurrentSession>,
    Path(slot_id): Path<String>,
) -> Result<Json<ApiResponse<ReviewAction>>, ApiError> {
    require_admin(&session, "flag")?;
    let slot = SlotId::parse(&slot_id)?;

    let changed = state.slots.flag(&slot).await?;
    Ok(Json(ApiResponse::success(ReviewAction { slot, action: "flagged", changed })))
}

/// GET /images/{slot_id}
pub async fn serve_approved(
    State(state): State<AppState>,
    Path(slot_id): Path<String>,
) -> Result<Response, ApiError> {
    let slot = SlotId::parse(&slot_id)?;
    let body = state.slots.serve_approved(&slot).await?;
    Ok(stream_response(&slot, body))
}
