//! Shared tail of the ingestion handlers

use axum::response::Html;
use std::time::Duration;
use tracing::{debug, warn};

use preview_core::domain::{IngestOutcome, SessionRecord};
use preview_core::services::PreviewRenderer;
use preview_security::token_hint;

use crate::error::ApiError;
use crate::state::AppState;

/// Grant a successful slot to the session and render the preview page.
///
/// Admin sessions read every slot without a grant, so nothing is recorded
/// for them. A slot whose grant could not be persisted is reclaimed right
/// away so no unreachable bytes are left behind.
pub(crate) async fn respond_with_preview(
    state: &AppState,
    session: &SessionRecord,
    outcome: IngestOutcome,
) -> Result<Html<String>, ApiError> {
    if let IngestOutcome::Success { slot, .. } = &outcome {
        if session.is_admin {
            debug!("Admin upload {} needs no grant", slot);
        } else if let Err(e) = state.sessions.grant_slot(session.token(), slot).await {
            warn!("Could not grant {} to session {}: {}", slot, token_hint(session.token()), e);
            state.slots.schedule_reclaim(slot.clone(), Duration::ZERO);
            return Err(e.into());
        }
    }

    let payload = PreviewRenderer::render(&outcome, session.is_admin);
    Ok(Html(state.templates.preview(&payload)?))
}
