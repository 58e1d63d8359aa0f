// ============================================================================
// Preview API - Upload Handler
// File: crates/preview-api/src/handlers/upload.rs
// ============================================================================

use axum::{
    extract::{multipart::MultipartError, Extension, Multipart, State},
    http::StatusCode,
    response::Html,
};
use bytes::Bytes;
use tracing::{debug, info};

use preview_core::domain::{ExtensionAllowList, IngestOutcome};

use super::preview::respond_with_preview;
use crate::error::ApiError;
use crate::middleware::CurrentSession;
use crate::state::AppState;

/// Multipart field carrying the image
pub const UPLOAD_FIELD: &str = "fileUpload";

/// POST /upload
pub async fn upload_image(
    State(state): State<AppState>,
    Extension(CurrentSession(session)): Extension<CurrentSession>,
    mut multipart: Multipart,
) -> Result<Html<String>, ApiError> {
    info!("File upload request received");

    let allowed = &state.slots.policy().allowed_extensions;
    let outcome = match read_upload(&mut multipart, allowed).await {
        Ok((file_name, data)) => state.slots.ingest_upload(&file_name, data).await?,
        Err(outcome) => outcome,
    };

    respond_with_preview(&state, &session, outcome).await
}

/// Pull the `fileUpload` field out of the form.
///
/// The extension is checked before the body is read so a disallowed file is
/// rejected without buffering it.
async fn read_upload(multipart: &mut Multipart, allowed: &ExtensionAllowList) -> Result<(String, Bytes), IngestOutcome> {
    while let Some(field) = multipart.next_field().await.map_err(|e| multipart_outcome(&e))? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        if allowed.accept(&file_name).is_none() {
            debug!("Upload {:?} has a disallowed extension", file_name);
            return Err(IngestOutcome::BadExtension);
        }

        let data = field.bytes().await.map_err(|e| multipart_outcome(&e))?;
        return Ok((file_name, data));
    }

    debug!("Upload form has no {} field", UPLOAD_FIELD);
    Err(IngestOutcome::InvalidSource)
}

fn multipart_outcome(e: &MultipartError) -> IngestOutcome {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        IngestOutcome::TooLarge
    } else {
        debug!("Malformed multipart body: {}", e);
        IngestOutcome::InvalidSource
    }
}
