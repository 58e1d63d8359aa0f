// ============================================================================
// Preview Core - Preview Renderer
// File: crates/preview-core/src/services/preview_renderer.rs
// ============================================================================
//! Turns an ingestion outcome into the data model of the preview page

use serde::Serialize;

use crate::domain::IngestOutcome;

/// Data handed to the preview template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewPayload {
    pub success: bool,
    pub is_admin: bool,
    pub file_uid: Option<String>,
    pub file_ext: Option<String>,
    pub message: String,
}

pub struct PreviewRenderer;

impl PreviewRenderer {
    /// Build the payload for `outcome`.
    ///
    /// Only successful outcomes expose a slot identity.
    pub fn render(outcome: &IngestOutcome, is_admin: bool) -> PreviewPayload {
        let (file_uid, file_ext) = match outcome {
            IngestOutcome::Success { slot, .. } => (Some(slot.stem().to_string()), Some(slot.ext().to_string())),
            _ => (None, None),
        };

        PreviewPayload {
            success: outcome.is_success(),
            is_admin,
            file_uid,
            file_ext,
            message: outcome.message().to_string(),
        }
    }
}
