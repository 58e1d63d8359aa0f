// ============================================================================
// Preview API - Page Templates
// File: crates/preview-api/src/templates.rs
// ============================================================================
//! Handlebars registry for the HTML pages. Templates are compiled into the
//! binary so the server has no runtime asset directory.

use handlebars::{Handlebars, RenderError, TemplateError};
use serde::Serialize;

use preview_core::services::PreviewPayload;

const INDEX: &str = "index";
const UPLOAD_FORM: &str = "upload";
const FETCH_FORM: &str = "get_image";
const PREVIEW: &str = "image_preview";

/// Values shared by the static form pages
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContext {
    pub extensions: Vec<String>,
    pub max_upload_mb: u64,
}

pub struct Templates {
    registry: Handlebars<'static>,
    context: PageContext,
}

impl Templates {
    pub fn new(context: PageContext) -> Result<Self, TemplateError> {
        let mut registry = Handlebars::new();
        registry.register_template_string(INDEX, include_str!("../templates/index.hbs"))?;
        registry.register_template_string(UPLOAD_FORM, include_str!("../templates/upload.hbs"))?;
        registry.register_template_string(FETCH_FORM, include_str!("../templates/get_image.hbs"))?;
        registry.register_template_string(PREVIEW, include_str!("../templates/image_preview.hbs"))?;
        Ok(Self { registry, context })
    }

    pub fn index(&self) -> Result<String, RenderError> {
        self.registry.render(INDEX, &self.context)
    }

    pub fn upload_form(&self) -> Result<String, RenderError> {
        self.registry.render(UPLOAD_FORM, &self.context)
    }

    pub fn fetch_form(&self) -> Result<String, RenderError> {
        self.registry.render(FETCH_FORM, &self.context)
    }

    pub fn preview(&self, payload: &PreviewPayload) -> Result<String, RenderError> {
        self.registry.render(PREVIEW, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use preview_core::domain::{IngestOutcome, SlotId};
    use preview_core::services::PreviewRenderer;

    fn templates() -> Templates {
        Templates::new(PageContext {
            extensions: vec![".png".into(), ".jpg".into()],
            max_upload_mb: 32,
        })
        .unwrap()
    }

    #[test]
    fn test_preview_success_links_slot() {
        let slot = SlotId::generate(".png").unwrap();
        let payload = PreviewRenderer::render(&IngestOutcome::Success { slot: slot.clone(), bytes: 1 }, false);
        let html = templates().preview(&payload).unwrap();

        assert!(html.contains(&format!("/cache/1/{}", slot)));
        assert!(!html.contains("/approve"));
    }

    #[test]
    fn test_preview_admin_gets_review_actions() {
        let slot = SlotId::generate(".jpg").unwrap();
        let payload = PreviewRenderer::render(&IngestOutcome::Success { slot: slot.clone(), bytes: 1 }, true);
        let html = templates().preview(&payload).unwrap();
        assert!(html.contains(&format!("/admin/slots/{}/approve", slot)));
    }

    #[test]
    fn test_preview_failure_shows_message() {
        let payload = PreviewRenderer::render(&IngestOutcome::NotExists, false);
        let html = templates().preview(&payload).unwrap();
        assert!(html.contains("file does not exist"));
        assert!(!html.contains("/cache/"));
    }

    #[test]
    fn test_form_pages_render() {
        let t = templates();
        assert!(t.upload_form().unwrap().contains("name=\"fileUpload\""));
        assert!(t.fetch_form().unwrap().contains("name=\"path\""));
        assert!(t.index().unwrap().contains(".jpg"));
    }
}
