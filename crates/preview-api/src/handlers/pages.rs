//! Static form pages and the 404 fallback

use axum::{extract::State, http::Uri, response::Html};

use crate::error::ApiError;
use crate::state::AppState;

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    Ok(Html(state.templates.index()?))
}

pub async fn upload_form(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    Ok(Html(state.templates.upload_form()?))
}

pub async fn fetch_form(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    Ok(Html(state.templates.fetch_form()?))
}

pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(uri.path().to_string())
}
