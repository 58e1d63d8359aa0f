// ============================================================================
// Preview API - Session Middleware
// File: crates/preview-api/src/middleware/session.rs
// ============================================================================
//! Establishes a session for every request before any handler runs.
//!
//! The resolved record is placed in request extensions as [`CurrentSession`];
//! a freshly created session also gets its `Set-Cookie` appended to the
//! response.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::OffsetDateTime;
use tracing::debug;

use preview_core::domain::SessionRecord;
use preview_security::token_hint;

use crate::error::ApiError;
use crate::state::AppState;

/// Session resolved for the current request
#[derive(Debug, Clone)]
pub struct CurrentSession(pub SessionRecord);

pub async fn session_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let cookie_name = &state.sessions.policy().cookie_name;
    let token = jar.get(cookie_name).map(|c| c.value().to_string());

    let (session, created) = state.sessions.ensure_session(token.as_deref()).await?;
    if created {
        debug!("Issued session {}", token_hint(session.token()));
    }

    let cookie = created.then(|| session_cookie(&session));
    request.extensions_mut().insert(CurrentSession(session));
    let response = next.run(request).await;

    match cookie {
        Some(cookie) => Ok((jar.add(cookie), response).into_response()),
        None => Ok(response),
    }
}

fn session_cookie(session: &SessionRecord) -> Cookie<'static> {
    let meta = &session.cookie;
    let mut cookie = Cookie::build((meta.name.clone(), meta.value.clone()))
        .path("/")
        .http_only(meta.http_only)
        .secure(meta.secure)
        .same_site(SameSite::Lax)
        .build();
    if let Ok(expires) = OffsetDateTime::from_unix_timestamp(meta.expires.timestamp()) {
        cookie.set_expires(expires);
    }
    cookie
}
