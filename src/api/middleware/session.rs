//! Session lookup middleware.
//!
//! Reads the session id from `X-Session-Id` or the `session_id` cookie,
//! resolves it in the `SessionStore`, and injects `SessionContext` into
//! request extensions for downstream handlers.

use axum::http::{header, HeaderMap, HeaderValue, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SessionContext};

pub const SESSION_HEADER: &str = "X-Session-Id";
pub const SESSION_COOKIE: &str = "session_id";

/// Require a live session.
///
/// Accesses `ApiContext` from request extensions (injected by Extension layer).
pub async fn require_session(req: Request<axum::body::Body>, next: Next) -> Response {
    match require_session_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => no_store(err.into_response()),
    }
}

async fn require_session_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    let id = extract_session_id(req.headers()).ok_or(ApiError::SessionRequired)?;

    let state = {
        let mut sessions = ctx.lock_sessions()?;
        sessions.get(&id).ok_or(ApiError::SessionRequired)?
    }; // MutexGuard dropped here, before any .await

    req.extensions_mut().insert(SessionContext { state });

    let response = next.run(req).await;
    Ok(no_store(response))
}

/// Mark a response as not cacheable.
pub fn no_store(mut response: Response) -> Response {
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

/// Session id from the header, falling back to the cookie.
pub fn extract_session_id(headers: &HeaderMap) -> Option<String> {
    let from_header = headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(id) = from_header {
        return Some(id.to_string());
    }

    headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|cookies| {
            cookies
                .split(';')
                .filter_map(|cookie| cookie.trim().split_once('='))
                .find(|(name, _)| *name == SESSION_COOKIE)
                .map(|(_, value)| value.to_string())
        })
        .filter(|v| !v.is_empty())
}
