//! Session and navigation endpoints.
//!
//! - `POST /api/session`: start a session
//! - `GET /api/page`: render the current page
//! - `POST /api/navigate`: guarded page transition
//! - `POST /api/role`: choose doctor or patient portal

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::middleware::session::{no_store, SESSION_COOKIE};
use crate::api::types::{ApiContext, SessionContext};
use crate::models::Role;
use crate::pages::Rendered;
use crate::session::Page;

#[derive(Serialize)]
pub struct SessionCreated {
    pub session_id: String,
    #[serde(flatten)]
    pub rendered: Rendered,
}

/// `POST /api/session`: new session on the role selection page.
///
/// The id is returned in the body and as a `session_id` cookie.
pub async fn create(State(ctx): State<ApiContext>) -> Result<Response, ApiError> {
    let (session_id, state) = ctx
        .lock_sessions()?
        .create()
        .ok_or_else(|| ApiError::Unavailable("Too many active sessions".into()))?;

    let rendered = {
        let guard = state
            .lock()
            .map_err(|_| ApiError::Internal("session lock".into()))?;
        ctx.render(&guard)?
    };

    let cookie = format!("{SESSION_COOKIE}={session_id}; Path=/; HttpOnly; SameSite=Strict");
    let mut response = Json(SessionCreated {
        session_id,
        rendered,
    })
    .into_response();
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    Ok(no_store(response))
}

/// `GET /api/page`: current page, rendered.
pub async fn current(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<Rendered>, ApiError> {
    let state = session.lock()?;
    Ok(Json(ctx.render(&state)?))
}

#[derive(Deserialize)]
pub struct NavigateRequest {
    pub page: String,
}

/// `POST /api/navigate`: move to another page if the transition is allowed.
pub async fn navigate(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    payload: Result<Json<NavigateRequest>, JsonRejection>,
) -> Result<Json<Rendered>, ApiError> {
    let Json(req) = payload?;
    let target: Page = req.page.parse()?;

    let mut state = session.lock()?;
    state.navigate(target)?;
    Ok(Json(ctx.render(&state)?))
}

#[derive(Deserialize)]
pub struct RoleRequest {
    pub role: String,
}

/// `POST /api/role`: pick a portal and go to its login page.
pub async fn select_role(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    payload: Result<Json<RoleRequest>, JsonRejection>,
) -> Result<Json<Rendered>, ApiError> {
    let Json(req) = payload?;
    let role: Role = req
        .role
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Unknown role: {}", req.role)))?;

    let mut state = session.lock()?;
    state.select_role(role)?;
    Ok(Json(ctx.render(&state)?))
}
