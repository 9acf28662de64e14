//! Login, registration and logout endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::{Extension, Json};
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SessionContext};
use crate::models::Registration;
use crate::pages::Rendered;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
}

/// Run password hashing and the SQLite work around it on the blocking pool.
async fn run_blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::Internal(format!("blocking task failed: {e}")))?
}

/// `POST /api/login`: check credentials for the session's chosen role.
///
/// Failure leaves the session on the login page with the message recorded.
pub async fn login(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<Rendered>, ApiError> {
    let Json(req) = payload?;

    let rendered = run_blocking(move || {
        let mut state = session.lock()?;
        let ok = state.login(&ctx.store, ctx.generator.as_ref(), &req.identifier, &req.password)?;
        if !ok {
            return Err(ApiError::InvalidCredentials);
        }
        ctx.render(&state)
    })
    .await?;
    Ok(Json(rendered))
}

/// `POST /api/register`: create a patient account and log it in.
pub async fn register(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    payload: Result<Json<Registration>, JsonRejection>,
) -> Result<Json<Rendered>, ApiError> {
    let Json(registration) = payload?;

    let rendered = run_blocking(move || {
        let mut state = session.lock()?;
        state.register(&ctx.store, ctx.generator.as_ref(), &registration)?;
        ctx.render(&state)
    })
    .await?;
    Ok(Json(rendered))
}

/// `POST /api/logout`: reset the session to role selection.
pub async fn logout(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<Rendered>, ApiError> {
    let mut state = session.lock()?;
    if let Some(identity) = state.identity() {
        tracing::info!(role = identity.role().as_str(), user_id = identity.id(), "Logged out");
    }
    state.logout();
    Ok(Json(ctx.render(&state)?))
}
