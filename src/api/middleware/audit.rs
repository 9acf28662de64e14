//! Access logging middleware.
//!
//! Logs every API request with method, path, status, latency and the
//! logged-in user (when the session middleware has run).

use std::time::Instant;

use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::api::types::SessionContext;

/// Log API access.
pub async fn log_access(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let request_id = uuid::Uuid::new_v4();

    // Identity as of request start; login changes it mid-request.
    let user = req
        .extensions()
        .get::<SessionContext>()
        .and_then(|s| s.lock().ok().and_then(|state| state.identity().cloned()))
        .map(|identity| format!("{}:{}", identity.role(), identity.id()));

    let started = Instant::now();
    let response = next.run(req).await;
    let status = response.status().as_u16();

    tracing::info!(
        %request_id,
        method,
        path,
        status,
        user = user.as_deref().unwrap_or("-"),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "API request"
    );

    response
}
