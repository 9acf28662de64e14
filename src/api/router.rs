//! API router.
//!
//! Returns a composable `Router`. Routes are nested under `/api/`.
//!
//! Middleware stack (outermost → innermost):
//! 1. Session lookup → 2. Access log

use axum::routing::{get, post};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;

/// Build the API router.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost layer).
/// Endpoint handlers use `State<ApiContext>` (provided via `with_state`).
pub fn api_router(ctx: ApiContext) -> Router {
    // Layers apply bottom (outermost) to top (innermost):
    //   Extension → Session → Audit → Handler
    //
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let session_bound = Router::new()
        .route("/page", get(endpoints::session::current))
        .route("/navigate", post(endpoints::session::navigate))
        .route("/role", post(endpoints::session::select_role))
        .route("/login", post(endpoints::auth::login))
        .route("/register", post(endpoints::auth::register))
        .route("/logout", post(endpoints::auth::logout))
        .route("/patients", get(endpoints::patients::list))
        .route(
            "/patients/:id/plan",
            get(endpoints::patients::get_plan).put(endpoints::patients::assign_plan),
        )
        .route(
            "/patients/:id/plan/generate",
            post(endpoints::patients::generate_plan),
        )
        .route("/plan", get(endpoints::plans::own_plan))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::middleware::from_fn(middleware::session::require_session))
        .layer(axum::Extension(ctx.clone()));

    // No session needed
    let open = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/session", post(endpoints::session::create))
        .with_state(ctx)
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(SetResponseHeaderLayer::overriding(
            axum::http::header::CACHE_CONTROL,
            axum::http::HeaderValue::from_static("no-store"),
        ));

    Router::new()
        .nest("/api", session_bound)
        .nest("/api", open)
}
