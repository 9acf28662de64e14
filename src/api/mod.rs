//! HTTP API.
//!
//! Exposes the session router and the patient/plan store as JSON endpoints
//! under `/api/`. Session-bound routes go through the session middleware,
//! which resolves the caller's session before the handler runs.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{serve, ApiServer};
pub use types::ApiContext;
