//! Shared types for the API layer.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::api::error::ApiError;
use crate::diet::PlanGenerator;
use crate::models::Identity;
use crate::pages::{self, Rendered};
use crate::session::{SessionHandle, SessionState, SessionStore};
use crate::store::Store;

// ═══════════════════════════════════════════════════════════
// API context: shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub store: Arc<Store>,
    pub sessions: Arc<Mutex<SessionStore>>,
    pub generator: Arc<dyn PlanGenerator>,
}

impl ApiContext {
    pub fn new(store: Arc<Store>, generator: Arc<dyn PlanGenerator>, idle_timeout: Duration) -> Self {
        Self {
            store,
            sessions: Arc::new(Mutex::new(SessionStore::new(idle_timeout))),
            generator,
        }
    }

    pub fn lock_sessions(&self) -> Result<MutexGuard<'_, SessionStore>, ApiError> {
        self.sessions
            .lock()
            .map_err(|_| ApiError::Internal("session store lock".into()))
    }

    /// Render a session's current page.
    pub fn render(&self, state: &SessionState) -> Result<Rendered, ApiError> {
        Ok(pages::render(state, &self.store)?)
    }
}

// ═══════════════════════════════════════════════════════════
// Session context: injected by the session middleware
// ═══════════════════════════════════════════════════════════

/// The caller's session, injected into request extensions by the session
/// middleware.
#[derive(Clone)]
pub struct SessionContext {
    pub state: SessionHandle,
}

impl SessionContext {
    pub fn lock(&self) -> Result<MutexGuard<'_, SessionState>, ApiError> {
        self.state
            .lock()
            .map_err(|_| ApiError::Internal("session lock".into()))
    }
}

/// Id of the logged-in doctor, or `Forbidden`.
pub fn require_doctor(state: &SessionState) -> Result<i64, ApiError> {
    match state.identity() {
        Some(Identity::Doctor { id, .. }) => Ok(*id),
        Some(_) => Err(ApiError::Forbidden("Doctors only".into())),
        None => Err(ApiError::Forbidden("Login required".into())),
    }
}

/// Id of the logged-in patient, or `Forbidden`.
pub fn require_patient(state: &SessionState) -> Result<i64, ApiError> {
    match state.identity() {
        Some(Identity::Patient { id, .. }) => Ok(*id),
        Some(_) => Err(ApiError::Forbidden("Patients only".into())),
        None => Err(ApiError::Forbidden("Login required".into())),
    }
}
