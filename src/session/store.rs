use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::config;

use super::SessionState;

/// Shared handle to one session's state.
pub type SessionHandle = Arc<Mutex<SessionState>>;

struct SessionSlot {
    state: SessionHandle,
    last_seen: Instant,
}

/// In-memory sessions keyed by opaque id, dropped after an idle timeout.
pub struct SessionStore {
    sessions: HashMap<String, SessionSlot>,
    idle_timeout: Duration,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self::with_limit(idle_timeout, config::MAX_SESSIONS)
    }

    pub fn with_limit(idle_timeout: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: HashMap::new(),
            idle_timeout,
            max_sessions,
        }
    }

    /// Start a fresh session on the role selection page.
    ///
    /// `None` when the live-session limit is reached.
    pub fn create(&mut self) -> Option<(String, SessionHandle)> {
        self.purge_expired();
        if self.sessions.len() >= self.max_sessions {
            tracing::warn!(limit = self.max_sessions, "Session limit reached");
            return None;
        }
        let id = generate_session_id();
        let state: SessionHandle = Arc::new(Mutex::new(SessionState::new()));
        self.sessions.insert(
            id.clone(),
            SessionSlot {
                state: state.clone(),
                last_seen: Instant::now(),
            },
        );
        tracing::debug!(active = self.sessions.len(), "Session created");
        Some((id, state))
    }

    /// Look up a live session and mark it as used. Every expired session is
    /// dropped first, so an expired id reports as missing.
    pub fn get(&mut self, id: &str) -> Option<SessionHandle> {
        self.purge_expired();
        let slot = self.sessions.get_mut(id)?;
        slot.last_seen = Instant::now();
        Some(slot.state.clone())
    }

    /// Drop every session idle past the timeout. Returns how many went.
    pub fn purge_expired(&mut self) -> usize {
        let now = Instant::now();
        let timeout = self.idle_timeout;
        let before = self.sessions.len();
        self.sessions
            .retain(|_, slot| now.duration_since(slot.last_seen) < timeout);
        let purged = before - self.sessions.len();
        if purged > 0 {
            tracing::debug!(purged, active = self.sessions.len(), "Expired sessions dropped");
        }
        purged
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// 32 random bytes, URL-safe base64.
pub fn generate_session_id() -> String {
    use base64::Engine;
    let bytes: [u8; 32] = rand::random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Page;

    #[test]
    fn session_ids_are_unique() {
        let a = generate_session_id();
        let b = generate_session_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
    }

    #[test]
    fn create_then_get_shares_state() {
        let mut store = SessionStore::new(Duration::from_secs(60));
        let (id, handle) = store.create().unwrap();
        handle
            .lock()
            .unwrap()
            .select_role(crate::models::Role::Patient)
            .unwrap();

        let again = store.get(&id).unwrap();
        assert_eq!(again.lock().unwrap().page(), Page::Login);
    }

    #[test]
    fn unknown_id_is_none() {
        let mut store = SessionStore::new(Duration::from_secs(60));
        assert!(store.get("nope").is_none());
    }

    #[test]
    fn idle_sessions_are_evicted() {
        let mut store = SessionStore::new(Duration::ZERO);
        let (id, _) = store.create().unwrap();
        assert!(store.get(&id).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn purge_removes_only_expired() {
        let mut store = SessionStore::new(Duration::from_secs(3600));
        store.create().unwrap();
        store.create().unwrap();
        assert_eq!(store.purge_expired(), 0);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn expired_sessions_are_dropped_on_lookup() {
        let mut store = SessionStore::new(Duration::ZERO);
        store.create().unwrap();
        store.create().unwrap();
        assert!(store.get("other").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn create_refuses_past_limit() {
        let mut store = SessionStore::with_limit(Duration::from_secs(60), 2);
        store.create().unwrap();
        store.create().unwrap();
        assert!(store.create().is_none());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn expired_sessions_free_capacity() {
        let mut store = SessionStore::with_limit(Duration::ZERO, 1);
        store.create().unwrap();
        assert!(store.create().is_some());
    }
}
