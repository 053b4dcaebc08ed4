//! Get-or-create session storage keyed by platform user id.

use std::sync::Arc;

use dashmap::DashMap;

use crate::session::Session;

/// In-memory session store, sharded per key.
///
/// Operations on one user's session are linearizable; different users never
/// contend on a shared lock. Sessions are created lazily on first access
/// and live until the process exits.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<String, Arc<Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session for `user_id`, creating an empty one on first access.
    pub fn session(&self, user_id: &str) -> Arc<Session> {
        if let Some(existing) = self.sessions.get(user_id) {
            return Arc::clone(&existing);
        }
        Arc::clone(
            &self
                .sessions
                .entry(user_id.to_string())
                .or_default(),
        )
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
