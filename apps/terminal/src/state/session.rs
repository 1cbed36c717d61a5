//! Logged-in session, passed explicitly to collaborator calls.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::warn;
use wt_api::{ClientError, SessionContext};

use crate::error::CommandError;

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    session: Arc<Mutex<Option<SessionContext>>>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, session: SessionContext) {
        *self.session.lock().unwrap_or_else(|e| e.into_inner()) = Some(session);
    }

    /// Drops the session; returns whether one was set.
    pub fn clear(&self) -> bool {
        self.session
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .is_some()
    }

    /// The current session, or an `UNAUTHORIZED` error.
    ///
    /// A token close to its expiry is still returned, with a warning so the
    /// operator can log in again between bills.
    pub fn current(&self) -> Result<SessionContext, CommandError> {
        let session = self
            .session
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or(ClientError::NotLoggedIn)?;

        let now = Utc::now();
        session.ensure_valid(now)?;
        if session.needs_refresh(now) {
            warn!(
                user = %session.user().email,
                remaining_secs = ?session.remaining_secs(now),
                "Session expires soon, log in again"
            );
        }
        Ok(session)
    }

    pub fn is_logged_in(&self) -> bool {
        self.session
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }
}
