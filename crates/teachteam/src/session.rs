//! Explicit login sessions handed to request handlers.
//!
//! A session is opened at login, looked up on every request and dropped at logout. Core
//! selection functions never consult the registry; handlers resolve the session and pass
//! what they need.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::selection::domain::{UserData, UserRole};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub token: SessionToken,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub opened_at: DateTime<Utc>,
}

impl Session {
    /// Lecturers and admins review applications.
    pub fn can_review(&self) -> bool {
        matches!(self.role, UserRole::Lecturer | UserRole::Admin)
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<SessionToken, Session>>,
    sequence: AtomicU64,
}

impl SessionRegistry {
    pub fn open(&self, user: UserData) -> Session {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let opened_at = Utc::now();
        let session = Session {
            token: SessionToken(format!(
                "sess-{id:06}-{:x}",
                opened_at.timestamp_nanos_opt().unwrap_or_default()
            )),
            email: user.email,
            name: user.name,
            role: user.role,
            opened_at,
        };

        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(session.token.clone(), session.clone());
        session
    }

    pub fn resolve(&self, token: &SessionToken) -> Option<Session> {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(token)
            .cloned()
    }

    /// Returns whether a session was actually closed.
    pub fn close(&self, token: &SessionToken) -> bool {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(token)
            .is_some()
    }
}
