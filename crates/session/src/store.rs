//! Session storage: the durable side of the refresh-credential invariant.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use authgate_core::{SessionId, UserId};

/// A live session row.
///
/// # Invariants
/// - At most one live row per `SessionId`.
/// - `refresh_fingerprint` is the only refresh credential currently valid for
///   this session (`None` between `create` and the first `bind_refresh`).
/// - A session whose `expires_at` has passed is as good as destroyed: every
///   lookup treats it as `SessionNotFound` and implementations may drop the
///   row at any point after that instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: SessionId,
    pub user_id: UserId,
    pub refresh_fingerprint: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_rotated_at: DateTime<Utc>,
    /// Expiry of the currently bound refresh credential. Until the first
    /// `bind_refresh` this equals `created_at`: nothing is redeemable yet.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionStoreError {
    /// The session does not exist (never created, destroyed, or expired).
    #[error("session not found")]
    SessionNotFound,

    /// The presented refresh credential is not the currently bound one —
    /// the session has been rotated since it was issued. This is the replay
    /// detection path.
    #[error("stale refresh credential")]
    StaleCredential,
}

/// Durable mapping from session id to the currently valid refresh credential.
///
/// Implementations must make `rotate_refresh` atomic per session: of N
/// concurrent rotations presenting the same fingerprint, exactly one may win.
pub trait SessionStore: Send + Sync {
    /// Allocate a fresh session for `user_id` with no refresh credential
    /// bound yet. The returned id is never a live id belonging to another
    /// user.
    fn create(&self, user_id: UserId) -> Result<Session, SessionStoreError>;

    /// Set or overwrite the session's refresh fingerprint, advancing
    /// `last_rotated_at` and moving `expires_at` to the new credential's
    /// expiry.
    fn bind_refresh(
        &self,
        session_id: SessionId,
        fingerprint: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), SessionStoreError>;

    /// Succeeds only if `fingerprint` equals the currently bound one and the
    /// session has not expired.
    fn validate_refresh(
        &self,
        session_id: SessionId,
        fingerprint: &str,
    ) -> Result<(), SessionStoreError>;

    /// Atomic compare-and-set: validate `presented` against the current
    /// binding and, in the same critical section, bind `next` with its
    /// expiry. The loser of a race observes `StaleCredential`, never a
    /// silent overwrite. An expired session observes `SessionNotFound`.
    fn rotate_refresh(
        &self,
        session_id: SessionId,
        presented: &str,
        next: &str,
        next_expires_at: DateTime<Utc>,
    ) -> Result<(), SessionStoreError>;

    /// Remove the session row. Subsequent calls for this id observe
    /// `SessionNotFound`.
    fn destroy(&self, session_id: SessionId) -> Result<(), SessionStoreError>;

    /// Look up a session row (telemetry/tests; not part of the rotation
    /// critical path).
    fn get(&self, session_id: SessionId) -> Result<Session, SessionStoreError>;
}

/// In-memory session store.
///
/// Intended for tests/dev and as the reference semantics for any persistent
/// implementation. All mutation happens under one write lock, which makes
/// `rotate_refresh` trivially atomic.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<SessionId, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn create(&self, user_id: UserId) -> Result<Session, SessionStoreError> {
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());

        // UUIDv7 collisions are not a practical concern, but the invariant
        // ("never reuse a live id") is cheap to uphold explicitly.
        let mut session_id = SessionId::new();
        while sessions.contains_key(&session_id) {
            session_id = SessionId::new();
        }

        let now = Utc::now();
        let session = Session {
            session_id,
            user_id,
            refresh_fingerprint: None,
            created_at: now,
            last_rotated_at: now,
            expires_at: now,
        };
        sessions.insert(session_id, session.clone());
        Ok(session)
    }

    fn bind_refresh(
        &self,
        session_id: SessionId,
        fingerprint: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), SessionStoreError> {
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        let session = sessions
            .get_mut(&session_id)
            .ok_or(SessionStoreError::SessionNotFound)?;

        session.refresh_fingerprint = Some(fingerprint.to_string());
        session.last_rotated_at = Utc::now();
        session.expires_at = expires_at;
        Ok(())
    }

    fn validate_refresh(
        &self,
        session_id: SessionId,
        fingerprint: &str,
    ) -> Result<(), SessionStoreError> {
        let sessions = self.sessions.read().unwrap_or_else(|e| e.into_inner());
        let session = sessions
            .get(&session_id)
            .ok_or(SessionStoreError::SessionNotFound)?;

        if session.is_expired(Utc::now()) {
            return Err(SessionStoreError::SessionNotFound);
        }

        match session.refresh_fingerprint.as_deref() {
            Some(current) if current == fingerprint => Ok(()),
            _ => Err(SessionStoreError::StaleCredential),
        }
    }

    fn rotate_refresh(
        &self,
        session_id: SessionId,
        presented: &str,
        next: &str,
        next_expires_at: DateTime<Utc>,
    ) -> Result<(), SessionStoreError> {
        // Validate-then-bind under the write lock: this is the critical
        // section the concurrency model hinges on.
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        let session = sessions
            .get_mut(&session_id)
            .ok_or(SessionStoreError::SessionNotFound)?;

        if session.is_expired(Utc::now()) {
            // The row is unreachable by any valid credential; reclaim it.
            sessions.remove(&session_id);
            return Err(SessionStoreError::SessionNotFound);
        }

        match session.refresh_fingerprint.as_deref() {
            Some(current) if current == presented => {
                session.refresh_fingerprint = Some(next.to_string());
                session.last_rotated_at = Utc::now();
                session.expires_at = next_expires_at;
                Ok(())
            }
            _ => Err(SessionStoreError::StaleCredential),
        }
    }

    fn destroy(&self, session_id: SessionId) -> Result<(), SessionStoreError> {
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        sessions
            .remove(&session_id)
            .map(|_| ())
            .ok_or(SessionStoreError::SessionNotFound)
    }

    fn get(&self, session_id: SessionId) -> Result<Session, SessionStoreError> {
        let sessions = self.sessions.read().unwrap_or_else(|e| e.into_inner());
        sessions
            .get(&session_id)
            .filter(|s| !s.is_expired(Utc::now()))
            .cloned()
            .ok_or(SessionStoreError::SessionNotFound)
    }
}
