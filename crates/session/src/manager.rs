//! Session lifecycle orchestration: login, refresh (rotation), logout.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use authgate_core::{SessionId, UserId};
use authgate_tokens::{TokenCodec, TokenError, TokenKind, fingerprint};

use crate::store::{SessionStore, SessionStoreError};

/// A freshly minted access + refresh credential pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialPair {
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
}

/// Typed failure of a session operation. Codec and store failures propagate
/// unchanged; nothing is downgraded to a generic error and nothing is retried
/// here (retry is a transport concern).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Store(#[from] SessionStoreError),
}

/// Orchestrates the session store and the credential codec.
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    codec: Arc<TokenCodec>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn SessionStore>,
        codec: Arc<TokenCodec>,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            store,
            codec,
            access_ttl,
            refresh_ttl,
        }
    }

    fn mint_pair(
        &self,
        user_id: UserId,
        session_id: SessionId,
    ) -> Result<CredentialPair, SessionError> {
        let access = self
            .codec
            .issue(user_id, session_id, TokenKind::Access, self.access_ttl)?;
        let refresh = self
            .codec
            .issue(user_id, session_id, TokenKind::Refresh, self.refresh_ttl)?;

        Ok(CredentialPair {
            access_token: access.token,
            refresh_token: refresh.token,
            access_expires_at: access.expires_at,
            refresh_expires_at: refresh.expires_at,
        })
    }

    /// Create a session for `user_id` and bind its first refresh credential.
    pub fn login(&self, user_id: UserId) -> Result<(CredentialPair, SessionId), SessionError> {
        let session = self.store.create(user_id)?;
        let pair = self.mint_pair(user_id, session.session_id)?;
        self.store.bind_refresh(
            session.session_id,
            &fingerprint(&pair.refresh_token),
            pair.refresh_expires_at,
        )?;

        tracing::debug!(session_id = %session.session_id, user_id = %user_id, "session created");
        Ok((pair, session.session_id))
    }

    /// Rotate the session's credential pair.
    ///
    /// The caller (guard) has already verified the presented token's
    /// signature, expiry and kind; this re-verifies independently and then
    /// checks the presented credential against the store's current binding
    /// inside the store's atomic compare-and-set. Losing a race, replaying a
    /// rotated-out credential, or refreshing a destroyed session all surface
    /// as `StaleCredential` / `SessionNotFound` here.
    pub fn refresh(
        &self,
        session_id: SessionId,
        presented_refresh_token: &str,
    ) -> Result<CredentialPair, SessionError> {
        let claims = self
            .codec
            .verify(presented_refresh_token, TokenKind::Refresh)?;

        // A verified token scoped to a different session can never be this
        // session's bound credential; fail the same way replay does.
        if claims.sid != session_id {
            return Err(SessionStoreError::StaleCredential.into());
        }

        // Mint first, then compare-and-set. A loser's pair is dropped without
        // ever being returned or bound.
        let pair = self.mint_pair(claims.sub, session_id)?;
        self.store.rotate_refresh(
            session_id,
            &fingerprint(presented_refresh_token),
            &fingerprint(&pair.refresh_token),
            pair.refresh_expires_at,
        )?;

        tracing::debug!(session_id = %session_id, "session rotated");
        Ok(pair)
    }

    /// Destroy the session.
    pub fn logout(&self, session_id: SessionId) -> Result<(), SessionError> {
        self.store.destroy(session_id)?;
        tracing::debug!(session_id = %session_id, "session destroyed");
        Ok(())
    }
}
