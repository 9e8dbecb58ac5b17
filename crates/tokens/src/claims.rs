//! Claims carried inside every signed credential.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use authgate_core::{SessionId, UserId};

/// What a credential authorizes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived, stateless; authorizes ordinary requests.
    Access,
    /// Longer-lived, tracked server-side as a fingerprint; exchanged for a
    /// new credential pair and invalidated on each use.
    Refresh,
}

impl core::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TokenKind::Access => f.write_str("access"),
            TokenKind::Refresh => f.write_str("refresh"),
        }
    }
}

/// Claims model for both credential kinds.
///
/// `iat`/`exp` use registered JWT claim names (unix seconds) so standard
/// tooling can validate expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the user this credential was issued to.
    pub sub: UserId,

    /// The session this credential is scoped to.
    pub sid: SessionId,

    /// Credential kind.
    pub kind: TokenKind,

    /// Unique token id. Guarantees two credentials are never byte-identical
    /// even when minted within the same second for the same session, so a
    /// rotation always produces a fresh fingerprint.
    pub jti: Uuid,

    #[serde(with = "chrono::serde::ts_seconds")]
    pub iat: DateTime<Utc>,

    #[serde(with = "chrono::serde::ts_seconds")]
    pub exp: DateTime<Utc>,
}
