use authgate_core::{SessionId, UserId};

/// Identity of an authenticated caller (access-guard output).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CallerContext {
    user_id: UserId,
    session_id: SessionId,
}

impl CallerContext {
    pub fn new(user_id: UserId, session_id: SessionId) -> Self {
        Self {
            user_id,
            session_id,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }
}

/// Output of the refresh guard: the presented refresh token has a valid
/// signature, expiry and kind, and these are the identities it carries. The
/// session core still re-validates the token against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshContext {
    user_id: UserId,
    session_id: SessionId,
    token: String,
}

impl RefreshContext {
    pub fn new(user_id: UserId, session_id: SessionId, token: String) -> Self {
        Self {
            user_id,
            session_id,
            token,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}
