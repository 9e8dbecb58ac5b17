//! Request/response DTOs and their pure validation functions.
//!
//! Validation never happens inside handlers ad hoc: each request type has one
//! function returning either the ok unit or the complete list of problems.

use serde::{Deserialize, Serialize};

use authgate_core::SessionId;
use authgate_directory::UserSnapshot;
use authgate_session::CredentialPair;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

pub fn validate_login(req: &LoginRequest) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();
    if req.email.trim().is_empty() {
        errors.push("email must not be empty".to_string());
    }
    if req.password.is_empty() {
        errors.push("password must not be empty".to_string());
    }
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

pub fn validate_register(req: &RegisterRequest) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();
    let email = req.email.trim();
    if email.is_empty() || !email.contains('@') {
        errors.push("email must be a valid address".to_string());
    }
    if req.password.len() < 8 {
        errors.push("password must be at least 8 characters".to_string());
    }
    if req.display_name.trim().is_empty() {
        errors.push("display name must not be empty".to_string());
    }
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Response for login, register and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub session_id: SessionId,
    pub user: UserSnapshot,
}

impl AuthResponse {
    pub fn new(pair: CredentialPair, session_id: SessionId, user: UserSnapshot) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            session_id,
            user,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub message: String,
    pub user: UserSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_validation_collects_every_problem() {
        let errors = validate_login(&LoginRequest {
            email: " ".to_string(),
            password: String::new(),
        })
        .unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn register_validation_accepts_a_complete_request() {
        validate_register(&RegisterRequest {
            email: "alice@example.com".to_string(),
            password: "correct horse".to_string(),
            display_name: "Alice".to_string(),
        })
        .unwrap();
    }

    #[test]
    fn register_validation_rejects_bad_fields() {
        let errors = validate_register(&RegisterRequest {
            email: "not-an-email".to_string(),
            password: "short".to_string(),
            display_name: String::new(),
        })
        .unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
