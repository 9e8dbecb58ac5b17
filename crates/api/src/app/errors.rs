//! Typed-error → HTTP response mapping.
//!
//! Every authentication failure maps to one uniform 401 body regardless of
//! cause (bad signature, expiry, stale credential, missing session, wrong
//! password): external callers must not be able to tell which check failed.
//! The distinct kinds are preserved internally via debug logging.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use authgate_directory::DirectoryError;
use authgate_session::SessionError;

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// The uniform authentication-failure response.
pub fn unauthorized() -> axum::response::Response {
    json_error(StatusCode::UNAUTHORIZED, "unauthorized", "authentication failed")
}

pub fn validation_errors(errors: Vec<String>) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        axum::Json(json!({
            "error": "validation_error",
            "messages": errors,
        })),
    )
        .into_response()
}

pub fn session_error_to_response(err: SessionError) -> axum::response::Response {
    tracing::debug!(error = %err, "session operation failed");
    unauthorized()
}

pub fn directory_error_to_response(err: DirectoryError) -> axum::response::Response {
    match err {
        DirectoryError::InvalidCredentials => {
            tracing::debug!("authentication with invalid credentials");
            unauthorized()
        }
        DirectoryError::EmailTaken => {
            json_error(StatusCode::CONFLICT, "email_taken", "email already registered")
        }
        DirectoryError::Validation(msg) => validation_errors(vec![msg]),
        DirectoryError::UserNotFound => {
            json_error(StatusCode::NOT_FOUND, "not_found", "user not found")
        }
    }
}
