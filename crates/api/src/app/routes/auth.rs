//! Authentication and access-check handlers.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use authgate_access::{AccessRequest, RawAccessRequest};
use authgate_directory::{DirectoryError, NewUser};

use crate::app::dto::{
    AuthResponse, LoginRequest, ProfileResponse, RegisterRequest, validate_login,
    validate_register,
};
use crate::app::{errors, services::AppServices};
use crate::context::{CallerContext, RefreshContext};

/// Routes reachable without credentials.
pub fn public_router() -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
}

/// Routes guarded by a verified refresh token.
pub fn refresh_router() -> Router {
    Router::new().route("/auth/refresh", post(refresh))
}

/// Routes guarded by a verified access token.
pub fn protected_router() -> Router {
    Router::new()
        .route("/auth/check-access", post(check_access))
        .route("/auth/profile", get(profile))
        .route("/auth/logout", post(logout))
}

/// POST /auth/login - authenticate and open a session.
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<LoginRequest>,
) -> axum::response::Response {
    if let Err(problems) = validate_login(&body) {
        return errors::validation_errors(problems);
    }

    let user = match services.directory.authenticate(&body.email, &body.password) {
        Ok(user) => user,
        Err(e) => return errors::directory_error_to_response(e),
    };

    match services.sessions.login(user.id) {
        Ok((pair, session_id)) => {
            tracing::info!(user_id = %user.id, %session_id, "login");
            (StatusCode::OK, Json(AuthResponse::new(pair, session_id, user))).into_response()
        }
        Err(e) => errors::session_error_to_response(e),
    }
}

/// POST /auth/register - create an account and open its first session.
pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<RegisterRequest>,
) -> axum::response::Response {
    if let Err(problems) = validate_register(&body) {
        return errors::validation_errors(problems);
    }

    let user = match services.directory.register(NewUser {
        email: body.email,
        password: body.password,
        display_name: body.display_name,
    }) {
        Ok(user) => user,
        Err(e) => return errors::directory_error_to_response(e),
    };

    match services.sessions.login(user.id) {
        Ok((pair, session_id)) => {
            tracing::info!(user_id = %user.id, %session_id, "registered");
            (
                StatusCode::CREATED,
                Json(AuthResponse::new(pair, session_id, user)),
            )
                .into_response()
        }
        Err(e) => errors::session_error_to_response(e),
    }
}

/// POST /auth/refresh - rotate the session's credential pair.
///
/// The refresh guard verified the presented token; the session core
/// re-validates it against the store and rotates atomically.
pub async fn refresh(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RefreshContext>,
) -> axum::response::Response {
    // The account vanished mid-session. Bail before rotating: consuming the
    // presented credential here would leave the session bound to a pair the
    // caller never receives.
    let Some(user) = services.directory.find_by_id(ctx.user_id()) else {
        tracing::debug!(user_id = %ctx.user_id(), "refresh for unknown user");
        return errors::unauthorized();
    };

    let pair = match services.sessions.refresh(ctx.session_id(), ctx.token()) {
        Ok(pair) => pair,
        Err(e) => return errors::session_error_to_response(e),
    };

    (
        StatusCode::OK,
        Json(AuthResponse::new(pair, ctx.session_id(), user)),
    )
        .into_response()
}

/// POST /auth/check-access - evaluate an access request for the caller.
pub async fn check_access(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<CallerContext>,
    Json(body): Json<RawAccessRequest>,
) -> axum::response::Response {
    let request = match AccessRequest::parse(body) {
        Ok(request) => request,
        Err(e) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_request", e.to_string());
        }
    };

    let decision = services.checker.check(ctx.user_id(), &request);
    (StatusCode::OK, Json(decision)).into_response()
}

/// GET /auth/profile - the caller's own snapshot.
pub async fn profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<CallerContext>,
) -> axum::response::Response {
    match services.directory.find_by_id(ctx.user_id()) {
        Some(user) => (
            StatusCode::OK,
            Json(ProfileResponse {
                message: "profile retrieved".to_string(),
                user,
            }),
        )
            .into_response(),
        None => errors::directory_error_to_response(DirectoryError::UserNotFound),
    }
}

/// POST /auth/logout - destroy the caller's session.
pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<CallerContext>,
) -> axum::response::Response {
    match services.sessions.logout(ctx.session_id()) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::session_error_to_response(e),
    }
}
