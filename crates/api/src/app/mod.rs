//! Application wiring (axum router + service construction).
//!
//! - `services.rs`: component wiring (codec, store, manager, directory, checker)
//! - `routes/`: handlers (one file per area)
//! - `dto.rs`: request/response DTOs + pure validation functions
//! - `errors.rs`: typed-error → status-code mapping

use std::sync::Arc;

use axum::{Extension, Router, routing::get};

use crate::config::ApiConfig;
use crate::middleware::{self, AuthState};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full router from configuration (the `main.rs` entrypoint).
pub fn build_app(config: &ApiConfig) -> Router {
    build_app_with_services(Arc::new(AppServices::from_config(config)))
}

/// Build the router around pre-built services (tests construct services
/// directly so they can seed the directory).
pub fn build_app_with_services(services: Arc<AppServices>) -> Router {
    let auth_state = AuthState {
        codec: Arc::clone(&services.codec),
    };

    // Routes requiring a verified access token.
    let protected = routes::auth::protected_router().layer(axum::middleware::from_fn_with_state(
        auth_state.clone(),
        middleware::access_guard,
    ));

    // The rotation route requires a verified refresh token instead.
    let refresh = routes::auth::refresh_router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::refresh_guard,
    ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::auth::public_router())
        .merge(protected)
        .merge(refresh)
        .layer(Extension(services))
}
