//! Guard middleware: explicit pipeline stages run before the handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use authgate_tokens::{TokenCodec, TokenKind};

use crate::app::errors;
use crate::context::{CallerContext, RefreshContext};

#[derive(Clone)]
pub struct AuthState {
    pub codec: Arc<TokenCodec>,
}

/// Access guard: requires a valid access token and injects [`CallerContext`].
pub async fn access_guard(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer(req.headers())?;

    let claims = state
        .codec
        .verify(token, TokenKind::Access)
        .map_err(|e| {
            tracing::debug!(error = %e, "access guard rejected credential");
            errors::unauthorized()
        })?;

    req.extensions_mut()
        .insert(CallerContext::new(claims.sub, claims.sid));

    Ok(next.run(req).await)
}

/// Refresh guard: requires a valid refresh token and injects
/// [`RefreshContext`] carrying the presented token for the store-side
/// re-validation.
pub async fn refresh_guard(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer(req.headers())?.to_string();

    let claims = state
        .codec
        .verify(&token, TokenKind::Refresh)
        .map_err(|e| {
            tracing::debug!(error = %e, "refresh guard rejected credential");
            errors::unauthorized()
        })?;

    req.extensions_mut()
        .insert(RefreshContext::new(claims.sub, claims.sid, token));

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, Response> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(errors::unauthorized)?;

    let header = header.to_str().map_err(|_| errors::unauthorized())?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(errors::unauthorized)?
        .trim();

    if token.is_empty() {
        return Err(errors::unauthorized());
    }

    Ok(token)
}
