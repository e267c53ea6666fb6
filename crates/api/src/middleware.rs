use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use fintrack_auth::AuthGate;

use crate::app::errors::ApiError;
use crate::context::AuthenticatedUser;

#[derive(Clone)]
pub struct AuthState {
    pub gate: Arc<AuthGate>,
}

/// Hard gate in front of every protected route: a request without a valid
/// bearer token never reaches a handler.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(req.headers()).ok_or_else(ApiError::unauthenticated)?;

    let user_id = state
        .gate
        .validate_token(token, Utc::now())
        .ok_or_else(ApiError::unauthenticated)?;

    req.extensions_mut().insert(AuthenticatedUser::new(user_id));

    Ok(next.run(req).await)
}

/// Log method, path, status and latency of every request.
pub async fn request_logging(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(req).await;

    tracing::info!(
        %method,
        path = %path,
        status = response.status().as_u16(),
        latency_ms = started.elapsed().as_millis() as u64,
        "request handled"
    );
    response
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let header = header.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}
