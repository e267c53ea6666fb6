use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::context::AuthenticatedUser;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(caller): Extension<AuthenticatedUser>) -> impl IntoResponse {
    Json(serde_json::json!({
        "user_id": caller.user_id().to_string(),
    }))
}
