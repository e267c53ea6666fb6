use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use fintrack_auth::UserProfile;
use fintrack_core::UserId;

use crate::app::dto;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::authz;
use crate::context::AuthenticatedUser;

/// Registration and login: reachable without a token.
pub fn public_router() -> Router {
    Router::new()
        .route("/users", post(register))
        .route("/users/login", post(login))
}

pub fn router() -> Router {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/email/:email", get(get_user_by_email))
        .route("/users/:id", get(get_user).put(update_user).delete(delete_user))
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body?;
    let user = services.auth.register(body.into(), Utc::now()).await?;

    Ok((
        StatusCode::CREATED,
        Json(dto::MessageResponse {
            message: "user registered",
            result: user.profile(),
        }),
    ))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body?;
    let issued = services
        .auth
        .login(body.identifier()?, &body.password, Utc::now())
        .await?;

    Ok(Json(dto::MessageResponse {
        message: "login successful",
        result: dto::TokenResponse::from(issued),
    }))
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<impl IntoResponse, ApiError> {
    let result: Vec<UserProfile> = services.auth.users().await?.iter().map(|u| u.profile()).collect();
    Ok(Json(dto::ListResponse {
        total: result.len() as u64,
        result,
    }))
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: UserId = id.parse()?;
    Ok(Json(services.auth.user(id).await?.profile()))
}

pub async fn get_user_by_email(
    Extension(services): Extension<Arc<AppServices>>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(services.auth.user_by_email(&email).await?.profile()))
}

pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    body: Result<Json<dto::UpdateUserRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id: UserId = id.parse()?;
    authz::ensure_owner(&caller, id)?;
    let Json(body) = body?;

    let user = services.auth.update_user(id, body.into(), Utc::now()).await?;
    Ok(Json(dto::MessageResponse {
        message: "user updated",
        result: user.profile(),
    }))
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: UserId = id.parse()?;
    authz::ensure_owner(&caller, id)?;

    services.delete_user(id).await?;
    Ok(Json(dto::message("user deleted")))
}
