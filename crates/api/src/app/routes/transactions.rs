use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Path, Query,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use fintrack_core::{Pagination, TransactionId, UserId};
use fintrack_ledger::{DateRange, NewTransaction, Transaction};

use crate::app::dto;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::authz;
use crate::context::AuthenticatedUser;

pub fn router() -> Router {
    Router::new()
        .route("/transactions", get(list_own).post(create_transaction))
        .route("/transactions/statement", get(statement))
        .route("/transactions/user/:user_id", get(list_for_user))
        .route(
            "/transactions/:id",
            get(get_transaction).put(update_transaction).delete(delete_transaction),
        )
}

/// Fetch a transaction and check that the caller owns it.
async fn owned(services: &AppServices, caller: &AuthenticatedUser, id: &str) -> Result<Transaction, ApiError> {
    let id: TransactionId = id.parse()?;
    let transaction = services.ledger.get(id).await?;
    authz::ensure_owner(caller, transaction.user_id)?;
    Ok(transaction)
}

async fn list(
    services: &AppServices,
    user_id: UserId,
    page: Pagination,
) -> Result<Json<dto::ListResponse<Transaction>>, ApiError> {
    let (total, result) = services.ledger.list_for_user(user_id, page).await?;
    Ok(Json(dto::ListResponse { total, result }))
}

pub async fn list_own(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<AuthenticatedUser>,
    query: Result<Query<dto::PageQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;
    list(&services, caller.user_id(), query.into()).await
}

pub async fn list_for_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(user_id): Path<String>,
    query: Result<Query<dto::PageQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id: UserId = user_id.parse()?;
    authz::ensure_owner(&caller, user_id)?;
    let Query(query) = query?;
    list(&services, user_id, query.into()).await
}

pub async fn create_transaction(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<AuthenticatedUser>,
    body: Result<Json<dto::CreateTransactionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body?;
    if let Some(user_id) = body.user_id {
        authz::ensure_owner(&caller, user_id)?;
    }

    let new = NewTransaction {
        user_id: caller.user_id(),
        amount: body.amount,
        kind: body.kind,
        description: body.description,
    };
    let transaction = services.ledger.create(new, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

pub async fn get_transaction(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(owned(&services, &caller, &id).await?))
}

pub async fn update_transaction(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    body: Result<Json<dto::UpdateTransactionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let existing = owned(&services, &caller, &id).await?;
    let Json(body) = body?;

    let updated = services.ledger.update(existing.id, body.into(), Utc::now()).await?;
    Ok(Json(updated))
}

pub async fn delete_transaction(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let existing = owned(&services, &caller, &id).await?;
    services.ledger.delete(existing.id).await?;
    Ok(Json(dto::message("transaction deleted")))
}

/// Statement of the caller's own account.
pub async fn statement(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<AuthenticatedUser>,
    query: Result<Query<dto::StatementQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;
    let range = DateRange::new(query.from, query.to)?;
    Ok(Json(services.ledger.statement(caller.user_id(), range).await?))
}
