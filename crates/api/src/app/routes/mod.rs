use axum::{routing::get, Router};

pub mod system;
pub mod transactions;
pub mod users;

/// Routes reachable without a bearer token.
pub fn public_router() -> Router {
    users::public_router()
}

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .merge(users::router())
        .merge(transactions::router())
}
