//! Service wiring: stores, hasher, token issuer, and the two engines.

use std::sync::Arc;

use fintrack_auth::{
    Argon2Hasher, AuthError, AuthGate, CredentialHasher, InMemoryUserStore, TokenIssuer, UserStore,
};
use fintrack_core::UserId;
use fintrack_infra::{TimeoutTransactionStore, TimeoutUserStore};
use fintrack_ledger::{InMemoryTransactionStore, LedgerEngine, TransactionStore};

use crate::app::errors::ApiError;
use crate::config::AppConfig;

/// Everything a handler needs, shared behind an `Arc`.
#[derive(Clone)]
pub struct AppServices {
    pub auth: Arc<AuthGate>,
    pub ledger: LedgerEngine,
}

impl AppServices {
    pub fn new(
        users: Arc<dyn UserStore>,
        transactions: Arc<dyn TransactionStore>,
        hasher: Arc<dyn CredentialHasher>,
        tokens: TokenIssuer,
    ) -> Result<Self, AuthError> {
        let auth = AuthGate::new(users.clone(), hasher, tokens)?;
        Ok(Self {
            auth: Arc::new(auth),
            ledger: LedgerEngine::new(transactions, users),
        })
    }

    /// In-memory stores behind the configured deadline.
    pub fn in_memory(config: &AppConfig, hasher: Arc<dyn CredentialHasher>) -> anyhow::Result<Self> {
        let users = Arc::new(TimeoutUserStore::new(InMemoryUserStore::new(), config.store_timeout));
        let transactions = Arc::new(TimeoutTransactionStore::new(
            InMemoryTransactionStore::new(),
            config.store_timeout,
        ));
        Ok(Self::new(users, transactions, hasher, config.token_issuer()?)?)
    }

    /// Delete a user. A user who still owns transactions cannot be deleted,
    /// and no transaction can be recorded for them while the delete runs.
    pub async fn delete_user(&self, id: UserId) -> Result<(), ApiError> {
        let auth = self.auth.clone();
        self.ledger
            .remove_owner(id, move || async move { auth.delete_user(id).await.map_err(ApiError::from) })
            .await
    }
}

/// Build services from configuration.
///
/// With the `postgres` feature and `DATABASE_URL` set, stores are backed by
/// Postgres; otherwise everything lives in memory.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2Hasher::new());

    match config.database_url.as_deref() {
        #[cfg(feature = "postgres")]
        Some(url) => postgres_services(config, url, hasher).await,
        #[cfg(not(feature = "postgres"))]
        Some(_) => {
            tracing::warn!("DATABASE_URL is set but the postgres feature is disabled; using in-memory stores");
            AppServices::in_memory(config, hasher)
        }
        None => {
            tracing::info!("using in-memory stores");
            AppServices::in_memory(config, hasher)
        }
    }
}

#[cfg(feature = "postgres")]
async fn postgres_services(
    config: &AppConfig,
    url: &str,
    hasher: Arc<dyn CredentialHasher>,
) -> anyhow::Result<AppServices> {
    use fintrack_infra::postgres::{self, PostgresTransactionStore, PostgresUserStore};

    let pool = postgres::connect(url, 10).await?;
    postgres::ensure_schema(&pool).await?;
    tracing::info!("using postgres stores");

    let users = Arc::new(TimeoutUserStore::new(
        PostgresUserStore::new(pool.clone()),
        config.store_timeout,
    ));
    let transactions = Arc::new(TimeoutTransactionStore::new(
        PostgresTransactionStore::new(pool),
        config.store_timeout,
    ));
    Ok(AppServices::new(users, transactions, hasher, config.token_issuer()?)?)
}
