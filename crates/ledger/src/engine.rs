//! Ledger engine: transaction CRUD plus statement derivation over the stores.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::RwLock;

use fintrack_auth::UserStore;
use fintrack_core::{DomainError, ErrorKind, Pagination, StoreError, TransactionId, UserId};

use crate::statement::{derive_statement, DateRange, Statement};
use crate::{NewTransaction, Transaction, TransactionPatch, TransactionStore};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::Domain(e) => e.kind(),
            LedgerError::Store(e) => e.kind(),
        }
    }
}

/// Enforces transaction invariants and derives statements.
///
/// Holds no balance state; whoever calls it has already bound the request to
/// an authenticated identity.
#[derive(Clone)]
pub struct LedgerEngine {
    transactions: Arc<dyn TransactionStore>,
    users: Arc<dyn UserStore>,
    /// Creates hold it shared; owner removal holds it exclusively.
    owners: Arc<RwLock<()>>,
}

impl LedgerEngine {
    pub fn new(transactions: Arc<dyn TransactionStore>, users: Arc<dyn UserStore>) -> Self {
        Self {
            transactions,
            users,
            owners: Arc::new(RwLock::new(())),
        }
    }

    /// Record a transaction for an existing user.
    pub async fn create(&self, new: NewTransaction, now: DateTime<Utc>) -> Result<Transaction, LedgerError> {
        let _owners = self.owners.read().await;
        if self.users.find_by_id(new.user_id).await?.is_none() {
            return Err(DomainError::not_found().into());
        }

        let transaction = Transaction::record(new, now)?;
        self.transactions.insert(transaction.clone()).await?;

        tracing::info!(
            transaction_id = %transaction.id,
            user_id = %transaction.user_id,
            amount = transaction.amount.minor_units(),
            "transaction recorded"
        );
        Ok(transaction)
    }

    pub async fn get(&self, id: TransactionId) -> Result<Transaction, LedgerError> {
        self.transactions
            .find(id)
            .await?
            .ok_or_else(|| DomainError::not_found().into())
    }

    /// One page of a user's transactions (oldest first) plus the total count.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
        page: Pagination,
    ) -> Result<(u64, Vec<Transaction>), LedgerError> {
        let total = self.transactions.count_by_user(user_id).await?;
        let result = self.transactions.page_by_user(user_id, page).await?;
        Ok((total, result))
    }

    pub async fn update(
        &self,
        id: TransactionId,
        patch: TransactionPatch,
        now: DateTime<Utc>,
    ) -> Result<Transaction, LedgerError> {
        let mut transaction = self.get(id).await?;
        transaction.apply(patch, now)?;

        if !self.transactions.update(transaction.clone()).await? {
            return Err(DomainError::not_found().into());
        }

        tracing::info!(transaction_id = %id, "transaction updated");
        Ok(transaction)
    }

    pub async fn delete(&self, id: TransactionId) -> Result<(), LedgerError> {
        if !self.transactions.delete(id).await? {
            return Err(DomainError::not_found().into());
        }
        tracing::info!(transaction_id = %id, "transaction deleted");
        Ok(())
    }

    /// Statement of `user_id` over `range`, computed from the live set.
    pub async fn statement(&self, user_id: UserId, range: DateRange) -> Result<Statement, LedgerError> {
        let transactions = self.transactions.list_by_user(user_id).await?;
        Ok(derive_statement(user_id, &transactions, range)?)
    }

    pub async fn has_transactions(&self, user_id: UserId) -> Result<bool, LedgerError> {
        Ok(self.transactions.count_by_user(user_id).await? > 0)
    }

    /// Run `remove` for a user who owns no transactions, with transaction
    /// creation paused until it finishes. Owners with transactions are a
    /// `Conflict` and `remove` is not called.
    pub async fn remove_owner<F, Fut, T, E>(&self, user_id: UserId, remove: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<LedgerError>,
    {
        let _owners = self.owners.write().await;
        if self.has_transactions(user_id).await? {
            return Err(LedgerError::from(DomainError::conflict("user still owns transactions")).into());
        }
        remove().await
    }
}
