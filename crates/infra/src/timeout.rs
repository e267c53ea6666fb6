//! Deadline decorators for store adapters.
//!
//! Every call is bounded by a fixed duration; a call that exceeds it surfaces
//! as `StoreError::Unavailable` instead of hanging the request. The inner
//! future is dropped on timeout, which cancels it at its next await point.

use std::future::Future;
use std::time::Duration;

use fintrack_auth::{User, UserStore};
use fintrack_core::{Pagination, StoreError, TransactionId, UserId};
use fintrack_ledger::{Transaction, TransactionStore};

async fn bounded<T, F>(operation: &'static str, deadline: Duration, fut: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => {
            if let Err(e) = &result {
                tracing::warn!(operation, error = %e, "store call failed");
            }
            result
        }
        Err(_) => {
            tracing::warn!(operation, deadline_ms = deadline.as_millis() as u64, "store call timed out");
            Err(StoreError::unavailable(format!("{operation} timed out")))
        }
    }
}

/// [`UserStore`] wrapper with a per-call deadline.
#[derive(Debug)]
pub struct TimeoutUserStore<S> {
    inner: S,
    deadline: Duration,
}

impl<S> TimeoutUserStore<S> {
    pub fn new(inner: S, deadline: Duration) -> Self {
        Self { inner, deadline }
    }
}

#[async_trait::async_trait]
impl<S: UserStore> UserStore for TimeoutUserStore<S> {
    async fn insert(&self, user: User) -> Result<(), StoreError> {
        bounded("users.insert", self.deadline, self.inner.insert(user)).await
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        bounded("users.find_by_id", self.deadline, self.inner.find_by_id(id)).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        bounded("users.find_by_email", self.deadline, self.inner.find_by_email(email)).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        bounded("users.find_by_username", self.deadline, self.inner.find_by_username(username)).await
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        bounded("users.list", self.deadline, self.inner.list()).await
    }

    async fn update(&self, user: User) -> Result<bool, StoreError> {
        bounded("users.update", self.deadline, self.inner.update(user)).await
    }

    async fn delete(&self, id: UserId) -> Result<bool, StoreError> {
        bounded("users.delete", self.deadline, self.inner.delete(id)).await
    }
}

/// [`TransactionStore`] wrapper with a per-call deadline.
#[derive(Debug)]
pub struct TimeoutTransactionStore<S> {
    inner: S,
    deadline: Duration,
}

impl<S> TimeoutTransactionStore<S> {
    pub fn new(inner: S, deadline: Duration) -> Self {
        Self { inner, deadline }
    }
}

#[async_trait::async_trait]
impl<S: TransactionStore> TransactionStore for TimeoutTransactionStore<S> {
    async fn insert(&self, transaction: Transaction) -> Result<(), StoreError> {
        bounded("transactions.insert", self.deadline, self.inner.insert(transaction)).await
    }

    async fn find(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError> {
        bounded("transactions.find", self.deadline, self.inner.find(id)).await
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Transaction>, StoreError> {
        bounded("transactions.list_by_user", self.deadline, self.inner.list_by_user(user_id)).await
    }

    async fn page_by_user(&self, user_id: UserId, page: Pagination) -> Result<Vec<Transaction>, StoreError> {
        bounded("transactions.page_by_user", self.deadline, self.inner.page_by_user(user_id, page)).await
    }

    async fn count_by_user(&self, user_id: UserId) -> Result<u64, StoreError> {
        bounded("transactions.count_by_user", self.deadline, self.inner.count_by_user(user_id)).await
    }

    async fn update(&self, transaction: Transaction) -> Result<bool, StoreError> {
        bounded("transactions.update", self.deadline, self.inner.update(transaction)).await
    }

    async fn delete(&self, id: TransactionId) -> Result<bool, StoreError> {
        bounded("transactions.delete", self.deadline, self.inner.delete(id)).await
    }
}
