//! Transaction store port.

use std::sync::Arc;

use fintrack_core::{Pagination, StoreError, TransactionId, UserId};

use crate::Transaction;

/// Persistence interface for transactions.
///
/// Each call is atomic on its own; callers assume nothing across calls.
#[async_trait::async_trait]
pub trait TransactionStore: Send + Sync {
    async fn insert(&self, transaction: Transaction) -> Result<(), StoreError>;

    async fn find(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError>;

    /// All transactions of `user_id`, ordered by `created_at` then `id`.
    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Transaction>, StoreError>;

    /// One window of [`TransactionStore::list_by_user`], applied by the store.
    async fn page_by_user(&self, user_id: UserId, page: Pagination) -> Result<Vec<Transaction>, StoreError>;

    async fn count_by_user(&self, user_id: UserId) -> Result<u64, StoreError>;

    /// Replace an existing record. `Ok(false)` when no record has that id.
    async fn update(&self, transaction: Transaction) -> Result<bool, StoreError>;

    /// `Ok(false)` when no record has that id.
    async fn delete(&self, id: TransactionId) -> Result<bool, StoreError>;
}

#[async_trait::async_trait]
impl<S> TransactionStore for Arc<S>
where
    S: TransactionStore + ?Sized,
{
    async fn insert(&self, transaction: Transaction) -> Result<(), StoreError> {
        (**self).insert(transaction).await
    }

    async fn find(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError> {
        (**self).find(id).await
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Transaction>, StoreError> {
        (**self).list_by_user(user_id).await
    }

    async fn page_by_user(&self, user_id: UserId, page: Pagination) -> Result<Vec<Transaction>, StoreError> {
        (**self).page_by_user(user_id, page).await
    }

    async fn count_by_user(&self, user_id: UserId) -> Result<u64, StoreError> {
        (**self).count_by_user(user_id).await
    }

    async fn update(&self, transaction: Transaction) -> Result<bool, StoreError> {
        (**self).update(transaction).await
    }

    async fn delete(&self, id: TransactionId) -> Result<bool, StoreError> {
        (**self).delete(id).await
    }
}
