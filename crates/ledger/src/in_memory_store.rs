use std::collections::HashMap;
use std::sync::RwLock;

use fintrack_core::{Pagination, StoreError, TransactionId, UserId};

use crate::{Transaction, TransactionStore};

/// In-memory transaction store (tests/dev).
#[derive(Debug, Default)]
pub struct InMemoryTransactionStore {
    transactions: RwLock<HashMap<TransactionId, Transaction>>,
}

impl InMemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> StoreError {
        StoreError::internal("lock poisoned")
    }
}

#[async_trait::async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn insert(&self, transaction: Transaction) -> Result<(), StoreError> {
        let mut map = self.transactions.write().map_err(|_| Self::poisoned())?;
        if map.contains_key(&transaction.id) {
            return Err(StoreError::Conflict("id".to_string()));
        }
        map.insert(transaction.id, transaction);
        Ok(())
    }

    async fn find(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError> {
        let map = self.transactions.read().map_err(|_| Self::poisoned())?;
        Ok(map.get(&id).cloned())
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Transaction>, StoreError> {
        let map = self.transactions.read().map_err(|_| Self::poisoned())?;
        let mut out: Vec<Transaction> = map
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(out)
    }

    async fn page_by_user(&self, user_id: UserId, page: Pagination) -> Result<Vec<Transaction>, StoreError> {
        Ok(page.apply(&self.list_by_user(user_id).await?))
    }

    async fn count_by_user(&self, user_id: UserId) -> Result<u64, StoreError> {
        let map = self.transactions.read().map_err(|_| Self::poisoned())?;
        Ok(map.values().filter(|t| t.user_id == user_id).count() as u64)
    }

    async fn update(&self, transaction: Transaction) -> Result<bool, StoreError> {
        let mut map = self.transactions.write().map_err(|_| Self::poisoned())?;
        match map.get_mut(&transaction.id) {
            Some(slot) => {
                *slot = transaction;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: TransactionId) -> Result<bool, StoreError> {
        let mut map = self.transactions.write().map_err(|_| Self::poisoned())?;
        Ok(map.remove(&id).is_some())
    }
}
