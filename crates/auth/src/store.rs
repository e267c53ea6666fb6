//! Credential store port.

use std::sync::Arc;

use fintrack_core::{StoreError, UserId};

use crate::User;

/// Persistence interface for user records.
///
/// Implementations must make each call atomic on its own and must reject a
/// write that would duplicate a username or email with `StoreError::Conflict`.
/// No cross-call transactional guarantee is assumed.
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: User) -> Result<(), StoreError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Lookup by normalized (lower-cased) email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// All users, oldest first.
    async fn list(&self) -> Result<Vec<User>, StoreError>;

    /// Replace a stored user. Returns `false` if no user has this id.
    async fn update(&self, user: User) -> Result<bool, StoreError>;

    /// Returns `false` if no user has this id.
    async fn delete(&self, id: UserId) -> Result<bool, StoreError>;
}

#[async_trait::async_trait]
impl<S> UserStore for Arc<S>
where
    S: UserStore + ?Sized,
{
    async fn insert(&self, user: User) -> Result<(), StoreError> {
        (**self).insert(user).await
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        (**self).find_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        (**self).find_by_email(email).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        (**self).find_by_username(username).await
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        (**self).list().await
    }

    async fn update(&self, user: User) -> Result<bool, StoreError> {
        (**self).update(user).await
    }

    async fn delete(&self, id: UserId) -> Result<bool, StoreError> {
        (**self).delete(id).await
    }
}
