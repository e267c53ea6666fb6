use std::collections::HashMap;
use std::sync::RwLock;

use fintrack_core::{StoreError, UserId};

use crate::{User, UserStore};

/// In-memory credential store.
///
/// Intended for tests/dev. Uniqueness of username and email is checked under
/// the same write lock as the insert/update, so concurrent registrations cannot
/// both succeed.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> StoreError {
        StoreError::internal("lock poisoned")
    }

    fn ensure_unique(users: &HashMap<UserId, User>, candidate: &User) -> Result<(), StoreError> {
        for existing in users.values().filter(|u| u.id != candidate.id) {
            if existing.username == candidate.username {
                return Err(StoreError::Conflict("username".to_string()));
            }
            if existing.email == candidate.email {
                return Err(StoreError::Conflict("email".to_string()));
            }
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: User) -> Result<(), StoreError> {
        let mut users = self.users.write().map_err(|_| Self::poisoned())?;
        if users.contains_key(&user.id) {
            return Err(StoreError::Conflict("id".to_string()));
        }
        Self::ensure_unique(&users, &user)?;
        users.insert(user.id, user);
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let users = self.users.read().map_err(|_| Self::poisoned())?;
        Ok(users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().map_err(|_| Self::poisoned())?;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().map_err(|_| Self::poisoned())?;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let users = self.users.read().map_err(|_| Self::poisoned())?;
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn update(&self, user: User) -> Result<bool, StoreError> {
        let mut users = self.users.write().map_err(|_| Self::poisoned())?;
        if !users.contains_key(&user.id) {
            return Ok(false);
        }
        Self::ensure_unique(&users, &user)?;
        users.insert(user.id, user);
        Ok(true)
    }

    async fn delete(&self, id: UserId) -> Result<bool, StoreError> {
        let mut users = self.users.write().map_err(|_| Self::poisoned())?;
        Ok(users.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(username: &str, email: &str) -> User {
        let now = Utc::now();
        User {
            id: UserId::new(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn duplicate_username_or_email_is_a_conflict() {
        let store = InMemoryUserStore::new();
        store.insert(user("alice", "alice@example.com")).await.unwrap();

        let err = store.insert(user("alice", "other@example.com")).await.unwrap_err();
        assert_eq!(err, StoreError::Conflict("username".into()));

        let err = store.insert(user("alice2", "alice@example.com")).await.unwrap_err();
        assert_eq!(err, StoreError::Conflict("email".into()));

        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_cannot_steal_another_users_email() {
        let store = InMemoryUserStore::new();
        let alice = user("alice", "alice@example.com");
        let mut bob = user("bob", "bob@example.com");
        store.insert(alice).await.unwrap();
        store.insert(bob.clone()).await.unwrap();

        bob.email = "alice@example.com".into();
        assert!(matches!(store.update(bob).await, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_rows() {
        let store = InMemoryUserStore::new();
        let ghost = user("ghost", "ghost@example.com");
        assert!(!store.update(ghost.clone()).await.unwrap());
        assert!(!store.delete(ghost.id).await.unwrap());

        store.insert(ghost.clone()).await.unwrap();
        assert!(store.delete(ghost.id).await.unwrap());
        assert!(store.find_by_id(ghost.id).await.unwrap().is_none());
    }
}
