//! Authentication gate: registration, login, token validation, and the user
//! profile operations that must go through the same hashing/uniqueness rules.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use fintrack_core::{stored_instant, DomainError, ErrorKind, StoreError, UserId};

use crate::hasher::{CredentialHasher, HashError};
use crate::token::{IssuedToken, TokenError, TokenIssuer};
use crate::user::{normalize_email, normalize_username, validate_password};
use crate::{Registration, User, UserStore, UserUpdate};

/// Authentication gate error.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown account or wrong password (deliberately indistinguishable).
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Hash(#[from] HashError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("hashing task failed: {0}")]
    Join(String),
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidCredentials => ErrorKind::InvalidCredentials,
            AuthError::Domain(e) => e.kind(),
            AuthError::Store(e) => e.kind(),
            AuthError::Hash(_) | AuthError::Token(_) | AuthError::Join(_) => ErrorKind::Internal,
        }
    }
}

/// Verifies credentials, issues tokens, and validates presented tokens.
///
/// Everything it needs is injected: the credential store, the hasher, and the
/// token issuer (which owns the process-wide signing secret).
#[derive(Clone)]
pub struct AuthGate {
    users: Arc<dyn UserStore>,
    hasher: Arc<dyn CredentialHasher>,
    tokens: TokenIssuer,
    /// Hash verified against when the account does not exist, so both login
    /// failure paths cost one hash verification.
    decoy_hash: Arc<str>,
}

impl AuthGate {
    pub fn new(
        users: Arc<dyn UserStore>,
        hasher: Arc<dyn CredentialHasher>,
        tokens: TokenIssuer,
    ) -> Result<Self, AuthError> {
        let decoy_hash = hasher.hash(&uuid::Uuid::now_v7().to_string())?;
        Ok(Self {
            users,
            hasher,
            tokens,
            decoy_hash: decoy_hash.into(),
        })
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Register a new user. The returned record carries the hash, never the
    /// cleartext password.
    pub async fn register(&self, registration: Registration, now: DateTime<Utc>) -> Result<User, AuthError> {
        let username = normalize_username(&registration.username)?;
        let email = normalize_email(&registration.email)?;
        validate_password(&registration.password)?;

        if self.users.find_by_username(&username).await?.is_some() {
            return Err(DomainError::conflict("username already taken").into());
        }
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(DomainError::conflict("email already registered").into());
        }

        let password_hash = self.hash_blocking(registration.password).await?;
        let now = stored_instant(now);
        let user = User {
            id: UserId::new(),
            username,
            email,
            password_hash,
            created_at: now,
            updated_at: now,
        };

        // The store re-checks uniqueness atomically; a concurrent registration
        // that slipped past the lookups above surfaces here as a conflict.
        self.users.insert(user.clone()).await.map_err(unique_conflict)?;

        tracing::info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Authenticate by email (or username) and password and issue a token.
    pub async fn login(&self, identifier: &str, password: &str, now: DateTime<Utc>) -> Result<IssuedToken, AuthError> {
        let identifier = identifier.trim();
        let user = if identifier.contains('@') {
            self.users.find_by_email(&identifier.to_lowercase()).await?
        } else {
            self.users.find_by_username(identifier).await?
        };

        let (encoded, subject) = match &user {
            Some(u) => (u.password_hash.clone(), Some(u.id)),
            None => (self.decoy_hash.to_string(), None),
        };
        let matches = self.verify_blocking(password.to_string(), encoded).await?;

        let Some(subject) = subject.filter(|_| matches) else {
            tracing::info!("login rejected");
            return Err(AuthError::InvalidCredentials);
        };

        let issued = self.tokens.issue(subject, now)?;
        tracing::info!(user_id = %subject, expires_at = %issued.expires_at, "token issued");
        Ok(issued)
    }

    /// Subject of a valid token, `None` otherwise. Pure apart from the secret.
    pub fn validate_token(&self, token: &str, now: DateTime<Utc>) -> Option<UserId> {
        self.tokens.validate(token, now)
    }

    pub async fn user(&self, id: UserId) -> Result<User, AuthError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found().into())
    }

    pub async fn user_by_email(&self, email: &str) -> Result<User, AuthError> {
        let email = email.trim().to_lowercase();
        self.users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| DomainError::not_found().into())
    }

    pub async fn users(&self) -> Result<Vec<User>, AuthError> {
        Ok(self.users.list().await?)
    }

    /// Apply a profile update. A changed password is re-hashed before it is
    /// persisted; changed username/email are re-checked for uniqueness.
    pub async fn update_user(&self, id: UserId, update: UserUpdate, now: DateTime<Utc>) -> Result<User, AuthError> {
        if update.is_empty() {
            return Err(DomainError::validation("no fields to update").into());
        }

        let mut user = self.user(id).await?;

        if let Some(raw) = &update.username {
            let username = normalize_username(raw)?;
            if username != user.username {
                if let Some(other) = self.users.find_by_username(&username).await? {
                    if other.id != id {
                        return Err(DomainError::conflict("username already taken").into());
                    }
                }
                user.username = username;
            }
        }

        if let Some(raw) = &update.email {
            let email = normalize_email(raw)?;
            if email != user.email {
                if let Some(other) = self.users.find_by_email(&email).await? {
                    if other.id != id {
                        return Err(DomainError::conflict("email already registered").into());
                    }
                }
                user.email = email;
            }
        }

        if let Some(password) = update.password {
            validate_password(&password)?;
            user.password_hash = self.hash_blocking(password).await?;
        }

        user.updated_at = stored_instant(now);
        if !self.users.update(user.clone()).await.map_err(unique_conflict)? {
            return Err(DomainError::not_found().into());
        }

        tracing::info!(user_id = %id, "user updated");
        Ok(user)
    }

    pub async fn delete_user(&self, id: UserId) -> Result<(), AuthError> {
        if !self.users.delete(id).await? {
            return Err(DomainError::not_found().into());
        }
        tracing::info!(user_id = %id, "user deleted");
        Ok(())
    }

    async fn hash_blocking(&self, password: String) -> Result<String, AuthError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Join(e.to_string()))?
            .map_err(AuthError::from)
    }

    async fn verify_blocking(&self, password: String, encoded: String) -> Result<bool, AuthError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &encoded))
            .await
            .map_err(|e| AuthError::Join(e.to_string()))
    }
}

fn unique_conflict(e: StoreError) -> AuthError {
    match e {
        StoreError::Conflict(field) => DomainError::conflict(format!("{field} already in use")).into(),
        other => other.into(),
    }
}
