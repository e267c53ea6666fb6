//! Ownership policy.
//!
//! A caller may only read or mutate resources whose owner is the caller.
//! No IO, no panics.

use thiserror::Error;

use fintrack_core::{ErrorKind, UserId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: resource belongs to another user")]
    NotOwner,
}

impl AuthzError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Forbidden
    }
}

/// Authorize `caller` against a resource owned by `owner`.
pub fn ensure_owner(caller: UserId, owner: UserId) -> Result<(), AuthzError> {
    if caller == owner {
        Ok(())
    } else {
        Err(AuthzError::NotOwner)
    }
}
