use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fintrack_core::{stored_instant, DomainError, DomainResult, Entity, Money, TransactionId, UserId};

pub const KIND_MAX_LEN: usize = 64;
pub const DESCRIPTION_MAX_LEN: usize = 512;

/// A recorded monetary movement on a user's account.
///
/// # Invariants
/// - `amount` is non-zero; positive is a credit, negative a debit.
/// - `user_id` is fixed at creation.
/// - `kind` is trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub user_id: UserId,
    pub amount: Money,
    pub kind: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Transaction {
    type Id = TransactionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Input for recording a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub user_id: UserId,
    pub amount: Money,
    pub kind: String,
    pub description: Option<String>,
}

/// Replacement values for an existing transaction. `None` keeps the field.
///
/// There is deliberately no owner field: ownership cannot be reassigned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionPatch {
    pub amount: Option<Money>,
    pub kind: Option<String>,
    pub description: Option<String>,
}

impl TransactionPatch {
    pub fn is_empty(&self) -> bool {
        self.amount.is_none() && self.kind.is_none() && self.description.is_none()
    }
}

impl Transaction {
    /// Validate `new` and build the record with a fresh id.
    pub fn record(new: NewTransaction, now: DateTime<Utc>) -> DomainResult<Self> {
        let now = stored_instant(now);
        Ok(Self {
            id: TransactionId::new(),
            user_id: new.user_id,
            amount: validate_amount(new.amount)?,
            kind: normalize_kind(&new.kind)?,
            description: validate_description(new.description.unwrap_or_default())?,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a patch. Validation runs on every supplied field before anything
    /// is changed, so a rejected patch leaves the record untouched.
    pub fn apply(&mut self, patch: TransactionPatch, now: DateTime<Utc>) -> DomainResult<()> {
        if patch.is_empty() {
            return Err(DomainError::validation("no fields to update"));
        }

        let amount = patch.amount.map(validate_amount).transpose()?;
        let kind = patch.kind.as_deref().map(normalize_kind).transpose()?;
        let description = patch.description.map(validate_description).transpose()?;

        if let Some(amount) = amount {
            self.amount = amount;
        }
        if let Some(kind) = kind {
            self.kind = kind;
        }
        if let Some(description) = description {
            self.description = description;
        }
        self.updated_at = stored_instant(now);
        Ok(())
    }
}

fn validate_amount(amount: Money) -> DomainResult<Money> {
    if amount.is_zero() {
        return Err(DomainError::validation("amount must be non-zero"));
    }
    Ok(amount)
}

fn normalize_kind(raw: &str) -> DomainResult<String> {
    let kind = raw.trim();
    if kind.is_empty() {
        return Err(DomainError::validation("kind is required"));
    }
    if kind.chars().count() > KIND_MAX_LEN {
        return Err(DomainError::validation(format!(
            "kind must be at most {KIND_MAX_LEN} characters"
        )));
    }
    Ok(kind.to_string())
}

fn validate_description(description: String) -> DomainResult<String> {
    if description.chars().count() > DESCRIPTION_MAX_LEN {
        return Err(DomainError::validation(format!(
            "description must be at most {DESCRIPTION_MAX_LEN} characters"
        )));
    }
    Ok(description)
}
