//! Bank-statement derivation.
//!
//! A statement is a pure function of a user's live transaction set: the same
//! input always yields the same output, and nothing is cached between calls.

use chrono::{DateTime, Utc};
use serde::Serialize;

use fintrack_core::{DomainError, DomainResult, Money, UserId};

use crate::Transaction;

/// Half-open creation-time window `[from, to)`. Either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> DomainResult<Self> {
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(DomainError::validation("`from` must not be after `to`"));
            }
        }
        Ok(Self { from, to })
    }

    pub fn all() -> Self {
        Self::default()
    }

    fn is_before(&self, at: DateTime<Utc>) -> bool {
        self.from.is_some_and(|from| at < from)
    }

    fn contains(&self, at: DateTime<Utc>) -> bool {
        !self.is_before(at) && self.to.is_none_or(|to| at < to)
    }
}

/// One statement line: the transaction and the balance right after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementLine {
    pub transaction: Transaction,
    pub balance_after: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatementSummary {
    pub opening_balance: Money,
    pub closing_balance: Money,
    /// Sum of positive amounts in range.
    pub total_credits: Money,
    /// Sum of the magnitudes of negative amounts in range.
    pub total_debits: Money,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statement {
    pub user_id: UserId,
    pub range: DateRange,
    pub lines: Vec<StatementLine>,
    pub summary: StatementSummary,
}

impl Statement {
    pub fn final_balance(&self) -> Money {
        self.summary.closing_balance
    }
}

/// Derive the statement of `user_id` from `transactions`.
///
/// Entries belonging to other users are ignored. Lines are ordered by
/// `created_at`, ties broken by id. Entries before `range.from` are folded into
/// the opening balance so running balances match the unranged statement.
pub fn derive_statement(
    user_id: UserId,
    transactions: &[Transaction],
    range: DateRange,
) -> DomainResult<Statement> {
    let mut owned: Vec<&Transaction> = transactions.iter().filter(|t| t.user_id == user_id).collect();
    owned.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

    let opening_balance = Money::checked_sum(
        owned
            .iter()
            .filter(|t| range.is_before(t.created_at))
            .map(|t| t.amount),
    )?;

    let mut balance = opening_balance;
    let mut total_credits = Money::ZERO;
    let mut total_debits = Money::ZERO;
    let mut lines = Vec::new();

    for tx in owned.into_iter().filter(|t| range.contains(t.created_at)) {
        balance = balance.checked_add(tx.amount)?;
        if tx.amount.is_credit() {
            total_credits = total_credits.checked_add(tx.amount)?;
        } else {
            total_debits = total_debits.checked_add(tx.amount.checked_abs()?)?;
        }
        lines.push(StatementLine {
            transaction: tx.clone(),
            balance_after: balance,
        });
    }

    Ok(Statement {
        user_id,
        range,
        summary: StatementSummary {
            opening_balance,
            closing_balance: balance,
            total_credits,
            total_debits,
            transaction_count: lines.len(),
        },
        lines,
    })
}
