//! `fintrack-ledger`: monetary transactions and bank-statement derivation.
//!
//! Balances are never stored. Every statement is recomputed from the live set
//! of transactions returned by the [`TransactionStore`].

pub mod engine;
pub mod in_memory_store;
pub mod statement;
pub mod store;
pub mod transaction;

pub use engine::{LedgerEngine, LedgerError};
pub use in_memory_store::InMemoryTransactionStore;
pub use statement::{derive_statement, DateRange, Statement, StatementLine, StatementSummary};
pub use store::TransactionStore;
pub use transaction::{NewTransaction, Transaction, TransactionPatch};
