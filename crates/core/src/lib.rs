//! `fintrack-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the fixed-precision `Money` type, pagination, and the error
//! taxonomy shared by every layer.

pub mod error;
pub mod id;
pub mod model;
pub mod money;
pub mod page;
pub mod time;

pub use error::{DomainError, DomainResult, ErrorKind, StoreError};
pub use id::{TransactionId, UserId};
pub use model::{Entity, ValueObject};
pub use money::Money;
pub use page::Pagination;
pub use time::stored_instant;
