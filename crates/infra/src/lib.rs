//! Infrastructure layer: store decorators and database adapters.

pub mod timeout;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use timeout::{TimeoutTransactionStore, TimeoutUserStore};

#[cfg(feature = "postgres")]
pub use postgres::{PostgresTransactionStore, PostgresUserStore};
