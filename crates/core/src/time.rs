//! Timestamp precision shared by every store.

use chrono::{DateTime, SubsecRound, Utc};

/// Stores keep microseconds (Postgres `TIMESTAMPTZ`). Records are stamped at
/// that precision so what a write returns equals what a later read returns.
pub fn stored_instant(at: DateTime<Utc>) -> DateTime<Utc> {
    at.trunc_subsecs(6)
}
