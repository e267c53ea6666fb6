//! API-side ownership guard.
//!
//! The token proves who the caller is; this decides whether that identity may
//! touch a resource owned by someone else (it may not).

use fintrack_core::UserId;

use crate::app::errors::ApiError;
use crate::context::AuthenticatedUser;

/// Fail with `Forbidden` unless `caller` owns the resource.
pub fn ensure_owner(caller: &AuthenticatedUser, owner: UserId) -> Result<(), ApiError> {
    fintrack_auth::ensure_owner(caller.user_id(), owner).map_err(|e| {
        tracing::info!(caller = %caller.user_id(), owner = %owner, "ownership check failed");
        ApiError::new(e.kind(), e.to_string())
    })
}
