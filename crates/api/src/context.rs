use fintrack_core::UserId;

/// Authenticated identity for a request.
///
/// Inserted by the auth middleware from a validated bearer token; handlers
/// behind that middleware can rely on it being present.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    user_id: UserId,
}

impl AuthenticatedUser {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }
}
