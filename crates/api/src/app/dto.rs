use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fintrack_auth::{IssuedToken, Registration, UserUpdate};
use fintrack_core::{Money, Pagination, UserId};
use fintrack_ledger::TransactionPatch;

use crate::app::errors::ApiError;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl From<RegisterRequest> for Registration {
    fn from(body: RegisterRequest) -> Self {
        Registration {
            username: body.username,
            email: body.email,
            password: body.password,
        }
    }
}

/// Login by `email` (or `username`) and password.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: String,
}

impl LoginRequest {
    pub fn identifier(&self) -> Result<&str, ApiError> {
        self.email
            .as_deref()
            .or(self.username.as_deref())
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ApiError::validation("email or username is required"))
    }
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl From<UpdateUserRequest> for UserUpdate {
    fn from(body: UpdateUserRequest) -> Self {
        UserUpdate {
            username: body.username,
            email: body.email,
            password: body.password,
        }
    }
}

/// Amounts are integer minor units; a JSON float is rejected.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateTransactionRequest {
    /// Optional; when present it must be the caller.
    #[serde(default, alias = "userId")]
    pub user_id: Option<UserId>,
    pub amount: Money,
    #[serde(alias = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateTransactionRequest {
    #[serde(default)]
    pub amount: Option<Money>,
    #[serde(default, alias = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl From<UpdateTransactionRequest> for TransactionPatch {
    fn from(body: UpdateTransactionRequest) -> Self {
        TransactionPatch {
            amount: body.amount,
            kind: body.kind,
            description: body.description,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl From<PageQuery> for Pagination {
    fn from(q: PageQuery) -> Self {
        Pagination::new(q.limit, q.offset)
    }
}

/// RFC 3339 bounds of a statement, `[from, to)`.
#[derive(Debug, Default, Deserialize)]
pub struct StatementQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub total: u64,
    pub result: Vec<T>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse<T> {
    pub message: &'static str,
    pub result: T,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl From<IssuedToken> for TokenResponse {
    fn from(issued: IssuedToken) -> Self {
        TokenResponse {
            token: issued.token,
            expires_at: issued.expires_at,
        }
    }
}

pub fn message(text: &'static str) -> serde_json::Value {
    serde_json::json!({ "message": text })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_amount_is_rejected() {
        let res: Result<CreateTransactionRequest, _> =
            serde_json::from_str(r#"{"amount": 12.5, "kind": "salary"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn accepts_legacy_field_names() {
        let body: CreateTransactionRequest = serde_json::from_str(
            r#"{"userId": "0191b2a6-6b0e-7c4e-9a53-2f1d2b3c4d5e", "amount": -2500, "type": "rent"}"#,
        )
        .unwrap();
        assert!(body.user_id.is_some());
        assert_eq!(body.amount, Money::from_minor(-2500));
        assert_eq!(body.kind, "rent");
    }

    #[test]
    fn owner_cannot_be_smuggled_into_an_update() {
        let res: Result<UpdateTransactionRequest, _> =
            serde_json::from_str(r#"{"user_id": "0191b2a6-6b0e-7c4e-9a53-2f1d2b3c4d5e"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn login_identifier_prefers_email() {
        let req = LoginRequest {
            email: Some("a@example.com".into()),
            username: Some("alice".into()),
            password: "pw".into(),
        };
        assert_eq!(req.identifier().unwrap(), "a@example.com");

        let req = LoginRequest {
            email: None,
            username: None,
            password: "pw".into(),
        };
        assert!(req.identifier().is_err());
    }
}
