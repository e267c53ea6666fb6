//! Bearer token issuance and validation (HS256 JWT).
//!
//! Tokens are stateless: validity is a pure function of the signature, the
//! signing secret, and the current time. There is no revocation list.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use fintrack_core::UserId;

use crate::claims::{validate_claims, Claims, TokenValidationError};

/// Lifetime of a freshly issued token, in hours.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 12;

/// Upper bound on a configurable lifetime (one year).
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 366;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("signing secret must not be empty")]
    EmptySecret,

    #[error("token ttl must be positive and at most one year")]
    InvalidTtl,

    #[error("token encoding failed: {0}")]
    Encode(String),
}

/// Process-wide HMAC signing secret. Loaded once at startup.
#[derive(Clone)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, TokenError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(TokenError::EmptySecret);
        }
        Ok(Self(bytes))
    }
}

impl core::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SigningSecret(<redacted>)")
    }
}

/// A token as handed back to a client after login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub subject: UserId,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Observable state of a presented token at a given instant.
///
/// `Issued → Valid → Expired` is the only progression; anything that fails
/// signature or structural checks is `Invalid` at every instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenState {
    Valid(Claims),
    Expired,
    Invalid(&'static str),
}

/// Signs and verifies bearer tokens with a single HS256 secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &SigningSecret) -> Self {
        Self::build(secret, Duration::hours(DEFAULT_TOKEN_TTL_HOURS))
    }

    pub fn with_ttl(secret: &SigningSecret, ttl: Duration) -> Result<Self, TokenError> {
        if ttl <= Duration::zero() || ttl > Duration::hours(MAX_TOKEN_TTL_HOURS) {
            return Err(TokenError::InvalidTtl);
        }
        Ok(Self::build(secret, ttl))
    }

    fn build(secret: &SigningSecret, ttl: Duration) -> Self {
        // Time checks are done by `validate_claims` against an explicit `now`,
        // so the library's wall-clock expiry check (and its leeway) is disabled.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(&secret.0),
            decoding: DecodingKey::from_secret(&secret.0),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a fresh token for `subject`.
    ///
    /// The token expires exactly `ttl` after `now`, sub-second part included;
    /// `iat` is `now` truncated to whole seconds.
    pub fn issue(&self, subject: UserId, now: DateTime<Utc>) -> Result<IssuedToken, TokenError> {
        let expiry = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| TokenError::Encode("expiry out of range".to_string()))?;
        let claims = Claims {
            sub: subject,
            iat: now.timestamp(),
            exp: expiry.timestamp(),
            exp_nanos: expiry.timestamp_subsec_nanos(),
            jti: Uuid::now_v7(),
        };

        let (Some(issued_at), Some(expires_at)) = (claims.issued_at(), claims.expires_at()) else {
            return Err(TokenError::Encode("timestamp out of range".to_string()));
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Encode(e.to_string()))?;

        Ok(IssuedToken {
            token,
            subject,
            issued_at,
            expires_at,
        })
    }

    /// Classify a presented token at `now`.
    pub fn inspect(&self, token: &str, now: DateTime<Utc>) -> TokenState {
        let data = match jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation) {
            Ok(data) => data,
            Err(e) => {
                tracing::debug!(error = %e, "token rejected");
                return TokenState::Invalid("signature or structure");
            }
        };

        match validate_claims(&data.claims, now) {
            Ok(()) => TokenState::Valid(data.claims),
            Err(TokenValidationError::Expired) => TokenState::Expired,
            Err(TokenValidationError::NotYetValid) => TokenState::Invalid("not yet valid"),
            Err(TokenValidationError::InvalidTimeWindow) => TokenState::Invalid("time window"),
        }
    }

    /// Subject of a valid token, or `None` for any failure.
    pub fn validate(&self, token: &str, now: DateTime<Utc>) -> Option<UserId> {
        match self.inspect(token, now) {
            TokenState::Valid(claims) => Some(claims.sub),
            TokenState::Expired | TokenState::Invalid(_) => None,
        }
    }
}
