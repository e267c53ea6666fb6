//! `fintrack-auth`: credentials, password hashing, and bearer tokens.
//!
//! Decoupled from HTTP. Storage is reached only through [`UserStore`].

pub mod authorize;
pub mod claims;
pub mod gate;
pub mod hasher;
pub mod in_memory_store;
pub mod store;
pub mod token;
pub mod user;

pub use authorize::{ensure_owner, AuthzError};
pub use claims::{validate_claims, Claims, TokenValidationError};
pub use gate::{AuthError, AuthGate};
pub use hasher::{Argon2Hasher, CredentialHasher, HashError};
pub use in_memory_store::InMemoryUserStore;
pub use store::UserStore;
pub use token::{IssuedToken, SigningSecret, TokenError, TokenIssuer, TokenState, DEFAULT_TOKEN_TTL_HOURS, MAX_TOKEN_TTL_HOURS};
pub use user::{Registration, User, UserProfile, UserUpdate};
