//! `salesdesk-auth` — authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it models
//! roles, token claims, and password hashing. Where tokens are stored and
//! which users exist is the credential directory's concern (infra).

pub mod claims;
pub mod password;
pub mod roles;
pub mod token;
pub mod user;

pub use claims::{validate_claims, AuthClaims, TokenValidationError};
pub use password::{hash_password, verify_password};
pub use roles::Role;
pub use token::{Hs256TokenCodec, TokenError, TokenVerifier};
pub use user::UserAccount;
