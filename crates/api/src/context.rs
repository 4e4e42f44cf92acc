use salesdesk_auth::{AuthClaims, Role};
use salesdesk_core::UserId;

/// Authenticated caller identity for a request.
///
/// Inserted by the auth middleware; must be present for all protected
/// routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    claims: AuthClaims,
    token: String,
}

impl CallerContext {
    pub fn new(claims: AuthClaims, token: String) -> Self {
        Self { claims, token }
    }

    pub fn user_id(&self) -> UserId {
        self.claims.sub
    }

    pub fn name(&self) -> &str {
        &self.claims.name
    }

    pub fn email(&self) -> &str {
        &self.claims.email
    }

    pub fn role(&self) -> Role {
        self.claims.role
    }

    /// The raw bearer token presented on this request (revoked on logout).
    pub fn token(&self) -> &str {
        &self.token
    }
}
