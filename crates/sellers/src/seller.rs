use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use salesdesk_core::{DomainError, DomainResult, SellerId};

/// A seller: generates sales and receives commission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seller {
    pub id: SellerId,
    pub name: String,
    /// Unique across the registry (compared case-insensitively).
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for registering a seller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSeller {
    name: String,
    email: String,
}

impl NewSeller {
    /// Validate and normalize registration input.
    ///
    /// Names and emails are trimmed; emails must look like addresses. The
    /// uniqueness check against the registry is the store's job.
    pub fn new(name: &str, email: &str) -> DomainResult<Self> {
        Ok(Self {
            name: validate_name(name)?,
            email: validate_email(email)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Materialize the seller with a fresh id and timestamps.
    pub fn into_seller(self, now: DateTime<Utc>) -> Seller {
        Seller {
            id: SellerId::new(),
            name: self.name,
            email: self.email,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update for a seller. Absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SellerPatch {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl SellerPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }

    /// Validate supplied fields and apply them to an existing seller.
    pub fn apply(self, seller: &mut Seller, now: DateTime<Utc>) -> DomainResult<()> {
        if let Some(name) = self.name {
            seller.name = validate_name(&name)?;
        }
        if let Some(email) = self.email {
            seller.email = validate_email(&email)?;
        }
        seller.updated_at = now;
        Ok(())
    }
}

fn validate_name(name: &str) -> DomainResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::validation("name", "name cannot be empty"));
    }
    Ok(name.to_string())
}

fn validate_email(email: &str) -> DomainResult<String> {
    let email = email.trim();
    if email.is_empty() {
        return Err(DomainError::validation("email", "email cannot be empty"));
    }
    // Minimal shape check; delivery problems surface at send time.
    let Some((local, domain)) = email.split_once('@') else {
        return Err(DomainError::validation("email", "email must contain '@'"));
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(DomainError::validation("email", "email is not a valid address"));
    }
    Ok(email.to_string())
}
