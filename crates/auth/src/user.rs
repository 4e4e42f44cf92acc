use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use salesdesk_core::UserId;

use crate::Role;

/// An account known to the credential directory.
///
/// Accounts are not part of the persisted sales schema; the directory that
/// owns them is the black-box credential issuer behind the API boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    /// Salted hash, see [`crate::password`]. Never serialized to API output.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    pub fn new(name: String, email: String, role: Role, password_hash: String) -> Self {
        Self {
            id: UserId::new(),
            name,
            email,
            role,
            password_hash,
            created_at: Utc::now(),
        }
    }
}
