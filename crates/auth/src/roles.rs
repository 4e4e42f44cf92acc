use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role granted to an authenticated user.
///
/// Managers receive the aggregate daily sales report and may trigger the
/// daily report batch; sellers only operate the CRUD surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Manager,
    Seller,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Manager => "manager",
            Role::Seller => "seller",
        }
    }

    pub fn is_manager(&self) -> bool {
        matches!(self, Role::Manager)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "manager" => Ok(Role::Manager),
            "seller" => Ok(Role::Seller),
            other => Err(format!("unknown role: {other}")),
        }
    }
}
