use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role tag carried by an identity. There is no authorization beyond it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Rector,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Rector => "rector",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "rector" => Ok(Role::Rector),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// The authenticated principal of the current session.
///
/// Persisted as-is under the `user` key. Never carries a secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: String,

    /// Display name.
    pub name: String,

    /// Login key.
    pub email: String,

    pub role: Role,

    /// Hostel affiliation; rectors have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostel_id: Option<String>,
}

impl Identity {
    pub fn is_rector(&self) -> bool {
        self.role == Role::Rector
    }
}
