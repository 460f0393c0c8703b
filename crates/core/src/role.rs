//! Roles and users.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// The closed set of organisational roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Finance,
    Marketing,
    Hr,
    Engineering,
    Ceo,
    Employee,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Finance,
        Role::Marketing,
        Role::Hr,
        Role::Engineering,
        Role::Ceo,
        Role::Employee,
    ];

    /// The wire name (`"finance"`, `"hr"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Finance => "finance",
            Role::Marketing => "marketing",
            Role::Hr => "hr",
            Role::Engineering => "engineering",
            Role::Ceo => "ceo",
            Role::Employee => "employee",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// An authenticated principal.
///
/// `department` is a display label used when prompting the model; access
/// decisions are made from `role` alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

impl User {
    pub fn new(username: impl Into<String>, role: Role, department: Option<&str>) -> Self {
        Self {
            username: username.into(),
            role,
            department: department.map(String::from),
        }
    }
}
