//! Role → access filter mapping.
//!
//! The mapping is an exhaustive `match`: adding a [`Role`] variant without
//! deciding its visibility here fails to compile.

use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::role::Role;

/// Metadata field holding a document's owning department.
pub const DEPARTMENT_FIELD: &str = "department";
/// Metadata field holding a document's general access level.
pub const ACCESS_LEVEL_FIELD: &str = "access_level";
/// The access level visible to every employee.
pub const GENERAL_ACCESS: &str = "general";

/// A predicate over document metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AccessFilter {
    /// Every document is eligible.
    Unrestricted,
    /// Only documents whose `field` metadata equals `value`.
    FieldEquals { field: String, value: String },
}

impl AccessFilter {
    pub fn department(department: impl Into<String>) -> Self {
        Self::FieldEquals {
            field: DEPARTMENT_FIELD.into(),
            value: department.into(),
        }
    }

    pub fn general() -> Self {
        Self::FieldEquals {
            field: ACCESS_LEVEL_FIELD.into(),
            value: GENERAL_ACCESS.into(),
        }
    }

    /// Whether `document` satisfies this predicate.
    ///
    /// A missing or non-string field never matches.
    pub fn permits(&self, document: &Document) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::FieldEquals { field, value } => {
                document.metadata_str(field) == Some(value.as_str())
            }
        }
    }

    /// The filter as a Chroma-style `where` document, `None` when unrestricted.
    pub fn to_where_clause(&self) -> Option<serde_json::Value> {
        match self {
            Self::Unrestricted => None,
            Self::FieldEquals { field, value } => {
                let mut clause = serde_json::Map::new();
                clause.insert(field.clone(), serde_json::json!({ "$eq": value }));
                Some(serde_json::Value::Object(clause))
            }
        }
    }
}

impl std::fmt::Display for AccessFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unrestricted => f.write_str("unrestricted"),
            Self::FieldEquals { field, value } => write!(f, "{field} == {value:?}"),
        }
    }
}

/// Maps roles to the documents they may see.
pub struct AccessPolicy;

impl AccessPolicy {
    /// Resolve the filter for `role`. Pure and total.
    pub fn resolve(role: Role) -> AccessFilter {
        match role {
            Role::Ceo => AccessFilter::Unrestricted,
            Role::Finance | Role::Marketing | Role::Hr | Role::Engineering => {
                AccessFilter::department(role.as_str())
            }
            Role::Employee => AccessFilter::general(),
        }
    }
}
