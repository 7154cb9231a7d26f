//! Authenticated user profile and role.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Portal role, decoded from the profile's `role.code`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Admin,
    SuperAdmin,
    /// Any code the portal does not know; kept verbatim for display.
    Unknown(String),
}

impl Role {
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "USER" => Self::User,
            "ADMIN" => Self::Admin,
            "SADMIN" => Self::SuperAdmin,
            other => Self::Unknown(other.to_owned()),
        }
    }

    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
            Self::SuperAdmin => "SADMIN",
            Self::Unknown(code) => code,
        }
    }

    /// Admins and super-admins drive publication; everyone else gets the
    /// read-only consolidation view.
    #[must_use]
    pub fn can_publish(&self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleInfo {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub libelle: Option<String>,
}

/// Profile returned by `GET /api/auth/me` and by login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, alias = "prenom", alias = "prenoms")]
    pub first_name: Option<String>,
    #[serde(default, alias = "nom")]
    pub last_name: Option<String>,
    pub role: RoleInfo,
    /// Fields the portal does not interpret (assigned departments, CELs, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    #[must_use]
    pub fn role(&self) -> Role {
        Role::from_code(&self.role.code)
    }

    /// "Prénom Nom", falling back to the email.
    #[must_use]
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        if parts.is_empty() { self.email.clone() } else { parts.join(" ") }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("expected string or number id, got {other}"))),
    }
}

#[cfg(test)]
#[path = "user_test.rs"]
mod tests;
