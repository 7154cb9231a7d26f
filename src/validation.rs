//! Request payload schemas.
//!
//! DESIGN
//! ======
//! Each mutating route declares a `Schema` type. Parsing walks a
//! `serde_json::Value` field by field and collects every problem into an
//! `Issue` list instead of stopping at the first one, so the 400 response can
//! report all offending fields at once.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One validation problem, addressed by a dotted field path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub path: String,
    pub code: String,
    pub message: String,
}

impl Issue {
    #[must_use]
    pub fn new(path: impl Into<String>, code: &str, message: impl Into<String>) -> Self {
        Self { path: path.into(), code: code.to_owned(), message: message.into() }
    }
}

/// A payload that can be parsed from untrusted JSON with issue reporting.
pub trait Schema: Sized {
    /// # Errors
    ///
    /// Returns every issue found in `value`.
    fn parse(value: &Value) -> Result<Self, Vec<Issue>>;
}

/// Parse a raw request body into `T`.
///
/// # Errors
///
/// Returns a single `invalid_json` issue when the body is not JSON, otherwise
/// the issues reported by `T::parse`.
pub fn parse_body<T: Schema>(body: &[u8]) -> Result<T, Vec<Issue>> {
    let value: Value = if body.is_empty() {
        Value::Object(Map::new())
    } else {
        serde_json::from_slice(body).map_err(|e| vec![Issue::new("", "invalid_json", e.to_string())])?
    };
    T::parse(&value)
}

fn as_object(value: &Value) -> Result<&Map<String, Value>, Vec<Issue>> {
    value
        .as_object()
        .ok_or_else(|| vec![Issue::new("", "invalid_type", "objet JSON attendu")])
}

fn required_string(obj: &Map<String, Value>, field: &str, issues: &mut Vec<Issue>) -> Option<String> {
    match obj.get(field) {
        None | Some(Value::Null) => {
            issues.push(Issue::new(field, "required", "champ requis"));
            None
        }
        Some(Value::String(s)) if s.trim().is_empty() => {
            issues.push(Issue::new(field, "too_small", "ne doit pas être vide"));
            None
        }
        Some(Value::String(s)) => Some(s.trim().to_owned()),
        Some(_) => {
            issues.push(Issue::new(field, "invalid_type", "chaîne attendue"));
            None
        }
    }
}

// =============================================================================
// ELECTION STATUT
// =============================================================================

/// Lifecycle status of an election.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ElectionStatut {
    Preparation,
    EnCours,
    Cloturee,
    Publiee,
}

impl ElectionStatut {
    pub const ALL: [Self; 4] = [Self::Preparation, Self::EnCours, Self::Cloturee, Self::Publiee];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Preparation => "PREPARATION",
            Self::EnCours => "EN_COURS",
            Self::Cloturee => "CLOTUREE",
            Self::Publiee => "PUBLIEE",
        }
    }
}

impl fmt::Display for ElectionStatut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElectionStatut {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|statut| statut.as_str() == s).ok_or(())
    }
}

/// Body of `PATCH /api/elections/{id}/statut`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatutUpdate {
    pub statut: ElectionStatut,
}

impl Schema for StatutUpdate {
    fn parse(value: &Value) -> Result<Self, Vec<Issue>> {
        let obj = as_object(value)?;
        let mut issues = Vec::new();
        let raw = required_string(obj, "statut", &mut issues);
        let statut = raw.and_then(|raw| match raw.parse::<ElectionStatut>() {
            Ok(statut) => Some(statut),
            Err(()) => {
                let expected: Vec<&str> = ElectionStatut::ALL.iter().map(|s| s.as_str()).collect();
                issues.push(Issue::new(
                    "statut",
                    "invalid_enum_value",
                    format!("valeur '{raw}' invalide, attendu: {}", expected.join(" | ")),
                ));
                None
            }
        });
        match statut {
            Some(statut) if issues.is_empty() => Ok(Self { statut }),
            _ => Err(issues),
        }
    }
}

// =============================================================================
// LOGIN
// =============================================================================

/// Body of `POST /api/auth/login`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Schema for LoginRequest {
    fn parse(value: &Value) -> Result<Self, Vec<Issue>> {
        let obj = as_object(value)?;
        let mut issues = Vec::new();
        let email = required_string(obj, "email", &mut issues);
        if let Some(email) = &email {
            if !looks_like_email(email) {
                issues.push(Issue::new("email", "invalid_string", "adresse email invalide"));
            }
        }
        let password = required_string(obj, "password", &mut issues);
        match (email, password) {
            (Some(email), Some(password)) if issues.is_empty() => Ok(Self { email, password }),
            _ => Err(issues),
        }
    }
}

fn looks_like_email(raw: &str) -> bool {
    let Some((local, domain)) = raw.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

// =============================================================================
// PUBLISH
// =============================================================================

/// Body of `POST /api/resultats/{id}/publish`. Both fields are optional; an
/// empty body publishes every department.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PublishRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departements: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force: Option<bool>,
}

impl Schema for PublishRequest {
    fn parse(value: &Value) -> Result<Self, Vec<Issue>> {
        let obj = as_object(value)?;
        let mut issues = Vec::new();

        let departements = match obj.get("departements") {
            None | Some(Value::Null) => None,
            Some(Value::Array(items)) => {
                let mut codes = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    match item.as_str().map(str::trim) {
                        Some(code) if !code.is_empty() => codes.push(code.to_owned()),
                        _ => issues.push(Issue::new(
                            format!("departements.{i}"),
                            "invalid_type",
                            "code département attendu",
                        )),
                    }
                }
                Some(codes)
            }
            Some(_) => {
                issues.push(Issue::new("departements", "invalid_type", "tableau attendu"));
                None
            }
        };

        let force = match obj.get("force") {
            None | Some(Value::Null) => None,
            Some(Value::Bool(b)) => Some(*b),
            Some(_) => {
                issues.push(Issue::new("force", "invalid_type", "booléen attendu"));
                None
            }
        };

        if issues.is_empty() { Ok(Self { departements, force }) } else { Err(issues) }
    }
}

// =============================================================================
// UPLOAD
// =============================================================================

pub const ALLOWED_UPLOAD_EXTENSIONS: [&str; 2] = ["xlsx", "xls"];

/// Text fields accompanying an Excel upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadMeta {
    pub code_cel: String,
    pub nom_fichier: String,
}

impl Schema for UploadMeta {
    fn parse(value: &Value) -> Result<Self, Vec<Issue>> {
        let obj = as_object(value)?;
        let mut issues = Vec::new();
        let code_cel = required_string(obj, "code_cel", &mut issues);
        let nom_fichier = required_string(obj, "nom_fichier", &mut issues);
        match (code_cel, nom_fichier) {
            (Some(code_cel), Some(nom_fichier)) if issues.is_empty() => Ok(Self { code_cel, nom_fichier }),
            _ => Err(issues),
        }
    }
}

/// Check an uploaded file's name and size.
///
/// # Errors
///
/// Returns issues on the `file` path for a wrong extension, an empty file, or
/// a file larger than `max_bytes`.
pub fn check_upload_file(file_name: &str, len: usize, max_bytes: usize) -> Result<(), Vec<Issue>> {
    let mut issues = Vec::new();
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    if !ALLOWED_UPLOAD_EXTENSIONS.contains(&extension.as_str()) {
        issues.push(Issue::new("file", "invalid_file_type", "seuls les fichiers .xlsx et .xls sont acceptés"));
    }
    if len == 0 {
        issues.push(Issue::new("file", "too_small", "fichier vide"));
    } else if len > max_bytes {
        issues.push(Issue::new("file", "too_big", format!("taille maximale: {max_bytes} octets")));
    }
    if issues.is_empty() { Ok(()) } else { Err(issues) }
}

#[cfg(test)]
#[path = "validation_test.rs"]
mod tests;
