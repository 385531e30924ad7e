//! User models and role normalization

use serde::{Serialize, Serializer};

/// HQ user role, normalized to the closed set the upstream documents.
///
/// Unrecognized non-empty role strings pass through unchanged so a new
/// upstream role does not get silently collapsed into something else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    ApiUser,
    Headquarter,
    Supervisor,
    Interviewer,
    Observer,
    Administrator,
    Other(String),
}

impl Role {
    /// Normalize a raw role string case-insensitively, mapping the alias
    /// spellings different HQ builds emit. Returns None for empty input so
    /// the caller can apply its endpoint-specific fallback role.
    pub fn normalize(raw: &str) -> Option<Role> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(match trimmed.to_lowercase().as_str() {
            "apiuser" | "api_user" | "api user" => Role::ApiUser,
            "headquarter" | "headquarters" | "hq" => Role::Headquarter,
            "supervisor" => Role::Supervisor,
            "interviewer" => Role::Interviewer,
            "observer" => Role::Observer,
            "administrator" | "admin" => Role::Administrator,
            _ => Role::Other(trimmed.to_string()),
        })
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::ApiUser => "ApiUser",
            Role::Headquarter => "Headquarter",
            Role::Supervisor => "Supervisor",
            Role::Interviewer => "Interviewer",
            Role::Observer => "Observer",
            Role::Administrator => "Administrator",
            Role::Other(s) => s,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A user record normalized from whatever shape the upstream returned.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct User {
    pub id: Option<String>,
    pub username: Option<String>,
    pub role: Option<Role>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub workspace: Option<String>,
    /// Username of the owning supervisor, for interviewers found via a
    /// supervisor's team listing.
    pub supervisor: Option<String>,
    pub is_archived: bool,
    pub is_locked: bool,
    pub creation_date: Option<String>,
}

impl User {
    /// Whether the record carries enough identity to keep at all.
    pub fn has_identity(&self) -> bool {
        self.identity_key().is_some()
    }

    /// Dedup key: lowercased username, falling back to lowercased id.
    pub fn identity_key(&self) -> Option<String> {
        for candidate in [&self.username, &self.id] {
            if let Some(value) = candidate {
                let trimmed = value.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_lowercase());
                }
            }
        }
        None
    }
}

/// Per-stage counters recorded while assembling the unified user view.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct UsersDebug {
    pub supervisors_raw: usize,
    pub supervisors_added: usize,
    pub supervisor_interviewers_raw: usize,
    pub supervisor_interviewers_added: usize,
    pub interviewers_list_status: Option<u16>,
    pub interviewers_list_raw: usize,
    pub interviewers_list_added: usize,
}

/// Result of the unified user traversal: deduplicated users plus the
/// non-fatal failures encountered along the way.
#[derive(Debug, Clone, Serialize)]
pub struct UnifiedUsers {
    pub users: Vec<User>,
    pub warnings: Vec<String>,
    pub debug: UsersDebug,
}

/// Payload for creating a user in HQ, keyed per the upstream
/// RegisterUserModel (PascalCase).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NewUser {
    pub role: Role,
    pub user_name: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Supervisor username, required when creating an interviewer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supervisor: Option<String>,
}
