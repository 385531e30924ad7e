//! Workspace models

use serde::Serialize;

/// A workspace partition on the HQ server.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Workspace {
    /// Machine name, the key used for path-based scoping. Never empty.
    pub name: String,
    pub display_name: Option<String>,
    pub disabled: bool,
    pub description: Option<String>,
}

/// Counters from the global workspace status endpoint, used as a fallback
/// when the role listings themselves are inaccessible.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct WorkspaceStatus {
    pub supervisors_count: Option<i64>,
    pub interviewers_count: Option<i64>,
}
