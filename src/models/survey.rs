//! Assignment and interview models

use serde::Serialize;

/// An assignment of a questionnaire to a responsible user.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Assignment {
    pub id: Option<String>,
    pub questionnaire_title: Option<String>,
    pub workspace: Option<String>,
    pub responsible: Option<String>,
    pub status: Option<String>,
    pub quantity: i64,
    pub interviews_count: i64,
}

/// A collected interview.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Interview {
    pub interview_id: Option<String>,
    pub assignment_id: Option<String>,
    pub interviewer: Option<String>,
    pub status: Option<String>,
    /// Canonical `YYYY-MM-DD HH:MM:SS` timestamp, or the raw upstream
    /// string when it could not be parsed.
    pub created_at: Option<String>,
}
