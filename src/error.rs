//! Error types for HQ API calls

use thiserror::Error;

/// Maximum number of upstream body bytes carried in an error message.
const BODY_LIMIT: usize = 512;

/// Errors raised by direct (non-aggregating) HQ calls.
///
/// Best-effort aggregation paths never return these; they degrade into
/// warnings instead (see `warnings`).
#[derive(Debug, Error)]
pub enum HqError {
    #[error("HQ returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("HQ request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl HqError {
    /// Build a status error from an upstream response body, truncated so a
    /// large HTML error page does not flood the caller-facing message.
    pub fn status(status: u16, body: &str) -> Self {
        let body = body.trim();
        let body = if body.len() > BODY_LIMIT {
            let mut end = BODY_LIMIT;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}...", &body[..end])
        } else {
            body.to_string()
        };
        HqError::Status { status, body }
    }
}

/// Result alias for HQ client operations.
pub type Result<T> = std::result::Result<T, HqError>;
