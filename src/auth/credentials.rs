//! Credential material and auth-mode resolution

/// Credentials for one upstream HQ server.
///
/// A bearer token, when present, takes precedence over basic auth for the
/// remainder of the session; there is no downgrade back to basic.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub bearer_token: Option<String>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            bearer_token: None,
        }
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn mode(&self) -> AuthMode {
        match self.bearer_token.as_deref() {
            Some(t) if !t.is_empty() => AuthMode::Bearer,
            _ => AuthMode::Basic,
        }
    }

    /// Whether the username looks like an email address; the login probe
    /// then also sends it under the `email` key.
    pub fn username_is_email(&self) -> bool {
        self.username.contains('@')
    }
}

/// How requests are authorized against the upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Basic,
    Bearer,
}

/// Outcome of probing the local token-issuing login endpoint.
///
/// Canonical HQ servers only accept basic auth and answer the probe with
/// 404/405; that is a different situation from wrong credentials (401).
#[derive(Debug, Clone)]
pub struct BearerLogin {
    pub ok: bool,
    pub status: u16,
    pub token: Option<String>,
}

impl BearerLogin {
    /// Whether this deployment supports token login at all.
    pub fn supported(&self) -> bool {
        !matches!(self.status, 404 | 405)
    }
}
