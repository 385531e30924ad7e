//! HTTP client for the HQ API

use reqwest::{Client, RequestBuilder, Response};
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::info;

use crate::auth::{AuthMode, BearerLogin, Credentials};
use crate::error::{HqError, Result};

const CONNECT_TIMEOUT_SECS: u64 = 10;
const TOTAL_TIMEOUT_SECS: u64 = 20;

/// Which base URL a request is rooted at.
///
/// Most resource endpoints are workspace-scoped via the URL path
/// (`{base}/{workspace}/api/v1/...`); workspace management and user
/// creation are global.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Scope<'a> {
    /// `{base}/...`
    Global,
    /// `{base}/{client workspace}/...`, or global when none is configured.
    Ambient,
    /// `{base}/{name}/...` for an explicitly named workspace.
    Named(&'a str),
}

/// Client for one configured HQ server.
///
/// Holds no state shared across instances; each logical session or request
/// context builds its own. The live bearer token sits behind a lock so the
/// one-way basic-to-bearer upgrade works through `&self`.
pub struct HqClient {
    http: Client,
    base_url: String,
    workspace: Option<String>,
    credentials: Credentials,
    bearer_token: RwLock<Option<String>>,
}

impl HqClient {
    pub fn new(
        base_url: impl Into<String>,
        workspace: Option<String>,
        credentials: Credentials,
    ) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("hqbridge/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(std::time::Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(std::time::Duration::from_secs(TOTAL_TIMEOUT_SECS))
            .build()?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(HqError::Config("base URL must not be empty".into()));
        }
        let workspace = workspace
            .map(|w| w.trim().to_string())
            .filter(|w| !w.is_empty());
        let bearer_token = RwLock::new(credentials.bearer_token.clone());

        Ok(Self {
            http,
            base_url,
            workspace,
            credentials,
            bearer_token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn workspace(&self) -> Option<&str> {
        self.workspace.as_deref()
    }

    pub async fn has_bearer_token(&self) -> bool {
        self.bearer_token
            .read()
            .await
            .as_deref()
            .is_some_and(|t| !t.is_empty())
    }

    /// The transport currently in effect for outbound calls.
    pub async fn auth_mode(&self) -> AuthMode {
        if self.has_bearer_token().await {
            AuthMode::Bearer
        } else {
            AuthMode::Basic
        }
    }

    /// Install a bearer token for all subsequent requests.
    pub async fn set_bearer_token(&self, token: Option<String>) {
        *self.bearer_token.write().await = token;
    }

    pub(crate) fn url(&self, scope: Scope<'_>, path: &str) -> String {
        let path = path.trim_start_matches('/');
        match scope {
            Scope::Global => format!("{}/{}", self.base_url, path),
            Scope::Ambient => match &self.workspace {
                Some(ws) => format!("{}/{}/{}", self.base_url, ws, path),
                None => format!("{}/{}", self.base_url, path),
            },
            Scope::Named(ws) => format!("{}/{}/{}", self.base_url, ws.trim(), path),
        }
    }

    async fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let token = self.bearer_token.read().await;
        match token.as_deref() {
            Some(t) if !t.is_empty() => request.bearer_auth(t),
            _ => request.basic_auth(&self.credentials.username, Some(&self.credentials.password)),
        }
    }

    pub(crate) async fn send_get(
        &self,
        scope: Scope<'_>,
        path: &str,
        paging: Option<(usize, usize)>,
    ) -> reqwest::Result<Response> {
        let mut request = self
            .http
            .get(self.url(scope, path))
            .header("Accept", "application/json");
        if let Some((limit, offset)) = paging {
            request = request.query(&[("limit", limit), ("offset", offset)]);
        }
        self.authorize(request).await.send().await
    }

    /// GET with paging parameters, falling back to a single unpaged retry
    /// when the paged call is rejected. Some HQ builds use different paging
    /// conventions and reject unknown parameters outright.
    pub(crate) async fn get_with_paging_retry(
        &self,
        scope: Scope<'_>,
        path: &str,
        limit: usize,
        offset: usize,
    ) -> reqwest::Result<Response> {
        let response = self.send_get(scope, path, Some((limit, offset))).await?;
        if response.status().is_success() {
            return Ok(response);
        }
        self.send_get(scope, path, None).await
    }

    pub(crate) async fn send_post(
        &self,
        scope: Scope<'_>,
        path: &str,
        body: &Value,
    ) -> reqwest::Result<Response> {
        let request = self
            .http
            .post(self.url(scope, path))
            .header("Accept", "application/json")
            .json(body);
        self.authorize(request).await.send().await
    }

    pub(crate) async fn send_patch(
        &self,
        scope: Scope<'_>,
        path: &str,
        body: &Value,
    ) -> reqwest::Result<Response> {
        let request = self
            .http
            .patch(self.url(scope, path))
            .header("Accept", "application/json")
            .json(body);
        self.authorize(request).await.send().await
    }

    /// Turn a non-2xx response into a hard error carrying status and a
    /// truncated body. Used by the direct-action calls, never by the
    /// best-effort aggregation paths.
    pub(crate) async fn check(&self, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(HqError::status(status.as_u16(), &body))
    }

    /// Probe the local token-issuing login endpoint.
    ///
    /// Reference deployments issue bearer tokens here; canonical HQ servers
    /// answer 404/405, which [`BearerLogin::supported`] distinguishes from
    /// a credential rejection.
    pub async fn try_bearer_login(&self) -> Result<BearerLogin> {
        let mut payload = Map::new();
        payload.insert("password".into(), Value::String(self.credentials.password.clone()));
        if self.credentials.username_is_email() {
            payload.insert("email".into(), Value::String(self.credentials.username.clone()));
        }
        payload.insert("username".into(), Value::String(self.credentials.username.clone()));

        let response = self
            .http
            .post(self.url(Scope::Global, "/api/v1/auth/login"))
            .header("Accept", "application/json")
            .json(&Value::Object(payload))
            .send()
            .await?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            return Ok(BearerLogin { ok: false, status, token: None });
        }

        let json = response.json::<Value>().await.unwrap_or(Value::Null);
        let token = json
            .get("token")
            .and_then(|t| t.as_str())
            .filter(|t| !t.is_empty())
            .map(|t| t.to_string());

        Ok(BearerLogin { ok: token.is_some(), status, token })
    }

    /// Verify the configured credentials, upgrading to bearer auth when the
    /// deployment requires it.
    ///
    /// Basic auth is tried first; only an HTTP 401 triggers the bearer-login
    /// probe. A successful probe swaps the session to bearer for good.
    pub async fn ensure_auth(&self) -> Result<()> {
        let response = self.send_get(Scope::Global, "/api/v1/workspaces", None).await?;
        if response.status().as_u16() != 401 {
            return Ok(());
        }

        if self.has_bearer_token().await {
            return Err(HqError::Auth("HQ rejected the bearer token (HTTP 401)".into()));
        }

        let login = self.try_bearer_login().await?;
        if login.ok {
            info!("basic auth rejected; switched to bearer token auth");
            self.set_bearer_token(login.token).await;
            return Ok(());
        }
        if !login.supported() {
            return Err(HqError::Auth(
                "HQ rejected the credentials and does not issue bearer tokens".into(),
            ));
        }
        Err(HqError::Auth(format!(
            "token login rejected with HTTP {}",
            login.status
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{basic_auth, bearer_token, body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn creds() -> Credentials {
        Credentials::new("admin", "secret")
    }

    fn client_for(server: &MockServer, workspace: Option<&str>) -> HqClient {
        HqClient::new(server.uri(), workspace.map(String::from), creds()).unwrap()
    }

    #[test]
    fn url_scoping() {
        let client = HqClient::new("http://hq.test/", Some("main".into()), creds()).unwrap();
        assert_eq!(
            client.url(Scope::Global, "/api/v1/workspaces"),
            "http://hq.test/api/v1/workspaces"
        );
        assert_eq!(
            client.url(Scope::Ambient, "/api/v1/supervisors"),
            "http://hq.test/main/api/v1/supervisors"
        );
        assert_eq!(
            client.url(Scope::Named("other"), "api/v1/supervisors"),
            "http://hq.test/other/api/v1/supervisors"
        );
    }

    #[test]
    fn ambient_without_workspace_is_global() {
        let client = HqClient::new("http://hq.test", None, creds()).unwrap();
        assert_eq!(
            client.url(Scope::Ambient, "/api/v1/interviewers"),
            "http://hq.test/api/v1/interviewers"
        );
    }

    #[tokio::test]
    async fn requests_use_basic_auth_by_default() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/workspaces"))
            .and(basic_auth("admin", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let response = client.send_get(Scope::Global, "/api/v1/workspaces", None).await.unwrap();
        assert!(response.status().is_success());
    }

    #[tokio::test]
    async fn requests_use_bearer_when_token_set() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/workspaces"))
            .and(bearer_token("tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        client.set_bearer_token(Some("tok-1".into())).await;
        let response = client.send_get(Scope::Global, "/api/v1/workspaces", None).await.unwrap();
        assert!(response.status().is_success());
    }

    #[tokio::test]
    async fn paged_call_retries_without_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/assignments"))
            .and(query_param("limit", "10"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/assignments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let response = client
            .get_with_paging_retry(Scope::Ambient, "/api/v1/assignments", 10, 0)
            .await
            .unwrap();
        assert!(response.status().is_success());
    }

    #[tokio::test]
    async fn bearer_login_sends_email_for_email_usernames() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/login"))
            .and(body_partial_json(json!({
                "username": "admin@example.org",
                "email": "admin@example.org",
                "password": "secret"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "tok-9"})))
            .mount(&server)
            .await;

        let client = HqClient::new(
            server.uri(),
            None,
            Credentials::new("admin@example.org", "secret"),
        )
        .unwrap();
        let login = client.try_bearer_login().await.unwrap();
        assert!(login.ok);
        assert_eq!(login.token.as_deref(), Some("tok-9"));
    }

    #[tokio::test]
    async fn bearer_login_missing_endpoint_is_unsupported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/login"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let login = client.try_bearer_login().await.unwrap();
        assert!(!login.ok);
        assert!(!login.supported());
    }

    #[tokio::test]
    async fn ensure_auth_upgrades_to_bearer_on_401() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/workspaces"))
            .and(basic_auth("admin", "secret"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "tok-2"})))
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        client.ensure_auth().await.unwrap();
        assert!(client.has_bearer_token().await);
    }

    #[tokio::test]
    async fn ensure_auth_reports_unsupported_token_login() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/workspaces"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/login"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let err = client.ensure_auth().await.unwrap_err();
        assert!(err.to_string().contains("does not issue bearer tokens"));
    }

    #[tokio::test]
    async fn ensure_auth_accepts_non_401_statuses() {
        // A 403 on the probe means authenticated but unauthorized for that
        // endpoint; individual calls surface it later.
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/workspaces"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        client.ensure_auth().await.unwrap();
        assert!(!client.has_bearer_token().await);
    }
}
