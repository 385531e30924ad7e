//! User directory assembly and user creation
//!
//! HQ exposes users only indirectly, by role, within workspace scope, and
//! any given credential may lack permission on some of the endpoints. The
//! unified traversal here is best-effort throughout: failed steps degrade
//! into warnings, they never abort the whole call.

use std::collections::{HashMap, HashSet};

use serde_json::Value;
use tracing::{debug, info, warn};

use super::HqClient;
use super::client::Scope;
use crate::error::Result;
use crate::extract::extract_list;
use crate::models::{NewUser, Role, UnifiedUsers, User, UsersDebug};
use crate::normalize::{first_nonempty_string, normalize_user, user_id};
use crate::warnings::Warnings;

const SUPERVISORS_ENDPOINT: &str = "GET /api/v1/supervisors";
const INTERVIEWERS_ENDPOINT: &str = "GET /api/v1/interviewers";

/// Keys the role listings hide their record arrays under.
const USER_LIST_KEYS: &[&str] = &["users", "items", "supervisors", "interviewers"];

impl HqClient {
    /// Assemble the unified user directory.
    ///
    /// Traversal order: global workspaces, supervisors per workspace (with
    /// an ambient-scope retry when that finds nothing), each supervisor's
    /// interviewer team, then the general interviewer list. Results are
    /// merged and deduplicated case-insensitively by username (or id when
    /// no username survives). Role-scoped listings page from offset 1, the
    /// general interviewer list from offset 0.
    pub async fn get_users_unified(&self, limit: usize) -> UnifiedUsers {
        let mut warnings = Warnings::new();
        let mut users: Vec<User> = Vec::new();
        let mut debug = UsersDebug::default();

        // Workspace discovery is best-effort: without it, supervisor
        // discovery degrades to the ambient scope below.
        let workspaces = self.workspace_names_for_discovery().await;

        let mut raw_supervisors: Vec<Value> = Vec::new();
        let mut workspace_by_supervisor: HashMap<String, String> = HashMap::new();
        let mut supervisors_listed = false;

        for ws_name in &workspaces {
            match self
                .get_with_paging_retry(Scope::Named(ws_name.as_str()), "/api/v1/supervisors", limit, 1)
                .await
            {
                Ok(response) if response.status().is_success() => {
                    supervisors_listed = true;
                    let json = response.json::<Value>().await.unwrap_or(Value::Null);
                    let items = extract_list(&json, USER_LIST_KEYS);
                    for item in &items {
                        if let Some(sid) = user_id(item) {
                            workspace_by_supervisor.entry(sid).or_insert_with(|| ws_name.clone());
                        }
                    }
                    raw_supervisors.extend(items);
                }
                Ok(response) => {
                    warnings.endpoint_status("Users", response.status().as_u16(), SUPERVISORS_ENDPOINT);
                }
                Err(err) => {
                    warn!(workspace = %ws_name, error = %err, "supervisor listing unreachable");
                    warnings.endpoint_unreachable("Users", SUPERVISORS_ENDPOINT);
                }
            }
        }

        // Per-workspace discovery found nothing: retry once against the
        // ambient workspace scope.
        if raw_supervisors.is_empty() {
            match self
                .get_with_paging_retry(Scope::Ambient, "/api/v1/supervisors", limit, 1)
                .await
            {
                Ok(response) if response.status().is_success() => {
                    supervisors_listed = true;
                    let json = response.json::<Value>().await.unwrap_or(Value::Null);
                    raw_supervisors.extend(extract_list(&json, USER_LIST_KEYS));
                }
                Ok(response) => {
                    warnings.endpoint_status("Users", response.status().as_u16(), SUPERVISORS_ENDPOINT);
                }
                Err(err) => {
                    warn!(error = %err, "supervisor listing unreachable");
                    warnings.endpoint_unreachable("Users", SUPERVISORS_ENDPOINT);
                }
            }
        }

        debug.supervisors_raw = raw_supervisors.len();
        if raw_supervisors.is_empty() {
            // API users often have more restricted access than web UI users.
            warnings.push(
                "Users: no supervisors found; the account may lack permission to list supervisors",
            );
        }

        let mut username_by_supervisor: HashMap<String, String> = HashMap::new();
        let mut supervisor_order: Vec<String> = Vec::new();
        for raw in raw_supervisors.iter().take(limit) {
            if !raw.is_object() {
                continue;
            }
            let user = normalize_user(raw, Role::Supervisor);
            if let (Some(id), Some(name)) = (&user.id, &user.username) {
                if !username_by_supervisor.contains_key(id) {
                    supervisor_order.push(id.clone());
                    username_by_supervisor.insert(id.clone(), name.clone());
                }
            }
            users.push(user);
            debug.supervisors_added += 1;
        }

        // Team listings both widen coverage and give the interviewer ->
        // supervisor mapping, so they are scoped to the workspace each
        // supervisor was discovered in.
        if supervisors_listed {
            for sid in supervisor_order.iter().take(limit) {
                let scope = match workspace_by_supervisor.get(sid) {
                    Some(ws) => Scope::Named(ws.as_str()),
                    None => Scope::Ambient,
                };
                let path = format!("/api/v1/supervisors/{sid}/interviewers");
                match self.get_with_paging_retry(scope, &path, limit, 1).await {
                    Ok(response) if response.status().is_success() => {
                        let json = response.json::<Value>().await.unwrap_or(Value::Null);
                        let items = extract_list(&json, USER_LIST_KEYS);
                        debug.supervisor_interviewers_raw += items.len();
                        for raw in items.iter().take(limit) {
                            if !raw.is_object() {
                                continue;
                            }
                            let mut user = normalize_user(raw, Role::Interviewer);
                            user.supervisor = username_by_supervisor.get(sid).cloned();
                            users.push(user);
                            debug.supervisor_interviewers_added += 1;
                        }
                    }
                    Ok(response) => {
                        debug!(supervisor = %sid, status = %response.status(), "team listing skipped");
                    }
                    Err(err) => {
                        debug!(supervisor = %sid, error = %err, "team listing skipped");
                    }
                }
            }
        }

        // The general interviewer list is not exposed by every HQ build; a
        // 404 is a normal outcome there, not a failure.
        match self
            .get_with_paging_retry(Scope::Ambient, "/api/v1/interviewers", limit, 0)
            .await
        {
            Ok(response) => {
                let status = response.status();
                debug.interviewers_list_status = Some(status.as_u16());
                if status.is_success() {
                    let json = response.json::<Value>().await.unwrap_or(Value::Null);
                    let items = extract_list(&json, USER_LIST_KEYS);
                    debug.interviewers_list_raw = items.len();
                    for raw in items.iter().take(limit) {
                        if !raw.is_object() {
                            continue;
                        }
                        users.push(normalize_user(raw, Role::Interviewer));
                        debug.interviewers_list_added += 1;
                    }
                } else if status.as_u16() != 404 {
                    warnings.endpoint_status("Users", status.as_u16(), INTERVIEWERS_ENDPOINT);
                }
            }
            Err(err) => {
                warn!(error = %err, "interviewer listing unreachable");
                warnings.endpoint_unreachable("Users", INTERVIEWERS_ENDPOINT);
            }
        }

        let merged = merge_users(users);
        // `debug` is shadowed by `tracing::field::debug` inside the macro,
        // so reference the counters through an alias.
        let dbg = &debug;
        info!(
            users = merged.len(),
            supervisors = dbg.supervisors_added,
            team_interviewers = dbg.supervisor_interviewers_added,
            listed_interviewers = dbg.interviewers_list_added,
            degraded = !warnings.is_empty(),
            "unified user fetch complete"
        );

        UnifiedUsers {
            users: merged,
            warnings: warnings.into_vec(),
            debug,
        }
    }

    async fn workspace_names_for_discovery(&self) -> Vec<String> {
        match self.send_get(Scope::Global, "/api/v1/workspaces", None).await {
            Ok(response) if response.status().is_success() => {
                let json = response.json::<Value>().await.unwrap_or(Value::Null);
                extract_list(&json, &["workspaces", "items"])
                    .iter()
                    .filter_map(|w| first_nonempty_string(w, &["Name", "name"]))
                    .collect()
            }
            Ok(response) => {
                warn!(status = %response.status(), "workspace discovery failed");
                Vec::new()
            }
            Err(err) => {
                warn!(error = %err, "workspace discovery failed");
                Vec::new()
            }
        }
    }

    /// Create a user in HQ. Returns the created id when the server provides
    /// one; some builds answer with JSON, others with a plain-text id.
    pub async fn create_user(&self, user: &NewUser) -> Result<Option<String>> {
        let body = serde_json::to_value(user)
            .map_err(|e| crate::error::HqError::Config(format!("invalid user payload: {e}")))?;
        let response = self.send_post(Scope::Global, "/api/v1/users", &body).await?;
        let response = self.check(response).await?;

        let text = response.text().await?;
        if let Ok(json) = serde_json::from_str::<Value>(&text) {
            match &json {
                Value::Object(_) => {
                    let id = ["id", "userId", "UserId"]
                        .iter()
                        .find_map(|k| json.get(k))
                        .and_then(|v| v.as_str())
                        .filter(|s| !s.is_empty())
                        .map(|s| s.to_string());
                    return Ok(id);
                }
                Value::String(s) if !s.trim().is_empty() => {
                    return Ok(Some(s.trim().to_string()));
                }
                _ => {}
            }
        }

        let trimmed = text.trim();
        Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
    }
}

/// Merge pass: keep only records with some identity, backfill the username
/// from the id for display, and deduplicate case-insensitively keeping the
/// first occurrence.
fn merge_users(users: Vec<User>) -> Vec<User> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged = Vec::new();
    for mut user in users {
        if user.username.as_deref().map(str::trim).filter(|s| !s.is_empty()).is_none() {
            user.username = user.id.clone().filter(|s| !s.trim().is_empty());
        }
        let Some(key) = user.identity_key() else {
            continue;
        };
        if seen.insert(key) {
            merged.push(user);
        }
    }
    merged
}
