//! Workspace listing, status, and management endpoints

use serde_json::{Value, json};

use super::HqClient;
use super::client::Scope;
use crate::error::Result;
use crate::extract::extract_list;
use crate::models::{Workspace, WorkspaceStatus};
use crate::normalize::{normalize_workspace, normalize_workspace_status};

impl HqClient {
    /// List all workspaces. The endpoint is global (not workspace-scoped).
    pub async fn get_workspaces(&self) -> Result<Vec<Workspace>> {
        let response = self.send_get(Scope::Global, "/api/v1/workspaces", None).await?;
        let response = self.check(response).await?;
        let json: Value = response.json().await?;

        let items = extract_list(&json, &["workspaces", "items"]);
        Ok(items.iter().filter_map(normalize_workspace).collect())
    }

    /// Fetch the status counters for one workspace, used as a fallback when
    /// the role listings themselves are inaccessible.
    pub async fn workspace_status(&self, name: &str) -> Result<WorkspaceStatus> {
        let path = format!("/api/v1/workspaces/status/{}", name.trim_matches('/'));
        let response = self.send_get(Scope::Global, &path, None).await?;
        let response = self.check(response).await?;
        let json: Value = response.json().await?;
        Ok(normalize_workspace_status(&json))
    }

    /// Create a workspace. Returns whatever object HQ echoes back.
    pub async fn create_workspace(&self, name: &str, display_name: &str) -> Result<Value> {
        let body = json!({"Name": name, "DisplayName": display_name});
        let response = self.send_post(Scope::Global, "/api/v1/workspaces", &body).await?;
        let response = self.check(response).await?;
        Ok(response.json().await.unwrap_or_else(|_| json!({})))
    }

    /// Update a workspace's display name.
    pub async fn update_workspace(&self, name: &str, display_name: &str) -> Result<()> {
        let path = format!("/api/v1/workspaces/{}", name.trim_matches('/'));
        let body = json!({"DisplayName": display_name});
        let response = self.send_patch(Scope::Global, &path, &body).await?;
        self.check(response).await?;
        Ok(())
    }

    pub async fn enable_workspace(&self, name: &str) -> Result<()> {
        self.toggle_workspace(name, "enable").await
    }

    pub async fn disable_workspace(&self, name: &str) -> Result<()> {
        self.toggle_workspace(name, "disable").await
    }

    async fn toggle_workspace(&self, name: &str, action: &str) -> Result<()> {
        let path = format!("/api/v1/workspaces/{}/{}", name.trim_matches('/'), action);
        let response = self.send_post(Scope::Global, &path, &json!({})).await?;
        self.check(response).await?;
        Ok(())
    }
}
