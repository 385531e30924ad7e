//! Assignment listing endpoint

use serde_json::Value;

use super::HqClient;
use super::client::Scope;
use crate::error::Result;
use crate::extract::extract_list;
use crate::models::Assignment;
use crate::normalize::normalize_assignment;

impl HqClient {
    /// List assignments in the ambient workspace. Paging for this endpoint
    /// family starts at offset 0.
    pub async fn get_assignments(&self, limit: usize) -> Result<Vec<Assignment>> {
        let response = self
            .get_with_paging_retry(Scope::Ambient, "/api/v1/assignments", limit, 0)
            .await?;
        let response = self.check(response).await?;
        let json: Value = response.json().await?;

        let items = extract_list(&json, &["assignments", "items"]);
        Ok(items.iter().map(normalize_assignment).collect())
    }
}
