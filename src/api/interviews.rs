//! Interview listing endpoint

use serde_json::Value;

use super::HqClient;
use super::client::Scope;
use crate::error::Result;
use crate::extract::extract_list;
use crate::models::Interview;
use crate::normalize::normalize_interview;

impl HqClient {
    /// List interviews in the ambient workspace. Offset starts at 0 for
    /// this endpoint family.
    pub async fn get_interviews(&self, limit: usize) -> Result<Vec<Interview>> {
        let response = self
            .get_with_paging_retry(Scope::Ambient, "/api/v1/interviews", limit, 0)
            .await?;
        let response = self.check(response).await?;
        let json: Value = response.json().await?;

        let items = extract_list(&json, &["interviews", "items"]);
        Ok(items.iter().map(normalize_interview).collect())
    }
}
