//! Board endpoints of the agile API: sprints and epics.

use crate::api::jira::{decode, path_segment, JiraClient, Query};
use crate::api::pagination::PageConvention;
use crate::errors::Result;
use crate::models::board::{Epic, Sprint};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, instrument};

impl JiraClient {
    /// Active sprints first, then future ones.
    #[instrument(parent = &self.span, skip(self), level = "debug")]
    pub async fn get_sprints(&self, board_id: &str) -> Result<Vec<Sprint>> {
        let endpoint = format!("agile/1.0/board/{}/sprint", path_segment(board_id));

        let future: Vec<Sprint> = self
            .board_values(&endpoint, vec![("state", "future".to_string())])
            .await?;
        let active: Vec<Sprint> = self
            .board_values(&endpoint, vec![("state", "active".to_string())])
            .await?;
        info!(board_id, active = active.len(), future = future.len(), "sprints fetched");

        Ok(active.into_iter().chain(future).collect())
    }

    #[instrument(parent = &self.span, skip(self), level = "debug")]
    pub async fn get_epics(&self, board_id: &str, include_done: bool) -> Result<Vec<Epic>> {
        let endpoint = format!("agile/1.0/board/{}/epic", path_segment(board_id));
        self.board_values(&endpoint, vec![("done", include_done.to_string())])
            .await
    }

    async fn board_values<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: Query,
    ) -> Result<Vec<T>> {
        self.get_all(endpoint, params, PageConvention::Values)
            .await?
            .into_iter()
            .map(|item: Value| decode(endpoint, item))
            .collect()
    }
}
