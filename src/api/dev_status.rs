use crate::api::jira::{decode, JiraClient};
use crate::errors::{JiraError, Result};
use crate::models::dev_status::{DevStatusResponse, LinkedPullRequests};
use reqwest::Method;
use tracing::{info, instrument};

/// Application type of the GitHub Enterprise integration.
pub const DEFAULT_APPLICATION_TYPE: &str = "githube";

const DETAIL_ENDPOINT: &str = "dev-status/1.0/issue/detail";

impl JiraClient {
    /// Branches and pull requests linked to an issue, from the first detail
    /// entry of the development panel.
    #[instrument(parent = &self.span, skip(self), level = "debug")]
    pub async fn get_linked_pull_requests(
        &self,
        issue_id: &str,
        application_type: &str,
    ) -> Result<LinkedPullRequests> {
        let query = [
            ("issueId", issue_id.to_string()),
            ("applicationType", application_type.to_string()),
            ("dataType", "pullrequest".to_string()),
        ];

        let payload = self
            .send(Method::GET, DETAIL_ENDPOINT, &query, None)
            .await?;
        let response: DevStatusResponse = decode(DETAIL_ENDPOINT, payload)?;

        let detail = response
            .detail
            .into_iter()
            .next()
            .ok_or_else(|| JiraError::EmptyDevStatus {
                issue_id: issue_id.to_string(),
            })?;

        let linked = LinkedPullRequests::from(detail);
        info!(
            issue_id,
            branches = linked.branches.len(),
            pull_requests = linked.pull_requests.len(),
            "dev status fetched"
        );

        Ok(linked)
    }
}
