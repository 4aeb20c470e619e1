use crate::api::pagination::{PageConvention, PAGE_SIZE};
use crate::config::ClientConfig;
use crate::errors::{JiraError, Result};
use crate::models::ticket::{NewTicket, RawIssue, Ticket, Transition, Transitions};
use reqwest::{header, Client, Method};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, info_span, instrument, warn, Span};

pub const DEFAULT_SEARCH_FIELDS: [&str; 6] = [
    "summary",
    "reporter",
    "description",
    "assignee",
    "labels",
    "status",
];

/// Query parameters, built fresh for every call.
pub type Query = Vec<(&'static str, String)>;

pub struct JiraClient {
    client: Client,
    base_url: String,
    api_key: String,
    deadline: Option<Duration>,
    pub(crate) span: Span,
}

impl JiraClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        if !config.verify_ssl {
            warn!(base_url = %config.base_url, "TLS certificate verification is disabled");
        }

        let client = Client::builder()
            .danger_accept_invalid_certs(!config.verify_ssl)
            .timeout(config.timeout)
            .build()?;

        let span = info_span!("jira", base_url = %config.base_url);
        debug!(?config, "jira client ready");

        Ok(Self {
            client,
            base_url: config.base_url,
            api_key: config.api_key,
            deadline: config.deadline,
            span,
        })
    }

    /// Emits every event of this client under `span` instead of the default
    /// `jira` span.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// One authenticated request. Non-2xx responses become
    /// [`JiraError::Remote`]; an empty body yields `Value::Null`.
    pub(crate) async fn send(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(%method, endpoint, "request");

        let mut request = self
            .client
            .request(method, &url)
            .bearer_auth(&self.api_key)
            .header(header::ACCEPT, "application/json");

        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), endpoint, "request failed");
            return Err(JiraError::remote(
                status.as_u16(),
                endpoint,
                error_message(&text),
            ));
        }

        debug!(status = status.as_u16(), endpoint, "response");

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| JiraError::Decode {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })
    }

    /// Walks every page of `endpoint`, bounded by the configured deadline.
    pub(crate) async fn get_all(
        &self,
        endpoint: &str,
        params: Query,
        convention: PageConvention,
    ) -> Result<Vec<Value>> {
        let fetch = self.collect_pages(endpoint, params, convention);

        match self.deadline {
            Some(deadline) => tokio::time::timeout(deadline, fetch)
                .await
                .map_err(|_| JiraError::Timeout {
                    endpoint: endpoint.to_string(),
                    after: Some(deadline),
                })?,
            None => fetch.await,
        }
    }

    async fn collect_pages(
        &self,
        endpoint: &str,
        params: Query,
        convention: PageConvention,
    ) -> Result<Vec<Value>> {
        let mut items = Vec::new();
        let mut start_at: u64 = 0;

        loop {
            let mut query = params.clone();
            query.push(("startAt", start_at.to_string()));
            query.push(("maxResults", PAGE_SIZE.to_string()));

            let payload = self.send(Method::GET, endpoint, &query, None).await?;
            let page = convention
                .read_page(payload)
                .map_err(|reason| JiraError::PaginationProtocol {
                    endpoint: endpoint.to_string(),
                    reason,
                })?;

            debug!(endpoint, start_at, count = page.items.len(), is_last = page.is_last, "page");

            let empty = page.items.is_empty();
            items.extend(page.items);

            if page.is_last {
                break;
            }
            if empty {
                return Err(JiraError::PaginationProtocol {
                    endpoint: endpoint.to_string(),
                    reason: format!("empty page at startAt={} before the last page", start_at),
                });
            }

            start_at += PAGE_SIZE;
        }

        Ok(items)
    }

    #[instrument(parent = &self.span, skip(self), level = "debug")]
    pub async fn test_connection(&self) -> Result<Value> {
        self.send(Method::GET, "api/2/myself", &[], None).await
    }

    /// Runs `jql` and returns the raw issues of every page. An empty `fields`
    /// selects [`DEFAULT_SEARCH_FIELDS`].
    #[instrument(parent = &self.span, skip(self), level = "debug")]
    pub async fn search_tickets(&self, jql: &str, fields: &[&str]) -> Result<Vec<Value>> {
        let fields = if fields.is_empty() {
            DEFAULT_SEARCH_FIELDS.join(",")
        } else {
            fields.join(",")
        };
        info!(jql, fields = %fields, "searching tickets");

        let params: Query = vec![("jql", jql.to_string()), ("fields", fields)];
        self.get_all("api/2/search", params, PageConvention::Issues)
            .await
    }

    #[instrument(parent = &self.span, skip(self), level = "debug")]
    pub async fn get_tickets_for_epic(
        &self,
        project: &str,
        epic_key: &str,
        include_done: bool,
    ) -> Result<Vec<Value>> {
        self.search_tickets(&epic_jql(project, epic_key, include_done), &[])
            .await
    }

    #[instrument(parent = &self.span, skip(self, text), level = "debug")]
    pub async fn post_comment(&self, ticket_key: &str, text: &str) -> Result<()> {
        let endpoint = format!("api/2/issue/{}/comment", path_segment(ticket_key));
        let payload = json!({ "body": text });

        self.send(Method::POST, &endpoint, &[], Some(&payload)).await?;
        info!(ticket_key, "comment posted");

        Ok(())
    }

    #[instrument(parent = &self.span, skip(self), level = "debug")]
    pub async fn get_ticket(&self, ticket_key: &str) -> Result<Ticket> {
        let endpoint = format!("api/2/issue/{}", path_segment(ticket_key));
        let payload = self.send(Method::GET, &endpoint, &[], None).await?;
        let raw: RawIssue = decode(&endpoint, payload)?;

        Ticket::from_raw(raw)
    }

    /// Numeric input is taken as an issue id already; anything else is
    /// looked up as a ticket key.
    #[instrument(parent = &self.span, skip(self), level = "debug")]
    pub async fn resolve_issue_id(&self, ticket: &str) -> Result<String> {
        if !ticket.is_empty() && ticket.chars().all(|c| c.is_ascii_digit()) {
            return Ok(ticket.to_string());
        }

        let endpoint = format!("api/2/issue/{}", path_segment(ticket));
        let query = [("fields", "summary".to_string())];
        let payload = self.send(Method::GET, &endpoint, &query, None).await?;

        #[derive(serde::Deserialize)]
        struct IssueId {
            id: String,
        }
        let issue: IssueId = decode(&endpoint, payload)?;
        Ok(issue.id)
    }

    #[instrument(parent = &self.span, skip(self), level = "debug")]
    pub async fn update_ticket_status(&self, ticket_key: &str, transition_id: &str) -> Result<()> {
        let endpoint = format!("api/2/issue/{}/transitions", path_segment(ticket_key));
        let payload = json!({
            "transition": {
                "id": transition_id
            }
        });

        self.send(Method::POST, &endpoint, &[], Some(&payload))
            .await
            .map_err(|e| e.with_transition(transition_id))?;
        info!(ticket_key, transition_id, "ticket transitioned");

        Ok(())
    }

    #[instrument(parent = &self.span, skip(self), level = "debug")]
    pub async fn get_available_statuses(&self, ticket_key: &str) -> Result<Vec<Transition>> {
        let endpoint = format!("api/2/issue/{}/transitions", path_segment(ticket_key));
        let payload = self.send(Method::GET, &endpoint, &[], None).await?;
        let transitions: Transitions = decode(&endpoint, payload)?;

        Ok(transitions.transitions)
    }

    #[instrument(parent = &self.span, skip(self), level = "debug")]
    pub async fn assign_user(&self, ticket_key: &str, username: &str) -> Result<()> {
        let endpoint = format!("api/2/issue/{}/assignee", path_segment(ticket_key));
        let payload = json!({ "name": username });

        self.send(Method::PUT, &endpoint, &[], Some(&payload)).await?;
        info!(ticket_key, username, "ticket assigned");

        Ok(())
    }

    /// Returns the server's raw response (`id`, `key`, `self`).
    #[instrument(parent = &self.span, skip(self), level = "debug")]
    pub async fn create_ticket(&self, ticket: &NewTicket) -> Result<Value> {
        let payload = ticket.payload();
        let created = self
            .send(Method::POST, "api/2/issue", &[], Some(&payload))
            .await?;
        let key = created.get("key").and_then(serde_json::Value::as_str);
        info!(key, "ticket created");

        Ok(created)
    }
}

/// Open tickets of one epic; Done is kept only with `include_done`.
pub fn epic_jql(project: &str, epic_key: &str, include_done: bool) -> String {
    let excluded = if include_done {
        r#""Rejected""#
    } else {
        r#""Rejected", "Done""#
    };

    format!(
        r#"project = {} AND "Epic Link" = {} AND status not in ({})"#,
        project, epic_key, excluded
    )
}

pub(crate) fn decode<T: DeserializeOwned>(endpoint: &str, payload: Value) -> Result<T> {
    serde_json::from_value(payload).map_err(|e| JiraError::Decode {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
    })
}

pub(crate) fn path_segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Jira error bodies look like `{"errorMessages": [...], "errors": {...}}`.
fn error_message(body: &str) -> String {
    let Ok(payload) = serde_json::from_str::<Value>(body) else {
        return body.chars().take(300).collect();
    };

    let mut messages: Vec<String> = payload
        .get("errorMessages")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    if let Some(errors) = payload.get("errors").and_then(Value::as_object) {
        messages.extend(errors.iter().map(|(field, message)| {
            format!("{}: {}", field, message.as_str().unwrap_or_default())
        }));
    }

    messages.join("; ")
}
