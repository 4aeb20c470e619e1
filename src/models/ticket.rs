use crate::errors::Result;
use crate::models::fields;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Issue as returned by `api/2/issue/{key}`; only the fields we project.
#[derive(Debug, Deserialize)]
pub struct RawIssue {
    pub id: String,
    pub key: String,
    #[serde(default)]
    pub fields: RawIssueFields,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawIssueFields {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub created: Option<String>,
    pub reporter: Option<User>,
    pub assignee: Option<User>,
    pub status: Option<Status>,
    pub issuetype: Option<IssueType>,
    pub labels: Option<Vec<String>>,
    pub comment: Option<RawComments>,
    #[serde(rename = "customfield_10005")]
    pub sprints: Option<Value>,
    #[serde(rename = "customfield_11100")]
    pub dev_summary: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawComments {
    #[serde(default, deserialize_with = "crate::models::null_as_empty")]
    pub comments: Vec<RawComment>,
}

#[derive(Debug, Deserialize)]
pub struct RawComment {
    pub author: Option<User>,
    pub body: Option<String>,
    pub created: Option<String>,
}

/// Simplified ticket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ticket {
    pub id: String,
    pub key: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub comments: Vec<Comment>,
    pub created: Option<String>,
    pub reporter: Option<User>,
    pub assignee: Option<User>,
    pub status: Option<Status>,
    pub issuetype: Option<IssueType>,
    pub labels: Vec<String>,
    pub sprints: Vec<String>,
    /// Pull request overview from the development panel.
    pub github: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comment {
    pub author: Option<User>,
    pub body: Option<String>,
    pub created: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub name: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Status {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IssueType {
    pub name: Option<String>,
    pub id: Option<String>,
}

/// A transition the ticket can take from its current status.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Transition {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct Transitions {
    #[serde(default, deserialize_with = "crate::models::null_as_empty")]
    pub transitions: Vec<Transition>,
}

impl Ticket {
    pub fn from_raw(raw: RawIssue) -> Result<Self> {
        let raw_fields = raw.fields;

        let sprints = fields::parse_sprints(raw_fields.sprints.as_ref())?;
        let github = fields::parse_dev_summary(raw_fields.dev_summary.as_ref())?;

        let comments = raw_fields
            .comment
            .unwrap_or_default()
            .comments
            .into_iter()
            .map(|c| Comment {
                author: c.author,
                body: c.body,
                created: c.created,
            })
            .collect();

        Ok(Self {
            id: raw.id,
            key: raw.key,
            summary: raw_fields.summary,
            description: raw_fields.description,
            comments,
            created: raw_fields.created,
            reporter: raw_fields.reporter,
            assignee: raw_fields.assignee,
            status: raw_fields.status,
            issuetype: raw_fields.issuetype,
            labels: raw_fields.labels.unwrap_or_default(),
            sprints,
            github,
        })
    }
}

/// Input for `JiraClient::create_ticket`.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub project_id: String,
    pub summary: String,
    pub description: String,
    pub issue_type_id: String,
    pub sprint_id: u64,
    pub epic: Option<String>,
}

impl NewTicket {
    pub fn payload(&self) -> Value {
        let mut body = serde_json::json!({
            "project": { "id": self.project_id },
            "summary": self.summary,
            "description": self.description,
            "issuetype": { "id": self.issue_type_id },
        });
        body[fields::SPRINT_FIELD] = Value::from(self.sprint_id);

        // Omitted entirely when there is no epic, never sent as null.
        if let Some(epic) = self.epic.as_deref().filter(|epic| !epic.is_empty()) {
            body[fields::EPIC_LINK_FIELD] = Value::String(epic.to_string());
        }

        serde_json::json!({ "fields": body })
    }
}
