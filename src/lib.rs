//! # jirakit
//!
//! A small client for the Jira Server REST API: ticket search and
//! projection, transitions, comments, assignment, board sprints and epics,
//! and the pull requests linked through the development panel.
//!
//! ```no_run
//! # async fn run() -> jirakit::Result<()> {
//! use jirakit::{ClientConfig, JiraClient, Overrides};
//!
//! let client = JiraClient::new(ClientConfig::resolve(Overrides::default())?)?;
//! let ticket = client.get_ticket("ABC-1").await?;
//! println!("{:?}", ticket.summary);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod errors;
pub mod models;

pub use api::jira::JiraClient;
pub use config::{ClientConfig, Overrides};
pub use errors::{JiraError, Result};
pub use models::{Epic, LinkedPullRequests, NewTicket, PullRequestSummary, Sprint, Ticket, Transition};
