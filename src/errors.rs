use colored::*;
use std::fmt;
use std::time::Duration;

#[derive(Debug)]
pub enum JiraError {
    // Configuration errors
    Config(String),

    // Jira errors
    Remote {
        status: u16,
        endpoint: String,
        transition_id: Option<String>,
        message: String,
    },
    EmptyDevStatus {
        issue_id: String,
    },
    MalformedField {
        field: String,
        reason: String,
    },
    PaginationProtocol {
        endpoint: String,
        reason: String,
    },

    // Transport errors
    Timeout {
        endpoint: String,
        after: Option<Duration>,
    },
    NetworkError(String),
    Decode {
        endpoint: String,
        reason: String,
    },

    // Generic error
    Other(String),
}

impl JiraError {
    pub fn remote(status: u16, endpoint: &str, message: String) -> Self {
        JiraError::Remote {
            status,
            endpoint: endpoint.to_string(),
            transition_id: None,
            message,
        }
    }

    pub fn malformed(field: &str, reason: impl Into<String>) -> Self {
        JiraError::MalformedField {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Attaches the attempted transition to a remote error so an invalid
    /// transition can be told apart from other failures.
    pub fn with_transition(self, id: &str) -> Self {
        match self {
            JiraError::Remote {
                status,
                endpoint,
                message,
                ..
            } => JiraError::Remote {
                status,
                endpoint,
                transition_id: Some(id.to_string()),
                message,
            },
            other => other,
        }
    }

    /// True for failures reported by the server rather than by the client.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            JiraError::Remote { .. } | JiraError::EmptyDevStatus { .. }
        )
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            JiraError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for JiraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JiraError::Config(msg) => {
                write!(f, "{}\n", "Configuration error".red().bold())?;
                write!(f, "   {}\n\n", msg.dimmed())?;
                write!(f, "   To fix:\n")?;
                write!(f, "   1. Export {} and {}\n", "JIRA_HOST".green(), "JIRA_API_KEY".green())?;
                write!(f, "   2. Or pass {} / {}\n", "--host".green(), "--api-key".green())?;
                write!(f, "   3. Or save them: {}", "jira config set jira.host <host>".green())
            }

            JiraError::Remote {
                status,
                endpoint,
                transition_id,
                message,
            } => {
                write!(
                    f,
                    "{}\n",
                    format!("Jira API error ({}) on {}", status, endpoint).red().bold()
                )?;
                if !message.is_empty() {
                    write!(f, "   {}\n", message.dimmed())?;
                }
                if let Some(id) = transition_id {
                    write!(f, "\n   Attempted transition: {}\n", id.yellow())?;
                    write!(f, "   List the allowed ones: {}", "jira get-status-list <ticket>".green())
                } else if *status == 401 || *status == 403 {
                    write!(f, "\n   {}\n", "Your API key may have expired or is invalid".dimmed())?;
                    write!(f, "   Update it: {}", "jira config set jira.api_key <key>".green())
                } else if *status == 404 {
                    write!(f, "\n   {}", "The resource doesn't exist or you don't have access to it".dimmed())
                } else {
                    write!(f, "\n   Try again or check your network connection")
                }
            }
            JiraError::EmptyDevStatus { issue_id } => {
                write!(
                    f,
                    "{}\n",
                    format!("No development information for issue {}", issue_id).red().bold()
                )?;
                write!(f, "   {}", "The dev-status response contained no detail entries".dimmed())
            }
            JiraError::MalformedField { field, reason } => {
                write!(f, "{}\n", format!("Malformed field '{}'", field).red().bold())?;
                write!(f, "   {}\n\n", reason.dimmed())?;
                write!(f, "   The server-side format of this field may have changed")
            }
            JiraError::PaginationProtocol { endpoint, reason } => {
                write!(
                    f,
                    "{}\n",
                    format!("Unexpected paginated response from {}", endpoint).red().bold()
                )?;
                write!(f, "   {}", reason.dimmed())
            }

            JiraError::Timeout { endpoint, after } => {
                let label = match after {
                    Some(after) => format!("Request to {} timed out after {:?}", endpoint, after),
                    None => format!("Request to {} timed out", endpoint),
                };
                write!(f, "{}\n", label.red().bold())?;
                write!(f, "   Raise the limit with {} or {}", "--timeout".green(), "--deadline".green())
            }
            JiraError::NetworkError(msg) => {
                write!(f, "{}\n", "Network error".red().bold())?;
                write!(f, "   {}\n\n", msg.dimmed())?;
                write!(f, "   To fix:\n")?;
                write!(f, "   1. Check your internet connection\n")?;
                write!(f, "   2. Verify you can reach the Jira host\n")?;
                write!(f, "   3. Try again in a moment")
            }
            JiraError::Decode { endpoint, reason } => {
                write!(
                    f,
                    "{}\n",
                    format!("Failed to parse response from {}", endpoint).red().bold()
                )?;
                write!(f, "   {}", reason.dimmed())
            }

            // Generic
            JiraError::Other(msg) => {
                write!(f, "{}\n", "Error".red().bold())?;
                write!(f, "   {}", msg.dimmed())
            }
        }
    }
}

impl std::error::Error for JiraError {}

// Conversion from anyhow::Error
impl From<anyhow::Error> for JiraError {
    fn from(err: anyhow::Error) -> Self {
        JiraError::Other(format!("{:#}", err))
    }
}

impl From<std::io::Error> for JiraError {
    fn from(err: std::io::Error) -> Self {
        JiraError::Other(err.to_string())
    }
}

impl From<reqwest::Error> for JiraError {
    fn from(err: reqwest::Error) -> Self {
        let endpoint = err.url().map(endpoint_of).unwrap_or_default();

        if err.is_timeout() {
            JiraError::Timeout {
                endpoint,
                after: None,
            }
        } else if err.is_connect() {
            JiraError::NetworkError(err.to_string())
        } else if let Some(status) = err.status() {
            JiraError::remote(status.as_u16(), &endpoint, err.to_string())
        } else if err.is_decode() {
            JiraError::Decode {
                endpoint,
                reason: err.to_string(),
            }
        } else {
            JiraError::NetworkError(err.to_string())
        }
    }
}

/// Path relative to the `/rest/` base, as every other variant reports it.
fn endpoint_of(url: &reqwest::Url) -> String {
    let path = url.path();
    match path.split_once("/rest/") {
        Some((_, endpoint)) => endpoint.to_string(),
        None => path.trim_start_matches('/').to_string(),
    }
}

pub type Result<T> = std::result::Result<T, JiraError>;
