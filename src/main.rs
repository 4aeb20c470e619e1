use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use colored::*;
use jirakit::api::dev_status::DEFAULT_APPLICATION_TYPE;
use jirakit::config::settings::{mask_secret, Settings};
use jirakit::{ClientConfig, JiraClient, NewTicket, Overrides};
use serde::Serialize;
use std::time::Duration;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "jira")]
#[command(version)]
#[command(about = "Jira tickets, sprints and epics from the command line", long_about = None)]
struct Cli {
    /// -v info, -vv debug, -vvv trace
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// (e.g., jira.company.com) falls back to $JIRA_HOST
    #[arg(long, global = true)]
    host: Option<String>,

    /// Falls back to $JIRA_API_KEY
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long, global = true)]
    insecure: bool,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Upper bound in seconds for a whole paginated fetch
    #[arg(long, global = true)]
    deadline: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search Jira tickets using JQL
    Search {
        jql: String,

        /// Comma-separated fields to return (default: summary, reporter,
        /// description, assignee, labels, status)
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
    },

    /// Get all open tickets of an epic
    GetEpicTickets {
        project_id: String,
        epic_key: String,

        /// Keep tickets that are already Done
        #[arg(long)]
        include_done: bool,
    },

    /// Post a comment on a ticket
    Comment { ticket_key: String, comment: String },

    /// Get active and future sprints of a board
    GetSprints { board_id: String },

    /// Get a simplified ticket
    GetTicket { ticket_key: String },

    /// Move a ticket through a transition (see get-status-list)
    UpdateStatus {
        ticket_key: String,
        transition_id: String,
    },

    /// Get the transitions available for a ticket
    GetStatusList { ticket_key: String },

    /// Assign a user to a ticket
    Assign { ticket_key: String, username: String },

    /// Get branches and pull requests linked to a ticket
    GetPrs {
        /// Ticket key or numeric issue id
        ticket: String,

        #[arg(long, default_value = DEFAULT_APPLICATION_TYPE)]
        application_type: String,
    },

    /// Get all epics of a board
    GetEpics {
        board_id: String,

        /// Include epics that are done
        #[arg(long)]
        include_done: bool,
    },

    /// Create a new ticket in a sprint
    CreateTicket {
        project_id: String,
        summary: String,
        issue_type_id: String,
        sprint_id: u64,

        #[arg(long, default_value = "")]
        description: String,

        /// Epic key to link the ticket to
        #[arg(long)]
        epic: Option<String>,
    },

    /// Manage the settings file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Display current configuration (with masked secrets)
    Show,

    /// Set a specific configuration value
    Set {
        /// Configuration key (e.g., jira.host, jira.api_key, jira.verify_ssl)
        key: String,
        /// New value
        value: String,
    },

    /// Check the connection with the resolved configuration
    Validate,

    /// Get the path to the config file
    Path,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            host: self.host.clone(),
            api_key: self.api_key.clone(),
            verify_ssl: self.insecure.then_some(false),
            timeout: self.timeout.map(Duration::from_secs),
            deadline: self.deadline.map(Duration::from_secs),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let overrides = cli.overrides();

    let result = match cli.command {
        None => handle_help(),

        Some(Commands::Search { jql, fields }) => handle_search(&overrides, &jql, &fields).await,

        Some(Commands::GetEpicTickets {
            project_id,
            epic_key,
            include_done,
        }) => handle_epic_tickets(&overrides, &project_id, &epic_key, include_done).await,

        Some(Commands::Comment {
            ticket_key,
            comment,
        }) => handle_comment(&overrides, &ticket_key, &comment).await,

        Some(Commands::GetSprints { board_id }) => handle_sprints(&overrides, &board_id).await,

        Some(Commands::GetTicket { ticket_key }) => handle_ticket(&overrides, &ticket_key).await,

        Some(Commands::UpdateStatus {
            ticket_key,
            transition_id,
        }) => handle_update_status(&overrides, &ticket_key, &transition_id).await,

        Some(Commands::GetStatusList { ticket_key }) => {
            handle_status_list(&overrides, &ticket_key).await
        }

        Some(Commands::Assign {
            ticket_key,
            username,
        }) => handle_assign(&overrides, &ticket_key, &username).await,

        Some(Commands::GetPrs {
            ticket,
            application_type,
        }) => handle_prs(&overrides, &ticket, &application_type).await,

        Some(Commands::GetEpics {
            board_id,
            include_done,
        }) => handle_epics(&overrides, &board_id, include_done).await,

        Some(Commands::CreateTicket {
            project_id,
            summary,
            issue_type_id,
            sprint_id,
            description,
            epic,
        }) => {
            let ticket = NewTicket {
                project_id,
                summary,
                description,
                issue_type_id,
                sprint_id,
                epic,
            };
            handle_create_ticket(&overrides, &ticket).await
        }

        Some(Commands::Config { action }) => handle_config(&overrides, action).await,
    };

    if let Err(e) = result {
        eprintln!("\n{:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    // stdout carries command output only.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    tracing::debug!("Tracing initialized with level: {}", level);
}

fn connect(overrides: &Overrides) -> anyhow::Result<JiraClient> {
    let config = ClientConfig::resolve(overrides.clone())?;
    Ok(JiraClient::new(config)?)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn handle_help() -> anyhow::Result<()> {
    Cli::command().print_help()?;
    println!();
    Ok(())
}

async fn handle_search(overrides: &Overrides, jql: &str, fields: &[String]) -> anyhow::Result<()> {
    let jira = connect(overrides)?;
    let fields: Vec<&str> = fields.iter().map(String::as_str).collect();

    let tickets = jira.search_tickets(jql, &fields).await?;
    print_json(&tickets)
}

async fn handle_epic_tickets(
    overrides: &Overrides,
    project_id: &str,
    epic_key: &str,
    include_done: bool,
) -> anyhow::Result<()> {
    let jira = connect(overrides)?;

    let tickets = jira
        .get_tickets_for_epic(project_id, epic_key, include_done)
        .await?;
    print_json(&tickets)
}

async fn handle_comment(overrides: &Overrides, ticket_key: &str, comment: &str) -> anyhow::Result<()> {
    let jira = connect(overrides)?;

    jira.post_comment(ticket_key, comment).await?;

    println!("{}", format!("✓ Comment posted on {}", ticket_key).green());
    Ok(())
}

async fn handle_sprints(overrides: &Overrides, board_id: &str) -> anyhow::Result<()> {
    let jira = connect(overrides)?;

    let sprints = jira.get_sprints(board_id).await?;
    print_json(&sprints)
}

async fn handle_ticket(overrides: &Overrides, ticket_key: &str) -> anyhow::Result<()> {
    let jira = connect(overrides)?;

    let ticket = jira.get_ticket(ticket_key).await?;
    print_json(&ticket)
}

async fn handle_update_status(
    overrides: &Overrides,
    ticket_key: &str,
    transition_id: &str,
) -> anyhow::Result<()> {
    let jira = connect(overrides)?;

    jira.update_ticket_status(ticket_key, transition_id).await?;

    println!(
        "{}",
        format!("✓ {} moved with transition {}", ticket_key, transition_id).green()
    );
    Ok(())
}

async fn handle_status_list(overrides: &Overrides, ticket_key: &str) -> anyhow::Result<()> {
    let jira = connect(overrides)?;

    let transitions = jira.get_available_statuses(ticket_key).await?;
    print_json(&transitions)
}

async fn handle_assign(overrides: &Overrides, ticket_key: &str, username: &str) -> anyhow::Result<()> {
    let jira = connect(overrides)?;

    jira.assign_user(ticket_key, username).await?;

    println!(
        "{}",
        format!("✓ {} assigned to {}", ticket_key, username).green()
    );
    Ok(())
}

async fn handle_prs(overrides: &Overrides, ticket: &str, application_type: &str) -> anyhow::Result<()> {
    let jira = connect(overrides)?;

    let issue_id = jira.resolve_issue_id(ticket).await?;
    let linked = jira
        .get_linked_pull_requests(&issue_id, application_type)
        .await?;
    print_json(&linked)
}

async fn handle_epics(overrides: &Overrides, board_id: &str, include_done: bool) -> anyhow::Result<()> {
    let jira = connect(overrides)?;

    let epics = jira.get_epics(board_id, include_done).await?;
    print_json(&epics)
}

async fn handle_create_ticket(overrides: &Overrides, ticket: &NewTicket) -> anyhow::Result<()> {
    let jira = connect(overrides)?;

    let created = jira.create_ticket(ticket).await?;
    print_json(&created)
}

async fn handle_config(overrides: &Overrides, action: ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            let settings = Settings::load()?;
            let not_set = || "(not set)".dimmed().to_string();

            println!("{}", "Current Configuration".cyan().bold());
            println!();

            println!("{}", "[jira]".bold());
            println!(
                "  {} {}",
                "host:".dimmed(),
                settings
                    .jira
                    .host
                    .as_deref()
                    .map(|host| host.bright_white().to_string())
                    .unwrap_or_else(not_set)
            );
            println!(
                "  {} {}",
                "api_key:".dimmed(),
                settings
                    .jira
                    .api_key
                    .as_deref()
                    .map(|key| mask_secret(key).yellow().to_string())
                    .unwrap_or_else(not_set)
            );
            println!(
                "  {} {}",
                "verify_ssl:".dimmed(),
                settings
                    .jira
                    .verify_ssl
                    .map(|verify| verify.to_string().bright_white().to_string())
                    .unwrap_or_else(not_set)
            );
            println!(
                "  {} {}",
                "timeout_secs:".dimmed(),
                settings
                    .jira
                    .timeout_secs
                    .map(|secs| secs.to_string().bright_white().to_string())
                    .unwrap_or_else(not_set)
            );

            Ok(())
        }

        ConfigAction::Set { key, value } => {
            let mut settings = Settings::load_or_default()?;
            settings.set(&key, &value)?;
            settings.save()?;

            let shown = if key == "jira.api_key" {
                mask_secret(&value)
            } else {
                value
            };
            println!("{}", format!("✓ Updated {} to: {}", key, shown).green().bold());
            println!();
            println!("{}", "Configuration saved successfully!".green());

            Ok(())
        }

        ConfigAction::Validate => {
            println!("{}", "Validating configuration...".cyan().bold());
            println!();

            let jira = connect(overrides)?;
            println!("  {} {}", "Jira:".dimmed(), jira.base_url().bright_white());

            let myself = jira.test_connection().await?;
            let who = myself
                .get("displayName")
                .or_else(|| myself.get("name"))
                .and_then(|name| name.as_str())
                .unwrap_or("unknown user");

            println!();
            println!("{}", format!("✓ Connected as {}", who).green().bold());

            Ok(())
        }

        ConfigAction::Path => {
            let config_path = Settings::config_path()?;
            println!("{}", config_path.display());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_parses() {
        let cli = Cli::try_parse_from(["jira"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_search_fields_are_comma_separated() {
        let cli = Cli::try_parse_from([
            "jira",
            "search",
            "project = ABC",
            "--fields",
            "summary,status",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Search { jql, fields }) => {
                assert_eq!(jql, "project = ABC");
                assert_eq!(fields, vec!["summary", "status"]);
            }
            _ => panic!("expected search command"),
        }
    }

    #[test]
    fn test_global_flags_become_overrides() {
        let cli = Cli::try_parse_from([
            "jira",
            "get-ticket",
            "ABC-1",
            "--host",
            "jira.example.com",
            "--insecure",
            "--timeout",
            "5",
            "--deadline",
            "60",
            "-vv",
        ])
        .unwrap();

        let overrides = cli.overrides();
        assert_eq!(overrides.host.as_deref(), Some("jira.example.com"));
        assert_eq!(overrides.api_key, None);
        assert_eq!(overrides.verify_ssl, Some(false));
        assert_eq!(overrides.timeout, Some(Duration::from_secs(5)));
        assert_eq!(overrides.deadline, Some(Duration::from_secs(60)));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_verification_untouched_without_insecure() {
        let cli = Cli::try_parse_from(["jira", "get-sprints", "5"]).unwrap();
        assert_eq!(cli.overrides().verify_ssl, None);
    }

    #[test]
    fn test_get_prs_default_application_type() {
        let cli = Cli::try_parse_from(["jira", "get-prs", "ABC-1"]).unwrap();
        match cli.command {
            Some(Commands::GetPrs {
                ticket,
                application_type,
            }) => {
                assert_eq!(ticket, "ABC-1");
                assert_eq!(application_type, "githube");
            }
            _ => panic!("expected get-prs command"),
        }
    }

    #[test]
    fn test_create_ticket_arguments() {
        let cli = Cli::try_parse_from([
            "jira",
            "create-ticket",
            "10000",
            "Fix login",
            "3",
            "42",
            "--epic",
            "ABC-7",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::CreateTicket {
                project_id,
                summary,
                issue_type_id,
                sprint_id,
                description,
                epic,
            }) => {
                assert_eq!(project_id, "10000");
                assert_eq!(summary, "Fix login");
                assert_eq!(issue_type_id, "3");
                assert_eq!(sprint_id, 42);
                assert_eq!(description, "");
                assert_eq!(epic.as_deref(), Some("ABC-7"));
            }
            _ => panic!("expected create-ticket command"),
        }
    }

    #[test]
    fn test_sprint_id_must_be_numeric() {
        let result = Cli::try_parse_from(["jira", "create-ticket", "10000", "x", "3", "next"]);
        assert!(result.is_err());
    }
}
