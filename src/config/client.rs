use crate::config::settings::Settings;
use crate::errors::{JiraError, Result};
use std::fmt;
use std::time::Duration;

pub const HOST_ENV: &str = "JIRA_HOST";
pub const API_KEY_ENV: &str = "JIRA_API_KEY";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for one [`crate::JiraClient`]. Fixed once built.
#[derive(Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: String,
    pub verify_ssl: bool,
    pub timeout: Duration,
    /// Upper bound for a whole paginated fetch.
    pub deadline: Option<Duration>,
}

/// Values given explicitly on the command line or by the caller. They win
/// over the environment, which wins over the settings file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub host: Option<String>,
    pub api_key: Option<String>,
    pub verify_ssl: Option<bool>,
    pub timeout: Option<Duration>,
    pub deadline: Option<Duration>,
}

impl ClientConfig {
    pub fn new(host: &str, api_key: &str) -> Result<Self> {
        Self::from_sources(
            Overrides {
                host: Some(host.to_string()),
                api_key: Some(api_key.to_string()),
                ..Overrides::default()
            },
            |_| None,
            &Settings::default(),
        )
    }

    /// Resolves the configuration from overrides, `JIRA_HOST`/`JIRA_API_KEY`
    /// and `~/.jirakit/config.toml`.
    pub fn resolve(overrides: Overrides) -> Result<Self> {
        let settings = Settings::load_or_default()
            .map_err(|e| JiraError::Config(format!("{:#}", e)))?;

        Self::from_sources(overrides, |name| std::env::var(name).ok(), &settings)
    }

    pub fn from_sources<F>(overrides: Overrides, env: F, settings: &Settings) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = first_present([
            overrides.host,
            env(HOST_ENV),
            settings.jira.host.clone(),
        ])
        .ok_or_else(|| {
            JiraError::Config(format!("No Jira host given and {} is not set", HOST_ENV))
        })?;

        let api_key = first_present([
            overrides.api_key,
            env(API_KEY_ENV),
            settings.jira.api_key.clone(),
        ])
        .ok_or_else(|| {
            JiraError::Config(format!("No API key given and {} is not set", API_KEY_ENV))
        })?;

        let timeout = overrides
            .timeout
            .or(settings.jira.timeout_secs.map(Duration::from_secs))
            .unwrap_or(DEFAULT_TIMEOUT);

        Ok(Self {
            base_url: base_url_for(&host),
            api_key,
            verify_ssl: overrides
                .verify_ssl
                .or(settings.jira.verify_ssl)
                .unwrap_or(true),
            timeout,
            deadline: overrides.deadline,
        })
    }

    pub fn with_verify_ssl(mut self, verify_ssl: bool) -> Self {
        self.verify_ssl = verify_ssl;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

// Masks the API key.
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"***")
            .field("verify_ssl", &self.verify_ssl)
            .field("timeout", &self.timeout)
            .field("deadline", &self.deadline)
            .finish()
    }
}

fn first_present<const N: usize>(candidates: [Option<String>; N]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

/// A bare host gets `https://`; a value with a scheme is used as given.
pub fn base_url_for(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        format!("{}/rest", host)
    } else {
        format!("https://{}/rest", host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::JiraConfig;

    fn file_settings() -> Settings {
        Settings {
            jira: JiraConfig {
                host: Some("file.example.com".to_string()),
                api_key: Some("file-key".to_string()),
                verify_ssl: Some(false),
                timeout_secs: Some(5),
            },
        }
    }

    #[test]
    fn test_explicit_values_win() {
        let config = ClientConfig::from_sources(
            Overrides {
                host: Some("cli.example.com".to_string()),
                api_key: Some("cli-key".to_string()),
                ..Overrides::default()
            },
            |name| Some(format!("env-{}", name)),
            &file_settings(),
        )
        .unwrap();

        assert_eq!(config.base_url, "https://cli.example.com/rest");
        assert_eq!(config.api_key, "cli-key");
    }

    #[test]
    fn test_environment_beats_settings_file() {
        let config = ClientConfig::from_sources(
            Overrides::default(),
            |name| match name {
                HOST_ENV => Some("env.example.com".to_string()),
                API_KEY_ENV => Some("env-key".to_string()),
                _ => None,
            },
            &file_settings(),
        )
        .unwrap();

        assert_eq!(config.base_url, "https://env.example.com/rest");
        assert_eq!(config.api_key, "env-key");
        assert!(!config.verify_ssl);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_settings_file_is_last_resort() {
        let config =
            ClientConfig::from_sources(Overrides::default(), |_| None, &file_settings()).unwrap();
        assert_eq!(config.base_url, "https://file.example.com/rest");
        assert_eq!(config.api_key, "file-key");
    }

    #[test]
    fn test_missing_host_is_a_config_error() {
        let result = ClientConfig::from_sources(
            Overrides {
                api_key: Some("key".to_string()),
                ..Overrides::default()
            },
            |_| None,
            &Settings::default(),
        );
        match result {
            Err(JiraError::Config(msg)) => assert!(msg.contains(HOST_ENV)),
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_key_is_a_config_error() {
        let result = ClientConfig::from_sources(
            Overrides {
                host: Some("jira.example.com".to_string()),
                api_key: Some("   ".to_string()),
                ..Overrides::default()
            },
            |_| None,
            &Settings::default(),
        );
        assert!(matches!(result, Err(JiraError::Config(_))));
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new("jira.example.com", "key").unwrap();
        assert!(config.verify_ssl);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert!(config.deadline.is_none());
    }

    #[test]
    fn test_base_url_for() {
        assert_eq!(base_url_for("jira.example.com"), "https://jira.example.com/rest");
        assert_eq!(base_url_for("http://127.0.0.1:8080/"), "http://127.0.0.1:8080/rest");
    }

    #[test]
    fn test_debug_masks_api_key() {
        let config = ClientConfig::new("jira.example.com", "super-secret").unwrap();
        assert!(!format!("{:?}", config).contains("super-secret"));
    }

    #[test]
    fn test_builders_replace_resolved_values() {
        let config = ClientConfig::new("jira.example.com", "key")
            .unwrap()
            .with_verify_ssl(false)
            .with_timeout(Duration::from_secs(5))
            .with_deadline(Duration::from_secs(60));

        assert!(!config.verify_ssl);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.deadline, Some(Duration::from_secs(60)));
    }
}
