use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub jira: JiraConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct JiraConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify_ssl: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Settings {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            anyhow::bail!(
                "Configuration not found at {}. Run 'jira config set jira.host <host>' to create it.",
                config_path.display()
            );
        }

        Self::load_from(&config_path)
    }

    /// Like [`Settings::load`], but a missing file (or an unset HOME) yields
    /// empty settings so environment variables alone are enough.
    pub fn load_or_default() -> Result<Self> {
        match Self::config_path() {
            Ok(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    fn load_from(path: &std::path::Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .context("Failed to read config file")?;

        Self::parse(&config_str)
    }

    pub fn parse(config_str: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(config_str)
            .context("Failed to parse config file")?;

        Ok(settings)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let config_str = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(&config_path, config_str)
            .context("Failed to write config file")?;

        // The file holds the API key.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&config_path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(&config_path, perms)?;
        }

        Ok(())
    }

    /// Updates one `section.field` key from its string form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let (section, field) = key
            .split_once('.')
            .context("Invalid key format. Use format: section.field (e.g., jira.host)")?;

        match (section, field) {
            ("jira", "host") => self.jira.host = Some(value.to_string()),
            ("jira", "api_key") => self.jira.api_key = Some(value.to_string()),
            ("jira", "verify_ssl") => {
                let verify = value
                    .parse::<bool>()
                    .context("jira.verify_ssl must be 'true' or 'false'")?;
                self.jira.verify_ssl = Some(verify);
            }
            ("jira", "timeout_secs") => {
                let secs = value
                    .parse::<u64>()
                    .context("jira.timeout_secs must be a whole number of seconds")?;
                self.jira.timeout_secs = Some(secs);
            }
            _ => anyhow::bail!("Unknown configuration key: {}", key),
        }

        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn config_dir() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .context("HOME environment variable not set")?;
        Ok(PathBuf::from(home).join(".jirakit"))
    }
}

/// Shows the first and last four characters of a secret.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}***{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serialization() {
        let settings = Settings {
            jira: JiraConfig {
                host: Some("jira.example.com".to_string()),
                api_key: Some("test-token".to_string()),
                verify_ssl: Some(false),
                timeout_secs: None,
            },
        };

        let toml_str = toml::to_string(&settings).unwrap();
        assert!(toml_str.contains("jira.example.com"));
        assert!(!toml_str.contains("timeout_secs"));

        let deserialized = Settings::parse(&toml_str).unwrap();
        assert_eq!(deserialized.jira.host.as_deref(), Some("jira.example.com"));
        assert_eq!(deserialized.jira.verify_ssl, Some(false));
    }

    #[test]
    fn test_parse_empty_file() {
        let settings = Settings::parse("").unwrap();
        assert!(settings.jira.host.is_none());
        assert!(settings.jira.api_key.is_none());
    }

    #[test]
    fn test_parse_invalid_file() {
        assert!(Settings::parse("[jira\nhost = ").is_err());
    }

    #[test]
    fn test_set_known_keys() {
        let mut settings = Settings::default();
        settings.set("jira.host", "jira.example.com").unwrap();
        settings.set("jira.verify_ssl", "false").unwrap();
        settings.set("jira.timeout_secs", "15").unwrap();

        assert_eq!(settings.jira.host.as_deref(), Some("jira.example.com"));
        assert_eq!(settings.jira.verify_ssl, Some(false));
        assert_eq!(settings.jira.timeout_secs, Some(15));
    }

    #[test]
    fn test_set_rejects_bad_input() {
        let mut settings = Settings::default();
        assert!(settings.set("host", "x").is_err());
        assert!(settings.set("jira.email", "x").is_err());
        assert!(settings.set("jira.verify_ssl", "maybe").is_err());
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("abcdefghijkl"), "abcd***ijkl");
        assert_eq!(mask_secret("short"), "*****");
    }
}
