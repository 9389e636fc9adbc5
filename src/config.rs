//! Configuration loading for agentrelay.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::agent::AgentId;
use crate::error::{Error, Result};
use crate::monitoring::MonitorConfig;

/// Get the agentrelay home directory (~/.agentrelay).
pub fn get_home_dir() -> Result<PathBuf> {
    let home = directories::UserDirs::new()
        .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

    Ok(home.home_dir().join(".agentrelay"))
}

/// Get the settings file path.
pub fn get_settings_path() -> Result<PathBuf> {
    Ok(get_home_dir()?.join("settings.json"))
}

/// Load settings from ~/.agentrelay/settings.json
pub fn load_settings() -> Result<Settings> {
    load_settings_from(&get_settings_path()?)
}

/// Load settings from an explicit path, then apply environment overrides.
pub fn load_settings_from(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Err(Error::Config(format!(
            "Settings file not found at {}. Run 'agentrelay config init' first.",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path)?;
    let mut settings: Settings = serde_json::from_str(&content)?;
    settings.apply_env_overrides();
    validate_settings(&settings)?;

    tracing::debug!("Loaded settings from {}", path.display());
    Ok(settings)
}

/// Load settings or return default if not found.
pub fn load_settings_or_default() -> Settings {
    load_settings().unwrap_or_else(|e| {
        tracing::warn!("Failed to load settings: {}, using defaults", e);
        let mut settings = Settings::default();
        settings.apply_env_overrides();
        settings
    })
}

/// Write settings as pretty JSON, creating the parent directory.
pub fn save_settings_to(settings: &Settings, path: &Path) -> Result<()> {
    validate_settings(settings)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(settings)?)?;
    tracing::info!("Saved settings to {}", path.display());
    Ok(())
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    save_settings_to(settings, &get_settings_path()?)
}

fn validate_settings(settings: &Settings) -> Result<()> {
    if settings.agents.enabled.is_empty() {
        return Err(Error::Config(
            "agents.enabled must list at least one agent".to_string(),
        ));
    }

    let m = &settings.monitoring;
    for (name, rate) in [
        ("traces_sample_rate", m.traces_sample_rate),
        ("replays_session_sample_rate", m.replays_session_sample_rate),
        ("replays_on_error_sample_rate", m.replays_on_error_sample_rate),
    ] {
        if !(0.0..=1.0).contains(&rate) {
            return Err(Error::Config(format!(
                "monitoring.{} must be within 0.0..=1.0, got {}",
                name, rate
            )));
        }
    }

    if settings.web.port == 0 {
        return Err(Error::Config("web.port must be non-zero".to_string()));
    }
    Ok(())
}

/// Which agents get an inbox when the server starts.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Agents {
    #[serde(default = "default_enabled_agents")]
    pub enabled: Vec<AgentId>,
}

fn default_enabled_agents() -> Vec<AgentId> {
    AgentId::ALL.to_vec()
}

impl Default for Agents {
    fn default() -> Self {
        Self {
            enabled: default_enabled_agents(),
        }
    }
}

/// Web server configuration.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Web {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3333
}

impl Default for Web {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Contact form configuration.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Contact {
    /// Where `agentrelay contact` submits forms.
    #[serde(default = "default_submit_url")]
    pub submit_url: String,
    /// SQLite file for received submissions; defaults under the home dir.
    pub database_path: Option<PathBuf>,
}

fn default_submit_url() -> String {
    "http://127.0.0.1:3333/api/contact".to_string()
}

impl Default for Contact {
    fn default() -> Self {
        Self {
            submit_url: default_submit_url(),
            database_path: None,
        }
    }
}

impl Contact {
    pub fn resolved_database_path(&self) -> Result<PathBuf> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => Ok(get_home_dir()?.join("contact.db")),
        }
    }
}

/// Messaging endpoint configuration.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Messaging {
    #[serde(default = "default_endpoint_url")]
    pub endpoint_url: String,
    /// Telegram bot token used by the server-side relay.
    pub bot_token: Option<String>,
    /// Bot username used for chat deep links.
    pub bot_username: Option<String>,
}

fn default_endpoint_url() -> String {
    "http://127.0.0.1:3333/api/chat".to_string()
}

impl Default for Messaging {
    fn default() -> Self {
        Self {
            endpoint_url: default_endpoint_url(),
            bot_token: None,
            bot_username: None,
        }
    }
}

/// agentrelay settings.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Settings {
    #[serde(default)]
    pub agents: Agents,

    #[serde(default)]
    pub web: Web,

    #[serde(default)]
    pub contact: Contact,

    #[serde(default)]
    pub messaging: Messaging,

    #[serde(default)]
    pub monitoring: MonitorConfig,
}

impl Settings {
    /// Apply `AGENTRELAY_*` environment variables on top of file values.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(port) = lookup("AGENTRELAY_PORT") {
            match port.parse() {
                Ok(p) => self.web.port = p,
                Err(_) => tracing::warn!("Ignoring invalid AGENTRELAY_PORT '{}'", port),
            }
        }
        if let Some(token) = lookup("AGENTRELAY_BOT_TOKEN").filter(|t| !t.is_empty()) {
            self.messaging.bot_token = Some(token);
        }
        if let Some(dsn) = lookup("AGENTRELAY_DSN").filter(|d| !d.is_empty()) {
            self.monitoring.dsn = Some(dsn);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_from_empty_object() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.agents.enabled, AgentId::ALL.to_vec());
        assert_eq!(settings.web.port, 3333);
        assert_eq!(settings.web.host, "0.0.0.0");
        assert!(settings.messaging.bot_token.is_none());
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut settings = Settings::default();
        settings.agents.enabled = vec![AgentId::Lee, AgentId::Nicole];
        settings.web.port = 8080;
        save_settings_to(&settings, &path).unwrap();

        let loaded = load_settings_from(&path).unwrap();
        assert_eq!(loaded.agents.enabled, vec![AgentId::Lee, AgentId::Nicole]);
        assert_eq!(loaded.web.port, 8080);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_settings_from(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut settings = Settings::default();
        settings.agents.enabled.clear();
        assert!(validate_settings(&settings).is_err());

        let mut settings = Settings::default();
        settings.monitoring.traces_sample_rate = 1.5;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("AGENTRELAY_PORT", "9090"),
            ("AGENTRELAY_BOT_TOKEN", "123:abc"),
            ("AGENTRELAY_DSN", ""),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings.apply_overrides(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(settings.web.port, 9090);
        assert_eq!(settings.messaging.bot_token.as_deref(), Some("123:abc"));
        assert!(settings.monitoring.dsn.is_none());
    }

    #[test]
    fn test_invalid_port_override_is_ignored() {
        let mut settings = Settings::default();
        settings.apply_overrides(|k| (k == "AGENTRELAY_PORT").then(|| "not-a-port".to_string()));
        assert_eq!(settings.web.port, 3333);
    }
}
