use anyhow::{Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::config::traits::Configuration;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HubConfigError {
    #[error("spawner command cannot be empty")]
    EmptySpawnCommand,
    #[error("{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },
    #[error("default_url must start with '/': {0}")]
    RelativeDefaultUrl(String),
    #[error("authenticator_class cannot be empty")]
    EmptyAuthenticator,
    #[error("API tokens cannot be empty strings")]
    EmptyToken,
    #[error("API token maps to an empty username")]
    EmptyTokenUser,
}

/// How single-user servers are launched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerConfig {
    pub cmd: Vec<String>,
    /// Seconds the spawner waits for the server process to start
    pub start_timeout: u64,
    /// Seconds the hub waits for the server to answer HTTP
    pub http_timeout: u64,
    /// Path users land on after login
    pub default_url: String,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            cmd: vec!["jupyterhub-singleuser".to_string()],
            start_timeout: 60,
            http_timeout: 60,
            default_url: "/lab".to_string(),
        }
    }
}

impl SpawnerConfig {
    pub fn start_timeout(&self) -> Duration {
        Duration::from_secs(self.start_timeout)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout)
    }
}

/// Settings for the multi-user notebook hub that hosts the benchmark
/// environment.
///
/// The hub reads these values at its own startup; nothing here runs the hub.
/// Missing fields in a loaded file take the defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    pub spawner: SpawnerConfig,
    pub authenticator_class: String,
    /// Shared password for the dummy authenticator; empty accepts any password
    pub dummy_password: String,
    pub admin_users: BTreeSet<String>,
    /// Static bearer token -> username. The holder of a token acts as that user.
    pub api_tokens: BTreeMap<String, String>,
    pub allow_named_servers: bool,
    #[serde(skip)]
    pub path: PathBuf,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            spawner: SpawnerConfig::default(),
            authenticator_class: "dummy".to_string(),
            dummy_password: String::new(),
            admin_users: BTreeSet::from(["admin".to_string()]),
            api_tokens: BTreeMap::from([("jupyter-token".to_string(), "admin".to_string())]),
            allow_named_servers: true,
            path: PathBuf::new(),
        }
    }
}

impl HubConfig {
    /// User a bearer token authenticates as
    pub fn token_user(&self, token: &str) -> Option<&str> {
        self.api_tokens.get(token).map(String::as_str)
    }

    pub fn is_admin(&self, user: &str) -> bool {
        self.admin_users.contains(user)
    }

    /// Structural checks; returns the first problem found
    pub fn check(&self) -> Result<(), HubConfigError> {
        if self.spawner.cmd.is_empty() || self.spawner.cmd[0].trim().is_empty() {
            return Err(HubConfigError::EmptySpawnCommand);
        }
        if self.spawner.start_timeout == 0 {
            return Err(HubConfigError::ZeroTimeout {
                field: "start_timeout",
            });
        }
        if self.spawner.http_timeout == 0 {
            return Err(HubConfigError::ZeroTimeout {
                field: "http_timeout",
            });
        }
        if !self.spawner.default_url.starts_with('/') {
            return Err(HubConfigError::RelativeDefaultUrl(
                self.spawner.default_url.clone(),
            ));
        }
        if self.authenticator_class.trim().is_empty() {
            return Err(HubConfigError::EmptyAuthenticator);
        }
        for (token, user) in &self.api_tokens {
            if token.is_empty() {
                return Err(HubConfigError::EmptyToken);
            }
            if user.trim().is_empty() {
                return Err(HubConfigError::EmptyTokenUser);
            }
        }
        Ok(())
    }

    /// Tokens granted to users that are not admins
    pub fn non_admin_tokens(&self) -> Vec<(&str, &str)> {
        self.api_tokens
            .iter()
            .filter(|(_, user)| !self.is_admin(user))
            .map(|(t, u)| (t.as_str(), u.as_str()))
            .collect()
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize hub configuration")
    }
}

impl Configuration for HubConfig {
    fn config_path(&self) -> &PathBuf {
        &self.path
    }

    fn config_type(&self) -> &str {
        "hub"
    }

    fn validate(&self) -> anyhow::Result<()> {
        self.check()?;
        for (_, user) in self.non_admin_tokens() {
            warn!("API token grants access as non-admin user '{}'", user);
        }
        Ok(())
    }
}

/// Load hub configuration from a YAML file; missing keys take the defaults
pub fn load_hub_config(hub_config_path: &Path) -> Result<HubConfig> {
    if !hub_config_path.exists() {
        anyhow::bail!("Hub config file not found: {:?}", hub_config_path);
    }
    let contents = std::fs::read_to_string(hub_config_path)
        .with_context(|| format!("Failed to read hub config file: {:?}", hub_config_path))?;

    let mut config: HubConfig = serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse YAML from file: {:?}", hub_config_path))?;
    config.path = hub_config_path.to_path_buf();
    config.validate()?;

    debug!("Using {} configuration\n{:?}", config.config_type(), config);
    Ok(config)
}
