//! mcastctl configuration
//!
//! Configuration lives in `<config_dir>/mcastctl/config.toml` unless a path is
//! given explicitly. Every field has a default, so a missing default file is
//! not an error.
//!
//! ```toml
//! [llm]
//! endpoint = "http://localhost:11434"
//! model = "llama3.2"
//!
//! [ssh]
//! port = 22
//! command_timeout_secs = 60
//!
//! [collection]
//! commands = ["show ip mroute", "show ip pim neighbor"]
//! ```

use crate::error::ConfigError;
use crate::llm_client::LlmConfig;
use crate::types::{CommandSpec, MULTICAST_COMMANDS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_DIR_NAME: &str = "mcastctl";
const CONFIG_FILE: &str = "config.toml";

/// Settings for the system `ssh` client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SshOptions {
    /// ssh client binary
    pub binary: String,

    pub port: u16,

    /// Passed to ssh as ConnectTimeout
    pub connect_timeout_secs: u64,

    /// Upper bound for a single command, connection included
    pub command_timeout_secs: u64,

    /// Value for StrictHostKeyChecking (yes, accept-new, no)
    pub strict_host_key_checking: String,

    /// Harmless command run once to prove the session works
    pub probe_command: String,
}

impl Default for SshOptions {
    fn default() -> Self {
        Self {
            binary: "ssh".to_string(),
            port: 22,
            connect_timeout_secs: 10,
            command_timeout_secs: 60,
            strict_host_key_checking: "accept-new".to_string(),
            probe_command: "show clock".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionSettings {
    pub commands: Vec<String>,
}

impl Default for CollectionSettings {
    fn default() -> Self {
        Self {
            commands: MULTICAST_COMMANDS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub ssh: SshOptions,
    pub collection: CollectionSettings,
}

/// Default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE))
}

impl AppConfig {
    /// Load configuration without validating it, so command line overrides
    /// can still be applied before `validate`.
    ///
    /// An explicit path must exist. Without one the default location is
    /// tried and a missing file means built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.command_spec()?;

        if !(self.llm.endpoint.starts_with("http://") || self.llm.endpoint.starts_with("https://"))
        {
            return Err(ConfigError::Invalid(format!(
                "llm.endpoint must be an http(s) URL, got '{}'",
                self.llm.endpoint
            )));
        }
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::Invalid("llm.model must not be empty".to_string()));
        }
        if self.llm.timeout_secs == 0 {
            return Err(ConfigError::Invalid("llm.timeout_secs must be positive".to_string()));
        }
        if self.ssh.connect_timeout_secs == 0 || self.ssh.command_timeout_secs == 0 {
            return Err(ConfigError::Invalid("ssh timeouts must be positive".to_string()));
        }

        Ok(())
    }

    /// Validated command list
    pub fn command_spec(&self) -> Result<CommandSpec, ConfigError> {
        CommandSpec::new(self.collection.commands.iter().cloned())
    }
}
