//! Data model shared by the collector and the analyzer

use crate::error::{AnalysisError, ConfigError};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashSet;
use std::fmt;

/// Diagnostic commands issued against the device, in prompt order
pub const MULTICAST_COMMANDS: [&str; 4] = [
    "show ip mroute",
    "show ip pim neighbor",
    "show ip igmp groups",
    "show ip mroute count",
];

/// Remote target for a collection run
#[derive(Clone, PartialEq, Eq)]
pub struct DeviceEndpoint {
    host: String,
    username: String,
    password: Option<String>,
}

impl DeviceEndpoint {
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: Option<String>,
    ) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            password,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Password, if the device is not reached with key authentication
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }
}

impl fmt::Debug for DeviceEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceEndpoint")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Ordered, duplicate-free list of commands to collect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    commands: Vec<String>,
}

impl CommandSpec {
    /// Build a command list, rejecting empty lists and repeated commands
    pub fn new<I, S>(commands: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let commands: Vec<String> = commands.into_iter().map(Into::into).collect();

        if commands.is_empty() {
            return Err(ConfigError::Invalid(
                "command list must contain at least one command".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for command in &commands {
            if command.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "command list contains a blank command".to_string(),
                ));
            }
            if !seen.insert(command.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "command '{}' is listed more than once",
                    command
                )));
            }
        }

        Ok(Self { commands })
    }

    /// The four multicast diagnostics
    pub fn multicast() -> Self {
        Self {
            commands: MULTICAST_COMMANDS.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Default for CommandSpec {
    fn default() -> Self {
        Self::multicast()
    }
}

/// Per-command output lines, kept in collection order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutputs {
    entries: Vec<(String, Vec<String>)>,
}

impl CommandOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store output for a command. A repeated command replaces its earlier
    /// entry in place so keys stay unique and order is unchanged.
    pub fn insert(&mut self, command: impl Into<String>, lines: Vec<String>) {
        let command = command.into();
        match self.entries.iter_mut().find(|(key, _)| *key == command) {
            Some((_, existing)) => *existing = lines,
            None => self.entries.push((command, lines)),
        }
    }

    pub fn get(&self, command: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(key, _)| key == command)
            .map(|(_, lines)| lines.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, lines)| (key.as_str(), lines.as_slice()))
    }

    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for CommandOutputs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (command, lines) in &self.entries {
            map.serialize_entry(command, lines)?;
        }
        map.end()
    }
}

/// Prompt text submitted to the completion service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisPrompt(String);

impl AnalysisPrompt {
    pub fn new(text: String) -> Self {
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Narrative text on success, the failure reason otherwise
pub type NarrativeResult = Result<String, AnalysisError>;

/// Everything a single run produced
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub outputs: CommandOutputs,
    pub narrative: NarrativeResult,
}
