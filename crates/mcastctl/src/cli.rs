//! Command line interface

use clap::{ArgAction, Parser};
use mcast_common::AppConfig;
use std::path::PathBuf;

// Version is embedded at build time
const VERSION: &str = env!("MCASTCTL_VERSION");

#[derive(Debug, Parser)]
#[command(name = "mcastctl")]
#[command(about = "Summarize router multicast state with a local language model", long_about = None)]
#[command(version = VERSION)]
pub struct Cli {
    /// Device address or hostname
    pub host: String,

    /// Login user on the device
    #[arg(short, long)]
    pub username: String,

    /// Login password (omit to use SSH keys)
    #[arg(short, long, env = "MCASTCTL_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Configuration file (default: <config dir>/mcastctl/config.toml)
    #[arg(long, env = "MCASTCTL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Completion service base URL, overrides the config file
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Model name, overrides the config file
    #[arg(long)]
    pub model: Option<String>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Collect command output and print it without analysis
    #[arg(long)]
    pub collect_only: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Apply command line overrides on top of the loaded configuration
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(endpoint) = &self.endpoint {
            config.llm.endpoint = endpoint.clone();
        }
        if let Some(model) = &self.model {
            config.llm.model = model.clone();
        }
    }
}
