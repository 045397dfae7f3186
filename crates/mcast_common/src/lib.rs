//! mcast_common - collection and narrative analysis of router multicast state
//!
//! Two stages run in strict sequence:
//! - `collector` drives a device session through an ordered command list
//! - `analyzer` turns the collected output into a single prompt and asks a
//!   local completion service for a plain-language summary
//!
//! Session transport and the model itself live behind the `session` and
//! `llm_client` traits.

pub mod analyzer;
pub mod collector;
pub mod config;
pub mod error;
pub mod llm_client;
pub mod pipeline;
pub mod prompt;
pub mod session;
pub mod types;

pub use analyzer::NarrativeAnalyzer;
pub use collector::StateCollector;
pub use config::{AppConfig, SshOptions};
pub use error::{AnalysisError, CommandExecutionError, ConfigError, ConnectionError};
pub use llm_client::{CompletionClient, HttpCompletionClient, LlmConfig};
pub use pipeline::{collect_state, run_analysis};
pub use prompt::{build_prompt, ANALYSIS_PREAMBLE};
pub use session::{DeviceSession, SessionConnector};
pub use types::*;
