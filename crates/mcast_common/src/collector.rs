//! StateCollector - runs the diagnostic command list over a device session
//!
//! Every command gets an entry in the result. A failed command is recorded as
//! a single `Error: ...` line and collection moves on to the next command.

use crate::session::DeviceSession;
use crate::types::{CommandOutputs, CommandSpec};
use tracing::{debug, error, info};

/// Prefix marking a command whose output could not be collected
pub const ERROR_MARKER: &str = "Error: ";

/// Collects command output from a device session
#[derive(Debug, Clone, Default)]
pub struct StateCollector {
    commands: CommandSpec,
}

impl StateCollector {
    pub fn new(commands: CommandSpec) -> Self {
        Self { commands }
    }

    /// Run each command in order and gather its output lines
    pub fn collect<S>(&self, session: &mut S) -> CommandOutputs
    where
        S: DeviceSession + ?Sized,
    {
        let mut outputs = CommandOutputs::new();

        for command in self.commands.iter() {
            info!("Executing command: {}", command);

            match session.send_command(command) {
                Ok(text) => {
                    let lines = split_lines(&text);
                    debug!("{} returned {} lines", command, lines.len());
                    outputs.insert(command, lines);
                }
                Err(e) => {
                    error!("Error executing {}: {}", command, e);
                    outputs.insert(command, vec![format!("{}{}", ERROR_MARKER, e)]);
                }
            }
        }

        outputs
    }
}

/// Split on '\n' only; the lines themselves are kept as-is
fn split_lines(text: &str) -> Vec<String> {
    text.split('\n').map(str::to_string).collect()
}
