//! Device session capability
//!
//! The collector only needs "send a command, get text back". Establishing and
//! tearing down the channel belongs to a `SessionConnector`.

use crate::error::{CommandExecutionError, ConnectionError};
use crate::types::DeviceEndpoint;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// An established command channel to a network device
pub trait DeviceSession {
    /// Run one command and return its decoded output. Blocks until the
    /// command finishes or the session gives up on it.
    fn send_command(&mut self, command: &str) -> Result<String, CommandExecutionError>;

    /// Release the session
    fn close(self)
    where
        Self: Sized,
    {
    }
}

/// Opens sessions for a device endpoint
pub trait SessionConnector {
    type Session: DeviceSession;

    fn connect(&self, endpoint: &DeviceEndpoint) -> Result<Self::Session, ConnectionError>;
}

/// Session fake with canned replies per command
///
/// Commands without a scripted reply fail with a device error.
#[derive(Debug, Default)]
pub struct ScriptedSession {
    replies: HashMap<String, Result<String, CommandExecutionError>>,
    sent: Arc<Mutex<Vec<String>>>,
    closed: Arc<AtomicBool>,
}

impl ScriptedSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply to `command` with `output`
    pub fn reply(mut self, command: &str, output: &str) -> Self {
        self.replies
            .insert(command.to_string(), Ok(output.to_string()));
        self
    }

    /// Fail `command` with `error`
    pub fn fail(mut self, command: &str, error: CommandExecutionError) -> Self {
        self.replies.insert(command.to_string(), Err(error));
        self
    }

    /// Commands sent so far, in order
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

impl DeviceSession for ScriptedSession {
    fn send_command(&mut self, command: &str) -> Result<String, CommandExecutionError> {
        self.sent.lock().unwrap().push(command.to_string());

        match self.replies.get(command) {
            Some(reply) => reply.clone(),
            None => Err(CommandExecutionError::Device(format!(
                "% Invalid input detected: {}",
                command
            ))),
        }
    }

    fn close(self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Connector fake handing out a scripted session, or refusing to connect
pub struct ScriptedConnector {
    session: Mutex<Option<ScriptedSession>>,
    refuse: Option<String>,
    sent: Arc<Mutex<Vec<String>>>,
    closed: Arc<AtomicBool>,
    connect_attempts: Mutex<usize>,
}

impl ScriptedConnector {
    pub fn new(session: ScriptedSession) -> Self {
        Self {
            sent: Arc::clone(&session.sent),
            closed: Arc::clone(&session.closed),
            session: Mutex::new(Some(session)),
            refuse: None,
            connect_attempts: Mutex::new(0),
        }
    }

    /// Connector whose every connect attempt fails with `detail`
    pub fn unreachable(detail: &str) -> Self {
        let mut connector = Self::new(ScriptedSession::new());
        connector.refuse = Some(detail.to_string());
        connector
    }

    /// Commands the handed-out session received
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    /// Whether the handed-out session was released
    pub fn session_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn connect_attempts(&self) -> usize {
        *self.connect_attempts.lock().unwrap()
    }
}

impl SessionConnector for ScriptedConnector {
    type Session = ScriptedSession;

    fn connect(&self, endpoint: &DeviceEndpoint) -> Result<ScriptedSession, ConnectionError> {
        *self.connect_attempts.lock().unwrap() += 1;

        if let Some(detail) = &self.refuse {
            return Err(ConnectionError::Unreachable {
                host: endpoint.host().to_string(),
                detail: detail.clone(),
            });
        }

        self.session
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| ConnectionError::Unreachable {
                host: endpoint.host().to_string(),
                detail: "scripted session already handed out".to_string(),
            })
    }
}
