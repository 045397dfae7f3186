//! Device sessions over the system `ssh` client
//!
//! Each command runs as its own ssh exec request, which IOS answers without
//! paging. Password logins go through `sshpass -e` so the secret travels in
//! the environment rather than on the command line.

use mcast_common::{
    CommandExecutionError, ConnectionError, DeviceEndpoint, DeviceSession, SessionConnector,
    SshOptions,
};
use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// ssh reserves exit status 255 for its own failures
const SSH_TRANSPORT_EXIT: i32 = 255;

pub struct SshConnector {
    options: SshOptions,
}

impl SshConnector {
    pub fn new(options: SshOptions) -> Self {
        Self { options }
    }
}

impl SessionConnector for SshConnector {
    type Session = SshSession;

    fn connect(&self, endpoint: &DeviceEndpoint) -> Result<SshSession, ConnectionError> {
        let session = SshSession {
            endpoint: endpoint.clone(),
            options: self.options.clone(),
        };
        let host = endpoint.host().to_string();

        debug!("Probing {} with '{}'", host, self.options.probe_command);
        match session.execute(&self.options.probe_command) {
            Ok(_) => {
                info!("Connected to {} as {}", host, endpoint.username());
                Ok(session)
            }
            Err(RunFailure::Launch { program, source }) => {
                Err(ConnectionError::Launch { program, source })
            }
            Err(RunFailure::Command(CommandExecutionError::Timeout(secs))) => {
                Err(ConnectionError::Timeout { host, secs })
            }
            Err(RunFailure::Command(e)) => Err(ConnectionError::Unreachable {
                host,
                detail: e.to_string(),
            }),
        }
    }
}

/// A verified ssh login to one device
#[derive(Debug)]
pub struct SshSession {
    endpoint: DeviceEndpoint,
    options: SshOptions,
}

impl SshSession {
    fn program(&self) -> &str {
        if self.endpoint.password().is_some() {
            "sshpass"
        } else {
            &self.options.binary
        }
    }

    /// Arguments for the ssh client itself
    fn ssh_args(&self, remote_command: &str) -> Vec<String> {
        let mut args = vec![
            "-T".to_string(),
            "-p".to_string(),
            self.options.port.to_string(),
            "-l".to_string(),
            self.endpoint.username().to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={}", self.options.connect_timeout_secs),
            "-o".to_string(),
            format!("StrictHostKeyChecking={}", self.options.strict_host_key_checking),
            "-o".to_string(),
            "LogLevel=ERROR".to_string(),
        ];

        if self.endpoint.password().is_some() {
            args.push("-o".to_string());
            args.push("NumberOfPasswordPrompts=1".to_string());
        } else {
            args.push("-o".to_string());
            args.push("BatchMode=yes".to_string());
        }

        args.push(self.endpoint.host().to_string());
        args.push(remote_command.to_string());
        args
    }

    fn build_command(&self, remote_command: &str) -> Command {
        let mut command = Command::new(self.program());

        if let Some(password) = self.endpoint.password() {
            command.arg("-e").arg(&self.options.binary);
            command.env("SSHPASS", password);
        }

        command.args(self.ssh_args(remote_command));
        command
    }

    fn execute(&self, remote_command: &str) -> Result<String, RunFailure> {
        let timeout = Duration::from_secs(self.options.command_timeout_secs);
        let output = run_with_timeout(self.build_command(remote_command), timeout)?;

        match output.status.code() {
            Some(0) => Ok(decode_output(&output.stdout)),
            Some(SSH_TRANSPORT_EXIT) => Err(RunFailure::Command(CommandExecutionError::Transport(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ))),
            Some(code) => Err(RunFailure::Command(CommandExecutionError::NonZeroExit {
                code,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })),
            None => Err(RunFailure::Command(CommandExecutionError::Transport(
                "ssh terminated by signal".to_string(),
            ))),
        }
    }
}

impl DeviceSession for SshSession {
    fn send_command(&mut self, command: &str) -> Result<String, CommandExecutionError> {
        self.execute(command).map_err(|failure| match failure {
            RunFailure::Launch { program, source } => {
                CommandExecutionError::Transport(format!("failed to launch {}: {}", program, source))
            }
            RunFailure::Command(e) => e,
        })
    }

    fn close(self) {
        debug!("Releasing session to {}", self.endpoint.host());
    }
}

#[derive(Debug)]
enum RunFailure {
    Launch {
        program: String,
        source: std::io::Error,
    },
    Command(CommandExecutionError),
}

impl From<CommandExecutionError> for RunFailure {
    fn from(e: CommandExecutionError) -> Self {
        Self::Command(e)
    }
}

#[derive(Debug)]
struct CapturedOutput {
    status: ExitStatus,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

/// Run `command` to completion, killing it once `timeout` has passed
fn run_with_timeout(mut command: Command, timeout: Duration) -> Result<CapturedOutput, RunFailure> {
    let program = command.get_program().to_string_lossy().into_owned();

    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    // Own process group, so a timeout also reaches the ssh spawned by sshpass
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }

    let mut child = command
        .spawn()
        .map_err(|source| RunFailure::Launch { program, source })?;

    // Drain both pipes while waiting so a chatty command cannot block on a full pipe
    let stdout = child.stdout.take().map(spawn_reader);
    let stderr = child.stderr.take().map(spawn_reader);

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                warn!("Command exceeded {}s, killing it", timeout.as_secs());
                kill_process_group(&mut child);
                let _ = child.wait();
                return Err(CommandExecutionError::Timeout(timeout.as_secs()).into());
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                kill_process_group(&mut child);
                return Err(CommandExecutionError::Transport(e.to_string()).into());
            }
        }
    };

    Ok(CapturedOutput {
        status,
        stdout: join_reader(stdout),
        stderr: join_reader(stderr),
    })
}

#[cfg(unix)]
fn kill_process_group(child: &mut Child) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    // The child leads its group, so its pid is the group id
    if let Err(e) = killpg(Pid::from_raw(child.id() as i32), Signal::SIGKILL) {
        debug!("killpg({}) failed: {}, killing child only", child.id(), e);
        let _ = child.kill();
    }
}

#[cfg(not(unix))]
fn kill_process_group(child: &mut Child) {
    let _ = child.kill();
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn join_reader(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

/// Decode device output: CRLF becomes LF and the final line break is dropped
fn decode_output(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw).replace("\r\n", "\n");
    text.strip_suffix('\n').unwrap_or(&text).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(binary: &str) -> SshOptions {
        SshOptions {
            binary: binary.to_string(),
            ..SshOptions::default()
        }
    }

    fn session(password: Option<&str>) -> SshSession {
        SshSession {
            endpoint: DeviceEndpoint::new("192.0.2.10", "netops", password.map(str::to_string)),
            options: SshOptions::default(),
        }
    }

    #[test]
    fn test_key_auth_uses_batch_mode() {
        let session = session(None);
        let args = session.ssh_args("show ip mroute");

        assert_eq!(session.program(), "ssh");
        assert!(args.contains(&"BatchMode=yes".to_string()));
        assert!(args.contains(&"ConnectTimeout=10".to_string()));
        assert_eq!(&args[args.len() - 2..], ["192.0.2.10", "show ip mroute"]);
    }

    #[test]
    fn test_password_auth_goes_through_sshpass() {
        let session = session(Some("secret"));
        let command = session.build_command("show clock");

        assert_eq!(command.get_program(), "sshpass");
        let args: Vec<String> = command
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(&args[..2], ["-e", "ssh"]);
        assert!(!args.iter().any(|a| a.contains("secret")));
        assert!(!args.contains(&"BatchMode=yes".to_string()));
    }

    #[test]
    fn test_decode_output() {
        assert_eq!(decode_output(b"a\r\nb\r\n"), "a\nb");
        assert_eq!(decode_output(b"a\n\n"), "a\n");
        assert_eq!(decode_output(b""), "");
    }

    #[cfg(unix)]
    #[test]
    fn test_run_with_timeout_kills_slow_command() {
        let mut command = Command::new("sh");
        command.args(["-c", "sleep 5"]);

        let started = Instant::now();
        let result = run_with_timeout(command, Duration::from_secs(1));

        assert!(matches!(
            result,
            Err(RunFailure::Command(CommandExecutionError::Timeout(1)))
        ));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    /// A live (non-zombie) process with this pid exists
    #[cfg(target_os = "linux")]
    fn process_running(pid: u32) -> bool {
        match std::fs::read_to_string(format!("/proc/{}/stat", pid)) {
            // State follows the parenthesised command name
            Ok(stat) => stat
                .rsplit_once(") ")
                .map(|(_, rest)| !rest.starts_with('Z'))
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_timeout_kills_grandchildren() {
        let pid_file = tempfile::NamedTempFile::new().unwrap();
        let script = format!(
            "sleep 30 & echo $! > {}; wait",
            pid_file.path().display()
        );
        let mut command = Command::new("sh");
        command.args(["-c", &script]);

        let result = run_with_timeout(command, Duration::from_secs(1));
        assert!(matches!(
            result,
            Err(RunFailure::Command(CommandExecutionError::Timeout(1)))
        ));

        let pid: u32 = std::fs::read_to_string(pid_file.path())
            .unwrap()
            .trim()
            .parse()
            .unwrap();

        // SIGKILL delivery is asynchronous; give the kernel a moment
        let deadline = Instant::now() + Duration::from_secs(2);
        while process_running(pid) && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(20));
        }
        assert!(!process_running(pid), "sleep {} outlived the timeout", pid);
    }

    #[cfg(unix)]
    #[test]
    fn test_run_with_timeout_captures_output() {
        let mut command = Command::new("sh");
        command.args(["-c", "echo out; echo err >&2; exit 3"]);

        let output = run_with_timeout(command, Duration::from_secs(5)).unwrap();
        assert_eq!(output.status.code(), Some(3));
        assert_eq!(output.stdout, b"out\n");
        assert_eq!(output.stderr, b"err\n");
    }

    #[test]
    fn test_missing_client_is_launch_failure() {
        let connector = SshConnector::new(options("/nonexistent/bin/ssh"));
        let endpoint = DeviceEndpoint::new("192.0.2.10", "netops", None);

        assert!(matches!(
            connector.connect(&endpoint),
            Err(ConnectionError::Launch { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_probe_is_unreachable() {
        let connector = SshConnector::new(options("false"));
        let endpoint = DeviceEndpoint::new("192.0.2.10", "netops", None);

        assert!(matches!(
            connector.connect(&endpoint),
            Err(ConnectionError::Unreachable { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_commands_reach_the_client() {
        // `echo` stands in for ssh and prints the argument list back
        let connector = SshConnector::new(options("echo"));
        let endpoint = DeviceEndpoint::new("192.0.2.10", "netops", None);

        let mut session = connector.connect(&endpoint).unwrap();
        let output = session.send_command("show ip mroute count").unwrap();

        assert!(output.starts_with("-T -p 22 -l netops"));
        assert!(output.ends_with("192.0.2.10 show ip mroute count"));
        session.close();
    }
}
