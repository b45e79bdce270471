use std::io::{self, Read};
use std::process::{Child, Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::error::ProbeError;

/// Line pmgsh writes to stderr when a request succeeded.
pub const SUCCESS_MARKER: &str = "200 OK";

const POLL_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_status: i32,
}

impl CommandOutput {
    pub fn is_clean(&self) -> bool {
        let stderr = self.stderr.trim();
        self.exit_status == 0 && (stderr.is_empty() || stderr == SUCCESS_MARKER)
    }

    /// Error text worth showing the operator, if any.
    pub fn error_echo(&self) -> Option<&str> {
        let stderr = self.stderr.trim();
        (!self.is_clean() && !stderr.is_empty()).then_some(stderr)
    }
}

/// Executes an external command and captures its output.
pub trait CommandRunner {
    fn run(&self, command: &[String]) -> Result<CommandOutput, ProbeError>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, command: &[String]) -> Result<CommandOutput, ProbeError> {
        (**self).run(command)
    }
}

/// Runs commands as real child processes.
///
/// Without a timeout the call blocks until the child exits. With one, the
/// child is killed once the limit passes and [`ProbeError::Timeout`] is
/// returned.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    timeout: Option<Duration>,
}

impl SystemRunner {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, command: &[String]) -> Result<CommandOutput, ProbeError> {
        let start_time = Instant::now();
        let Some((program, args)) = command.split_first() else {
            return Err(ProbeError::ExecutableNotFound {
                command: Vec::new(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "empty command"),
            });
        };

        info!(action = "start", component = "command_runner", command = ?command, "Running command");

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ProbeError::ExecutableNotFound {
                command: command.to_vec(),
                source,
            })?;

        let output = match self.timeout {
            None => child
                .wait_with_output()
                .map_err(|source| ProbeError::CommandIo {
                    command: command.to_vec(),
                    source,
                })?,
            Some(limit) => wait_with_deadline(child, limit, command)?,
        };

        let result = CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_status: output.status.code().unwrap_or(-1),
        };

        if !result.is_clean() {
            warn!(
                action = "complete",
                component = "command_runner",
                command = ?command,
                exit_status = result.exit_status,
                stderr = result.stderr.trim(),
                "Command reported an error"
            );
        }
        if let Some(stderr) = result.error_echo() {
            // Operators read stdout, so the error stream goes there too.
            println!("{stderr}\n");
        }

        info!(
            action = "complete",
            component = "command_runner",
            exit_status = result.exit_status,
            stdout_bytes = result.stdout.len(),
            duration_ms = start_time.elapsed().as_millis(),
            "Command finished"
        );
        Ok(result)
    }
}

fn wait_with_deadline(
    mut child: Child,
    limit: Duration,
    command: &[String],
) -> Result<Output, ProbeError> {
    let io_error = |source| ProbeError::CommandIo {
        command: command.to_vec(),
        source,
    };

    // Pipes are drained on their own threads so a chatty child cannot block on
    // a full pipe while we wait for it.
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let stdout_reader = thread::spawn(move || drain(stdout));
    let stderr_reader = thread::spawn(move || drain(stderr));

    let deadline = Instant::now() + limit;
    let status = loop {
        match child.try_wait().map_err(io_error)? {
            Some(status) => break status,
            None if Instant::now() >= deadline => {
                if let Err(e) = child.kill() {
                    warn!(action = "kill", component = "command_runner", error = %e, "Failed to kill timed out command");
                }
                if let Err(e) = child.wait() {
                    warn!(action = "reap", component = "command_runner", error = %e, "Failed to reap timed out command");
                }
                return Err(ProbeError::Timeout {
                    command: command.to_vec(),
                    timeout_secs: limit.as_secs(),
                });
            }
            None => thread::sleep(POLL_INTERVAL),
        }
    };

    Ok(Output {
        status,
        stdout: stdout_reader.join().unwrap_or_default(),
        stderr: stderr_reader.join().unwrap_or_default(),
    })
}

fn drain<R: Read>(pipe: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        if let Err(e) = pipe.read_to_end(&mut buf) {
            warn!(action = "read", component = "command_runner", error = %e, "Failed to read command output");
        }
    }
    buf
}
