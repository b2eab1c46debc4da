//! External command execution
//!
//! Build and discovery command lines carry `ENVFILE=` prefixes and shell
//! pipelines, so everything runs through `sh -c`.

use std::path::PathBuf;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

use rnsim_core::prelude::*;

/// Result of one external command invocation.
///
/// Failures are carried in the result, never raised past this boundary:
/// a nonzero exit or a spawn error sets `exit_failed` and fills `error`.
#[derive(Debug, Clone, Default)]
pub struct CommandResult {
    /// Captured stdout
    pub stdout: String,

    /// Whether the command failed (nonzero exit or spawn failure)
    pub exit_failed: bool,

    /// Raw error text (captured stderr, or the spawn error)
    pub error: Option<String>,
}

impl CommandResult {
    pub fn ok(&self) -> bool {
        !self.exit_failed
    }

    /// The error text, or an empty string when the command succeeded
    pub fn error_text(&self) -> String {
        self.error.clone().unwrap_or_default()
    }
}

/// Line-oriented event from a streaming child process
#[derive(Debug, Clone)]
pub enum StreamEvent {
    Stdout(String),
    Stderr(String),
    /// A stream-level read error on either pipe
    StreamError(String),
}

/// Handle to a process spawned with [`CommandRunner::spawn_streaming`].
///
/// The child itself is owned by a background reaper task; dropping this
/// handle stops line delivery but does not kill the process.
pub struct StreamingChild {
    /// Line events from both output streams, in arrival order
    pub events: mpsc::Receiver<StreamEvent>,
    pid: Option<u32>,
}

impl StreamingChild {
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }
}

/// Executes external commands with a fixed working directory.
///
/// Constructed once with its configuration; components never reach for
/// globals at call time.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    cwd: PathBuf,
    display_errors: bool,
}

impl CommandRunner {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            display_errors: true,
        }
    }

    pub fn with_error_display(mut self, display_errors: bool) -> Self {
        self.display_errors = display_errors;
        self
    }

    /// Run a command line to completion, capturing stdout/stderr.
    ///
    /// Blocks the calling flow until the child exits; no timeout is
    /// enforced at this layer.
    pub async fn run(&self, command_line: &str) -> CommandResult {
        debug!("exec: {}", command_line);

        let output = Command::new("sh")
            .args(["-c", command_line])
            .current_dir(&self.cwd)
            .stdin(Stdio::null())
            .output()
            .await;

        match output {
            Ok(output) => {
                let stdout = String::from_utf8_lossy(&output.stdout).to_string();

                if output.status.success() {
                    CommandResult {
                        stdout,
                        exit_failed: false,
                        error: None,
                    }
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
                    let error = if stderr.trim().is_empty() {
                        format!("command exited with status {:?}", output.status.code())
                    } else {
                        stderr
                    };

                    if self.display_errors {
                        error!("command failed: {}", error.trim());
                    }

                    CommandResult {
                        stdout,
                        exit_failed: true,
                        error: Some(error),
                    }
                }
            }
            Err(e) => {
                if self.display_errors {
                    error!("failed to spawn '{}': {}", command_line, e);
                }

                CommandResult {
                    stdout: String::new(),
                    exit_failed: true,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// Spawn a long-running command and stream its output line by line.
    ///
    /// Both pipes are read by background tasks that forward each line as a
    /// [`StreamEvent`]. The child is handed to a reaper task so the OS can
    /// collect it whenever it exits; the process is never killed from here.
    pub fn spawn_streaming(&self, command_line: &str) -> Result<StreamingChild> {
        info!("spawn: {}", command_line);

        let mut child = Command::new("sh")
            .args(["-c", command_line])
            .current_dir(&self.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::ProcessSpawn {
                reason: e.to_string(),
            })?;

        let pid = child.id();
        let (tx, rx) = mpsc::channel::<StreamEvent>(64);

        let stdout = child.stdout.take().expect("stdout was configured");
        tokio::spawn(Self::stdout_reader(stdout, tx.clone()));

        let stderr = child.stderr.take().expect("stderr was configured");
        tokio::spawn(Self::stderr_reader(stderr, tx));

        // Reaper owns the child so its exit status is collected even after
        // the caller stops listening.
        tokio::spawn(async move {
            let _ = child.wait().await;
        });

        Ok(StreamingChild { events: rx, pid })
    }

    /// Read lines from stdout and send as `StreamEvent::Stdout`
    async fn stdout_reader(stdout: tokio::process::ChildStdout, tx: mpsc::Sender<StreamEvent>) {
        let mut reader = BufReader::new(stdout).lines();

        loop {
            match reader.next_line().await {
                Ok(Some(line)) => {
                    trace!("stdout: {}", line);
                    if tx.send(StreamEvent::Stdout(line)).await.is_err() {
                        debug!("stdout channel closed");
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    let _ = tx.send(StreamEvent::StreamError(e.to_string())).await;
                    break;
                }
            }
        }

        debug!("stdout reader finished");
    }

    /// Read lines from stderr and send as `StreamEvent::Stderr`
    async fn stderr_reader(stderr: tokio::process::ChildStderr, tx: mpsc::Sender<StreamEvent>) {
        let mut reader = BufReader::new(stderr).lines();

        loop {
            match reader.next_line().await {
                Ok(Some(line)) => {
                    trace!("stderr: {}", line);
                    if tx.send(StreamEvent::Stderr(line)).await.is_err() {
                        debug!("stderr channel closed");
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    let _ = tx.send(StreamEvent::StreamError(e.to_string())).await;
                    break;
                }
            }
        }

        debug!("stderr reader finished");
    }
}
