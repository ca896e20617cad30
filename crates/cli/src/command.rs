//! External command as a retrying task.
//!
//! The command asks for a retry by exiting with one of the configured retry
//! statuses; any other non-zero status is fatal. The current retry count is
//! exported to the child as `SYNCRETRY_RETRIES`.
//!
//! The running child is tracked so an attempt that overruns its time limit
//! can be killed before the next one starts. Only the direct child is
//! killed; commands that fork should `exec` their final program.

use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use syncretry_core::{Attempt, Task, TaskRequest};

/// How often a running child is checked for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Program and arguments, forwarded unchanged to every attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    /// Split `argv` into program and arguments. `None` when empty.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

/// Captured output of a successful attempt.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to wait for `{program}`: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{program}` exited with status {code}")]
    Exit {
        program: String,
        code: i32,
        stderr: String,
    },

    #[error("`{program}` was terminated by a signal")]
    Signaled { program: String },

    #[error("`{program}` was killed after overrunning its time limit")]
    Cancelled { program: String },
}

impl CommandError {
    /// Exit status of the command, when it exited normally.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Exit { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Captured stderr of the failed attempt, if any.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::Exit { stderr, .. } if !stderr.is_empty() => Some(stderr),
            _ => None,
        }
    }
}

/// Child process of the attempt currently in flight.
#[derive(Debug)]
struct Running {
    retries: u32,
    child: Child,
}

/// Runs a [`CommandSpec`] once per attempt.
#[derive(Debug)]
pub struct CommandTask {
    retry_exit_codes: Vec<i32>,
    attempts: AtomicU32,
    running: Mutex<Option<Running>>,
}

impl CommandTask {
    pub fn new(retry_exit_codes: Vec<i32>) -> Self {
        Self {
            retry_exit_codes,
            attempts: AtomicU32::new(0),
            running: Mutex::new(None),
        }
    }

    /// Invocations started so far.
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    fn running(&self) -> MutexGuard<'_, Option<Running>> {
        self.running.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Poll the child of attempt `retries` until it exits.
    ///
    /// `Ok(None)` means the child was taken away by [`Task::cancel`].
    fn wait_for_exit(&self, retries: u32) -> io::Result<Option<ExitStatus>> {
        loop {
            {
                let mut slot = self.running();
                let Some(running) = slot.as_mut().filter(|r| r.retries == retries) else {
                    return Ok(None);
                };
                match running.child.try_wait() {
                    Ok(Some(status)) => {
                        *slot = None;
                        return Ok(Some(status));
                    }
                    Ok(None) => {}
                    Err(e) => {
                        if let Some(mut running) = slot.take() {
                            let _ = running.child.kill();
                            let _ = running.child.wait();
                        }
                        return Err(e);
                    }
                }
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl Task<CommandSpec> for CommandTask {
    type Output = CommandOutput;
    type Error = CommandError;

    fn run(&self, request: &TaskRequest, spec: &CommandSpec) -> Attempt<CommandOutput, CommandError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        debug!(
            program = %spec.program,
            attempt = request.attempt(),
            "Running command"
        );

        let mut child = match Command::new(&spec.program)
            .args(&spec.args)
            .env("SYNCRETRY_RETRIES", request.retries.to_string())
            .env("SYNCRETRY_MAX_RETRIES", request.max_retries.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(source) => {
                return Attempt::Fatal(CommandError::Spawn {
                    program: spec.program.clone(),
                    source,
                })
            }
        };

        // Drain both pipes so a chatty child never blocks on a full buffer.
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);
        *self.running() = Some(Running {
            retries: request.retries,
            child,
        });

        let status = match self.wait_for_exit(request.retries) {
            Ok(Some(status)) => status,
            Ok(None) => {
                return Attempt::retry(CommandError::Cancelled {
                    program: spec.program.clone(),
                })
            }
            Err(source) => {
                return Attempt::Fatal(CommandError::Wait {
                    program: spec.program.clone(),
                    source,
                })
            }
        };
        let stdout = collect(stdout);
        let stderr = collect(stderr);

        match status.code() {
            Some(0) => Attempt::Success(CommandOutput { stdout, stderr }),
            Some(code) => {
                let error = CommandError::Exit {
                    program: spec.program.clone(),
                    code,
                    stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
                };
                if self.retry_exit_codes.contains(&code) {
                    Attempt::retry(error)
                } else {
                    Attempt::Fatal(error)
                }
            }
            None => Attempt::Fatal(CommandError::Signaled {
                program: spec.program.clone(),
            }),
        }
    }

    fn name(&self) -> &str {
        "command"
    }

    fn cancel(&self, request: &TaskRequest) {
        let running = self.running().take_if(|r| r.retries == request.retries);
        if let Some(mut running) = running {
            warn!(
                pid = running.child.id(),
                attempt = request.attempt(),
                "Killing command that overran its time limit"
            );
            if let Err(e) = running.child.kill() {
                warn!(error = %e, "Failed to kill command");
            }
            // Reap it so nothing outlives the attempt.
            let _ = running.child.wait();
        }
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn collect(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}
