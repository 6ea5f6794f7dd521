//! Whitelisted subprocess execution for command-backed collectors

use std::collections::HashSet;
use std::io::Read;
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const RESTRICTED_PATH: &str = "/usr/bin:/bin:/usr/sbin:/sbin";

/// Runs whitelisted programs with a cleared environment and a timeout
#[derive(Debug, Clone)]
pub struct SystemCommandExecutor {
    default_timeout: Duration,
    allowed_programs: HashSet<String>,
}

impl Default for SystemCommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemCommandExecutor {
    /// Executor with an empty whitelist and a 5 second timeout
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(5))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            default_timeout: timeout,
            allowed_programs: HashSet::new(),
        }
    }

    /// Whitelist programs by the exact strings later passed to `execute`
    pub fn allowing<I, S>(mut self, programs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_programs
            .extend(programs.into_iter().map(Into::into));
        self
    }

    pub fn is_allowed(&self, program: &str) -> bool {
        self.allowed_programs.contains(program)
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Run `program` with `args`, capturing stdout and stderr
    ///
    /// A non-zero exit status is not an error here; callers inspect
    /// [`CommandOutput::exit_code`].
    pub fn execute(
        &self,
        program: &str,
        args: &[&str],
        timeout: Option<Duration>,
    ) -> Result<CommandOutput, CommandError> {
        if !self.is_allowed(program) {
            return Err(CommandError::NotWhitelisted {
                program: program.to_string(),
            });
        }

        let timeout = timeout.unwrap_or(self.default_timeout);
        let start = Instant::now();
        log::debug!("Executing {} {:?} (timeout {:?})", program, args, timeout);

        let mut child = Command::new(program)
            .args(args)
            .env_clear()
            .env("PATH", RESTRICTED_PATH)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => CommandError::ProgramNotFound {
                    program: program.to_string(),
                },
                std::io::ErrorKind::PermissionDenied => CommandError::PermissionDenied {
                    program: program.to_string(),
                },
                _ => CommandError::ExecutionFailed {
                    program: program.to_string(),
                    reason: e.to_string(),
                },
            })?;

        // Pipes are drained while waiting; a full pipe would stall the child
        let stdout_reader = child.stdout.take().map(spawn_reader);
        let stderr_reader = child.stderr.take().map(spawn_reader);

        let status = wait_timeout::ChildExt::wait_timeout(&mut child, timeout).map_err(|e| {
            CommandError::ExecutionFailed {
                program: program.to_string(),
                reason: e.to_string(),
            }
        })?;

        let Some(status) = status else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(CommandError::Timeout {
                timeout_ms: timeout.as_millis() as u64,
            });
        };

        let stdout = join_reader(program, stdout_reader)?;
        let stderr = join_reader(program, stderr_reader)?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&stdout).to_string(),
            stderr: String::from_utf8_lossy(&stderr).to_string(),
            exit_code: status.code().unwrap_or(-1),
            duration: start.elapsed(),
        })
    }
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<std::io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        pipe.read_to_end(&mut buf)?;
        Ok(buf)
    })
}

fn join_reader(
    program: &str,
    reader: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
) -> Result<Vec<u8>, CommandError> {
    let Some(reader) = reader else {
        return Ok(Vec::new());
    };

    let failed = |reason: String| CommandError::ExecutionFailed {
        program: program.to_string(),
        reason,
    };
    reader
        .join()
        .map_err(|_| failed("output reader panicked".to_string()))?
        .map_err(|e| failed(e.to_string()))
}

/// Captured output of one command run
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub duration: Duration,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Non-empty stdout lines, trailing whitespace trimmed
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.stdout
            .lines()
            .map(str::trim_end)
            .filter(|l| !l.is_empty())
    }
}

/// Command execution errors
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Program not found: {program}")]
    ProgramNotFound { program: String },

    #[error("Execution failed for '{program}': {reason}")]
    ExecutionFailed { program: String, reason: String },

    #[error("Command timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Permission denied: {program}")]
    PermissionDenied { program: String },

    #[error("Program '{program}' is not whitelisted")]
    NotWhitelisted { program: String },
}
