//! Bounded external commands.
//!
//! Guards that shell out (git, shellcheck, linters, tsc) go through
//! [`CommandRunner`] so tests can script the results.

use std::io::{self, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;
use thiserror::Error;
use wait_timeout::ChildExt;

/// Errors from running an external command.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("{0}: command not found")]
    NotFound(String),

    #[error("{program} timed out after {} seconds", timeout.as_secs())]
    TimedOut { program: String, timeout: Duration },

    #[error("failed to run {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// Captured result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutput {
    pub success: bool,
    /// Exit code; `None` when the child was ended by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Runs a program to completion or until `timeout` elapses.
pub trait CommandRunner {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        dir: Option<&Path>,
        timeout: Duration,
    ) -> Result<RunOutput, RunError>;
}

/// Spawns real processes; a child still running at the deadline is killed.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}

impl CommandRunner for SystemRunner {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        dir: Option<&Path>,
        timeout: Duration,
    ) -> Result<RunOutput, RunError> {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = dir.filter(|d| d.is_dir()) {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => RunError::NotFound(program.to_string()),
            _ => RunError::Io {
                program: program.to_string(),
                source,
            },
        })?;

        // Drain both pipes while waiting so a chatty child cannot block on a full pipe.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let waited = child.wait_timeout(timeout);
        let status = match waited {
            Ok(Some(status)) => status,
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(RunError::TimedOut {
                    program: program.to_string(),
                    timeout,
                });
            }
            Err(source) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(RunError::Io {
                    program: program.to_string(),
                    source,
                });
            }
        };

        let stdout = stdout.join().unwrap_or_default();
        let stderr = stderr.join().unwrap_or_default();
        tracing::debug!(program, code = ?status.code(), "subprocess finished");

        Ok(RunOutput {
            success: status.success(),
            code: status.code(),
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        })
    }
}
