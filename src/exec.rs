use crate::error::CommandError;
use std::future::Future;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
}

/// Runs an external executable inside a working directory and returns what it
/// printed on stdout. Implementations report non-zero exits as errors.
pub trait CommandExecutor {
    fn execute(
        &self,
        executable: &str,
        args: &[&str],
        working_dir: &Path,
    ) -> impl Future<Output = Result<CommandOutput, CommandError>> + Send;
}

#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    pub timeout: Duration,
}

impl Default for ProcessExecutor {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ProcessExecutor {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl CommandExecutor for ProcessExecutor {
    async fn execute(
        &self,
        executable: &str,
        args: &[&str],
        working_dir: &Path,
    ) -> Result<CommandOutput, CommandError> {
        let joined = args.join(" ");
        info!("Execute: {} {}", executable, joined);
        debug!("Working directory: {}", working_dir.display());

        let child = Command::new(executable)
            .args(args)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| CommandError::Spawn {
                executable: executable.to_string(),
                source,
            })?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| CommandError::TimedOut {
                executable: executable.to_string(),
                args: joined.clone(),
                seconds: self.timeout.as_secs(),
            })?
            .map_err(|source| CommandError::Spawn {
                executable: executable.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(CommandError::Failed {
                executable: executable.to_string(),
                args: joined,
                code: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8(output.stdout).map_err(|_| CommandError::Utf8 {
            executable: executable.to_string(),
        })?;

        Ok(CommandOutput { stdout })
    }
}
