//! Subprocess generator.
//!
//! Spawns a configured command (by default `claude -p`), writes the system
//! instruction and the prompt to its stdin, and returns whatever it prints
//! on stdout.

use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use super::GenerateError;
use super::trait_def::Generator;

/// Generator backed by an external command.
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    command: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandGenerator {
    pub const DEFAULT_COMMAND: &str = "claude";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

    /// Create a generator that runs `command` with `args`.
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// The text written to the child's stdin.
    fn stdin_payload(system: &str, prompt: &str) -> String {
        format!("{}\n\n{}\n", system.trim(), prompt.trim())
    }
}

impl Default for CommandGenerator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_COMMAND, vec!["-p".to_owned()])
    }
}

#[async_trait]
impl Generator for CommandGenerator {
    fn name(&self) -> &str {
        &self.command
    }

    async fn generate(&self, system: &str, prompt: &str) -> Result<String, GenerateError> {
        debug!(command = %self.command, args = ?self.args, "spawning generator");

        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| GenerateError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        // Input is written while output is drained; a child may exit
        // without reading it.
        let stdin = child.stdin.take();
        let payload = Self::stdin_payload(system, prompt);
        let write = async move {
            match stdin {
                // Dropping stdin at the end of the block closes the pipe.
                Some(mut stdin) => stdin.write_all(payload.as_bytes()).await,
                None => Ok(()),
            }
        };

        let (written, output) = tokio::time::timeout(self.timeout, async {
            tokio::join!(write, child.wait_with_output())
        })
        .await
        .map_err(|_| GenerateError::Timeout {
            command: self.command.clone(),
            secs: self.timeout.as_secs(),
        })?;
        let output = output?;

        if !output.status.success() {
            return Err(GenerateError::Failed {
                command: self.command.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        match written {
            Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                debug!(command = %self.command, "generator exited without reading its input");
            }
            Err(e) => return Err(e.into()),
            Ok(()) => {}
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(command = %self.command, bytes = text.len(), "generator finished");
        Ok(text)
    }
}
