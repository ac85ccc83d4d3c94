//! Subprocess invocation of the ImageMagick convert command.
//!
//! Process spawning sits behind the [`CommandRunner`] trait so the pipeline
//! can be driven by a scripted runner in tests instead of a real binary.

use async_trait::async_trait;
use std::io;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Instant;
use tokio::process::Command;

use crate::error::ParserError;

/// Captured result of one finished subprocess.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Whether the process exited with status zero
    pub success: bool,
    /// Exit code, `None` if the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl From<std::process::Output> for CommandOutput {
    fn from(output: std::process::Output) -> Self {
        Self {
            success: output.status.success(),
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        }
    }
}

/// Strategy for running an external program to completion.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args`, capturing stdout and stderr in full.
    ///
    /// Returns `Err` only when the process could not be started or awaited;
    /// a non-zero exit is reported through [`CommandOutput::success`].
    async fn run(&self, program: &str, args: &[String]) -> io::Result<CommandOutput>;
}

/// Runs commands as real OS processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, program: &str, args: &[String]) -> io::Result<CommandOutput> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await?;
        Ok(output.into())
    }
}

/// Invokes the configured convert command through a [`CommandRunner`].
#[derive(Clone)]
pub struct Invoker {
    command: String,
    runner: Arc<dyn CommandRunner>,
}

impl Invoker {
    /// Create an invoker for `command` using the given runner.
    pub fn new(command: impl Into<String>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            command: command.into(),
            runner,
        }
    }

    /// Create an invoker that spawns real processes.
    pub fn system(command: impl Into<String>) -> Self {
        Self::new(command, Arc::new(SystemRunner))
    }

    /// The convert command this invoker runs.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Run the command once with `args`.
    ///
    /// `files` only labels a failure: they are joined with `", "` into the
    /// error's file field. On failure the error carries the full command
    /// line and whatever the process printed.
    pub async fn invoke(&self, files: &[String], args: &[String]) -> Result<CommandOutput, ParserError> {
        let start = Instant::now();
        let result = self.runner.run(&self.command, args).await;
        tracing::trace!("  {} ({} args): {:?}", self.command, args.len(), start.elapsed());

        let failure = |cause: String, stdout: Vec<u8>, stderr: Vec<u8>| {
            ParserError::new(
                format!("ImageMagick convert command failed: {cause}"),
                files.join(", "),
                self.command_line(args),
                stdout,
                stderr,
            )
        };

        match result {
            Ok(output) if output.success => Ok(output),
            Ok(output) => {
                let cause = match output.code {
                    Some(code) => format!("exit status {code}"),
                    None => "terminated by signal".to_string(),
                };
                Err(failure(cause, output.stdout, output.stderr))
            }
            Err(e) => Err(failure(e.to_string(), Vec::new(), Vec::new())),
        }
    }

    /// Run the convert command with arbitrary arguments.
    ///
    /// Returns the captured `(stdout, stderr)`. A failure has an empty file
    /// field but still carries both streams.
    pub async fn convert(&self, args: &[String]) -> Result<(Vec<u8>, Vec<u8>), ParserError> {
        let output = self.invoke(&[], args).await?;
        Ok((output.stdout, output.stderr))
    }

    /// The command line as it would be typed, space-joined.
    fn command_line(&self, args: &[String]) -> String {
        std::iter::once(self.command.as_str())
            .chain(args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl std::fmt::Debug for Invoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invoker")
            .field("command", &self.command)
            .finish_non_exhaustive()
    }
}
