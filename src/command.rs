use anyhow::{Context, Result};
use log::debug;
use std::collections::HashMap;
use std::path::Path;
use std::process::{Child, Command, Output, Stdio};
use std::time::{Duration, Instant};

use crate::managers::PackageCommand;

/// Settings applied to every process an executor launches
#[derive(Debug, Clone, Default)]
pub struct CommandContext {
    /// Current working directory
    pub working_dir: Option<String>,
    /// Environment variables to set
    pub env_vars: HashMap<String, String>,
    /// Keep stdout and stderr; otherwise both are discarded
    pub capture_output: bool,
}

/// Builder for CommandExecutor
pub struct CommandExecutorBuilder {
    context: CommandContext,
}

impl Default for CommandExecutorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandExecutorBuilder {
    /// Create a new CommandExecutorBuilder with default settings
    pub fn new() -> Self {
        Self {
            context: CommandContext::default(),
        }
    }

    /// Set whether to capture command output
    pub fn capture_output(mut self, capture: bool) -> Self {
        self.context.capture_output = capture;
        self
    }

    /// Set the working directory
    pub fn working_dir<P: AsRef<Path>>(mut self, dir: Option<P>) -> Self {
        self.context.working_dir = dir.map(|d| d.as_ref().to_string_lossy().to_string());
        self
    }

    /// Add environment variables
    pub fn env_vars(mut self, vars: HashMap<String, String>) -> Self {
        self.context.env_vars.extend(vars);
        self
    }

    /// Build the CommandExecutor
    pub fn build(self) -> Result<CommandExecutor> {
        if let Some(dir) = &self.context.working_dir {
            if !Path::new(dir).is_dir() {
                anyhow::bail!("Working directory does not exist: {}", dir);
            }
        }

        Ok(CommandExecutor {
            context: self.context,
        })
    }
}

/// Outcome of a process that ran to completion, with its wall-clock duration
#[derive(Debug, Clone)]
pub struct TimedOutput {
    /// Exit code, `None` if the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

impl TimedOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs package commands for the harness.
///
/// `Err` means the process never started; a process that started and exited
/// non-zero is an `Ok` with a non-zero code.
pub trait ProcessRunner {
    fn run(&self, command: &PackageCommand) -> Result<TimedOutput>;
}

impl<T: ProcessRunner + ?Sized> ProcessRunner for &T {
    fn run(&self, command: &PackageCommand) -> Result<TimedOutput> {
        (**self).run(command)
    }
}

/// A unified interface for executing commands
pub struct CommandExecutor {
    context: CommandContext,
}

impl Default for CommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandExecutor {
    /// Create a new CommandExecutor with default settings
    pub fn new() -> Self {
        Self {
            context: CommandContext::default(),
        }
    }

    /// Create a builder for CommandExecutor with fluent configuration
    pub fn builder() -> CommandExecutorBuilder {
        CommandExecutorBuilder::new()
    }

    /// Execute a command with arguments and wait for it to complete, returning the output.
    ///
    /// A non-zero exit is an error.
    pub fn execute_command_with_args(&self, cmd: &str, args: &[&str]) -> Result<Output> {
        let output = self.wait(cmd, args)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow::anyhow!(
                "Command failed with status {}: {}\nStderr: {}",
                output.status.code().unwrap_or(-1),
                format_command(cmd, args),
                stderr
            ));
        }

        Ok(output)
    }

    /// Launch a command, wait for it and measure how long it took.
    ///
    /// A non-zero exit is not an error here: the exit code is part of the
    /// measurement. Output is kept only when the executor captures it, so
    /// without capture `stdout` and `stderr` are empty.
    pub fn execute_timed(&self, cmd: &str, args: &[&str]) -> Result<TimedOutput> {
        let start = Instant::now();
        let output = self.wait(cmd, args)?;
        let elapsed = start.elapsed();

        debug!(
            "{} exited with {:?} after {:.2}s",
            format_command(cmd, args),
            output.status.code(),
            elapsed.as_secs_f64()
        );

        Ok(TimedOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            elapsed,
        })
    }

    fn wait(&self, cmd: &str, args: &[&str]) -> Result<Output> {
        self.launch_command(cmd, args)?
            .wait_with_output()
            .with_context(|| {
                format!(
                    "Failed to wait for command completion: {}",
                    format_command(cmd, args)
                )
            })
    }

    fn launch_command(&self, cmd: &str, args: &[&str]) -> Result<Child> {
        let command_str = format_command(cmd, args);
        debug!("Launching command: {}", command_str);

        let mut command = Command::new(cmd);
        command.args(args);

        if let Some(dir) = &self.context.working_dir {
            command.current_dir(dir);
        }

        for (key, value) in &self.context.env_vars {
            command.env(key, value);
        }

        if self.context.capture_output {
            command.stdout(Stdio::piped()).stderr(Stdio::piped());
        } else {
            command.stdout(Stdio::null()).stderr(Stdio::null());
        }

        command
            .spawn()
            .with_context(|| format!("Failed to spawn command: {}", command_str))
    }

}

/// Format command and arguments for logging
fn format_command(cmd: &str, args: &[&str]) -> String {
    if args.is_empty() {
        return cmd.to_string();
    }
    format!("{} {}", cmd, args.join(" "))
}

impl ProcessRunner for CommandExecutor {
    fn run(&self, command: &PackageCommand) -> Result<TimedOutput> {
        self.execute_timed(&command.program, &command.arg_refs())
    }
}
