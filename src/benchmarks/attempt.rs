use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::command::TimedOutput;
use crate::managers::{ManagerKind, PackageCommand};

/// Why a measured or cleanup invocation did not succeed
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttemptError {
    /// The install command ran and exited non-zero
    #[error("{message}")]
    InstallFailed { code: Option<i32>, message: String },
    /// The install command could not be started at all
    #[error("failed to launch {program}: {reason}")]
    LaunchFailed { program: String, reason: String },
    /// An uninstall/remove step failed. Only ever logged.
    #[error("cleanup with {program} failed: {reason}")]
    CleanupFailed { program: String, reason: String },
}

impl AttemptError {
    /// Build an `InstallFailed` from a finished process, preferring its stderr
    pub fn from_exit(output: &TimedOutput) -> Self {
        let stderr = output.stderr.trim();
        let message = if !stderr.is_empty() {
            stderr.to_string()
        } else {
            match output.code {
                Some(code) => format!("exited with status {code}"),
                None => "terminated by signal".to_string(),
            }
        };
        AttemptError::InstallFailed {
            code: output.code,
            message,
        }
    }
}

/// One timed install of one package by one manager
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallAttempt {
    pub manager: ManagerKind,
    pub package: String,
    /// Wall-clock seconds, measured whether or not the install succeeded
    pub elapsed_seconds: f64,
    pub succeeded: bool,
    /// Present exactly when `succeeded` is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<AttemptError>,
}

impl InstallAttempt {
    pub fn success(manager: ManagerKind, package: &str, elapsed: Duration) -> Self {
        Self {
            manager,
            package: package.to_string(),
            elapsed_seconds: elapsed.as_secs_f64(),
            succeeded: true,
            error_text: None,
            error: None,
        }
    }

    pub fn failure(
        manager: ManagerKind,
        package: &str,
        elapsed: Duration,
        error: AttemptError,
    ) -> Self {
        Self {
            manager,
            package: package.to_string(),
            elapsed_seconds: elapsed.as_secs_f64(),
            succeeded: false,
            error_text: Some(error.to_string()),
            error: Some(error),
        }
    }

    /// Classify the result of running `command`.
    ///
    /// `Err` from the runner means the process never started.
    pub fn from_run(
        command: &PackageCommand,
        result: anyhow::Result<TimedOutput>,
        launch_elapsed: Duration,
    ) -> Self {
        match result {
            Ok(output) if output.success() => {
                Self::success(command.manager, &command.package, output.elapsed)
            }
            Ok(output) => Self::failure(
                command.manager,
                &command.package,
                output.elapsed,
                AttemptError::from_exit(&output),
            ),
            Err(err) => Self::failure(
                command.manager,
                &command.package,
                launch_elapsed,
                AttemptError::LaunchFailed {
                    program: command.program.clone(),
                    reason: format!("{err:#}"),
                },
            ),
        }
    }

    /// Duration shown in the report: two decimals, or `Failed`
    pub fn time_label(&self) -> String {
        if self.succeeded {
            format!("{:.2}", self.elapsed_seconds)
        } else {
            "Failed".to_string()
        }
    }
}
