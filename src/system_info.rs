use chrono::{DateTime, Local};
use log::{info, warn};
use serde::Serialize;
use sysinfo::System;

use crate::command::CommandExecutor;

/// What the report header says about the machine and interpreter
#[derive(Debug, Clone, Serialize)]
pub struct EnvironmentInfo {
    pub python_version: String,
    pub started_at: DateTime<Local>,
}

impl EnvironmentInfo {
    pub fn new(python_version: impl Into<String>, started_at: DateTime<Local>) -> Self {
        Self {
            python_version: python_version.into(),
            started_at,
        }
    }

    /// Ask the interpreter for its version; `unknown` if it can't be run
    pub fn detect(python: &str) -> Self {
        Self::new(python_version(python), Local::now())
    }

    pub fn started_at_label(&self) -> String {
        self.started_at.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

fn python_version(python: &str) -> String {
    let executor = match CommandExecutor::builder().capture_output(true).build() {
        Ok(executor) => executor,
        Err(e) => {
            warn!("Could not prepare interpreter probe: {e:#}");
            return "unknown".to_string();
        }
    };

    match executor.execute_command_with_args(python, &["--version"]) {
        Ok(output) => {
            // Python 2 and early 3.x print the version on stderr
            let stdout = String::from_utf8_lossy(&output.stdout);
            let stderr = String::from_utf8_lossy(&output.stderr);
            parse_python_version(&stdout)
                .or_else(|| parse_python_version(&stderr))
                .unwrap_or_else(|| "unknown".to_string())
        }
        Err(e) => {
            warn!("Could not determine version of {python}: {e:#}");
            "unknown".to_string()
        }
    }
}

/// "Python 3.12.1\n" -> "3.12.1"
pub fn parse_python_version(text: &str) -> Option<String> {
    let version = text.trim().strip_prefix("Python")?.trim();
    if version.is_empty() {
        None
    } else {
        Some(version.to_string())
    }
}

/// Log a one-line description of the host the benchmark runs on
pub fn log_sys_info() {
    let mut sys = System::new_all();
    sys.refresh_all();

    let os = System::long_os_version().unwrap_or_else(|| "<unknown>".to_owned());
    let kernel = System::kernel_version().unwrap_or_else(|| "<unknown>".to_owned());
    let cpu = sys
        .cpus()
        .first()
        .map(|c| c.brand().trim().to_string())
        .unwrap_or_else(|| "Unknown CPU".to_owned());

    info!(
        "Host: {} (kernel {}), {} x {} [{}], {} MiB memory",
        os,
        kernel,
        sys.cpus().len(),
        cpu,
        System::cpu_arch(),
        sys.total_memory() / (1024 * 1024)
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_python_version() {
        assert_eq!(
            parse_python_version("Python 3.12.1\n"),
            Some("3.12.1".to_string())
        );
        assert_eq!(
            parse_python_version("Python 2.7.18"),
            Some("2.7.18".to_string())
        );
        assert_eq!(parse_python_version("Python"), None);
        assert_eq!(parse_python_version(""), None);
        assert_eq!(parse_python_version("pypy 7.3"), None);
    }

    #[test]
    fn test_missing_interpreter_is_unknown() {
        let env = EnvironmentInfo::detect("pkgbench-no-such-python");
        assert_eq!(env.python_version, "unknown");
    }

    #[test]
    fn test_started_at_label() {
        let at = Local.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        let env = EnvironmentInfo::new("3.11.4", at);
        assert_eq!(env.started_at_label(), "2024-03-05 07:08:09");
    }
}
