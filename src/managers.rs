use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::BenchConfig;

/// The package managers the harness knows how to drive.
///
/// The declaration order is the evaluation order used everywhere: install
/// order, table columns and tie breaking when two managers are equally fast.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ManagerKind {
    Pip,
    Conda,
    Uv,
}

impl ManagerKind {
    pub const ALL: [ManagerKind; 3] = [ManagerKind::Pip, ManagerKind::Conda, ManagerKind::Uv];

    pub fn name(&self) -> &'static str {
        match self {
            ManagerKind::Pip => "pip",
            ManagerKind::Conda => "conda",
            ManagerKind::Uv => "uv",
        }
    }
}

impl fmt::Display for ManagerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sort managers into evaluation order and drop duplicates
pub fn normalize_managers(managers: &[ManagerKind]) -> Vec<ManagerKind> {
    let mut managers = managers.to_vec();
    managers.sort();
    managers.dedup();
    managers
}

/// A command bound to the package it operates on.
///
/// The package travels next to the argv so nothing ever has to recover it
/// from the command text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageCommand {
    pub manager: ManagerKind,
    pub package: String,
    pub program: String,
    pub args: Vec<String>,
}

impl PackageCommand {
    fn new(manager: ManagerKind, package: &str, program: &str, args: Vec<String>) -> Self {
        Self {
            manager,
            package: package.to_string(),
            program: program.to_string(),
            args,
        }
    }

    /// Borrowed argument list in the shape the executor takes
    pub fn arg_refs(&self) -> Vec<&str> {
        self.args.iter().map(String::as_str).collect()
    }

    /// Space separated command line for display
    pub fn command_line(&self) -> String {
        if self.args.is_empty() {
            return self.program.clone();
        }
        format!("{} {}", self.program, self.args.join(" "))
    }
}

impl fmt::Display for PackageCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

/// Builds install and cleanup commands for each manager from the bench config
#[derive(Debug, Clone)]
pub struct CommandFactory {
    python: String,
    pip_flags: Vec<String>,
    conda_bin: String,
    conda_channel: String,
    uv_bin: String,
}

impl CommandFactory {
    pub fn from_config(config: &BenchConfig) -> Self {
        Self {
            python: config.python.clone(),
            pip_flags: config.pip_flags.clone(),
            conda_bin: config.conda_bin.clone(),
            conda_channel: config.conda_channel.clone(),
            uv_bin: config.uv_bin.clone(),
        }
    }

    pub fn python(&self) -> &str {
        &self.python
    }

    pub fn install(&self, manager: ManagerKind, package: &str) -> PackageCommand {
        match manager {
            ManagerKind::Pip => {
                let mut args = vec!["-m".to_string(), "pip".to_string(), "install".to_string()];
                args.extend(self.pip_flags.iter().cloned());
                args.push(package.to_string());
                PackageCommand::new(manager, package, &self.python, args)
            }
            ManagerKind::Conda => PackageCommand::new(
                manager,
                package,
                &self.conda_bin,
                owned(&[
                    "install",
                    "-y",
                    "--no-update-deps",
                    "-c",
                    &self.conda_channel,
                    package,
                ]),
            ),
            ManagerKind::Uv => PackageCommand::new(
                manager,
                package,
                &self.uv_bin,
                owned(&["pip", "install", "--system", package]),
            ),
        }
    }

    /// Command that undoes `install` for the same manager.
    ///
    /// uv installs into the system interpreter, so the interpreter's own pip
    /// removes what it put there.
    pub fn cleanup(&self, manager: ManagerKind, package: &str) -> PackageCommand {
        match manager {
            ManagerKind::Pip | ManagerKind::Uv => PackageCommand::new(
                manager,
                package,
                &self.python,
                owned(&["-m", "pip", "uninstall", "-y", package]),
            ),
            ManagerKind::Conda => PackageCommand::new(
                manager,
                package,
                &self.conda_bin,
                owned(&["remove", "-y", "--force", package]),
            ),
        }
    }

    /// Cleanup commands for every manager, with identical command lines collapsed
    pub fn preclean(&self, managers: &[ManagerKind], package: &str) -> Vec<PackageCommand> {
        let mut commands: Vec<PackageCommand> = Vec::new();
        for manager in managers {
            let cmd = self.cleanup(*manager, package);
            if !commands
                .iter()
                .any(|c| c.program == cmd.program && c.args == cmd.args)
            {
                commands.push(cmd);
            }
        }
        commands
    }
}

fn owned(args: &[&str]) -> Vec<String> {
    args.iter().map(|a| a.to_string()).collect()
}
