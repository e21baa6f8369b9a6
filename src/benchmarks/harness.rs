use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use serde::Serialize;
use std::io::Write;
use std::time::Instant;

use crate::benchmarks::attempt::{AttemptError, InstallAttempt};
use crate::benchmarks::render::ReportWriter;
use crate::benchmarks::results::PackageReport;
use crate::benchmarks::summary::RunSummary;
use crate::command::ProcessRunner;
use crate::config::BenchConfig;
use crate::managers::{CommandFactory, ManagerKind, PackageCommand};
use crate::system_info::EnvironmentInfo;

/// Everything one run produced
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub python_version: String,
    pub started_at: DateTime<Local>,
    pub managers: Vec<ManagerKind>,
    pub packages: Vec<PackageReport>,
    pub summary: RunSummary,
}

/// Times installs of each package with each manager, strictly one at a time.
///
/// For every package: remove any existing install, then for each manager
/// install (timed) and remove again. Nothing is retried and no failure stops
/// the run; failures end up in the report.
pub struct Harness<R: ProcessRunner> {
    runner: R,
    factory: CommandFactory,
    managers: Vec<ManagerKind>,
    show_progress: bool,
}

impl<R: ProcessRunner> Harness<R> {
    pub fn new(runner: R, config: &BenchConfig) -> Self {
        Self {
            runner,
            factory: CommandFactory::from_config(config),
            managers: config.ordered_managers(),
            show_progress: false,
        }
    }

    /// Draw a progress bar on stderr while packages are benchmarked
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Run one install command and turn its outcome into an attempt
    pub fn measure(&self, command: &PackageCommand) -> InstallAttempt {
        debug!("Measuring: {}", command);
        let start = Instant::now();
        let result = self.runner.run(command);
        InstallAttempt::from_run(command, result, start.elapsed())
    }

    /// Best-effort removal. The outcome is only logged.
    fn cleanup(&self, command: &PackageCommand) {
        let failure = match self.runner.run(command) {
            Ok(output) if output.success() => None,
            Ok(output) => Some(AttemptError::CleanupFailed {
                program: command.program.clone(),
                reason: AttemptError::from_exit(&output).to_string(),
            }),
            Err(e) => Some(AttemptError::CleanupFailed {
                program: command.program.clone(),
                reason: format!("{e:#}"),
            }),
        };
        if let Some(err) = failure {
            debug!("Ignoring failed cleanup of {}: {}", command.package, err);
        }
    }

    /// Benchmark every configured manager against one package
    pub fn benchmark_package<W: Write>(
        &self,
        package: &str,
        out: &mut ReportWriter<W>,
    ) -> Result<PackageReport> {
        out.package_banner(package)?;

        out.preclean(package)?;
        for command in self.factory.preclean(&self.managers, package) {
            self.cleanup(&command);
        }

        let mut report = PackageReport::new(package);
        for manager in &self.managers {
            let install = self.factory.install(*manager, package);
            out.attempt_started(&install)?;
            let attempt = self.measure(&install);
            out.attempt_finished(&attempt)?;
            report.record(attempt);

            let cleanup = self.factory.cleanup(*manager, package);
            out.cleanup(&cleanup)?;
            self.cleanup(&cleanup);
        }

        out.package_summary(&report)?;
        Ok(report)
    }

    /// Benchmark all packages in order and write the full report
    pub fn run<W: Write>(
        &self,
        packages: &[String],
        env: &EnvironmentInfo,
        out: &mut ReportWriter<W>,
    ) -> Result<RunReport> {
        info!(
            "Benchmarking {} packages with {}",
            packages.len(),
            self.managers
                .iter()
                .map(ManagerKind::name)
                .collect::<Vec<_>>()
                .join(", ")
        );
        out.header(env, packages)?;

        let progress = self.progress_bar(packages.len())?;
        let mut reports = Vec::with_capacity(packages.len());
        for package in packages {
            progress.set_message(package.clone());
            reports.push(self.benchmark_package(package, out)?);
            progress.inc(1);
        }
        progress.finish_and_clear();

        let summary = RunSummary::from_reports(&self.managers, &reports);
        out.overall(&summary)?;
        out.table(&self.managers, &reports)?;
        out.flush().context("Failed to flush report")?;

        info!("Benchmarked {} packages", reports.len());
        Ok(RunReport {
            python_version: env.python_version.clone(),
            started_at: env.started_at,
            managers: self.managers.clone(),
            packages: reports,
            summary,
        })
    }

    fn progress_bar(&self, len: usize) -> Result<ProgressBar> {
        if !self.show_progress {
            return Ok(ProgressBar::hidden());
        }
        let pb = ProgressBar::new(len as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] [{bar:40.magenta/black}] {pos}/{len} {msg}")
                .context("Invalid progress bar template")?
                .progress_chars("=> "),
        );
        Ok(pb)
    }
}
