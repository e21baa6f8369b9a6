use std::io::{self, Write};

use crate::benchmarks::attempt::InstallAttempt;
use crate::benchmarks::results::PackageReport;
use crate::benchmarks::summary::{OverallVerdict, RunSummary};
use crate::managers::{ManagerKind, PackageCommand};
use crate::system_info::EnvironmentInfo;

const BANNER_WIDTH: usize = 50;
const PACKAGE_COLUMN: usize = 15;
const COLUMN: usize = 10;

/// Writes the linear plain-text report
pub struct ReportWriter<W: Write> {
    out: W,
    /// "Python 3.12.1", used in section titles
    label: String,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(out: W, python_version: &str) -> Self {
        Self {
            out,
            label: format!("Python {python_version}"),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn banner(&mut self, title: &str) -> io::Result<()> {
        let rule = "=".repeat(BANNER_WIDTH);
        writeln!(self.out, "\n{rule}")?;
        writeln!(self.out, "{title}")?;
        writeln!(self.out, "{rule}")
    }

    pub fn header(&mut self, env: &EnvironmentInfo, packages: &[String]) -> io::Result<()> {
        writeln!(self.out, "Python Environment: {}", env.python_version)?;
        writeln!(self.out, "Running benchmarks at: {}", env.started_at_label())?;
        writeln!(
            self.out,
            "Benchmarking package installations for {}",
            self.label
        )?;
        writeln!(self.out, "Packages to test: {}", packages.join(", "))
    }

    pub fn package_banner(&mut self, package: &str) -> io::Result<()> {
        let title = format!("BENCHMARKING PACKAGE: {package} on {}", self.label);
        self.banner(&title)
    }

    pub fn preclean(&mut self, package: &str) -> io::Result<()> {
        writeln!(self.out, "Ensuring {package} is not installed...")
    }

    pub fn attempt_started(&mut self, command: &PackageCommand) -> io::Result<()> {
        writeln!(
            self.out,
            "\n==== {} INSTALL FOR '{}' ====",
            command.manager.name().to_uppercase(),
            command.package
        )?;
        writeln!(self.out, "Running: {}", command.command_line())
    }

    pub fn attempt_finished(&mut self, attempt: &InstallAttempt) -> io::Result<()> {
        let status = if attempt.succeeded { "Success" } else { "Failed" };
        writeln!(self.out, "Status: {status}")?;
        writeln!(self.out, "Time: {:.2} seconds", attempt.elapsed_seconds)?;
        if let Some(error) = &attempt.error_text {
            writeln!(self.out, "Error: {error}")?;
        }
        Ok(())
    }

    pub fn cleanup(&mut self, command: &PackageCommand) -> io::Result<()> {
        writeln!(
            self.out,
            "Removing {} installed by {}...",
            command.package, command.manager
        )
    }

    pub fn package_summary(&mut self, report: &PackageReport) -> io::Result<()> {
        writeln!(
            self.out,
            "\n==== RESULTS SUMMARY FOR '{}' ({}) ====",
            report.package, self.label
        )?;
        for attempt in report.attempts.values() {
            if attempt.succeeded {
                writeln!(
                    self.out,
                    "{}: {:.2} seconds",
                    attempt.manager, attempt.elapsed_seconds
                )?;
            } else {
                writeln!(self.out, "{}: Failed", attempt.manager)?;
            }
        }

        match report.fastest() {
            Some(fastest) => {
                writeln!(
                    self.out,
                    "\nFastest package manager for '{}': {} ({:.2} seconds)",
                    report.package, fastest.manager, fastest.elapsed_seconds
                )?;
                for speedup in report.speedups() {
                    writeln!(self.out, "{speedup}")?;
                }
            }
            None => writeln!(
                self.out,
                "\nNo successful '{}' installations to compare",
                report.package
            )?,
        }
        Ok(())
    }

    pub fn overall(&mut self, summary: &RunSummary) -> io::Result<()> {
        let title = format!("OVERALL PERFORMANCE SUMMARY FOR {}", self.label);
        self.banner(&title)?;

        writeln!(self.out, "\nSuccess rates:")?;
        for (manager, totals) in &summary.totals {
            writeln!(
                self.out,
                "{manager}: {}/{} packages successful",
                totals.successes, summary.package_count
            )?;
        }

        writeln!(self.out, "\nTotal installation times ({}):", self.label)?;
        for (manager, totals) in &summary.totals {
            match totals.average() {
                Some(average) => writeln!(
                    self.out,
                    "{manager}: {:.2} seconds total, {average:.2} seconds average",
                    totals.total_seconds
                )?,
                None => writeln!(self.out, "{manager}: No successful installations")?,
            }
        }

        match summary.verdict() {
            Some(OverallVerdict::Full { fastest, speedups }) => {
                writeln!(
                    self.out,
                    "\nOverall fastest package manager for {}: {fastest}",
                    self.label
                )?;
                for speedup in speedups {
                    writeln!(self.out, "{speedup} overall")?;
                }
            }
            Some(OverallVerdict::Partial { fastest, .. }) => {
                writeln!(
                    self.out,
                    "\nFastest average package manager for {}: {fastest}",
                    self.label
                )?;
                writeln!(
                    self.out,
                    "(Note: Not all package managers succeeded for all packages)"
                )?;
            }
            None => {}
        }
        Ok(())
    }

    pub fn table(
        &mut self,
        managers: &[ManagerKind],
        reports: &[PackageReport],
    ) -> io::Result<()> {
        let title = format!("DETAILED RESULTS TABLE ({})", self.label);
        self.banner(&title)?;

        let mut header = format!("{:<width$}", "Package", width = PACKAGE_COLUMN);
        let mut rule = "-".repeat(PACKAGE_COLUMN);
        for manager in managers {
            header.push_str(&format!(" {:<width$}", format!("{manager} (s)"), width = COLUMN));
            rule.push_str(&format!(" {}", "-".repeat(COLUMN)));
        }
        header.push_str(&format!(" {:<width$}", "Fastest", width = COLUMN));
        rule.push_str(&format!(" {}", "-".repeat(COLUMN)));
        writeln!(self.out, "{header}")?;
        writeln!(self.out, "{rule}")?;

        for report in reports {
            let mut row = format!("{:<width$}", report.package, width = PACKAGE_COLUMN);
            for manager in managers {
                let cell = report
                    .attempt(*manager)
                    .map(InstallAttempt::time_label)
                    .unwrap_or_else(|| "-".to_string());
                row.push_str(&format!(" {cell:<width$}", width = COLUMN));
            }
            let fastest = report
                .fastest()
                .map(|a| a.manager.to_string())
                .unwrap_or_else(|| "None".to_string());
            row.push_str(&format!(" {fastest:<width$}", width = COLUMN));
            writeln!(self.out, "{row}")?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmarks::attempt::AttemptError;
    use std::time::Duration;

    fn writer() -> ReportWriter<Vec<u8>> {
        ReportWriter::new(Vec::new(), "3.12.1")
    }

    fn text(w: ReportWriter<Vec<u8>>) -> String {
        String::from_utf8(w.into_inner()).unwrap()
    }

    fn sample_report() -> PackageReport {
        let mut report = PackageReport::new("transformers");
        report.record(InstallAttempt::failure(
            ManagerKind::Pip,
            "transformers",
            Duration::from_secs(1),
            AttemptError::InstallFailed {
                code: Some(1),
                message: "no wheel".to_string(),
            },
        ));
        report.record(InstallAttempt::success(
            ManagerKind::Conda,
            "transformers",
            Duration::from_secs(40),
        ));
        report.record(InstallAttempt::success(
            ManagerKind::Uv,
            "transformers",
            Duration::from_secs(8),
        ));
        report
    }

    #[test]
    fn test_attempt_detail() {
        let mut w = writer();
        let attempt = sample_report().attempt(ManagerKind::Pip).cloned().unwrap();
        w.attempt_finished(&attempt).unwrap();
        assert_eq!(text(w), "Status: Failed\nTime: 1.00 seconds\nError: no wheel\n");
    }

    #[test]
    fn test_package_summary() {
        let mut w = writer();
        w.package_summary(&sample_report()).unwrap();
        let out = text(w);

        assert!(out.contains("==== RESULTS SUMMARY FOR 'transformers' (Python 3.12.1) ===="));
        assert!(out.contains("pip: Failed\nconda: 40.00 seconds\nuv: 8.00 seconds\n"));
        assert!(out.contains("Fastest package manager for 'transformers': uv (8.00 seconds)"));
        assert!(out.contains("uv is 5.0x faster than conda"));
        assert!(!out.contains("than pip"));
    }

    #[test]
    fn test_table_layout() {
        let mut w = writer();
        w.table(&ManagerKind::ALL, &[sample_report()]).unwrap();
        let out = text(w);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[1], "=".repeat(50));
        assert_eq!(lines[2], "DETAILED RESULTS TABLE (Python 3.12.1)");
        assert_eq!(
            lines[4],
            "Package         pip (s)    conda (s)  uv (s)     Fastest   "
        );
        assert_eq!(
            lines[5],
            "--------------- ---------- ---------- ---------- ----------"
        );
        assert_eq!(
            lines[6],
            "transformers    Failed     40.00      8.00       uv        "
        );
    }

    #[test]
    fn test_overall_partial_note() {
        let summary = RunSummary::from_reports(&ManagerKind::ALL, &[sample_report()]);
        let mut w = writer();
        w.overall(&summary).unwrap();
        let out = text(w);

        assert!(out.contains("pip: 0/1 packages successful"));
        assert!(out.contains("pip: No successful installations"));
        assert!(out.contains("uv: 8.00 seconds total, 8.00 seconds average"));
        assert!(out.contains("Overall fastest package manager for Python 3.12.1: uv"));
        assert!(out.contains("uv is 5.0x faster than conda overall"));
        assert!(!out.contains("Note:"));
    }
}
