use anyhow::{Context, Result};
use std::path::Path;

use crate::benchmarks::harness::RunReport;
use crate::path_utils;

/// Functions for exporting benchmark results
pub struct ResultExporter;

impl ResultExporter {
    /// Write a run's reports and summary as pretty-printed JSON
    pub fn export_json(report: &RunReport, path: &Path) -> Result<()> {
        let json_data = serde_json::to_string_pretty(report)
            .context("Failed to serialize benchmark results")?;

        path_utils::ensure_parent_directory(path)?;
        std::fs::write(path, json_data)
            .with_context(|| format!("Failed to write benchmark results to {path:?}"))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmarks::attempt::InstallAttempt;
    use crate::benchmarks::results::PackageReport;
    use crate::benchmarks::summary::RunSummary;
    use crate::managers::ManagerKind;
    use chrono::Local;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn test_export_json() {
        let mut package = PackageReport::new("requests");
        package.record(InstallAttempt::success(
            ManagerKind::Uv,
            "requests",
            Duration::from_millis(500),
        ));
        let managers = vec![ManagerKind::Uv];
        let summary = RunSummary::from_reports(&managers, std::slice::from_ref(&package));
        let report = RunReport {
            python_version: "3.12.1".to_string(),
            started_at: Local::now(),
            managers,
            packages: vec![package],
            summary,
        };

        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("results.json");
        ResultExporter::export_json(&report, &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["python_version"], "3.12.1");
        assert_eq!(value["managers"][0], "uv");
        let attempt = &value["packages"][0]["attempts"]["uv"];
        assert_eq!(attempt["succeeded"], true);
        assert_eq!(attempt["elapsed_seconds"], 0.5);
        assert!(attempt.get("error_text").is_none());
        assert_eq!(value["summary"]["totals"]["uv"]["successes"], 1);
    }
}
