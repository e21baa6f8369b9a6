use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::benchmarks::results::{PackageReport, Speedup};
use crate::managers::ManagerKind;

/// Successful installs of one manager across the run
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ManagerTotals {
    pub successes: usize,
    /// Sum of `elapsed_seconds` over successful attempts only
    pub total_seconds: f64,
}

impl ManagerTotals {
    pub fn average(&self) -> Option<f64> {
        if self.successes == 0 {
            None
        } else {
            Some(self.total_seconds / self.successes as f64)
        }
    }
}

/// Which manager came out ahead over the whole run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "coverage", rename_all = "snake_case")]
pub enum OverallVerdict {
    /// Chosen among managers that installed every package, by total time
    Full {
        fastest: ManagerKind,
        speedups: Vec<Speedup>,
    },
    /// No manager installed every package; lowest per-success average wins
    Partial {
        fastest: ManagerKind,
        average_seconds: f64,
    },
}

/// Cross-package aggregate, built by folding package reports one at a time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub package_count: usize,
    pub totals: BTreeMap<ManagerKind, ManagerTotals>,
}

impl RunSummary {
    /// Empty summary with a zeroed entry for every benchmarked manager
    pub fn new(managers: &[ManagerKind]) -> Self {
        Self {
            package_count: 0,
            totals: managers
                .iter()
                .map(|m| (*m, ManagerTotals::default()))
                .collect(),
        }
    }

    /// Fold step: the summary after one more package
    pub fn absorb(mut self, report: &PackageReport) -> Self {
        self.package_count += 1;
        for attempt in report.successes() {
            let totals = self.totals.entry(attempt.manager).or_default();
            totals.successes += 1;
            totals.total_seconds += attempt.elapsed_seconds;
        }
        self
    }

    pub fn from_reports(managers: &[ManagerKind], reports: &[PackageReport]) -> Self {
        reports
            .iter()
            .fold(Self::new(managers), |summary, report| summary.absorb(report))
    }

    pub fn totals(&self, manager: ManagerKind) -> ManagerTotals {
        self.totals.get(&manager).copied().unwrap_or_default()
    }

    pub fn total_successes(&self) -> usize {
        self.totals.values().map(|t| t.successes).sum()
    }

    /// Managers that succeeded for every package, in evaluation order
    pub fn full_coverage(&self) -> Vec<ManagerKind> {
        self.totals
            .iter()
            .filter(|(_, t)| t.successes == self.package_count && t.successes > 0)
            .map(|(m, _)| *m)
            .collect()
    }

    /// `None` when nothing succeeded anywhere
    pub fn verdict(&self) -> Option<OverallVerdict> {
        if self.total_successes() == 0 {
            return None;
        }

        let full = self.full_coverage();
        let full_totals = full.iter().map(|m| (*m, self.totals(*m).total_seconds));
        if let Some(fastest) = first_minimum(full_totals) {
            let fastest_total = self.totals(fastest).total_seconds;
            let speedups = full
                .iter()
                .filter(|m| **m != fastest)
                .map(|m| {
                    Speedup::between(fastest, fastest_total, *m, self.totals(*m).total_seconds)
                })
                .collect();
            return Some(OverallVerdict::Full { fastest, speedups });
        }

        let averages = self
            .totals
            .iter()
            .filter_map(|(m, t)| t.average().map(|avg| (*m, avg)));
        first_minimum(averages).map(|fastest| OverallVerdict::Partial {
            fastest,
            average_seconds: self.totals(fastest).average().unwrap_or_default(),
        })
    }
}

/// Key with the strictly smallest value; earlier keys win ties
fn first_minimum(values: impl Iterator<Item = (ManagerKind, f64)>) -> Option<ManagerKind> {
    let mut best: Option<(ManagerKind, f64)> = None;
    for (manager, value) in values {
        match best {
            Some((_, best_value)) if value >= best_value => {}
            _ => best = Some((manager, value)),
        }
    }
    best.map(|(m, _)| m)
}
