use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::benchmarks::attempt::InstallAttempt;
use crate::managers::ManagerKind;

/// How many times faster one manager was than another
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Speedup {
    pub fastest: ManagerKind,
    pub other: ManagerKind,
    /// `other` time divided by `fastest` time
    pub factor: f64,
}

impl Speedup {
    pub fn between(
        fastest: ManagerKind,
        fastest_secs: f64,
        other: ManagerKind,
        other_secs: f64,
    ) -> Self {
        let factor = if fastest_secs > 0.0 {
            other_secs / fastest_secs
        } else {
            f64::INFINITY
        };
        Self {
            fastest,
            other,
            factor,
        }
    }
}

impl fmt::Display for Speedup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.factor.is_finite() {
            // A zero-second install has no meaningful ratio
            return write!(
                f,
                "{} finished in no measurable time, ahead of {}",
                self.fastest, self.other
            );
        }
        write!(
            f,
            "{} is {:.1}x faster than {}",
            self.fastest, self.factor, self.other
        )
    }
}

/// Every manager's attempt at installing one package
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageReport {
    pub package: String,
    /// Keyed by manager, so iteration follows evaluation order
    pub attempts: BTreeMap<ManagerKind, InstallAttempt>,
}

impl PackageReport {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            attempts: BTreeMap::new(),
        }
    }

    /// Record an attempt. A manager has at most one attempt per package; a
    /// second attempt for the same manager replaces the first.
    pub fn record(&mut self, attempt: InstallAttempt) {
        debug_assert_eq!(attempt.package, self.package);
        self.attempts.insert(attempt.manager, attempt);
    }

    pub fn attempt(&self, manager: ManagerKind) -> Option<&InstallAttempt> {
        self.attempts.get(&manager)
    }

    /// Successful attempts in evaluation order
    pub fn successes(&self) -> impl Iterator<Item = &InstallAttempt> {
        self.attempts.values().filter(|a| a.succeeded)
    }

    /// The successful attempt with the strictly smallest time. On a tie the
    /// manager evaluated first wins.
    pub fn fastest(&self) -> Option<&InstallAttempt> {
        let mut fastest: Option<&InstallAttempt> = None;
        for attempt in self.successes() {
            match fastest {
                Some(best) if attempt.elapsed_seconds >= best.elapsed_seconds => {}
                _ => fastest = Some(attempt),
            }
        }
        fastest
    }

    /// Speedup of the fastest manager over each other successful manager
    pub fn speedups(&self) -> Vec<Speedup> {
        let Some(fastest) = self.fastest() else {
            return Vec::new();
        };
        self.successes()
            .filter(|a| a.manager != fastest.manager)
            .map(|a| {
                Speedup::between(
                    fastest.manager,
                    fastest.elapsed_seconds,
                    a.manager,
                    a.elapsed_seconds,
                )
            })
            .collect()
    }
}
