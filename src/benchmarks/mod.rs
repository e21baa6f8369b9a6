mod attempt;
pub use attempt::{AttemptError, InstallAttempt};
mod results;
pub use results::{PackageReport, Speedup};
mod summary;
pub use summary::{ManagerTotals, OverallVerdict, RunSummary};
mod render;
pub use render::ReportWriter;
mod harness;
pub use harness::{Harness, RunReport};
mod export;
pub use export::ResultExporter;
