/// Benchmark configuration
pub mod bench;
pub use bench::{load_bench_config, resolve_bench_config, BenchConfig, BenchOverrides};

/// Notebook hub configuration
pub mod hub;
pub use hub::{load_hub_config, HubConfig, HubConfigError, SpawnerConfig};

/// Configuration traits
pub mod traits;
pub use traits::{Configuration, MergeableConfiguration, PathConfiguration};

/// Tests for configuration
#[cfg(test)]
mod tests;
