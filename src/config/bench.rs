use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::config::traits::{Configuration, MergeableConfiguration, PathConfiguration};
use crate::managers::{normalize_managers, ManagerKind};
use crate::path_utils;

/// Packages benchmarked when the config does not name any: a mix of small
/// pure-python libraries and heavy compiled stacks.
pub const DEFAULT_PACKAGES: [&str; 11] = [
    "requests",
    "beautifulsoup4",
    "pandas",
    "matplotlib",
    "seaborn",
    "scikit-learn",
    "transformers",
    "pillow",
    "nltk",
    "pyyaml",
    "tqdm",
];

/// pip flags that keep its output quiet when running as root
pub const DEFAULT_PIP_FLAGS: [&str; 4] = [
    "--quiet",
    "--disable-pip-version-check",
    "--no-warn-script-location",
    "--root-user-action=ignore",
];

/// Benchmark configuration loaded from bench.yml
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BenchConfig {
    /// Interpreter used for `-m pip` and for the version banner
    #[serde(default = "default_python")]
    pub python: String,
    /// Packages to benchmark, in order
    #[serde(default = "default_packages")]
    pub packages: Vec<String>,
    /// Managers to benchmark
    #[serde(default = "default_managers")]
    pub managers: Vec<ManagerKind>,
    /// Extra flags passed to `pip install`
    #[serde(default = "default_pip_flags")]
    pub pip_flags: Vec<String>,
    /// Channel passed to `conda install -c`
    #[serde(default = "default_conda_channel")]
    pub conda_channel: String,
    #[serde(default = "default_conda_bin")]
    pub conda_bin: String,
    #[serde(default = "default_uv_bin")]
    pub uv_bin: String,
    /// Directory the package managers run in
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
    /// Environment variables to set for every package manager invocation
    #[serde(default)]
    pub env: HashMap<String, String>,
    /// Path to the config file (set during loading)
    #[serde(skip)]
    pub path: PathBuf,
}

fn default_python() -> String {
    "python3".to_string()
}

fn default_packages() -> Vec<String> {
    DEFAULT_PACKAGES.iter().map(|p| p.to_string()).collect()
}

fn default_managers() -> Vec<ManagerKind> {
    ManagerKind::ALL.to_vec()
}

fn default_pip_flags() -> Vec<String> {
    DEFAULT_PIP_FLAGS.iter().map(|f| f.to_string()).collect()
}

fn default_conda_channel() -> String {
    "conda-forge".to_string()
}

fn default_conda_bin() -> String {
    "conda".to_string()
}

fn default_uv_bin() -> String {
    "uv".to_string()
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            python: default_python(),
            packages: default_packages(),
            managers: default_managers(),
            pip_flags: default_pip_flags(),
            conda_channel: default_conda_channel(),
            conda_bin: default_conda_bin(),
            uv_bin: default_uv_bin(),
            working_dir: None,
            env: HashMap::new(),
            path: PathBuf::new(),
        }
    }
}

impl BenchConfig {
    /// Managers in evaluation order with duplicates removed
    pub fn ordered_managers(&self) -> Vec<ManagerKind> {
        normalize_managers(&self.managers)
    }
}

impl Configuration for BenchConfig {
    fn config_path(&self) -> &PathBuf {
        &self.path
    }

    fn config_type(&self) -> &str {
        "benchmark"
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.python.trim().is_empty() {
            anyhow::bail!("python interpreter cannot be empty");
        }
        if self.packages.is_empty() {
            anyhow::bail!("No packages configured");
        }
        if self.managers.is_empty() {
            anyhow::bail!("No package managers configured");
        }
        if self.conda_channel.trim().is_empty() {
            anyhow::bail!("conda_channel cannot be empty");
        }

        let mut seen = HashSet::new();
        for package in &self.packages {
            if package.is_empty() {
                anyhow::bail!("Package name cannot be empty");
            }
            if package.chars().any(char::is_whitespace) {
                anyhow::bail!("Invalid package name: {:?}", package);
            }
            if !seen.insert(package.to_lowercase()) {
                anyhow::bail!("Duplicate package: {}", package);
            }
        }

        Ok(())
    }
}

impl PathConfiguration for BenchConfig {
    fn with_expanded_paths(&self, config_dir: &Path) -> anyhow::Result<Self> {
        let mut config = self.clone();
        config.python = path_utils::expand_program(&config.python);
        config.conda_bin = path_utils::expand_program(&config.conda_bin);
        config.uv_bin = path_utils::expand_program(&config.uv_bin);
        if let Some(dir) = &config.working_dir {
            config.working_dir = Some(path_utils::resolve_path(dir, config_dir));
        }
        Ok(config)
    }
}

/// Values given on the command line that replace the file's values
#[derive(Debug, Clone, Default)]
pub struct BenchOverrides {
    pub packages: Vec<String>,
    pub managers: Vec<ManagerKind>,
    pub python: Option<String>,
}

impl MergeableConfiguration<BenchOverrides> for BenchConfig {
    fn merge_with(&self, other: &BenchOverrides) -> anyhow::Result<Self> {
        let mut merged = self.clone();
        if !other.packages.is_empty() {
            merged.packages = other.packages.clone();
        }
        if !other.managers.is_empty() {
            merged.managers = other.managers.clone();
        }
        if let Some(python) = &other.python {
            merged.python = path_utils::expand_program(python);
        }
        merged.validate()?;
        Ok(merged)
    }
}

/// Load benchmark configuration from a YAML file
pub fn load_bench_config(bench_config_path: &Path) -> Result<BenchConfig> {
    if !bench_config_path.exists() {
        anyhow::bail!("Benchmark config file not found: {:?}", bench_config_path);
    }
    let config_dir = bench_config_path
        .parent()
        .context("Failed to get benchmark config directory")?;

    let contents = std::fs::read_to_string(bench_config_path).with_context(|| {
        format!(
            "Failed to read benchmark config file: {:?}",
            bench_config_path
        )
    })?;

    let mut config: BenchConfig = serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse YAML from file: {:?}", bench_config_path))?;
    config.path = bench_config_path.to_path_buf();

    let config = config.with_expanded_paths(config_dir)?;
    config.validate()?;

    debug!("Using {} configuration\n{:?}", config.config_type(), config);
    Ok(config)
}

/// Load the config file, falling back to the built-in defaults when the
/// default path is absent. An explicitly requested file must exist.
pub fn resolve_bench_config(path: &Path, explicit: bool) -> Result<BenchConfig> {
    if !explicit && !path.exists() {
        info!(
            "No benchmark config at {}, using built-in defaults",
            path.display()
        );
        let config = BenchConfig::default();
        config.validate()?;
        return Ok(config);
    }
    load_bench_config(path)
}
