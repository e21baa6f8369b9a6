use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use log::info;
use pkgbench::{
    benchmarks::{Harness, ReportWriter, ResultExporter},
    command::CommandExecutor,
    config::{
        load_hub_config, resolve_bench_config, BenchConfig, BenchOverrides, HubConfig,
        MergeableConfiguration,
    },
    managers::{CommandFactory, ManagerKind},
    path_utils,
    system_info::{self, EnvironmentInfo},
};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

const DEFAULT_BENCH_CONFIG: &str = "bench.yml";

#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "Time package installs with pip, conda and uv and compare the results"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Benchmark config (defaults to ./bench.yml, built-in defaults if absent)
    #[arg(short, long, global = true, env = "PKGBENCH_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the install benchmarks
    Run {
        #[command(flatten)]
        selection: Selection,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also export results as JSON
        #[arg(long)]
        json: Option<PathBuf>,

        /// Don't draw a progress bar
        #[arg(long)]
        no_progress: bool,
    },
    /// Show what would be run without running it
    List {
        #[command(flatten)]
        selection: Selection,
    },
    /// Notebook hub configuration
    Hub {
        #[command(subcommand)]
        command: HubCommands,
    },
}

#[derive(Args, Debug)]
struct Selection {
    /// Package to benchmark (repeatable, replaces the configured list)
    #[arg(short, long = "package")]
    packages: Vec<String>,

    /// Manager to benchmark (repeatable, replaces the configured list)
    #[arg(short, long = "manager", value_enum)]
    managers: Vec<ManagerKind>,

    /// Python interpreter used for pip
    #[arg(long)]
    python: Option<String>,
}

impl Selection {
    fn overrides(&self) -> BenchOverrides {
        BenchOverrides {
            packages: self.packages.clone(),
            managers: self.managers.clone(),
            python: self.python.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
enum HubCommands {
    /// Load, validate and print a hub config file
    Check {
        /// Hub config YAML
        file: PathBuf,
    },
    /// Print the default hub config
    Default,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Hub { command } => match command {
            HubCommands::Check { file } => {
                let hub = load_hub_config(file)?;
                info!("Hub config {} is valid", file.display());
                print!("{}", hub.to_yaml()?);
            }
            HubCommands::Default => {
                print!("{}", HubConfig::default().to_yaml()?);
            }
        },
        Commands::List { selection } => {
            let config = bench_config(&cli, selection)?;
            list(&config);
        }
        Commands::Run {
            selection,
            output,
            json,
            no_progress,
        } => {
            let config = bench_config(&cli, selection)?;
            run(&config, output.as_deref(), json.as_deref(), !*no_progress)?;
        }
    }

    Ok(())
}

fn bench_config(cli: &Cli, selection: &Selection) -> Result<BenchConfig> {
    let (path, explicit) = match &cli.config {
        Some(path) => (path.clone(), true),
        None => (PathBuf::from(DEFAULT_BENCH_CONFIG), false),
    };
    resolve_bench_config(&path, explicit)?.merge_with(&selection.overrides())
}

fn list(config: &BenchConfig) {
    let factory = CommandFactory::from_config(config);
    let managers = config.ordered_managers();
    println!("Python: {}", factory.python());
    println!("Packages: {}", config.packages.join(", "));
    for package in &config.packages {
        println!("\n{package}:");
        for manager in &managers {
            println!("  install: {}", factory.install(*manager, package));
            println!("  cleanup: {}", factory.cleanup(*manager, package));
        }
    }
}

fn run(
    config: &BenchConfig,
    output: Option<&Path>,
    json: Option<&Path>,
    progress: bool,
) -> Result<()> {
    system_info::log_sys_info();
    let env = EnvironmentInfo::detect(&config.python);

    let executor = CommandExecutor::builder()
        .capture_output(true)
        .working_dir(config.working_dir.as_ref())
        .env_vars(config.env.clone())
        .build()?;
    let harness = Harness::new(executor, config).with_progress(progress);

    let sink: Box<dyn Write> = match output {
        Some(path) => {
            path_utils::ensure_parent_directory(path)?;
            let file = File::create(path)
                .with_context(|| format!("Failed to create report file: {path:?}"))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::stdout().lock()),
    };
    let mut writer = ReportWriter::new(sink, &env.python_version);

    let report = harness.run(&config.packages, &env, &mut writer)?;

    if let Some(path) = json {
        ResultExporter::export_json(&report, path)?;
        info!("Wrote results to {}", path.display());
    }
    if let Some(path) = output {
        info!("Wrote report to {}", path.display());
    }
    Ok(())
}
