use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use femsntl::config::Config;
use femsntl::constants::DEFAULT_NEW_DATA_DIR;
use femsntl::datafiles::most_recent;
use femsntl::inventory::sha256_file;
use femsntl::normalize::NormalizeKind;
use femsntl::{logging, metrics, stdio};

#[derive(Parser)]
#[command(name = "femsntl")]
#[command(about = "Data inventory and record cleaning for the EMS analysis")]
#[command(version = "0.1.0")]
struct Cli {
    /// Configuration file (default: femsntl.toml at the project root, if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Write a Prometheus-format metrics snapshot here on exit
    #[arg(long, global = true)]
    metrics_out: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Commands related to the data inventory
    Inventory {
        #[command(subcommand)]
        command: InventoryCommands,
    },
    /// Print the SHA-256 of each file
    Sha256 {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print the most recent file in a directory whose name starts with PREFIX
    Mostrec {
        prefix: String,
        /// Directory to search (default: <data dir>/intermediate_objects)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Normalize values line by line
    Normalize {
        #[arg(value_enum)]
        kind: NormalizeKind,
        /// Input file, or - for stdin
        #[arg(long, short, default_value = "-")]
        input: String,
        /// Output file, or - for stdout
        #[arg(long, short, default_value = "-")]
        output: String,
        /// Token to drop from names (repeatable; adds to non_names from config)
        #[arg(long = "exclude", short = 'x')]
        exclude: Vec<String>,
    },
}

#[derive(Subcommand)]
enum InventoryCommands {
    /// Create an inventory from a directory
    Create {
        /// The directory containing the data to inventory
        #[arg(long = "data-dir", short = 'd')]
        data_dir: Option<PathBuf>,
    },
    /// Recompute the sha of every entry in an existing inventory
    ComputeSha {
        #[arg(long = "data-dir", short = 'd')]
        data_dir: Option<PathBuf>,
    },
    /// Verify that all data files match the shas in the inventory
    Verify {
        #[arg(long = "data-dir", short = 'd')]
        data_dir: Option<PathBuf>,
        /// Exit non-zero when any file does not match
        #[arg(long)]
        strict: bool,
        #[arg(long, value_enum, default_value = "text")]
        format: ReportFormat,
    },
    /// Copy the inventoried files into a fresh data directory
    RecreateDataDir {
        #[arg(long = "data-dir", short = 'd')]
        data_dir: Option<PathBuf>,
        #[arg(long = "new-data-dir", short = 'n', default_value = DEFAULT_NEW_DATA_DIR)]
        new_data_dir: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

fn main() {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            std::process::exit(2);
        }
    };

    let guard = logging::init_logging(&config.log_dir);
    if cli.metrics_out.is_some() {
        metrics::init_metrics();
    }

    let code = match run(cli.command, &config) {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("❌ {:#}", e);
            1
        }
    };

    if let Some(path) = &cli.metrics_out {
        if let Err(e) = write_metrics(path) {
            warn!("Failed to write metrics to {}: {:#}", path.display(), e);
        }
    }

    // exit() skips destructors; flush the log writer first
    drop(guard);
    std::process::exit(code);
}

fn run(command: Commands, config: &Config) -> anyhow::Result<i32> {
    match command {
        Commands::Inventory { command } => run_inventory(command, config),
        Commands::Sha256 { files } => {
            for file in &files {
                let hash = sha256_file(file)
                    .with_context(|| format!("hashing {}", file.display()))?;
                println!("{}  {}", hash, file.display());
            }
            Ok(0)
        }
        Commands::Mostrec { prefix, dir } => {
            let dir = dir.unwrap_or_else(|| {
                config.data_dir.join(femsntl::constants::INTERMEDIATE_DIR)
            });
            let path = most_recent(&prefix, &dir)?;
            println!("{}", path.display());
            Ok(0)
        }
        Commands::Normalize {
            kind,
            input,
            output,
            exclude,
        } => {
            let mut tokens = config.excluded_tokens();
            tokens.extend(exclude.iter().map(|t| t.to_uppercase()));
            let token_refs: Vec<&str> = tokens.iter().map(String::as_str).collect();

            let reader = stdio::open_input(Some(&input))?;
            let writer = stdio::open_output(Some(&output))?;
            let lines = stdio::normalize_lines(kind, reader, writer, &token_refs)?;
            info!(kind = ?kind, lines, "Normalized values");
            Ok(0)
        }
    }
}

fn run_inventory(command: InventoryCommands, config: &Config) -> anyhow::Result<i32> {
    let data_dir_or_default =
        |d: Option<PathBuf>| d.unwrap_or_else(|| config.data_dir.clone());

    match command {
        InventoryCommands::Create { data_dir } => {
            let data_dir = data_dir_or_default(data_dir);
            let span =
                tracing::info_span!("inventory_create_command", data_dir = %data_dir.display());
            let _enter = span.enter();

            let manager = config.inventory_manager(&data_dir);
            let manifest = manager
                .create()
                .with_context(|| format!("creating inventory of {}", data_dir.display()))?;
            manager.save(&manifest)?;
            println!(
                "✅ Inventoried {} files into {}",
                manifest.len(),
                manager.manifest_path().display()
            );
            Ok(0)
        }
        InventoryCommands::ComputeSha { data_dir } => {
            let data_dir = data_dir_or_default(data_dir);
            let manager = config.inventory_manager(&data_dir);
            let mut manifest = manager.load()?;
            manager
                .recompute_hashes(&mut manifest)
                .with_context(|| format!("recomputing hashes under {}", data_dir.display()))?;
            manager.save(&manifest)?;
            println!("✅ Updated {} hashes", manifest.len());
            Ok(0)
        }
        InventoryCommands::Verify {
            data_dir,
            strict,
            format,
        } => {
            let data_dir = data_dir_or_default(data_dir);
            let manager = config.inventory_manager(&data_dir);
            let manifest = manager.load()?;
            let report = manager
                .verify(&manifest)
                .with_context(|| format!("verifying {}", data_dir.display()))?;

            match format {
                ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
                ReportFormat::Text => {
                    for path in report.mismatched_paths() {
                        warn!(path, "Hash mismatch");
                        println!("file {} does not match sha", path);
                    }
                    println!(
                        "Checked {} files, skipped {} without sha, {} mismatched",
                        report.checked,
                        report.skipped,
                        report.mismatches.len()
                    );
                }
            }
            Ok(if strict && !report.is_clean() { 1 } else { 0 })
        }
        InventoryCommands::RecreateDataDir {
            data_dir,
            new_data_dir,
        } => {
            let data_dir = data_dir_or_default(data_dir);
            ensure_distinct(&data_dir, &new_data_dir)?;
            let manager = config.inventory_manager(&data_dir);
            let manifest = manager.load()?;
            let cloned = manager.clone_to(&manifest, &new_data_dir)?;
            println!(
                "✅ Copied {} files into {}",
                cloned.len(),
                new_data_dir.display()
            );
            Ok(0)
        }
    }
}

fn ensure_distinct(old: &Path, new: &Path) -> anyhow::Result<()> {
    if old == new {
        bail!("new data dir must differ from {}", old.display());
    }
    Ok(())
}

fn write_metrics(path: &Path) -> anyhow::Result<()> {
    let rendered = metrics::render().context("metrics recorder not installed")?;
    std::fs::write(path, rendered)?;
    Ok(())
}
