//! Vista CLI - inspect viewer configurations without a browser
//!
//! Validates config files, prints the effective configuration as the JSON
//! export the debug panel copies, and samples the scroll director against a
//! page layout given on the command line.

mod check;
mod layout;
mod sample;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use vista_core::ViewerConfig;

use crate::layout::{ArgLayout, LandmarkArg};

#[derive(Parser, Debug)]
#[command(name = "vista")]
#[command(about = "Inspect Vista building viewer configurations")]
#[command(version)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a config file and report anything suspicious
    Check {
        /// Config file (.json export or TOML)
        file: PathBuf,
    },
    /// Print the effective configuration
    Export {
        /// Config file to start from; defaults are used without one
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Evaluate the scroll director at one scroll offset
    Sample {
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Page scroll offset in CSS pixels
        #[arg(long)]
        scroll: f64,

        /// Viewport height in CSS pixels
        #[arg(long)]
        viewport: f64,

        /// Landmark geometry as id=top,height (repeatable)
        #[arg(long = "landmark")]
        landmarks: Vec<LandmarkArg>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Toml,
}

fn load(config: Option<&Path>) -> Result<ViewerConfig> {
    match config {
        Some(path) => ViewerConfig::from_file(path)
            .with_context(|| format!("Failed to load {}", path.display())),
        None => {
            info!("No config given, using defaults");
            Ok(ViewerConfig::default())
        }
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Check { file } => {
            let config = load(Some(&file))?;
            println!("{}", check::summary(&config));

            let findings = check::inspect(&config);
            if findings.is_empty() {
                println!("OK: {}", file.display());
            } else {
                for finding in &findings {
                    println!("  - {}", finding);
                }
                bail!("{} problem(s) in {}", findings.len(), file.display());
            }
        }
        Command::Export { config, format, output } => {
            let config = load(config.as_deref())?;
            let text = match format {
                Format::Json => config.to_json_pretty()?,
                Format::Toml => config.to_toml()?,
            };
            match output {
                Some(path) => {
                    std::fs::write(&path, text)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!(path = %path.display(), "Wrote config");
                }
                None => println!("{}", text),
            }
        }
        Command::Sample {
            config,
            scroll,
            viewport,
            landmarks,
        } => {
            let config = load(config.as_deref())?;
            let layout = ArgLayout::new(viewport, &landmarks);
            let report = sample::sample(&config, &layout, scroll);
            if report.pose.is_none() {
                tracing::warn!("No transition matched the given landmarks");
            }
            println!("{}", serde_json::to_string_pretty(&report.to_json())?);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr so exported JSON can be piped
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    run(args.command)
}
