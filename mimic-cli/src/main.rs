//! Mimic CLI - runs the kitchen demonstration against recording doubles

mod kitchen;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mimic_core::config::{MimicConfig, ReportFormat};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mimic")]
#[command(about = "Mimic call-recording engine CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the kitchen scenarios and report the outcome
    Kitchen {
        /// Configuration file (defaults to mimic.toml and MIMIC_ variables)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Include every scenario's call timeline
        #[arg(long)]
        timeline: bool,
    },
    /// Version information
    Version,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Version => {
            println!("mimic {}", env!("CARGO_PKG_VERSION"));
            println!("mimic-core {}", mimic_core::VERSION);
        }
        Commands::Kitchen {
            config,
            json,
            timeline,
        } => {
            let mut config = match config {
                Some(path) => MimicConfig::from_file(&path)
                    .with_context(|| format!("loading {}", path.display()))?,
                None => MimicConfig::load()?,
            };
            if json {
                config.report.format = ReportFormat::Json;
            }
            if timeline {
                config.report.include_timeline = true;
            }

            let report = kitchen::run(&config);
            print_report(&report, config.report.format)?;

            if !report.passed() {
                anyhow::bail!("{} kitchen scenario(s) failed", report.failures());
            }
        }
    }

    Ok(())
}

fn print_report(report: &kitchen::KitchenReport, format: ReportFormat) -> Result<()> {
    match format {
        ReportFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        ReportFormat::Text => {
            for scenario in &report.scenarios {
                let status = if scenario.passed { "ok" } else { "FAILED" };
                println!("Test: {} ... {} ({})", scenario.name, status, scenario.detail);
                for call in &scenario.timeline {
                    println!(
                        "    #{} {} {} {}",
                        call.sequence, call.operation_name, call.subject, call.recorded_at
                    );
                }
            }
        }
    }
    Ok(())
}
