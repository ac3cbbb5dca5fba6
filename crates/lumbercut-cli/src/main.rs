//! lumbercut CLI - cut list optimizer for lumber
//!
//! Reads job files (cut list + stock), plans the cuts and prints a report.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use lumbercut::{optimize_batch, Unit};
use std::path::PathBuf;
use tracing::info;

mod config;
mod job;
mod logging;
mod report;

use config::Config;
use job::JobFile;

#[derive(Parser)]
#[command(name = "lumbercut")]
#[command(about = "Plan cuts from stock lumber with minimal waste", long_about = None)]
struct Cli {
    /// Config file with default settings (else $LUMBERCUT_CONFIG)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Optimize one or more job files
    Optimize(OptimizeArgs),
    /// List supported length units
    Units,
    /// Print a sample job file
    Example {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
}

#[derive(clap::Args)]
struct OptimizeArgs {
    /// Job files (.toml, otherwise JSON)
    #[arg(required = true)]
    jobs: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Unit for lengths in the text report
    #[arg(short, long, value_parser = parse_unit)]
    unit: Option<Unit>,

    /// Saw kerf, in the configured kerf unit
    #[arg(long)]
    kerf: Option<f64>,

    /// Minimum usable offcut, in the configured offcut unit
    #[arg(long)]
    min_offcut: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Human-readable report (TOML for `example`)
    Text,
    /// JSON
    Json,
}

fn parse_unit(s: &str) -> Result<Unit, String> {
    s.parse::<Unit>().map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Optimize(args) => {
            let config = Config::discover(cli.config.as_deref())?;
            print!("{}", run_optimize(&args, &config)?);
        }
        Commands::Units => {
            print!("{}", list_units());
        }
        Commands::Example { format } => {
            print!("{}", example(format)?);
        }
    }

    Ok(())
}

fn run_optimize(args: &OptimizeArgs, config: &Config) -> Result<String> {
    let base = config.base_settings();

    let mut jobs = Vec::with_capacity(args.jobs.len());
    for path in &args.jobs {
        let mut job = JobFile::load(path)?.into_job(&base);
        if let Some(kerf) = args.kerf {
            job.settings.saw_kerf = kerf;
        }
        if let Some(min_offcut) = args.min_offcut {
            job.settings.min_offcut_length = min_offcut;
        }
        jobs.push(job);
    }
    info!(jobs = jobs.len(), "optimizing");

    let results = optimize_batch(&jobs);
    let display_unit = args.unit.or(config.display_unit).unwrap_or_default();

    let mut out = String::new();
    let mut json = Vec::with_capacity(results.len());
    for ((path, job), result) in args.jobs.iter().zip(&jobs).zip(results) {
        let result = result.with_context(|| format!("optimizing {}", path.display()))?;
        match args.format {
            Format::Json => json.push(serde_json::to_value(&result)?),
            Format::Text => {
                if args.jobs.len() > 1 {
                    out.push_str(&format!("== {} ==\n", path.display()));
                }
                report::render(&mut out, &result, display_unit, job.settings.min_offcut_unit)?;
                out.push('\n');
            }
        }
    }

    if args.format == Format::Json {
        let value = if json.len() == 1 {
            json.remove(0)
        } else {
            serde_json::Value::Array(json)
        };
        out = serde_json::to_string_pretty(&value)?;
        out.push('\n');
    }

    Ok(out)
}

fn list_units() -> String {
    let mut out = String::new();
    for unit in Unit::ALL {
        out.push_str(&format!(
            "{:<8} {:<4} {} in\n",
            unit.name(),
            unit.suffix(),
            unit.inches_per_unit()
        ));
    }
    out
}

fn example(format: Format) -> Result<String> {
    match format {
        Format::Text => Ok(job::EXAMPLE_TOML.to_string()),
        Format::Json => {
            let job = JobFile::parse(job::EXAMPLE_TOML, true)?;
            let settings = Config::default().base_settings();
            let mut text = serde_json::to_string_pretty(&job.into_job(&settings))?;
            text.push('\n');
            Ok(text)
        }
    }
}
