use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "repo-health",
    version,
    about = "Repository health scoring from pre-fetched activity data"
)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score one or more activity bundles (JSON files)
    Analyze(AnalyzeCommand),
    /// Show engine version, weights and capabilities
    Info(InfoCommand),
}

#[derive(Args)]
pub struct AnalyzeCommand {
    /// Paths to activity bundles; each is scored independently
    #[arg(required = true)]
    pub bundles: Vec<PathBuf>,

    /// Classification threshold in (0.0, 1.0]; overrides configuration
    #[arg(short, long)]
    pub threshold: Option<f64>,

    #[arg(short, long, value_enum, default_value = "json")]
    pub format: ReportFormat,

    /// Write the report to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory holding repo-health.toml (defaults to the current directory)
    #[arg(long)]
    pub config_dir: Option<PathBuf>,

    /// Evaluation instant as RFC 3339 (defaults to the current time)
    #[arg(long)]
    pub now: Option<String>,
}

#[derive(Args)]
pub struct InfoCommand {
    #[arg(short, long, value_enum, default_value = "summary")]
    pub format: ReportFormat,

    #[arg(long)]
    pub config_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ReportFormat {
    Json,
    Summary,
}
