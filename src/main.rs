mod cli;

use chrono::{DateTime, Utc};
use clap::Parser;
use repo_health::config;
use repo_health::report::{self, OutputFormat};
use repo_health::{Engine, EngineConfig, HealthError, RawBundle, ScoreResult};
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const NEEDS_ATTENTION: i32 = 1;
    pub const LOW_CONFIDENCE: i32 = 2;
    pub const RUNTIME_FAILURE: i32 = 3;
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_engine(config_dir: Option<&Path>, threshold: Option<f64>) -> Result<Engine, HealthError> {
    let dir = config_dir.unwrap_or_else(|| Path::new("."));
    if !dir.exists() {
        return Err(HealthError::PathNotFound(dir.display().to_string()));
    }
    let mut loaded: EngineConfig = config::load_config(dir)?;
    if let Some(threshold) = threshold {
        loaded = loaded.with_threshold(threshold);
    }
    Engine::new(loaded)
}

fn parse_now(raw: Option<&str>) -> Result<DateTime<Utc>, HealthError> {
    match raw {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|instant| instant.with_timezone(&Utc))
            .map_err(|e| HealthError::Input(format!("--now {raw:?}: {e}"))),
        None => Ok(Utc::now()),
    }
}

fn output_format(format: cli::ReportFormat) -> OutputFormat {
    match format {
        cli::ReportFormat::Json => OutputFormat::Json,
        cli::ReportFormat::Summary => OutputFormat::Summary,
    }
}

fn analyze_bundle(
    engine: &Engine,
    path: &Path,
    now: DateTime<Utc>,
) -> Result<ScoreResult, HealthError> {
    let bundle = RawBundle::from_path(path)?;
    debug!(bundle = %path.display(), %now, "loaded bundle");
    engine.analyze(&bundle, now)
}

fn result_code(result: &ScoreResult) -> i32 {
    if result.demo_mode {
        exit_code::LOW_CONFIDENCE
    } else if result.is_healthy() {
        exit_code::SUCCESS
    } else {
        exit_code::NEEDS_ATTENTION
    }
}

fn run() -> Result<i32, HealthError> {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        cli::Commands::Analyze(cmd) => {
            let engine = load_engine(cmd.config_dir.as_deref(), cmd.threshold)?;
            let now = parse_now(cmd.now.as_deref())?;

            let mut results = Vec::with_capacity(cmd.bundles.len());
            let mut code = exit_code::SUCCESS;
            for path in &cmd.bundles {
                match analyze_bundle(&engine, path, now) {
                    Ok(result) => {
                        code = code.max(result_code(&result));
                        results.push(result);
                    }
                    Err(e) => {
                        eprintln!("error: {}: {}", path.display(), e);
                        code = exit_code::RUNTIME_FAILURE;
                    }
                }
            }

            if !results.is_empty() {
                let rendered = report::render_batch(&results, output_format(cmd.format))?;
                match &cmd.output {
                    Some(output) => {
                        fs::write(output, format!("{rendered}\n"))?;
                        info!(output = %output.display(), reports = results.len(), "report written");
                    }
                    None => println!("{rendered}"),
                }
            }
            Ok(code)
        }
        cli::Commands::Info(cmd) => {
            let engine = load_engine(cmd.config_dir.as_deref(), None)?;
            let rendered = report::render_info(&engine.info(), output_format(cmd.format))?;
            println!("{rendered}");
            Ok(exit_code::SUCCESS)
        }
    }
}

fn main() {
    match run() {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
        }
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(exit_code::RUNTIME_FAILURE);
        }
    }
}
