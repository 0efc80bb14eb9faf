//! quakesim - synthetic earthquake pipeline from your terminal.
//!
//! Streams a simulated three-station event tick by tick, picks arrivals,
//! locates the epicenter, and prints what happened.

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;

use quakesim::output;
use quakesim::{Scheduler, SimConfig};

mod cli;

use cli::{Cli, Command};

fn main() -> ExitCode {
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Returns whether the command succeeded; a run without a solution is a failure.
fn run() -> Result<bool> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Command::Run(args) => cmd_run(args),
        Command::Config => cmd_config().map(|()| true),
    }
}

/// Initialize tracing subscriber.
fn init_tracing(verbose: bool, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Build the run configuration: file (or defaults), then flag overrides.
fn build_config(args: &cli::RunArgs) -> Result<SimConfig> {
    let mut config = match &args.config {
        Some(path) => SimConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => SimConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(p) = args.p_threshold {
        config.p_threshold = p;
    }
    if let Some(s) = args.s_threshold {
        config.s_threshold = s;
    }
    if let Some(sigma) = args.noise_sigma {
        config.noise_sigma = sigma;
    }
    if let Some(bbox) = args.bbox {
        config.search_box = bbox;
    }
    if let Some(step) = args.grid_step {
        config.grid_step = step;
    }
    if let Some(max_ticks) = args.max_ticks {
        config.max_ticks = max_ticks;
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Execute the `run` command - stream a simulation to its end.
fn cmd_run(args: cli::RunArgs) -> Result<bool> {
    let config = build_config(&args)?;
    let mut scheduler: Scheduler = Scheduler::new(config).context("failed to build scheduler")?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let report = output::write_run(
        &mut handle,
        &mut scheduler,
        args.format,
        args.snapshot_every,
        chrono::Utc::now(),
    )
    .context("failed to write run output")?;

    Ok(report.outcome.is_success())
}

/// Execute the `config` command - print defaults for editing.
fn cmd_config() -> Result<()> {
    let json = serde_json::to_string_pretty(&SimConfig::default())
        .context("failed to serialize default config")?;
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{json}")?;
    Ok(())
}
