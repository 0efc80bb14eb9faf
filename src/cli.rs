//! Command-line interface definitions.
//!
//! Uses clap derive API for argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use quakesim::geo::SearchBox;
use quakesim::output::Format;

/// Synthetic earthquake pipeline: pick, locate, and size a simulated event.
#[derive(Parser, Debug)]
#[command(name = "quakesim")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose debug logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Silence logging below error level (run output still goes to stdout)
    #[arg(long, global = true)]
    pub quiet: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a simulation to completion and report the solution
    Run(RunArgs),

    /// Print the default configuration as JSON
    Config,
}

/// Arguments for the `run` command.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// JSON configuration file (missing fields use defaults)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// RNG seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// P pick threshold
    #[arg(long)]
    pub p_threshold: Option<f64>,

    /// S pick threshold
    #[arg(long)]
    pub s_threshold: Option<f64>,

    /// Background amplitude noise standard deviation (0 disables noise)
    #[arg(long)]
    pub noise_sigma: Option<f64>,

    /// Search box: minlat,minlon,maxlat,maxlon
    #[arg(long, value_parser = parse_bbox)]
    pub bbox: Option<SearchBox>,

    /// Grid search step in degrees
    #[arg(long)]
    pub grid_step: Option<f64>,

    /// Tick ceiling before the run times out
    #[arg(long)]
    pub max_ticks: Option<u64>,

    /// Print a station snapshot every N ticks (0 = never)
    #[arg(long, default_value = "0")]
    pub snapshot_every: u64,

    /// Output format
    #[arg(long, short = 'f', default_value = "human", value_parser = parse_format)]
    pub format: Format,
}

/// Parse an output format from string.
fn parse_format(s: &str) -> Result<Format, String> {
    s.parse()
}

/// Parse a search box from string.
fn parse_bbox(s: &str) -> Result<SearchBox, String> {
    s.parse()
}
