//! Error types for quakesim.
//!
//! Uses `thiserror` for library-style error definitions.

use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while building or loading a simulation.
#[derive(Error, Debug)]
pub enum SimError {
    /// Configuration failed validation
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Reading a configuration file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing failed
    #[error("Failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors returned by the location solver.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LocateError {
    /// Fewer than two stations carry a P pick; the inversion is unconstrained
    #[error("insufficient picks: {usable} usable station(s), at least 2 required")]
    InsufficientPicks { usable: usize },
}
