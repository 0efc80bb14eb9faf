//! Output formatters for run signals and reports.
//!
//! Supports human-readable (with colors), JSON, and NDJSON formats.

use std::io::{self, Write};

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;

use crate::models::{Solution, SourceEvent};
use crate::scheduler::{RunEvent, RunOutcome, RunSnapshot, Scheduler};

// ANSI color codes
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

const RED: &str = "\x1b[91m";
const YELLOW: &str = "\x1b[93m";
const CYAN: &str = "\x1b[96m";
const GREEN: &str = "\x1b[92m";
const WHITE: &str = "\x1b[97m";

const ICON_QUAKE: &str = "🌍";

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Human-readable terminal output (default)
    #[default]
    Human,
    /// JSON document
    Json,
    /// Newline-delimited JSON (one object per line)
    Ndjson,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            "ndjson" => Ok(Self::Ndjson),
            _ => Err(format!("unknown format: {s} (expected: human, json, ndjson)")),
        }
    }
}

/// Per-station line of the final report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationSummary {
    pub code: String,
    /// Distance to the true source (km)
    pub distance_km: f64,
    pub p_pick: Option<u64>,
    pub s_pick: Option<u64>,
    /// P pick in seconds since run start
    pub p_time: Option<f64>,
    pub peak_amplitude: f64,
}

/// Final report of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub finished_at: String,
    pub ticks: u64,
    pub dt: f64,
    pub truth: SourceEvent,
    pub outcome: RunOutcome,
    /// Epicentral error against the true source, when solved
    pub location_error_km: Option<f64>,
    pub stations: Vec<StationSummary>,
    /// Lifecycle signals, carried only when the report is the whole output
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<RunEvent>,
    /// Periodic snapshots, carried only when the report is the whole output
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub snapshots: Vec<RunSnapshot>,
}

impl RunReport {
    /// Summarize a finished run. Returns `None` while the run is in progress.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_scheduler<R: Rng>(scheduler: &Scheduler<R>, finished_at: DateTime<Utc>) -> Option<Self> {
        let outcome = scheduler.outcome()?.clone();
        let config = scheduler.config();
        let truth = config.source;

        let stations = config
            .stations
            .iter()
            .zip(&scheduler.run().stations)
            .map(|(sta, run)| StationSummary {
                code: sta.code.clone(),
                distance_km: sta.distance_km(truth.latitude, truth.longitude),
                p_pick: run.p_pick,
                s_pick: run.s_pick,
                p_time: run.p_pick.map(|t| t as f64 * config.dt),
                peak_amplitude: run.peak_amplitude,
            })
            .collect();

        let location_error_km = outcome.solution().map(|s| {
            crate::geo::haversine_distance(s.latitude, s.longitude, truth.latitude, truth.longitude)
        });

        Some(Self {
            finished_at: finished_at.to_rfc3339(),
            ticks: scheduler.ticks(),
            dt: config.dt,
            truth,
            outcome,
            location_error_km,
            stations,
            events: Vec::new(),
            snapshots: Vec::new(),
        })
    }
}

/// Drive `scheduler` to its end, writing signals, snapshots, and the report.
///
/// Human and NDJSON output stream as ticks happen. JSON output is a single
/// report document with the signals and snapshots folded in.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_run<W: Write, R: Rng>(
    writer: &mut W,
    scheduler: &mut Scheduler<R>,
    format: Format,
    snapshot_every: u64,
    finished_at: DateTime<Utc>,
) -> io::Result<RunReport> {
    let dt = scheduler.config().dt;
    let mut events = Vec::new();
    let mut snapshots = Vec::new();

    while !scheduler.is_finished() {
        let tick_events = scheduler.tick();
        let snapshot = (snapshot_every > 0 && scheduler.ticks() % snapshot_every == 0)
            .then(|| scheduler.snapshot());

        if format == Format::Json {
            events.extend(tick_events);
            snapshots.extend(snapshot);
            continue;
        }
        if !tick_events.is_empty() {
            write_events(writer, &tick_events, format, dt)?;
        }
        if let Some(snapshot) = snapshot {
            write_snapshot(writer, &snapshot, format)?;
        }
        let _ = writer.flush();
    }

    let mut report = RunReport::from_scheduler(scheduler, finished_at)
        .ok_or_else(|| io::Error::other("run ended without an outcome"))?;
    report.events = events;
    report.snapshots = snapshots;
    write_report(writer, &report, format)?;
    Ok(report)
}

/// Get the color code for a magnitude value.
fn magnitude_color(mag: Option<f64>) -> &'static str {
    match mag {
        Some(m) if m >= 7.0 => RED,
        Some(m) if m >= 6.0 => YELLOW,
        Some(m) if m >= 4.5 => CYAN,
        Some(m) if m >= 3.0 => GREEN,
        _ => WHITE,
    }
}

fn format_solution(solution: &Solution) -> String {
    let mag = solution.magnitude;
    let mag_str = mag.map_or_else(|| "?".into(), |m| format!("{m:.1}"));
    let color = magnitude_color(mag);
    let ns = if solution.latitude >= 0.0 { 'N' } else { 'S' };
    let ew = if solution.longitude >= 0.0 { 'E' } else { 'W' };
    format!(
        "{ICON_QUAKE} {color}{BOLD}M{mag_str}{RESET} │ \
         {:.3}°{ns} {:.3}°{ew} │ \
         origin {:.2}s │ \
         {DIM}misfit {:.4} s² ({} stations){RESET}",
        solution.latitude.abs(),
        solution.longitude.abs(),
        solution.origin_time,
        solution.misfit,
        solution.stations_used,
    )
}

/// Write one lifecycle signal in human-readable form.
///
/// # Errors
///
/// Returns an error if writing fails.
#[allow(clippy::cast_precision_loss)]
pub fn write_event_human<W: Write>(writer: &mut W, event: &RunEvent, dt: f64) -> io::Result<()> {
    match event {
        RunEvent::Started => writeln!(writer, "{BOLD}▶ run started{RESET}"),
        RunEvent::StationPicked {
            station,
            phase,
            tick,
        } => writeln!(
            writer,
            "  {CYAN}{phase}{RESET} pick │ {station:<6} │ tick {tick:>5} │ {DIM}{:.2}s{RESET}",
            *tick as f64 * dt
        ),
        RunEvent::PickingComplete { tick } => {
            writeln!(writer, "{GREEN}✔ picking complete{RESET} {DIM}at tick {tick}{RESET}")
        }
        RunEvent::Solved { solution } => writeln!(writer, "{}", format_solution(solution)),
        RunEvent::Failed { reason } => writeln!(writer, "{RED}✖ location failed:{RESET} {reason}"),
        RunEvent::Timeout { tick } => {
            writeln!(writer, "{YELLOW}⏱ timed out{RESET} at tick {tick} before picking completed")
        }
    }
}

/// Write lifecycle signals in the specified format.
///
/// JSON writes an array; NDJSON writes one object per line.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_events<W: Write>(
    writer: &mut W,
    events: &[RunEvent],
    format: Format,
    dt: f64,
) -> io::Result<()> {
    match format {
        Format::Human => {
            for event in events {
                write_event_human(writer, event, dt)?;
            }
            Ok(())
        }
        Format::Json => write_json(writer, events),
        Format::Ndjson => {
            for event in events {
                write_json_line(writer, event)?;
            }
            Ok(())
        }
    }
}

/// Write a mid-run snapshot. Human format prints one summary line.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_snapshot<W: Write>(writer: &mut W, snapshot: &RunSnapshot, format: Format) -> io::Result<()> {
    match format {
        Format::Human => {
            let stations: Vec<String> = snapshot
                .stations
                .iter()
                .map(|s| {
                    let flag = if s.picked {
                        "●"
                    } else if s.fired {
                        "◐"
                    } else {
                        "○"
                    };
                    format!("{flag} {} {:.2}", s.code, s.peak_amplitude)
                })
                .collect();
            writeln!(
                writer,
                "{DIM}tick {:>5} │ {}{RESET}",
                snapshot.tick,
                stations.join(" │ ")
            )
        }
        Format::Json => write_json(writer, snapshot),
        Format::Ndjson => write_json_line(writer, snapshot),
    }
}

/// Write the final report in the specified format.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_report<W: Write>(writer: &mut W, report: &RunReport, format: Format) -> io::Result<()> {
    match format {
        Format::Human => write_report_human(writer, report),
        Format::Json => write_json(writer, report),
        Format::Ndjson => write_json_line(writer, report),
    }
}

fn write_report_human<W: Write>(writer: &mut W, report: &RunReport) -> io::Result<()> {
    writeln!(
        writer,
        "{DIM}─────────────────────────────────────────────────────────────{RESET}"
    )?;
    for sta in &report.stations {
        let p = sta
            .p_time
            .map_or_else(|| "   -   ".into(), |t| format!("{t:>6.2}s"));
        let s = sta.s_pick.map_or_else(|| "-".into(), |t| t.to_string());
        writeln!(
            writer,
            "  {BOLD}{:<6}{RESET} │ {:>6.1} km │ P {p} │ S tick {s:>5} │ peak {:.3}",
            sta.code, sta.distance_km, sta.peak_amplitude
        )?;
    }

    match &report.outcome {
        RunOutcome::Solved { solution } => {
            writeln!(writer, "{}", format_solution(solution))?;
            if let Some(err) = report.location_error_km {
                writeln!(writer, "{DIM}  error vs truth: {err:.2} km{RESET}")?;
            }
        }
        RunOutcome::Failed { reason } => writeln!(writer, "{RED}✖ no solution:{RESET} {reason}")?,
        RunOutcome::TimedOut { tick } => {
            writeln!(writer, "{YELLOW}⏱ no solution:{RESET} timed out at tick {tick}")?;
        }
        RunOutcome::Aborted { tick } => writeln!(writer, "{DIM}run aborted at tick {tick}{RESET}")?,
    }
    writeln!(writer, "{DIM}{} ticks │ finished {}{RESET}", report.ticks, report.finished_at)
}

fn write_json<W: Write, T: Serialize + ?Sized>(writer: &mut W, value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{json}")
}

fn write_json_line<W: Write, T: Serialize + ?Sized>(writer: &mut W, value: &T) -> io::Result<()> {
    let json =
        serde_json::to_string(value).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{json}")
}
