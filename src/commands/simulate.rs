//! Implementation of `duskr simulate` for exercising the loop against a fake clock.
//!
//! Installs a [`SimulatedTimeSource`] before anything logs, so every line carries
//! the simulated timestamp. The caller then runs the normal application; the loop
//! stops on its own when the simulated clock reaches the end time.

use anyhow::Result;
use chrono::{DateTime, Local};
use std::sync::Arc;

use crate::logger::{Log, LoggerGuard};
use crate::time_source::{self, SimulatedTimeSource};

/// Set up the simulated clock, and file logging when `log_to_file` is set.
///
/// The returned guard must outlive the simulation so the log file is flushed.
pub fn handle_simulate_command(
    start_time: &str,
    end_time: &str,
    multiplier: f64,
    log_to_file: bool,
    debug_enabled: bool,
) -> Result<Option<LoggerGuard>> {
    let (start, end) = parse_simulation_window(start_time, end_time)?;

    let guard = if log_to_file {
        let log_filename = format!(
            "duskr-simulation-{}.log",
            Local::now().format("%Y%m%d-%H%M%S")
        );
        println!("Writing simulation log to {log_filename}");
        Some(Log::start_file_logging(log_filename)?)
    } else {
        None
    };

    // Must happen before any logging so timestamps are simulated from the start
    let source = Arc::new(SimulatedTimeSource::new(start, end, multiplier));
    time_source::init_time_source(source);

    log_version!();
    log_block_start!("Simulation Mode");
    log_decorated!(
        "Simulating from {} to {}",
        start.format("%Y-%m-%d %H:%M:%S"),
        end.format("%Y-%m-%d %H:%M:%S")
    );

    let duration = end.signed_duration_since(start);
    log_indented!(
        "Total simulated time: {} hours {} minutes",
        duration.num_hours(),
        duration.num_minutes() % 60
    );
    if multiplier == 0.0 {
        log_indented!("Time acceleration: fast-forward");
    } else {
        log_indented!(
            "Time acceleration: {}x (will complete in ~{:.1} seconds)",
            multiplier,
            duration.num_seconds() as f64 / multiplier
        );
    }

    if debug_enabled {
        log_pipe!();
        log_debug!("Simulated time source initialized");
    }

    Ok(guard)
}

/// Parse and order-check the simulation bounds.
pub fn parse_simulation_window(
    start_time: &str,
    end_time: &str,
) -> Result<(DateTime<Local>, DateTime<Local>)> {
    let start = time_source::parse_datetime(start_time)
        .map_err(|e| anyhow::anyhow!("Invalid start time: {}", e))?;
    let end = time_source::parse_datetime(end_time)
        .map_err(|e| anyhow::anyhow!("Invalid end time: {}", e))?;

    if end <= start {
        anyhow::bail!("End time must be after start time");
    }
    Ok((start, end))
}
