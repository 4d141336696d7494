//! Status command: today's solar window and the phase that applies right now.
//!
//! Performs one location lookup and one solar lookup, then prints the raw and
//! offset-adjusted windows. Nothing is applied to the desktop.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;

use crate::config::Config;
use crate::geo::create_resolver;
use crate::solar::{EffectiveWindow, SolarWindow, create_provider, format_offset};
use crate::time_source;

/// Snapshot printed by `duskr status --json`.
#[derive(Debug, Serialize, PartialEq)]
pub struct StatusReport {
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub date: String,
    pub sunrise: DateTime<Local>,
    pub sunset: DateTime<Local>,
    pub effective_sunrise: DateTime<Local>,
    pub effective_sunset: DateTime<Local>,
    pub sunrise_offset: String,
    pub sunset_offset: String,
    pub phase: String,
    /// Next phase change today, if any.
    pub next_change: Option<DateTime<Local>>,
}

pub fn handle_status_command(json: bool, debug_enabled: bool) -> Result<()> {
    if !json {
        log_version!();
    } else {
        // Keep stdout machine-readable
        crate::logger::Log::set_enabled(false);
    }

    let config = Config::load()?;
    let resolver = create_resolver(&config, debug_enabled)?;
    let provider = create_provider(&config, debug_enabled)?;
    let offsets = config.offsets()?;
    let now = time_source::now();

    let location = resolver
        .resolve(config.location())
        .with_context(|| format!("Could not resolve location '{}'", config.location()))?;
    let window = provider
        .fetch(location, now.date_naive())
        .context("Could not fetch sunrise/sunset times")?;
    let effective = window.apply_offsets(&offsets);

    let report = StatusReport {
        location: config.location().to_string(),
        latitude: location.latitude(),
        longitude: location.longitude(),
        date: window.date().to_string(),
        sunrise: window.sunrise(),
        sunset: window.sunset(),
        effective_sunrise: effective.sunrise,
        effective_sunset: effective.sunset,
        sunrise_offset: format_offset(offsets.sunrise),
        sunset_offset: format_offset(offsets.sunset),
        phase: effective.phase_at(now).to_string(),
        next_change: next_change(&effective, now),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        display_human_readable(&report, &window, &effective);
    }

    Ok(())
}

/// When the phase next flips today, or `None` once today's window has passed.
pub fn next_change(effective: &EffectiveWindow, now: DateTime<Local>) -> Option<DateTime<Local>> {
    if effective.is_inverted() {
        None
    } else if now < effective.sunrise {
        Some(effective.sunrise)
    } else if now < effective.sunset {
        Some(effective.sunset)
    } else {
        None
    }
}

fn display_human_readable(report: &StatusReport, window: &SolarWindow, effective: &EffectiveWindow) {
    log_block_start!("Location: {}", report.location);
    log_indented!("{:.4}, {:.4}", report.latitude, report.longitude);

    log_block_start!("Solar times for {}", report.date);
    log_indented!(
        "Sunrise: {} -> {} ({})",
        window.sunrise().format("%H:%M:%S"),
        effective.sunrise.format("%H:%M:%S"),
        report.sunrise_offset
    );
    log_indented!(
        "Sunset:  {} -> {} ({})",
        window.sunset().format("%H:%M:%S"),
        effective.sunset.format("%H:%M:%S"),
        report.sunset_offset
    );
    if effective.is_inverted() {
        log_warning!("Offsets leave no daylight today");
    }

    log_block_start!("Current phase: {}", report.phase);
    match report.next_change {
        Some(at) => log_indented!("Next change at {}", at.format("%H:%M:%S")),
        None => log_indented!("No further change today"),
    }
    log_end!();
}
