//! Application coordinator that manages the complete lifecycle of duskr.
//!
//! Handles configuration loading, backend detection, collaborator construction
//! and signal setup, then hands control to the [`DayNightScheduler`].
//!
//! - Normal startup: `Duskr::new(debug_enabled).run()`
//! - Simulation mode: `Duskr::new(debug_enabled).without_headers().run()` after the
//!   simulated time source has been installed

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::config::{self, Config};
use crate::geo::create_resolver;
use crate::net::TcpProbe;
use crate::scheduler::{Collaborators, DayNightScheduler, SchedulerSettings, SchedulerState};
use crate::signals::setup_signal_handler;
use crate::solar::create_provider;
use crate::theme::{create_applier, detect_backend};
use crate::time_source::{self, TimeSource};

/// Builder for configuring and running duskr.
pub struct Duskr {
    debug_enabled: bool,
    show_headers: bool,
}

impl Duskr {
    pub fn new(debug_enabled: bool) -> Self {
        Self {
            debug_enabled,
            show_headers: true,
        }
    }

    /// Skip the version header (the caller already printed one).
    pub fn without_headers(mut self) -> Self {
        self.show_headers = false;
        self
    }

    /// Run until a shutdown signal arrives or a simulation ends.
    pub fn run(self) -> Result<()> {
        if self.show_headers {
            log_version!();
            if self.debug_enabled {
                log_pipe!();
                log_debug!("Debug mode enabled - showing lookups and unchanged ticks");
            }
        }

        let signal_state = setup_signal_handler(self.debug_enabled)?;
        let config = Config::load()?;
        let time_source = time_source::global();

        let mut scheduler = build_scheduler(&config, time_source, self.debug_enabled)?
            .with_signals(signal_state);

        log_block_start!("Starting scheduler...");
        scheduler.run();

        log_block_start!("Shutting down duskr...");
        log_end!();
        Ok(())
    }
}

/// Assemble a scheduler from configuration with real collaborators.
pub fn build_scheduler(
    config: &Config,
    time_source: Arc<dyn TimeSource>,
    debug_enabled: bool,
) -> Result<DayNightScheduler> {
    let backend_type = detect_backend(config).context("No usable theme backend")?;
    config.log_config(Some(backend_type));

    let collaborators = Collaborators {
        probe: Box::new(TcpProbe::new(
            config.probe_host(),
            time_source.clone(),
            debug_enabled,
        )),
        resolver: create_resolver(config, debug_enabled)?,
        provider: create_provider(config, debug_enabled)?,
        applier: create_applier(backend_type, config, debug_enabled)?,
    };

    let state = match config.coordinates()? {
        Some(location) => SchedulerState::with_location(location),
        None => SchedulerState::new(),
    };

    Ok(DayNightScheduler::new(
        SchedulerSettings::from_config(config)?,
        collaborators,
        time_source,
    )
    .with_state(state)
    .debug(debug_enabled))
}

/// Apply `--config <dir>` before anything reads the configuration.
pub fn apply_config_dir(config_dir: Option<String>) -> Result<()> {
    if config_dir.is_some() {
        config::set_config_dir(config_dir)?;
    }
    Ok(())
}
