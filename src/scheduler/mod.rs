//! The day/night scheduling loop.
//!
//! [`DayNightScheduler`] owns a [`SchedulerState`] and drives the collaborators
//! through one tick at a time:
//!
//! 1. Read the current local time.
//! 2. If the stored window belongs to today, apply the phase for `now` and wait
//!    `loop_delay`.
//! 3. Otherwise check connectivity. On failure wait `check_interval`.
//! 4. Resolve the location if it has never been resolved. On failure wait
//!    `check_interval`.
//! 5. Fetch today's solar window. On failure wait `check_interval`; the location
//!    is kept.
//! 6. Store the window (with offsets applied), mark today as the reference day and
//!    tick again immediately.
//!
//! Every failure path ends in a bounded wait, so the loop only stops when the
//! process is asked to shut down or a simulation runs out of time.

use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use crate::config::Config;
use crate::error::{FailureKind, LookupError, ThemeError};
use crate::geo::{Coordinates, LocationResolver};
use crate::net::ConnectivityProbe;
use crate::signals::{SignalMessage, SignalState};
use crate::solar::{EffectiveWindow, Offsets, Phase, SolarTimeProvider, SolarWindow};
use crate::theme::{ApplyOutcome, ThemeApplier};
use crate::time_source::TimeSource;

/// Timing and lookup parameters for the loop.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerSettings {
    pub location_name: String,
    pub offsets: Offsets,
    pub loop_delay: Duration,
    pub check_interval: Duration,
    pub probe_retries: u32,
    pub probe_retry_interval: Duration,
    pub probe_timeout: Duration,
}

impl SchedulerSettings {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            location_name: config.location().to_string(),
            offsets: config.offsets()?,
            loop_delay: config.loop_delay(),
            check_interval: config.check_interval(),
            probe_retries: config.probe_retries(),
            probe_retry_interval: config.probe_retry_interval(),
            probe_timeout: config.probe_timeout(),
        })
    }
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        use crate::constants::*;
        Self {
            location_name: DEFAULT_LOCATION.to_string(),
            offsets: Offsets::default(),
            loop_delay: Duration::from_secs(DEFAULT_LOOP_DELAY),
            check_interval: Duration::from_secs(DEFAULT_CHECK_INTERVAL),
            probe_retries: DEFAULT_PROBE_RETRIES,
            probe_retry_interval: Duration::from_millis(DEFAULT_PROBE_RETRY_INTERVAL_MS),
            probe_timeout: Duration::from_millis(DEFAULT_PROBE_TIMEOUT_MS),
        }
    }
}

/// Everything the scheduler remembers between ticks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchedulerState {
    /// Resolved once, then reused for the life of the process.
    pub location: Option<Coordinates>,
    pub window: Option<SolarWindow>,
    pub effective: Option<EffectiveWindow>,
    /// Calendar day `window` was fetched for.
    pub reference_day: Option<NaiveDate>,
    /// Start of the most recent refresh attempt.
    pub last_attempt: Option<DateTime<Local>>,
}

impl SchedulerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State with a location that never needs geocoding.
    pub fn with_location(location: Coordinates) -> Self {
        Self {
            location: Some(location),
            ..Self::default()
        }
    }

    /// The effective window, if it was fetched for `today`.
    pub fn fresh_window(&self, today: NaiveDate) -> Option<EffectiveWindow> {
        match (self.reference_day, self.effective) {
            (Some(day), Some(effective)) if day == today => Some(effective),
            _ => None,
        }
    }
}

/// Step of the refresh sequence that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Connectivity,
    Location,
    SolarTimes,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Connectivity => write!(f, "connectivity check"),
            Stage::Location => write!(f, "location lookup"),
            Stage::SolarTimes => write!(f, "sunrise/sunset lookup"),
        }
    }
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The phase was applied (or already in effect).
    Applied { phase: Phase, changed: bool },
    /// The theme backend refused; the tick is skipped.
    ApplySkipped { phase: Phase },
    /// A new window was stored; tick again without waiting.
    Refreshed,
    /// A refresh step failed; wait for the check interval.
    RetryAfter { stage: Stage, kind: FailureKind },
}

impl TickOutcome {
    /// How long to wait before the next tick.
    pub fn delay(&self, settings: &SchedulerSettings) -> Option<Duration> {
        match self {
            TickOutcome::Applied { .. } | TickOutcome::ApplySkipped { .. } => {
                Some(settings.loop_delay)
            }
            TickOutcome::Refreshed => None,
            TickOutcome::RetryAfter { .. } => Some(settings.check_interval),
        }
    }
}

/// The scheduler's four collaborators.
pub struct Collaborators {
    pub probe: Box<dyn ConnectivityProbe>,
    pub resolver: Box<dyn LocationResolver>,
    pub provider: Box<dyn SolarTimeProvider>,
    pub applier: Box<dyn ThemeApplier>,
}

pub struct DayNightScheduler {
    settings: SchedulerSettings,
    state: SchedulerState,
    collaborators: Collaborators,
    time_source: Arc<dyn TimeSource>,
    running: Arc<AtomicBool>,
    signal_receiver: Option<Receiver<SignalMessage>>,
    debug_enabled: bool,
}

impl DayNightScheduler {
    pub fn new(
        settings: SchedulerSettings,
        collaborators: Collaborators,
        time_source: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            settings,
            state: SchedulerState::new(),
            collaborators,
            time_source,
            running: Arc::new(AtomicBool::new(true)),
            signal_receiver: None,
            debug_enabled: false,
        }
    }

    pub fn with_state(mut self, state: SchedulerState) -> Self {
        self.state = state;
        self
    }

    /// Stop on signals; real-time waits wake as soon as one arrives.
    pub fn with_signals(mut self, signal_state: SignalState) -> Self {
        self.running = signal_state.running;
        self.signal_receiver = Some(signal_state.signal_receiver);
        self
    }

    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug_enabled = enabled;
        self
    }

    pub fn state(&self) -> &SchedulerState {
        &self.state
    }

    /// Loop until shutdown is requested or the time source runs out.
    pub fn run(&mut self) {
        while self.running.load(Ordering::SeqCst) && !self.time_source.is_ended() {
            self.step();
        }
    }

    /// One tick followed by the wait it asks for.
    pub fn step(&mut self) -> TickOutcome {
        let outcome = self.tick();
        if let Some(delay) = outcome.delay(&self.settings) {
            self.pause(delay);
        }
        outcome
    }

    /// Run one pass of the tick algorithm without waiting.
    pub fn tick(&mut self) -> TickOutcome {
        // Step 1
        let now = self.time_source.now();
        let today = now.date_naive();

        // Step 2
        if let Some(effective) = self.state.fresh_window(today) {
            return self.apply_phase(effective.phase_at(now));
        }

        self.state.last_attempt = Some(now);

        // Step 3
        if self.needs_connectivity() && !self.check_connectivity() {
            log_pipe!();
            log_warning!(
                "No network connectivity, retrying in {}s",
                self.settings.check_interval.as_secs()
            );
            return TickOutcome::RetryAfter {
                stage: Stage::Connectivity,
                kind: FailureKind::TransientNetwork,
            };
        }

        // Step 4
        let location = match self.state.location {
            Some(location) => location,
            None => match self.resolve_location() {
                Ok(location) => location,
                Err(e) => return self.retry(Stage::Location, &e),
            },
        };

        // Step 5
        match self.collaborators.provider.fetch(location, today) {
            Ok(window) => {
                // Step 6
                self.store_window(window, today);
                TickOutcome::Refreshed
            }
            Err(e) => self.retry(Stage::SolarTimes, &e),
        }
    }

    fn needs_connectivity(&self) -> bool {
        self.state.location.is_none() || self.collaborators.provider.requires_network()
    }

    fn check_connectivity(&self) -> bool {
        self.collaborators.probe.check(
            self.settings.probe_retries,
            self.settings.probe_retry_interval,
            self.settings.probe_timeout,
        )
    }

    fn resolve_location(&mut self) -> Result<Coordinates, LookupError> {
        let name = self.settings.location_name.clone();
        if self.debug_enabled {
            log_debug!(
                "Resolving '{name}' via {}",
                self.collaborators.resolver.resolver_name()
            );
        }

        let location = self.collaborators.resolver.resolve(&name)?;
        log_block_start!("Location resolved: {name}");
        log_indented!("{location}");
        self.state.location = Some(location);
        Ok(location)
    }

    fn store_window(&mut self, window: SolarWindow, today: NaiveDate) {
        let effective = window.apply_offsets(&self.settings.offsets);

        log_block_start!(
            "Solar times for {} ({})",
            window.date(),
            self.collaborators.provider.provider_name()
        );
        log_indented!(
            "Sunrise: {} (effective {})",
            window.sunrise().format("%H:%M:%S"),
            effective.sunrise.format("%H:%M:%S")
        );
        log_indented!(
            "Sunset: {} (effective {})",
            window.sunset().format("%H:%M:%S"),
            effective.sunset.format("%H:%M:%S")
        );
        if effective.is_inverted() {
            log_warning!("Offsets leave no daylight today; staying dark until tomorrow");
        }

        self.state.window = Some(window);
        self.state.effective = Some(effective);
        self.state.reference_day = Some(today);
    }

    fn apply_phase(&mut self, phase: Phase) -> TickOutcome {
        match self.collaborators.applier.apply(phase, false) {
            Ok(ApplyOutcome::Changed) => {
                log_block_start!(
                    "Switched to {phase} theme ({})",
                    self.collaborators.applier.backend_name()
                );
                TickOutcome::Applied {
                    phase,
                    changed: true,
                }
            }
            Ok(ApplyOutcome::Unchanged) => {
                if self.debug_enabled {
                    log_debug!("Theme already {phase}");
                }
                TickOutcome::Applied {
                    phase,
                    changed: false,
                }
            }
            Err(e) => {
                log_pipe!();
                match e {
                    ThemeError::PermissionDenied(_) => {
                        log_error!("Cannot switch to {phase} theme: {e}");
                    }
                    _ => log_warning!("Could not switch to {phase} theme: {e}"),
                }
                TickOutcome::ApplySkipped { phase }
            }
        }
    }

    fn retry(&self, stage: Stage, error: &LookupError) -> TickOutcome {
        let kind = error.kind();
        log_pipe!();
        log_warning!("{stage} failed ({kind}): {error}");
        log_indented!("Retrying in {}s", self.settings.check_interval.as_secs());
        TickOutcome::RetryAfter { stage, kind }
    }

    /// Wait for `duration`, returning early on shutdown in real time.
    fn pause(&self, duration: Duration) {
        match &self.signal_receiver {
            Some(receiver) if !self.time_source.is_simulated() => {
                match receiver.recv_timeout(duration) {
                    Ok(SignalMessage::Shutdown) => self.running.store(false, Ordering::SeqCst),
                    Err(RecvTimeoutError::Timeout) => {}
                    // No listener left to wake us
                    Err(RecvTimeoutError::Disconnected) => self.time_source.sleep(duration),
                }
            }
            _ => self.time_source.sleep(duration),
        }
    }
}

#[cfg(test)]
mod tests;
