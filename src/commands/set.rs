//! Set command: apply a theme once through the configured backend.

use anyhow::{Context, Result};

use crate::config::Config;
use crate::solar::Phase;
use crate::theme::{ApplyOutcome, ThemeApplier, create_applier, detect_backend};

pub fn handle_set_command(phase: Phase, force: bool, debug_enabled: bool) -> Result<()> {
    log_version!();

    let config = Config::load()?;
    let backend_type = detect_backend(&config).context("No usable theme backend")?;
    let mut applier = create_applier(backend_type, &config, debug_enabled)?;

    match apply_once(applier.as_mut(), phase, force) {
        Ok(()) => {
            log_end!();
            Ok(())
        }
        Err(e) => {
            log_error_exit!("{e}");
            Err(e)
        }
    }
}

/// Apply `phase` and report the outcome.
pub fn apply_once(applier: &mut dyn ThemeApplier, phase: Phase, force: bool) -> Result<()> {
    let outcome = applier
        .apply(phase, force)
        .with_context(|| format!("Failed to switch to {phase} theme"))?;

    match outcome {
        ApplyOutcome::Changed => {
            log_block_start!("Switched to {phase} theme ({})", applier.backend_name());
        }
        ApplyOutcome::Unchanged => {
            log_block_start!("Theme is already {phase}");
            log_indented!("Use --force to rewrite the settings anyway");
        }
    }
    Ok(())
}
