//! Theme backends: the side effect at the end of every scheduler tick.
//!
//! Every backend implements [`ThemeApplier`]. Backends that expose two settings
//! (an application theme and a system/shell theme) change both together and
//! skip the write when both already match, so applying the same phase every
//! minute costs one read.
//!
//! ## Supported Backends
//!
//! - **GNOME** ([`gnome::GnomeTheme`]): `color-scheme` and `gtk-theme` through
//!   `gsettings`
//! - **Windows** ([`windows::WindowsTheme`]): `AppsUseLightTheme` and
//!   `SystemUsesLightTheme` registry values through `reg`
//! - **Command** ([`command::CommandTheme`]): user-supplied shell commands
//!
//! Auto-detection priority: Windows → GNOME → Command → error.

pub mod command;
pub mod gnome;
pub mod windows;

use anyhow::Result;
use std::process::Command;

use crate::config::{Backend, Config};
use crate::error::ThemeError;
use crate::solar::Phase;

pub use command::CommandTheme;
pub use gnome::GnomeTheme;
pub use windows::WindowsTheme;

/// Result of a successful apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Settings were written.
    Changed,
    /// Settings already matched; nothing was written.
    Unchanged,
}

/// Sets the desktop theme for a phase.
#[cfg_attr(test, mockall::automock)]
pub trait ThemeApplier {
    /// Switch to `phase`. With `force`, write even when the current settings
    /// already match.
    fn apply(&mut self, phase: Phase, force: bool) -> Result<ApplyOutcome, ThemeError>;

    /// Human-readable backend name for log output.
    fn backend_name(&self) -> &'static str;
}

/// Whether a two-setting store must be written to reach `phase`.
///
/// Unknown current values (`None`) always force a write.
pub(crate) fn needs_write(
    app_light: Option<bool>,
    system_light: Option<bool>,
    phase: Phase,
    force: bool,
) -> bool {
    let wanted = Some(phase.is_light());
    force || app_light != wanted || system_light != wanted
}

/// Run a settings command and return its trimmed stdout.
pub(crate) fn run_settings_command(program: &str, args: &[&str]) -> Result<String, ThemeError> {
    let output = Command::new(program).args(args).output().map_err(|e| {
        if e.kind() == std::io::ErrorKind::PermissionDenied {
            ThemeError::PermissionDenied(format!("{program}: {e}"))
        } else {
            ThemeError::StoreUnavailable(format!("{program}: {e}"))
        }
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ThemeError::from_command_failure(program, &stderr));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Enumeration of concrete backend types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    Gnome,
    Windows,
    Command,
}

impl BackendType {
    pub fn name(&self) -> &'static str {
        match self {
            BackendType::Gnome => "GNOME",
            BackendType::Windows => "Windows",
            BackendType::Command => "Command",
        }
    }
}

/// Pick a backend from the configuration and the running environment.
pub fn detect_backend(config: &Config) -> Result<BackendType, ThemeError> {
    match config.backend() {
        Backend::Gnome => Ok(BackendType::Gnome),
        Backend::Windows => Ok(BackendType::Windows),
        Backend::Command => {
            if config.light_command.is_none() || config.dark_command.is_none() {
                return Err(ThemeError::Unsupported(
                    "backend = \"command\" requires light_command and dark_command".to_string(),
                ));
            }
            Ok(BackendType::Command)
        }
        Backend::Auto => {
            if cfg!(windows) {
                Ok(BackendType::Windows)
            } else if gnome::gsettings_available() {
                Ok(BackendType::Gnome)
            } else if config.light_command.is_some() && config.dark_command.is_some() {
                Ok(BackendType::Command)
            } else {
                Err(ThemeError::Unsupported(
                    "neither gsettings nor light/dark commands are available".to_string(),
                ))
            }
        }
    }
}

/// Build the applier for a detected backend type.
pub fn create_applier(
    backend_type: BackendType,
    config: &Config,
    debug_enabled: bool,
) -> Result<Box<dyn ThemeApplier>> {
    let applier: Box<dyn ThemeApplier> = match backend_type {
        BackendType::Gnome => Box::new(GnomeTheme::new(
            config.gtk_light_theme(),
            config.gtk_dark_theme(),
            debug_enabled,
        )),
        BackendType::Windows => Box::new(WindowsTheme::new(debug_enabled)),
        BackendType::Command => {
            let (Some(light), Some(dark)) = (&config.light_command, &config.dark_command) else {
                anyhow::bail!("command backend requires light_command and dark_command");
            };
            Box::new(CommandTheme::new(light, dark, debug_enabled))
        }
    };
    Ok(applier)
}
