//! Configuration system for duskr.
//!
//! Settings live in a single TOML file, `duskr.toml`, searched in:
//! 1. The directory passed with `--config <dir>`
//! 2. **XDG_CONFIG_HOME**/duskr/duskr.toml (platform config dir elsewhere)
//!
//! A commented default file is written on first run.
//!
//! ## Configuration Structure
//!
//! ```toml
//! #[Location]
//! location = "London"          # City name to geocode
//! # latitude = 51.5074         # Manual coordinates skip geocoding entirely
//! # longitude = -0.1278
//!
//! #[Offsets]
//! sunrise_offset = "+00:00"    # Shift applied to sunrise ([+-]HH:MM, up to 12:00)
//! sunset_offset = "+00:00"     # Shift applied to sunset ([+-]HH:MM, up to 12:00)
//!
//! #[Timing]
//! loop_delay = 60              # Seconds between phase checks (5-3600)
//! check_interval = 20          # Seconds between retries after a failure (1-600)
//!
//! #[Connectivity]
//! probe_host = "1.1.1.1:53"    # host:port used for the connectivity check
//! probe_retries = 3            # Attempts per check (1-20)
//! probe_retry_interval = 1000  # Milliseconds between attempts
//! probe_timeout = 1500         # Milliseconds per attempt (100-10000)
//! http_timeout = 10            # Seconds per HTTP request (1-120)
//!
//! #[Services]
//! solar_provider = "api"       # "api" (sunrise-sunset.org) or "local" (offline)
//! geocoding_url = "https://nominatim.openstreetmap.org"
//! solar_url = "https://api.sunrise-sunset.org"
//!
//! #[Theme]
//! backend = "auto"             # "auto", "gnome", "windows" or "command"
//! gtk_light_theme = "Adwaita"
//! gtk_dark_theme = "Adwaita-dark"
//! # light_command = "..."      # Required for backend = "command"
//! # dark_command = "..."
//! ```
//!
//! Every key is optional. Accessors on [`Config`] fall back to the defaults in
//! [`crate::constants`], and [`validation::validate_config`] runs on every load.

pub mod builder;
pub mod loading;
pub mod validation;

use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;

use crate::constants::*;
use crate::geo::Coordinates;
use crate::solar::{Offsets, format_offset};

pub use builder::create_default_config;
pub use loading::{get_config_path, get_custom_config_dir, load, load_from_path, set_config_dir};

/// Theme backend selection.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Detect from the running platform.
    ///
    /// Auto-detection priority: Windows → GNOME → Command → error.
    #[default]
    Auto,
    /// `gsettings` on GNOME and GTK desktops.
    Gnome,
    /// Personalisation registry values on Windows.
    Windows,
    /// User-supplied `light_command` / `dark_command`.
    Command,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Auto => "auto",
            Backend::Gnome => "gnome",
            Backend::Windows => "windows",
            Backend::Command => "command",
        }
    }
}

/// Source of sunrise/sunset times.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SolarProvider {
    /// The sunrise-sunset.org web service.
    #[default]
    Api,
    /// Offline calculation; never needs the network.
    Local,
}

impl SolarProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            SolarProvider::Api => "api",
            SolarProvider::Local => "local",
        }
    }
}

/// Settings loaded from `duskr.toml`.
///
/// Fields mirror the file keys one to one and stay `None` when absent; use the
/// accessor methods to read effective values.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    /// City name resolved through the geocoder.
    pub location: Option<String>,
    /// Manual coordinates. When both are set the geocoder is never called.
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    pub sunrise_offset: Option<String>, // [+-]HH:MM
    pub sunset_offset: Option<String>,  // [+-]HH:MM

    pub loop_delay: Option<u64>,     // seconds
    pub check_interval: Option<u64>, // seconds
    pub http_timeout: Option<u64>,   // seconds

    pub probe_host: Option<String>,
    pub probe_retries: Option<u32>,
    pub probe_retry_interval: Option<u64>, // milliseconds
    pub probe_timeout: Option<u64>,        // milliseconds

    pub solar_provider: Option<SolarProvider>,
    pub geocoding_url: Option<String>,
    pub solar_url: Option<String>,

    pub backend: Option<Backend>,
    pub gtk_light_theme: Option<String>,
    pub gtk_dark_theme: Option<String>,
    pub light_command: Option<String>,
    pub dark_command: Option<String>,
}

impl Config {
    pub fn location(&self) -> &str {
        self.location.as_deref().unwrap_or(DEFAULT_LOCATION)
    }

    /// Manual coordinates, if both halves are configured.
    pub fn coordinates(&self) -> Result<Option<Coordinates>> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Ok(Some(Coordinates::new(lat, lon)?)),
            _ => Ok(None),
        }
    }

    pub fn offsets(&self) -> Result<Offsets> {
        Offsets::parse(
            self.sunrise_offset
                .as_deref()
                .unwrap_or(DEFAULT_SUNRISE_OFFSET),
            self.sunset_offset.as_deref().unwrap_or(DEFAULT_SUNSET_OFFSET),
        )
    }

    pub fn loop_delay(&self) -> Duration {
        Duration::from_secs(self.loop_delay.unwrap_or(DEFAULT_LOOP_DELAY))
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval.unwrap_or(DEFAULT_CHECK_INTERVAL))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout.unwrap_or(DEFAULT_HTTP_TIMEOUT))
    }

    pub fn probe_host(&self) -> &str {
        self.probe_host.as_deref().unwrap_or(DEFAULT_PROBE_HOST)
    }

    pub fn probe_retries(&self) -> u32 {
        self.probe_retries.unwrap_or(DEFAULT_PROBE_RETRIES)
    }

    pub fn probe_retry_interval(&self) -> Duration {
        Duration::from_millis(
            self.probe_retry_interval
                .unwrap_or(DEFAULT_PROBE_RETRY_INTERVAL_MS),
        )
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout.unwrap_or(DEFAULT_PROBE_TIMEOUT_MS))
    }

    pub fn solar_provider(&self) -> SolarProvider {
        self.solar_provider.unwrap_or_default()
    }

    pub fn geocoding_url(&self) -> &str {
        self.geocoding_url.as_deref().unwrap_or(DEFAULT_GEOCODING_URL)
    }

    pub fn solar_url(&self) -> &str {
        self.solar_url.as_deref().unwrap_or(DEFAULT_SOLAR_URL)
    }

    pub fn backend(&self) -> Backend {
        self.backend.unwrap_or_default()
    }

    pub fn gtk_light_theme(&self) -> &str {
        self.gtk_light_theme
            .as_deref()
            .unwrap_or(GNOME_LIGHT_GTK_THEME)
    }

    pub fn gtk_dark_theme(&self) -> &str {
        self.gtk_dark_theme.as_deref().unwrap_or(GNOME_DARK_GTK_THEME)
    }

    pub fn log_config(&self, resolved_backend: Option<crate::theme::BackendType>) {
        log_block_start!("Loaded configuration");

        match self.coordinates() {
            Ok(Some(coords)) => log_indented!("Location: {coords} (manual)"),
            _ => log_indented!("Location: {}", self.location()),
        }

        if let Ok(offsets) = self.offsets() {
            log_indented!(
                "Offsets: sunrise {}, sunset {}",
                format_offset(offsets.sunrise),
                format_offset(offsets.sunset)
            );
        }

        let backend_display = match (self.backend(), resolved_backend) {
            (Backend::Auto, Some(resolved)) => format!("Auto ({})", resolved.name()),
            (backend, _) => backend.as_str().to_string(),
        };
        log_indented!("Backend: {backend_display}");
        log_indented!("Solar times: {}", self.solar_provider().as_str());
        log_indented!(
            "Loop delay: {}s, retry interval: {}s",
            self.loop_delay().as_secs(),
            self.check_interval().as_secs()
        );
    }
}

#[cfg(test)]
mod tests;
