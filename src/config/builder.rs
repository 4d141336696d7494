//! Default configuration file creation.
//!
//! The builder keeps the trailing comments of every setting aligned to one
//! column, so the generated file stays readable when defaults change.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::constants::*;

/// Write a commented default configuration to `path`, creating parent directories.
pub fn create_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    fs::write(path, default_config_content())
        .with_context(|| format!("Failed to write default config to {}", path.display()))?;

    log_block_start!("Created default configuration");
    log_indented!("{}", path.display());

    Ok(())
}

pub(crate) fn default_config_content() -> String {
    let mut content = ConfigBuilder::new()
        .add_section("Location")
        .add_setting(
            "location",
            &format!("\"{DEFAULT_LOCATION}\""),
            "City name to geocode (set latitude/longitude to skip geocoding)",
        )
        .add_section("Offsets")
        .add_setting(
            "sunrise_offset",
            &format!("\"{DEFAULT_SUNRISE_OFFSET}\""),
            "Shift applied to sunrise ([+-]HH:MM, up to 12:00)",
        )
        .add_setting(
            "sunset_offset",
            &format!("\"{DEFAULT_SUNSET_OFFSET}\""),
            "Shift applied to sunset ([+-]HH:MM, up to 12:00)",
        )
        .add_section("Timing")
        .add_setting(
            "loop_delay",
            &DEFAULT_LOOP_DELAY.to_string(),
            &format!("Seconds between phase checks ({MINIMUM_LOOP_DELAY}-{MAXIMUM_LOOP_DELAY})"),
        )
        .add_setting(
            "check_interval",
            &DEFAULT_CHECK_INTERVAL.to_string(),
            &format!(
                "Seconds between retries after a failure ({MINIMUM_CHECK_INTERVAL}-{MAXIMUM_CHECK_INTERVAL})"
            ),
        )
        .add_section("Connectivity")
        .add_setting(
            "probe_host",
            &format!("\"{DEFAULT_PROBE_HOST}\""),
            "host:port used for the connectivity check",
        )
        .add_setting(
            "probe_retries",
            &DEFAULT_PROBE_RETRIES.to_string(),
            &format!("Attempts per check ({MINIMUM_PROBE_RETRIES}-{MAXIMUM_PROBE_RETRIES})"),
        )
        .add_setting(
            "probe_retry_interval",
            &DEFAULT_PROBE_RETRY_INTERVAL_MS.to_string(),
            "Milliseconds between attempts",
        )
        .add_setting(
            "probe_timeout",
            &DEFAULT_PROBE_TIMEOUT_MS.to_string(),
            &format!(
                "Milliseconds per attempt ({MINIMUM_PROBE_TIMEOUT_MS}-{MAXIMUM_PROBE_TIMEOUT_MS})"
            ),
        )
        .add_setting(
            "http_timeout",
            &DEFAULT_HTTP_TIMEOUT.to_string(),
            &format!("Seconds per HTTP request ({MINIMUM_HTTP_TIMEOUT}-{MAXIMUM_HTTP_TIMEOUT})"),
        )
        .add_section("Services")
        .add_setting(
            "solar_provider",
            "\"api\"",
            "\"api\" (sunrise-sunset.org) or \"local\" (offline calculation)",
        )
        .add_section("Theme")
        .add_setting(
            "backend",
            "\"auto\"",
            "Backend to use: \"auto\", \"gnome\", \"windows\" or \"command\"",
        )
        .add_setting(
            "gtk_light_theme",
            &format!("\"{GNOME_LIGHT_GTK_THEME}\""),
            "GTK theme for the light phase (gnome backend)",
        )
        .add_setting(
            "gtk_dark_theme",
            &format!("\"{GNOME_DARK_GTK_THEME}\""),
            "GTK theme for the dark phase (gnome backend)",
        )
        .build();

    content.push('\n');
    content
}

/// Builder for the default configuration file.
struct ConfigBuilder {
    entries: Vec<ConfigEntry>,
}

enum ConfigEntry {
    Section(String),
    Setting { line: String, comment: String },
}

impl ConfigBuilder {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn add_section(mut self, title: &str) -> Self {
        self.entries.push(ConfigEntry::Section(format!("#[{title}]")));
        self
    }

    fn add_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(ConfigEntry::Setting {
            line: format!("{key} = {value}"),
            comment: format!("# {comment}"),
        });
        self
    }

    fn build(self) -> String {
        let max_width = self
            .entries
            .iter()
            .filter_map(|entry| match entry {
                ConfigEntry::Setting { line, .. } => Some(line.len()),
                ConfigEntry::Section(_) => None,
            })
            .max()
            .unwrap_or(0)
            + 1; // one space between setting and comment

        let mut result = Vec::new();
        let mut first_section = true;

        for entry in self.entries {
            match entry {
                ConfigEntry::Section(title) => {
                    if !first_section {
                        result.push(String::new());
                    }
                    result.push(title);
                    first_section = false;
                }
                ConfigEntry::Setting { line, comment } => {
                    let padding = " ".repeat(max_width - line.len());
                    result.push(format!("{line}{padding}{comment}"));
                }
            }
        }

        result.join("\n")
    }
}
