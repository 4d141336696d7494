//! Configuration validation functionality.
//!
//! Rejects values outside their documented ranges with messages naming the key.

use anyhow::Result;

use super::{Backend, Config};
use crate::constants::*;
use crate::solar::parse_offset;

/// Validate every configured value. Absent keys are always valid.
pub fn validate_config(config: &Config) -> Result<()> {
    if let Some(location) = &config.location
        && location.trim().is_empty()
    {
        anyhow::bail!("location must not be empty");
    }

    if let Some(lat) = config.latitude
        && !(-90.0..=90.0).contains(&lat)
    {
        anyhow::bail!("latitude must be between -90 and 90 degrees (got {})", lat);
    }

    if let Some(lon) = config.longitude
        && !(-180.0..=180.0).contains(&lon)
    {
        anyhow::bail!(
            "longitude must be between -180 and 180 degrees (got {})",
            lon
        );
    }

    if let Some(offset) = &config.sunrise_offset {
        parse_offset(offset).map_err(|e| anyhow::anyhow!("sunrise_offset: {e}"))?;
    }
    if let Some(offset) = &config.sunset_offset {
        parse_offset(offset).map_err(|e| anyhow::anyhow!("sunset_offset: {e}"))?;
    }

    validate_range(
        "loop_delay",
        config.loop_delay,
        MINIMUM_LOOP_DELAY,
        MAXIMUM_LOOP_DELAY,
        "seconds",
    )?;
    validate_range(
        "check_interval",
        config.check_interval,
        MINIMUM_CHECK_INTERVAL,
        MAXIMUM_CHECK_INTERVAL,
        "seconds",
    )?;
    validate_range(
        "http_timeout",
        config.http_timeout,
        MINIMUM_HTTP_TIMEOUT,
        MAXIMUM_HTTP_TIMEOUT,
        "seconds",
    )?;
    validate_range(
        "probe_retries",
        config.probe_retries.map(u64::from),
        u64::from(MINIMUM_PROBE_RETRIES),
        u64::from(MAXIMUM_PROBE_RETRIES),
        "attempts",
    )?;
    validate_range(
        "probe_retry_interval",
        config.probe_retry_interval,
        0,
        MAXIMUM_PROBE_RETRY_INTERVAL_MS,
        "milliseconds",
    )?;
    validate_range(
        "probe_timeout",
        config.probe_timeout,
        MINIMUM_PROBE_TIMEOUT_MS,
        MAXIMUM_PROBE_TIMEOUT_MS,
        "milliseconds",
    )?;

    if let Some(host) = &config.probe_host
        && !host.contains(':')
    {
        anyhow::bail!("probe_host must be in host:port form (got '{}')", host);
    }

    for (key, url) in [
        ("geocoding_url", &config.geocoding_url),
        ("solar_url", &config.solar_url),
    ] {
        if let Some(url) = url
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            anyhow::bail!("{key} must be an http:// or https:// URL (got '{url}')");
        }
    }

    if config.backend == Some(Backend::Command)
        && (config.light_command.is_none() || config.dark_command.is_none())
    {
        anyhow::bail!("backend = \"command\" requires both light_command and dark_command");
    }

    for (key, command) in [
        ("light_command", &config.light_command),
        ("dark_command", &config.dark_command),
    ] {
        if let Some(command) = command
            && command.trim().is_empty()
        {
            anyhow::bail!("{key} must not be empty");
        }
    }

    Ok(())
}

fn validate_range(key: &str, value: Option<u64>, min: u64, max: u64, unit: &str) -> Result<()> {
    if let Some(value) = value
        && !(min..=max).contains(&value)
    {
        anyhow::bail!(
            "{} ({} {}) must be between {} and {} {}",
            key,
            value,
            unit,
            min,
            max,
            unit
        );
    }
    Ok(())
}
