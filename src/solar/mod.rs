//! Sunrise/sunset windows and the light/dark phase decision.
//!
//! A [`SolarWindow`] is the raw daylight interval reported by a provider for one
//! calendar day. Applying the configured [`Offsets`] yields an
//! [`EffectiveWindow`], the half-open interval `[sunrise, sunset)` during which
//! the light theme is active.
//!
//! ## Inverted windows
//!
//! Large negative sunset offsets (or large positive sunrise offsets) can push the
//! effective sunset to or before the effective sunrise. Such a window contains no
//! instant at all, so the whole day is dark. [`EffectiveWindow::is_inverted`]
//! lets callers warn about it. Offsets that move a boundary past midnight need
//! no special handling: boundaries are absolute instants, not times of day.

pub mod api;
pub mod local;

use chrono::{DateTime, Duration, Local, NaiveDate};
use std::fmt;

use crate::config::{Config, SolarProvider};
use crate::constants::MAXIMUM_OFFSET_MINUTES;
use crate::error::LookupError;
use crate::geo::Coordinates;

pub use api::SunriseSunsetApi;
pub use local::LocalSolarCalculator;

/// The binary theme decision for an instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Light,
    Dark,
}

impl Phase {
    pub fn is_light(self) -> bool {
        self == Phase::Light
    }

    pub fn from_light(use_light: bool) -> Self {
        if use_light { Phase::Light } else { Phase::Dark }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Light => write!(f, "light"),
            Phase::Dark => write!(f, "dark"),
        }
    }
}

/// Raw sunrise/sunset for one calendar day, in local time.
#[derive(Debug, Clone, PartialEq)]
pub struct SolarWindow {
    date: NaiveDate,
    sunrise: DateTime<Local>,
    sunset: DateTime<Local>,
}

impl SolarWindow {
    /// Build a window, rejecting `sunrise >= sunset` as bad upstream data.
    pub fn new(
        date: NaiveDate,
        sunrise: DateTime<Local>,
        sunset: DateTime<Local>,
    ) -> Result<Self, LookupError> {
        if sunrise >= sunset {
            return Err(LookupError::InvalidWindow {
                sunrise: sunrise.to_rfc3339(),
                sunset: sunset.to_rfc3339(),
            });
        }
        Ok(Self {
            date,
            sunrise,
            sunset,
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn sunrise(&self) -> DateTime<Local> {
        self.sunrise
    }

    pub fn sunset(&self) -> DateTime<Local> {
        self.sunset
    }

    /// Shift both boundaries by the configured offsets.
    pub fn apply_offsets(&self, offsets: &Offsets) -> EffectiveWindow {
        EffectiveWindow {
            sunrise: self.sunrise + offsets.sunrise,
            sunset: self.sunset + offsets.sunset,
        }
    }
}

/// Signed shifts applied to the raw sunrise and sunset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Offsets {
    pub sunrise: Duration,
    pub sunset: Duration,
}

impl Offsets {
    pub fn new(sunrise: Duration, sunset: Duration) -> Self {
        Self { sunrise, sunset }
    }

    /// Parse both offsets from `[+-]HH:MM` strings.
    pub fn parse(sunrise: &str, sunset: &str) -> anyhow::Result<Self> {
        Ok(Self {
            sunrise: parse_offset(sunrise)
                .map_err(|e| anyhow::anyhow!("sunrise_offset: {e}"))?,
            sunset: parse_offset(sunset).map_err(|e| anyhow::anyhow!("sunset_offset: {e}"))?,
        })
    }
}

/// Parse a signed `HH:MM` offset such as `+00:30` or `-01:00`.
///
/// A missing sign means positive. Magnitudes above 12 hours are rejected.
pub fn parse_offset(text: &str) -> Result<Duration, String> {
    let text = text.trim();
    let (negative, body) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        Some(_) => (false, text),
        None => return Err("offset must not be empty".to_string()),
    };

    let (hours, minutes) = body
        .split_once(':')
        .ok_or_else(|| format!("'{text}' is not in [+-]HH:MM format"))?;
    let hours: i64 = hours
        .parse()
        .map_err(|_| format!("'{text}' has an invalid hour component"))?;
    let minutes: i64 = minutes
        .parse()
        .map_err(|_| format!("'{text}' has an invalid minute component"))?;

    if hours < 0 || !(0..60).contains(&minutes) {
        return Err(format!("'{text}' is out of range"));
    }

    let total = hours
        .checked_mul(60)
        .and_then(|h| h.checked_add(minutes))
        .unwrap_or(i64::MAX);
    if total > MAXIMUM_OFFSET_MINUTES {
        return Err(format!(
            "'{text}' exceeds the maximum of {} hours",
            MAXIMUM_OFFSET_MINUTES / 60
        ));
    }

    Ok(Duration::minutes(if negative { -total } else { total }))
}

/// Render an offset back as `[+-]HH:MM`.
pub fn format_offset(offset: Duration) -> String {
    let total = offset.num_minutes();
    let sign = if total < 0 { '-' } else { '+' };
    let total = total.abs();
    format!("{sign}{:02}:{:02}", total / 60, total % 60)
}

/// The offset-adjusted light interval `[sunrise, sunset)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveWindow {
    pub sunrise: DateTime<Local>,
    pub sunset: DateTime<Local>,
}

impl EffectiveWindow {
    /// Light exactly when `sunrise <= now < sunset`.
    pub fn phase_at(&self, now: DateTime<Local>) -> Phase {
        Phase::from_light(self.sunrise <= now && now < self.sunset)
    }

    /// True when offsets leave no light time at all.
    pub fn is_inverted(&self) -> bool {
        self.sunset <= self.sunrise
    }
}

/// Produces the raw solar window for a location and date.
#[cfg_attr(test, mockall::automock)]
pub trait SolarTimeProvider {
    fn fetch(&self, coords: Coordinates, date: NaiveDate) -> Result<SolarWindow, LookupError>;

    /// Short label for log output.
    fn provider_name(&self) -> &'static str;

    /// Whether `fetch` needs network access (and therefore a connectivity probe).
    fn requires_network(&self) -> bool {
        true
    }
}

/// Build the provider selected by `solar_provider`.
pub fn create_provider(
    config: &Config,
    debug_enabled: bool,
) -> anyhow::Result<Box<dyn SolarTimeProvider>> {
    match config.solar_provider() {
        SolarProvider::Api => Ok(Box::new(SunriseSunsetApi::new(
            config.solar_url(),
            config.http_timeout(),
            debug_enabled,
        )?)),
        SolarProvider::Local => Ok(Box::new(LocalSolarCalculator)),
    }
}
