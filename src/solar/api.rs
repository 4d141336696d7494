//! Sunrise/sunset lookup against the sunrise-sunset.org JSON API.
//!
//! Request:
//!
//! ```text
//! {base}/json?lat=52.3676&lng=4.9041&date=2024-06-01&formatted=0
//! ```
//!
//! Response (trimmed):
//!
//! ```json
//! {"results":{"sunrise":"2024-06-01T03:23:51+00:00","sunset":"2024-06-01T20:03:07+00:00"},"status":"OK"}
//! ```
//!
//! Times arrive in UTC and are converted to the local timezone here, so the
//! scheduler only ever sees local instants. The legacy `formatted=1` shape
//! (`"3:23:51 AM"`) is accepted as well.

use chrono::{DateTime, Duration as ChronoDuration, Local, NaiveDate, NaiveTime, Utc};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;

use super::{SolarTimeProvider, SolarWindow};
use crate::constants::HTTP_USER_AGENT;
use crate::error::LookupError;
use crate::geo::Coordinates;

pub struct SunriseSunsetApi {
    http: Client,
    base_url: String,
    timeout: Duration,
    debug_enabled: bool,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: String,
    /// An object on success, an empty string on error replies.
    #[serde(default)]
    results: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ApiResults {
    sunrise: String,
    sunset: String,
}

impl SunriseSunsetApi {
    pub fn new(base_url: &str, timeout: Duration, debug_enabled: bool) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(HTTP_USER_AGENT)
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build sunrise HTTP client: {e}"))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            debug_enabled,
        })
    }
}

impl SolarTimeProvider for SunriseSunsetApi {
    fn fetch(&self, coords: Coordinates, date: NaiveDate) -> Result<SolarWindow, LookupError> {
        let url = format!("{}/json", self.base_url);
        let date_param = date.format("%Y-%m-%d").to_string();
        let lat = coords.latitude().to_string();
        let lng = coords.longitude().to_string();

        if self.debug_enabled {
            log_pipe!();
            log_debug!("Fetching sunrise/sunset for {coords} on {date_param} via {url}");
        }

        let timeout_secs = self.timeout.as_secs();
        let response = self
            .http
            .get(&url)
            .query(&[
                ("lat", lat.as_str()),
                ("lng", lng.as_str()),
                ("date", date_param.as_str()),
                ("formatted", "0"),
            ])
            .send()
            .map_err(|e| LookupError::from_http(&e, timeout_secs))?;

        let http_status = response.status();
        let body = response
            .text()
            .map_err(|e| LookupError::from_http(&e, timeout_secs))?;

        // Error replies still carry a JSON status; only fall back to the HTTP
        // status line when the body is not the API's JSON
        match parse_response(&body, date) {
            Err(LookupError::Unparseable(_)) if !http_status.is_success() => {
                Err(LookupError::BadStatus(http_status.to_string()))
            }
            other => other,
        }
    }

    fn provider_name(&self) -> &'static str {
        "sunrise-sunset.org"
    }
}

/// Turn an API body into a local-time window for `date`.
pub(crate) fn parse_response(body: &str, date: NaiveDate) -> Result<SolarWindow, LookupError> {
    let parsed: ApiResponse =
        serde_json::from_str(body).map_err(|e| LookupError::Unparseable(e.to_string()))?;

    if parsed.status != "OK" {
        return Err(LookupError::BadStatus(parsed.status));
    }

    let results: ApiResults = serde_json::from_value(parsed.results)
        .map_err(|e| LookupError::Unparseable(format!("response results: {e}")))?;

    let sunrise = parse_utc_time(&results.sunrise, date)?;
    let mut sunset = parse_utc_time(&results.sunset, date)?;

    // 12-hour times carry no date; a UTC sunset can fall on the next UTC day
    if sunset <= sunrise && !is_rfc3339(&results.sunset) {
        sunset += ChronoDuration::days(1);
    }

    SolarWindow::new(
        date,
        sunrise.with_timezone(&Local),
        sunset.with_timezone(&Local),
    )
}

fn is_rfc3339(text: &str) -> bool {
    DateTime::parse_from_rfc3339(text).is_ok()
}

/// Parse either an RFC 3339 timestamp or a bare `h:mm:ss AM` UTC time on `date`.
fn parse_utc_time(text: &str, date: NaiveDate) -> Result<DateTime<Utc>, LookupError> {
    if let Ok(stamp) = DateTime::parse_from_rfc3339(text) {
        return Ok(stamp.with_timezone(&Utc));
    }

    NaiveTime::parse_from_str(text.trim(), "%I:%M:%S %p")
        .map(|time| date.and_time(time).and_utc())
        .map_err(|_| LookupError::Unparseable(text.to_string()))
}
