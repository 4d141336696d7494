//! Geocoding against an OpenStreetMap Nominatim endpoint.
//!
//! One blocking GET per lookup:
//!
//! ```text
//! {base}/search?q=<name>&format=json&limit=1
//! ```
//!
//! Nominatim returns an array of places whose `lat`/`lon` fields are strings.
//! An empty array is a [`LookupError::NoResults`], not a network failure.

use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;

use super::{Coordinates, LocationResolver};
use crate::constants::HTTP_USER_AGENT;
use crate::error::LookupError;

pub struct NominatimResolver {
    http: Client,
    base_url: String,
    timeout: Duration,
    debug_enabled: bool,
}

#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    importance: Option<f64>,
}

impl NominatimResolver {
    pub fn new(base_url: &str, timeout: Duration, debug_enabled: bool) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(HTTP_USER_AGENT)
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build geocoding HTTP client: {e}"))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            debug_enabled,
        })
    }
}

impl LocationResolver for NominatimResolver {
    fn resolve(&self, name: &str) -> Result<Coordinates, LookupError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LookupError::InvalidInput(
                "location name must not be empty".to_string(),
            ));
        }

        let url = format!("{}/search", self.base_url);
        if self.debug_enabled {
            log_pipe!();
            log_debug!("Geocoding '{name}' via {url}");
        }

        let timeout_secs = self.timeout.as_secs();
        let response = self
            .http
            .get(&url)
            .query(&[("q", name), ("format", "json"), ("limit", "1")])
            .send()
            .map_err(|e| LookupError::from_http(&e, timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::BadStatus(status.to_string()));
        }

        let body = response
            .text()
            .map_err(|e| LookupError::from_http(&e, timeout_secs))?;

        parse_places(&body, name)
    }

    fn resolver_name(&self) -> &'static str {
        "Nominatim"
    }
}

/// Pick the most important place from a Nominatim JSON body.
pub(crate) fn parse_places(body: &str, name: &str) -> Result<Coordinates, LookupError> {
    let places: Vec<Place> =
        serde_json::from_str(body).map_err(|e| LookupError::Unparseable(e.to_string()))?;

    let best = places
        .into_iter()
        .enumerate()
        // Earlier entries win ties; Nominatim already sorts by relevance
        .max_by(|(ia, a), (ib, b)| {
            let score_a = a.importance.unwrap_or(0.0);
            let score_b = b.importance.unwrap_or(0.0);
            score_a.total_cmp(&score_b).then(ib.cmp(ia))
        })
        .map(|(_, place)| place)
        .ok_or_else(|| LookupError::NoResults(name.to_string()))?;

    let latitude: f64 = best
        .lat
        .parse()
        .map_err(|_| LookupError::Unparseable(best.lat.clone()))?;
    let longitude: f64 = best
        .lon
        .parse()
        .map_err(|_| LookupError::Unparseable(best.lon.clone()))?;

    if let Some(display) = &best.display_name {
        log_indented!("Matched: {display}");
    }

    Coordinates::new(latitude, longitude)
}
