//! Offline sunrise/sunset calculation.
//!
//! Uses the `sunrise` crate's NOAA-based algorithm, so no network access (and no
//! connectivity probe) is needed. Selected with `solar_provider = "local"`.

use chrono::{Local, NaiveDate};
use sunrise::{SolarDay, SolarEvent};

use super::{SolarTimeProvider, SolarWindow};
use crate::error::LookupError;
use crate::geo::Coordinates;

pub struct LocalSolarCalculator;

impl SolarTimeProvider for LocalSolarCalculator {
    fn fetch(&self, coords: Coordinates, date: NaiveDate) -> Result<SolarWindow, LookupError> {
        let position = sunrise::Coordinates::new(coords.latitude(), coords.longitude())
            .ok_or_else(|| LookupError::InvalidInput(format!("coordinates {coords}")))?;

        let day = SolarDay::new(position, date);
        let sunrise = day.event_time(SolarEvent::Sunrise);
        let sunset = day.event_time(SolarEvent::Sunset);

        // Polar day/night yields degenerate events, rejected by the window invariant
        SolarWindow::new(
            date,
            sunrise.with_timezone(&Local),
            sunset.with_timezone(&Local),
        )
    }

    fn provider_name(&self) -> &'static str {
        "local calculation"
    }

    fn requires_network(&self) -> bool {
        false
    }
}
