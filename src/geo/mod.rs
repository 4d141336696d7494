//! Location handling: coordinates and the resolvers that produce them.
//!
//! The scheduler resolves its location at most once per process. Two resolvers
//! exist:
//!
//! - [`nominatim::NominatimResolver`]: geocodes the configured place name against
//!   an OpenStreetMap Nominatim endpoint.
//! - [`StaticLocation`]: returns coordinates written directly in the
//!   configuration, for machines that should never talk to a geocoder.

pub mod nominatim;

use anyhow::Result;
use std::fmt;

use crate::config::Config;
use crate::error::LookupError;

pub use nominatim::NominatimResolver;

/// A validated point on the globe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// Validate latitude in [-90, 90] and longitude in [-180, 180].
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, LookupError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(LookupError::InvalidInput(format!(
                "latitude must be between -90 and 90 degrees (got {latitude})"
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(LookupError::InvalidInput(format!(
                "longitude must be between -180 and 180 degrees (got {longitude})"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ns = if self.latitude >= 0.0 { 'N' } else { 'S' };
        let ew = if self.longitude >= 0.0 { 'E' } else { 'W' };
        write!(
            f,
            "{:.4}°{ns}, {:.4}°{ew}",
            self.latitude.abs(),
            self.longitude.abs()
        )
    }
}

/// Turns a place name into coordinates.
#[cfg_attr(test, mockall::automock)]
pub trait LocationResolver {
    /// Look up `name` and return the most relevant match.
    fn resolve(&self, name: &str) -> Result<Coordinates, LookupError>;

    /// Short label for log output.
    fn resolver_name(&self) -> &'static str;
}

/// Resolver backed by coordinates from the configuration file.
pub struct StaticLocation {
    coordinates: Coordinates,
}

impl StaticLocation {
    pub fn new(coordinates: Coordinates) -> Self {
        Self { coordinates }
    }
}

impl LocationResolver for StaticLocation {
    fn resolve(&self, _name: &str) -> Result<Coordinates, LookupError> {
        Ok(self.coordinates)
    }

    fn resolver_name(&self) -> &'static str {
        "configured coordinates"
    }
}

/// Pick the resolver for a configuration: manual coordinates win over geocoding.
pub fn create_resolver(config: &Config, debug_enabled: bool) -> Result<Box<dyn LocationResolver>> {
    match config.coordinates()? {
        Some(coordinates) => Ok(Box::new(StaticLocation::new(coordinates))),
        None => Ok(Box::new(NominatimResolver::new(
            config.geocoding_url(),
            config.http_timeout(),
            debug_enabled,
        )?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_validation() {
        assert!(Coordinates::new(40.7128, -74.0060).is_ok());
        assert!(Coordinates::new(90.0, 180.0).is_ok());
        assert!(Coordinates::new(-90.0, -180.0).is_ok());

        assert!(Coordinates::new(91.0, 0.0).is_err());
        assert!(Coordinates::new(-90.5, 0.0).is_err());
        assert!(Coordinates::new(0.0, 181.0).is_err());
        assert!(Coordinates::new(0.0, -360.0).is_err());
        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_coordinates_display_uses_hemispheres() {
        let sydney = Coordinates::new(-33.8688, 151.2093).unwrap();
        assert_eq!(sydney.to_string(), "33.8688°S, 151.2093°E");

        let nyc = Coordinates::new(40.7128, -74.006).unwrap();
        assert_eq!(nyc.to_string(), "40.7128°N, 74.0060°W");
    }

    #[test]
    fn test_static_location_ignores_name() {
        let coords = Coordinates::new(52.3676, 4.9041).unwrap();
        let resolver = StaticLocation::new(coords);
        assert_eq!(resolver.resolve("anything"), Ok(coords));
        assert_eq!(resolver.resolve(""), Ok(coords));
    }
}
