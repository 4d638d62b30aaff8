//! Geolocation collaborator contract.
//!
//! Position lookup lives outside the store. Callers resolve a [`Location`]
//! first and hand it to `create_issue`; failures surface to the user and
//! are never retried here.

use serde::{Deserialize, Serialize};

use crate::error::{CivicError, Result};
use crate::model::Location;

/// A bare latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl From<Coordinates> for Location {
    fn from(c: Coordinates) -> Self {
        Self::new(c.latitude, c.longitude)
    }
}

/// Source of the reporter's current position.
pub trait Geolocator {
    /// Current position of the reporting device.
    ///
    /// # Errors
    ///
    /// Returns `LocationUnavailable` if no position can be determined.
    fn detect_location(&self) -> Result<Coordinates>;

    /// Best-effort human-readable address; may be approximate.
    fn reverse_geocode(&self, position: Coordinates) -> String {
        approximate_address(position)
    }
}

/// Geolocator answering with a preconfigured position, or failing when none
/// is configured.
#[derive(Debug, Clone, Default)]
pub struct FixedGeolocator {
    position: Option<Coordinates>,
    address: Option<String>,
}

impl FixedGeolocator {
    #[must_use]
    pub const fn new(position: Coordinates) -> Self {
        Self {
            position: Some(position),
            address: None,
        }
    }

    #[must_use]
    pub const fn unavailable() -> Self {
        Self {
            position: None,
            address: None,
        }
    }

    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }
}

impl Geolocator for FixedGeolocator {
    fn detect_location(&self) -> Result<Coordinates> {
        self.position.ok_or_else(|| CivicError::LocationUnavailable {
            reason: "no position configured for this device".to_string(),
        })
    }

    fn reverse_geocode(&self, position: Coordinates) -> String {
        self.address
            .clone()
            .unwrap_or_else(|| approximate_address(position))
    }
}

/// Format coordinates as `"40.7128°N, 74.0060°W"`.
#[must_use]
pub fn approximate_address(position: Coordinates) -> String {
    let ns = if position.latitude < 0.0 { 'S' } else { 'N' };
    let ew = if position.longitude < 0.0 { 'W' } else { 'E' };
    format!(
        "{:.4}°{ns}, {:.4}°{ew}",
        position.latitude.abs(),
        position.longitude.abs()
    )
}

/// Detect the current position and attach its address.
///
/// # Errors
///
/// Returns `LocationUnavailable` from the geolocator unchanged.
pub fn locate(geolocator: &dyn Geolocator) -> Result<Location> {
    let position = geolocator.detect_location()?;
    let address = geolocator.reverse_geocode(position);
    tracing::debug!(
        latitude = position.latitude,
        longitude = position.longitude,
        %address,
        "location detected"
    );
    Ok(Location::from(position).with_address(address))
}
