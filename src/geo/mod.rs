//! Geolocation
//!
//! Optional location enrichment for the intake form:
//! - a [`Geolocator`] reports the device position, if it has one
//! - a [`ReverseGeocoder`] turns that position into a city name
//!
//! Both are best-effort. Callers treat every error as "no location".

mod bigdatacloud;

pub use bigdatacloud::BigDataCloudGeocoder;

use crate::backend::Coordinates;
use crate::config::LocationConfig;
use async_trait::async_trait;

/// City label used when the geocoder answers without a place name
pub const DETECTED_LOCATION: &str = "Detected Location";

/// Source of the device position
#[async_trait]
pub trait Geolocator: Send + Sync {
    /// Current position; `None` when the capability is absent
    async fn current_position(&self) -> Result<Option<Coordinates>, GeoError>;
}

/// Resolves coordinates to a human-readable city
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn city_name(&self, coords: Coordinates) -> Result<String, GeoError>;
}

/// Errors from position lookup or reverse geocoding
#[derive(Debug, thiserror::Error)]
pub enum GeoError {
    #[error("Position unavailable: {0}")]
    PositionUnavailable(String),

    #[error("Geocoding request timed out")]
    Timeout,

    #[error("Geocoding request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Geocoding service returned {0}")]
    Status(u16),
}

/// Device without location support
pub struct NoGeolocation;

#[async_trait]
impl Geolocator for NoGeolocation {
    async fn current_position(&self) -> Result<Option<Coordinates>, GeoError> {
        Ok(None)
    }
}

/// A position configured up front
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Coordinates);

impl FixedPosition {
    /// Position from `[location]`, when both coordinates are set
    pub fn from_config(config: &LocationConfig) -> Option<Self> {
        match (config.latitude, config.longitude) {
            (Some(lat), Some(lon)) => Some(Self(Coordinates::new(lat, lon))),
            _ => None,
        }
    }
}

#[async_trait]
impl Geolocator for FixedPosition {
    async fn current_position(&self) -> Result<Option<Coordinates>, GeoError> {
        Ok(Some(self.0))
    }
}

/// Result of a location lookup
#[derive(Debug, Clone, PartialEq)]
pub struct LocationFix {
    pub coordinates: Coordinates,
    /// Set only when reverse geocoding succeeded
    pub city: Option<String>,
}

/// Look up the device position and name its city.
///
/// Returns `None` when there is no position at all. A geocoding failure
/// still yields the coordinates, with `city` left empty.
pub async fn locate(
    locator: &dyn Geolocator,
    geocoder: Option<&dyn ReverseGeocoder>,
) -> Option<LocationFix> {
    let coordinates = match locator.current_position().await {
        Ok(Some(coords)) => coords,
        Ok(None) => {
            tracing::debug!("No geolocation capability");
            return None;
        }
        Err(e) => {
            tracing::warn!(error = %e, "Geolocation failed");
            return None;
        }
    };

    let city = match geocoder {
        Some(geocoder) => match geocoder.city_name(coordinates).await {
            Ok(city) => Some(city),
            Err(e) => {
                tracing::warn!(error = %e, "Reverse geocoding failed");
                None
            }
        },
        None => None,
    };

    Some(LocationFix { coordinates, city })
}
