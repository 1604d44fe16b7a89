//! BigDataCloud reverse geocoding client

use super::{GeoError, ReverseGeocoder, DETECTED_LOCATION};
use crate::backend::Coordinates;
use crate::config::GeocodingConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Client for the free `reverse-geocode-client` endpoint
pub struct BigDataCloudGeocoder {
    client: Client,
    url: String,
    language: String,
}

#[derive(Debug, Deserialize)]
struct ReverseGeocodeResponse {
    #[serde(default)]
    locality: Option<String>,
    #[serde(default)]
    city: Option<String>,
}

impl BigDataCloudGeocoder {
    pub fn new(config: &GeocodingConfig) -> Result<Self, GeoError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: Client, config: &GeocodingConfig) -> Self {
        Self {
            client,
            url: config.url.clone(),
            language: config.language.clone(),
        }
    }
}

/// Prefer the locality, then the city, then a generic label
fn pick_city(response: ReverseGeocodeResponse) -> String {
    [response.locality, response.city]
        .into_iter()
        .flatten()
        .find(|name| !name.trim().is_empty())
        .unwrap_or_else(|| DETECTED_LOCATION.to_string())
}

#[async_trait]
impl ReverseGeocoder for BigDataCloudGeocoder {
    async fn city_name(&self, coords: Coordinates) -> Result<String, GeoError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("latitude", coords.lat.to_string()),
                ("longitude", coords.lon.to_string()),
                ("localityLanguage", self.language.clone()),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GeoError::Timeout
                } else {
                    GeoError::Request(e)
                }
            })?;

        if !response.status().is_success() {
            return Err(GeoError::Status(response.status().as_u16()));
        }

        let body: ReverseGeocodeResponse = response.json().await?;
        Ok(pick_city(body))
    }
}
