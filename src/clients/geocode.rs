//! Venue geocoding (Google Geocoding API)

use crate::clients::http::{read_json, ApiError};
use crate::core::config::{Config, ConfigError, GeocodingSettings};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

const SERVICE: &str = "Geocoding";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Coordinates of the default venue (1999 Harrison St, Oakland), used when
/// the geocoder finds nothing for an address
pub const DEFAULT_COORDINATES: Coordinates = Coordinates {
    lat: 37.8084,
    lng: -122.2642,
};

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Look up an address; `Ok(None)` when the service has no match
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>, ApiError>;
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Coordinates,
}

#[derive(Clone)]
pub struct GoogleGeocoder {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl GoogleGeocoder {
    pub fn new(settings: &GeocodingSettings, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: settings.api_url.clone(),
            api_key: api_key.into(),
        }
    }

    /// Build the client, failing if its credentials are not configured
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::new(
            &config.settings.geocoding,
            config.credentials.maps_api_key()?,
        ))
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>, ApiError> {
        debug!("Geocoding '{}'", address);

        let response = self
            .http
            .get(&self.api_url)
            .query(&[("address", address), ("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(ApiError::transport(SERVICE))?;

        let body: GeocodeResponse = read_json(SERVICE, response).await?;

        // The service answers 200 even for a bad key; only these two are usable
        match body.status.as_deref() {
            None | Some("OK") | Some("ZERO_RESULTS") => {}
            Some(status) => {
                return Err(ApiError::Rejected {
                    service: SERVICE,
                    reason: match body.error_message {
                        Some(message) => format!("{}: {}", status, message),
                        None => status.to_string(),
                    },
                })
            }
        }

        Ok(body.results.into_iter().next().map(|r| r.geometry.location))
    }
}

impl std::fmt::Debug for GoogleGeocoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleGeocoder")
            .field("api_url", &self.api_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}
