#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Nominatim geocoding collaborator.
//!
//! Resolves free-text location descriptions ("the jetty near Alang") to a
//! best-match latitude/longitude using the public Nominatim instance, or a
//! self-hosted one via configuration. The public instance is free, needs
//! no API key, and rate-limits at 1 request per second — fine for a demo
//! workload where lookups are user-initiated.
//!
//! Lookups carry a hard timeout and are never retried automatically; a
//! transport failure is surfaced to the caller so the user can be told to
//! try again.

pub mod nominatim;

use std::time::Duration;

use thiserror::Error;

/// Default Nominatim search endpoint (public instance).
pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org/search";

/// How long a single lookup may take before it is abandoned.
pub const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// A geocoding result with coordinates and metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPlace {
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// The canonical display name returned by the geocoder.
    pub display_name: Option<String>,
}

/// Errors from geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed (includes timeouts).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,
}

/// Where and how to reach the geocoding service.
#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    /// Search endpoint URL.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl GeocoderConfig {
    /// Reads the configuration from the environment, falling back to the
    /// public Nominatim instance.
    ///
    /// Honors `MANGROVE_GEOCODER_URL`.
    #[must_use]
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("MANGROVE_GEOCODER_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self {
            base_url,
            timeout: LOOKUP_TIMEOUT,
        }
    }

    /// Builds an HTTP client with this configuration's timeout applied to
    /// every request.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the TLS backend cannot be
    /// initialized.
    pub fn build_client(&self) -> Result<reqwest::Client, GeocodeError> {
        Ok(reqwest::Client::builder().timeout(self.timeout).build()?)
    }
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: LOOKUP_TIMEOUT,
        }
    }
}
