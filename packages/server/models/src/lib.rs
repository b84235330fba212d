#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the Mangrove Watch server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the domain types to allow independent evolution of the API
//! contract; conversions into domain types live here too.

use mangrove_watch_geocoder::GeocodedPlace;
use mangrove_watch_report_models::ReportDraft;
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// Body of `POST /api/reports`: a citizen submission.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReportRequest {
    /// Free-text reporter identity.
    pub reporter_name: String,
    /// Incident category label.
    pub incident_type: String,
    /// Free-text body.
    pub description: String,
    /// Latitude (WGS84).
    pub lat: f64,
    /// Longitude (WGS84).
    pub lng: f64,
    /// Attached photo as a data URI, if any.
    #[serde(default)]
    pub photo_data_url: Option<String>,
}

impl From<SubmitReportRequest> for ReportDraft {
    fn from(request: SubmitReportRequest) -> Self {
        Self {
            reporter_name: request.reporter_name,
            incident_type: request.incident_type,
            description: request.description,
            lat: request.lat,
            lng: request.lng,
            photo_data_url: request.photo_data_url,
        }
    }
}

/// Body of `POST /api/reports/{id}/status`.
///
/// The status is kept as a raw string so an unrecognized value can be
/// rejected with a clear message instead of a generic deserialize error.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetStatusRequest {
    /// Requested status value.
    pub status: String,
}

/// Query parameters for the authority table endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportListParams {
    /// Keep only reports with exactly this status.
    pub status: Option<String>,
    /// Free-text search filter.
    pub q: Option<String>,
}

/// Query parameters for the my-reports endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MyReportsParams {
    /// Reporter name to look up (case-insensitive).
    pub name: String,
}

/// Query parameters for the event stream endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventStreamParams {
    /// Context id of the subscribing client. `EventSource` cannot set
    /// headers, so the id rides in the query string.
    pub context: Option<String>,
}

/// Query parameters for the geocode endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeParams {
    /// Free-text location query.
    pub q: String,
}

/// Response of the geocode endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeResponse {
    /// Whether a match was found.
    pub found: bool,
    /// Best-match latitude.
    pub lat: Option<f64>,
    /// Best-match longitude.
    pub lng: Option<f64>,
    /// Canonical display name of the match.
    pub display_name: Option<String>,
}

impl GeocodeResponse {
    /// The "no results" response.
    #[must_use]
    pub const fn no_match() -> Self {
        Self {
            found: false,
            lat: None,
            lng: None,
            display_name: None,
        }
    }
}

impl From<GeocodedPlace> for GeocodeResponse {
    fn from(place: GeocodedPlace) -> Self {
        Self {
            found: true,
            lat: Some(place.latitude),
            lng: Some(place.longitude),
            display_name: place.display_name,
        }
    }
}

/// Response of the login endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Whether the submitted credentials were accepted.
    pub authorized: bool,
}
