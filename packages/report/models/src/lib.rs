#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Report record types and status vocabulary.
//!
//! This crate defines the canonical [`Report`] entity shared across the
//! entire Mangrove Watch system, along with the closed [`ReportStatus`]
//! vocabulary and submission validation. Every other package operates on
//! these types; none defines its own report representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Review status of a report.
///
/// The vocabulary is a flat enum: any recognized status may be assigned at
/// any time, in any order. There is no transition state machine.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReportStatus {
    /// Newly submitted, not yet reviewed.
    Pending,
    /// Seen by the authority, no action taken yet.
    Acknowledged,
    /// Remediation under way.
    InProgress,
    /// Incident handled and closed.
    Resolved,
}

impl ReportStatus {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Pending,
            Self::Acknowledged,
            Self::InProgress,
            Self::Resolved,
        ]
    }
}

/// A single citizen-submitted incident record.
///
/// `id` and `created_at` are set once at creation and never change. Only
/// `status` is mutated after creation, by the authority review flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Opaque unique identifier (`r_` followed by 7 base-36 characters).
    pub id: String,
    /// Free-text reporter identity. Not authenticated; the grouping key
    /// for scoring and "my reports" lookup.
    pub reporter_name: String,
    /// Incident category label.
    pub incident_type: String,
    /// Free-text body.
    pub description: String,
    /// Latitude (WGS84). Always finite.
    pub lat: f64,
    /// Longitude (WGS84). Always finite.
    pub lng: f64,
    /// Current review status.
    pub status: ReportStatus,
    /// When the report was submitted. Immutable.
    pub created_at: DateTime<Utc>,
    /// Whether a photo is attached.
    pub has_photo: bool,
    /// Attached photo as a data URI, if any.
    #[serde(default)]
    pub photo_data_url: Option<String>,
}

impl Report {
    /// Generates a fresh report id: `r_` plus 7 base-36 characters drawn
    /// from UUID v4 randomness.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn generate_id() -> String {
        const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

        let mut value = uuid::Uuid::new_v4().as_u128();
        let mut id = String::with_capacity(9);
        id.push_str("r_");
        for _ in 0..7 {
            id.push(char::from(ALPHABET[(value % 36) as usize]));
            value /= 36;
        }
        id
    }
}

/// A citizen submission before it becomes a stored [`Report`].
///
/// Carries only the caller-supplied fields; `id`, `created_at`, and the
/// initial `Pending` status are assigned by [`ReportDraft::submit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDraft {
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

impl ReportDraft {
    /// Checks that all required fields are present and the coordinates are
    /// finite, without consuming the draft.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.reporter_name.trim().is_empty() {
            return Err(ValidationError::MissingField("reporterName"));
        }
        if self.incident_type.trim().is_empty() {
            return Err(ValidationError::MissingField("incidentType"));
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::MissingField("description"));
        }
        if !self.lat.is_finite() {
            return Err(ValidationError::NonFiniteCoordinate("lat"));
        }
        if !self.lng.is_finite() {
            return Err(ValidationError::NonFiniteCoordinate("lng"));
        }
        Ok(())
    }

    /// Validates the draft and turns it into a stored [`Report`] with a
    /// fresh id, the current timestamp, and `Pending` status.
    ///
    /// An empty-string photo payload is normalized to no photo.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if any required field is missing or a
    /// coordinate is not a finite number. Nothing is generated on failure.
    pub fn submit(self) -> Result<Report, ValidationError> {
        self.validate()?;

        let photo_data_url = self.photo_data_url.filter(|p| !p.is_empty());

        Ok(Report {
            id: Report::generate_id(),
            reporter_name: self.reporter_name,
            incident_type: self.incident_type,
            description: self.description,
            lat: self.lat,
            lng: self.lng,
            status: ReportStatus::Pending,
            created_at: Utc::now(),
            has_photo: photo_data_url.is_some(),
            photo_data_url,
        })
    }
}

/// Error returned when a [`ReportDraft`] fails submission validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// A required free-text field is missing or blank.
    MissingField(&'static str),
    /// A coordinate is NaN or infinite.
    NonFiniteCoordinate(&'static str),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "required field '{field}' is missing"),
            Self::NonFiniteCoordinate(field) => {
                write!(f, "coordinate '{field}' must be a finite number")
            }
        }
    }
}

impl std::error::Error for ValidationError {}
