#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Projection query and result types.
//!
//! Inputs and outputs of the pure view projections: leaderboard rows,
//! aggregate status counts, and the authority table filter. Kept separate
//! from the projection functions so API surfaces can depend on the types
//! without pulling in the computation.

use mangrove_watch_report_models::ReportStatus;
use serde::{Deserialize, Serialize};

/// One leaderboard entry: a reporter and their accumulated score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRow {
    /// Reporter display name ("Anonymous" for blank submissions).
    pub name: String,
    /// Accumulated points across all of this reporter's reports.
    pub score: u64,
}

/// Filter for the authority review table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    /// Keep only reports with exactly this status.
    pub status: Option<ReportStatus>,
    /// Case-insensitive substring matched against reporter name, incident
    /// type, description, and id.
    pub search: Option<String>,
}

/// Aggregate counts over a snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    /// Total number of reports.
    pub total: usize,
    /// Reports with `pending` status.
    pub pending: usize,
    /// Reports with `acknowledged` status.
    pub acknowledged: usize,
    /// Reports with `in_progress` status.
    pub in_progress: usize,
    /// Reports with `resolved` status.
    pub resolved: usize,
    /// `resolved / total` as a whole percentage, rounded half-up.
    /// Zero when the store is empty.
    pub resolved_pct: usize,
}
