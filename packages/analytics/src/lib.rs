#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Pure view projections over report store snapshots.
//!
//! Every function here derives presentation data from an immutable
//! snapshot and holds no state of its own — re-running a projection on
//! the latest snapshot is always the full answer. No projection depends
//! on a presentation technology.

use std::collections::HashMap;

use mangrove_watch_analytics_models::{LeaderboardRow, ReportQuery, StatusCounts};
use mangrove_watch_report_models::{Report, ReportStatus};

/// Points awarded for every submitted report.
pub const POINTS_PER_REPORT: u64 = 10;
/// Bonus points for a report with an attached photo.
pub const PHOTO_BONUS: u64 = 5;
/// Bonus points for a report that reached `resolved`.
pub const RESOLVED_BONUS: u64 = 5;
/// Maximum number of leaderboard rows returned.
pub const MAX_LEADERBOARD_ROWS: usize = 50;

/// Bucket name for reports submitted without a reporter name.
pub const ANONYMOUS: &str = "Anonymous";

/// Computes the reporter leaderboard.
///
/// Reports are grouped by trimmed, case-sensitive reporter name (blank
/// names fall into the [`ANONYMOUS`] bucket). Each report scores
/// [`POINTS_PER_REPORT`], plus [`PHOTO_BONUS`] if it carries a photo and
/// [`RESOLVED_BONUS`] if it was resolved. Rows are sorted descending by
/// score; the sort is stable, so ties keep first-seen insertion order.
/// At most [`MAX_LEADERBOARD_ROWS`] rows are returned.
#[must_use]
pub fn leaderboard(snapshot: &[Report]) -> Vec<LeaderboardRow> {
    let mut rows: Vec<LeaderboardRow> = Vec::new();
    let mut index_by_name: HashMap<String, usize> = HashMap::new();

    for report in snapshot {
        let name = report.reporter_name.trim();
        let name = if name.is_empty() { ANONYMOUS } else { name };

        let mut points = POINTS_PER_REPORT;
        if report.has_photo {
            points += PHOTO_BONUS;
        }
        if report.status == ReportStatus::Resolved {
            points += RESOLVED_BONUS;
        }

        if let Some(&idx) = index_by_name.get(name) {
            rows[idx].score += points;
        } else {
            index_by_name.insert(name.to_string(), rows.len());
            rows.push(LeaderboardRow {
                name: name.to_string(),
                score: points,
            });
        }
    }

    rows.sort_by(|a, b| b.score.cmp(&a.score));
    rows.truncate(MAX_LEADERBOARD_ROWS);
    rows
}

/// Filters the snapshot to one reporter's reports.
///
/// The match is a case-insensitive equality on the reporter name; stored
/// order is preserved.
#[must_use]
pub fn my_reports(snapshot: &[Report], name: &str) -> Vec<Report> {
    let wanted = name.to_lowercase();
    snapshot
        .iter()
        .filter(|r| r.reporter_name.to_lowercase() == wanted)
        .cloned()
        .collect()
}

/// Builds the authority review table.
///
/// Applies the optional status equality filter and a case-insensitive
/// substring match against reporter name, incident type, description, and
/// id, then sorts descending by creation time (newest first).
#[must_use]
pub fn authority_table(snapshot: &[Report], query: &ReportQuery) -> Vec<Report> {
    let needle = query
        .search
        .as_deref()
        .unwrap_or_default()
        .to_lowercase();

    let mut rows: Vec<Report> = snapshot
        .iter()
        .filter(|r| {
            let status_ok = query.status.is_none_or(|status| r.status == status);
            let haystack = format!(
                "{} {} {} {}",
                r.reporter_name, r.incident_type, r.description, r.id
            )
            .to_lowercase();
            status_ok && haystack.contains(&needle)
        })
        .cloned()
        .collect();

    rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    rows
}

/// Computes aggregate counts over the snapshot.
///
/// The resolved percentage rounds half-up; an empty snapshot yields 0%
/// rather than a division fault.
#[must_use]
pub fn status_counts(snapshot: &[Report]) -> StatusCounts {
    let mut counts = StatusCounts {
        total: snapshot.len(),
        ..StatusCounts::default()
    };

    for report in snapshot {
        match report.status {
            ReportStatus::Pending => counts.pending += 1,
            ReportStatus::Acknowledged => counts.acknowledged += 1,
            ReportStatus::InProgress => counts.in_progress += 1,
            ReportStatus::Resolved => counts.resolved += 1,
        }
    }

    counts.resolved_pct = if counts.total == 0 {
        0
    } else {
        // round(resolved / total * 100) with half-up rounding, in integers
        (counts.resolved * 200 + counts.total) / (counts.total * 2)
    };

    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn report(name: &str, has_photo: bool, status: ReportStatus) -> Report {
        Report {
            id: Report::generate_id(),
            reporter_name: name.to_string(),
            incident_type: "dumping".to_string(),
            description: "Debris washed into the roots".to_string(),
            lat: 21.641,
            lng: 72.357,
            status,
            created_at: Utc::now(),
            has_photo,
            photo_data_url: None,
        }
    }

    #[test]
    fn leaderboard_scores_reports_with_bonuses() {
        let snapshot = vec![
            report("A", false, ReportStatus::Pending),
            report("A", true, ReportStatus::Resolved),
            report("B", false, ReportStatus::Pending),
        ];
        let rows = leaderboard(&snapshot);
        assert_eq!(
            rows,
            vec![
                LeaderboardRow {
                    name: "A".to_string(),
                    score: 30,
                },
                LeaderboardRow {
                    name: "B".to_string(),
                    score: 10,
                },
            ]
        );
    }

    #[test]
    fn leaderboard_groups_blank_names_as_anonymous() {
        let snapshot = vec![
            report("", false, ReportStatus::Pending),
            report("   ", false, ReportStatus::Pending),
        ];
        let rows = leaderboard(&snapshot);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, ANONYMOUS);
        assert_eq!(rows[0].score, 20);
    }

    #[test]
    fn leaderboard_grouping_is_case_sensitive() {
        let snapshot = vec![
            report("asha", false, ReportStatus::Pending),
            report("Asha", false, ReportStatus::Pending),
        ];
        assert_eq!(leaderboard(&snapshot).len(), 2);
    }

    #[test]
    fn leaderboard_ties_keep_first_seen_order() {
        let snapshot = vec![
            report("First", false, ReportStatus::Pending),
            report("Second", false, ReportStatus::Pending),
            report("Third", true, ReportStatus::Pending),
        ];
        let rows = leaderboard(&snapshot);
        assert_eq!(rows[0].name, "Third");
        assert_eq!(rows[1].name, "First");
        assert_eq!(rows[2].name, "Second");
    }

    #[test]
    fn leaderboard_truncates_to_top_fifty() {
        let snapshot: Vec<Report> = (0..60)
            .map(|i| report(&format!("reporter-{i}"), false, ReportStatus::Pending))
            .collect();
        assert_eq!(leaderboard(&snapshot).len(), MAX_LEADERBOARD_ROWS);
    }

    #[test]
    fn my_reports_matches_name_case_insensitively() {
        let snapshot = vec![
            report("Asha", false, ReportStatus::Pending),
            report("ASHA", false, ReportStatus::Pending),
            report("Ravi", false, ReportStatus::Pending),
        ];
        let mine = my_reports(&snapshot, "asha");
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].reporter_name, "Asha");
        assert_eq!(mine[1].reporter_name, "ASHA");
    }

    #[test]
    fn authority_table_filters_by_status_and_search() {
        let snapshot = vec![
            report("Asha", false, ReportStatus::Pending),
            report("Ravi", false, ReportStatus::Resolved),
            report("Meera", false, ReportStatus::Pending),
        ];
        let rows = authority_table(
            &snapshot,
            &ReportQuery {
                status: Some(ReportStatus::Pending),
                search: Some("ASHA".to_string()),
            },
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].reporter_name, "Asha");
    }

    #[test]
    fn authority_table_search_covers_description_and_id() {
        let mut tagged = report("Asha", false, ReportStatus::Pending);
        tagged.description = "Oil sheen near the Khadi outlet".to_string();
        let other = report("Ravi", false, ReportStatus::Pending);
        let snapshot = vec![tagged.clone(), other.clone()];

        let by_description = authority_table(
            &snapshot,
            &ReportQuery {
                status: None,
                search: Some("khadi".to_string()),
            },
        );
        assert_eq!(by_description.len(), 1);
        assert_eq!(by_description[0].id, tagged.id);

        let by_id = authority_table(
            &snapshot,
            &ReportQuery {
                status: None,
                search: Some(other.id.clone()),
            },
        );
        assert_eq!(by_id.len(), 1);
        assert_eq!(by_id[0].id, other.id);
    }

    #[test]
    fn authority_table_sorts_newest_first() {
        let mut oldest = report("Asha", false, ReportStatus::Pending);
        oldest.created_at = Utc::now() - Duration::hours(2);
        let mut middle = report("Ravi", false, ReportStatus::Pending);
        middle.created_at = Utc::now() - Duration::hours(1);
        let newest = report("Meera", false, ReportStatus::Pending);

        let snapshot = vec![oldest.clone(), newest.clone(), middle.clone()];
        let rows = authority_table(&snapshot, &ReportQuery::default());
        assert_eq!(rows[0].id, newest.id);
        assert_eq!(rows[1].id, middle.id);
        assert_eq!(rows[2].id, oldest.id);
    }

    #[test]
    fn status_counts_handles_the_empty_snapshot() {
        let counts = status_counts(&[]);
        assert_eq!(counts.total, 0);
        assert_eq!(counts.resolved_pct, 0);
    }

    #[test]
    fn status_counts_rounds_resolved_percentage_half_up() {
        let snapshot = vec![
            report("A", false, ReportStatus::Resolved),
            report("B", false, ReportStatus::Pending),
            report("C", false, ReportStatus::Pending),
        ];
        let counts = status_counts(&snapshot);
        assert_eq!(counts.total, 3);
        assert_eq!(counts.resolved, 1);
        assert_eq!(counts.resolved_pct, 33);

        // 1/8 = 12.5% rounds up to 13
        let snapshot: Vec<Report> = std::iter::once(report("A", false, ReportStatus::Resolved))
            .chain((0..7).map(|_| report("B", false, ReportStatus::Pending)))
            .collect();
        assert_eq!(status_counts(&snapshot).resolved_pct, 13);
    }

    #[test]
    fn status_counts_tallies_every_status() {
        let snapshot = vec![
            report("A", false, ReportStatus::Pending),
            report("B", false, ReportStatus::Acknowledged),
            report("C", false, ReportStatus::InProgress),
            report("D", false, ReportStatus::Resolved),
            report("E", false, ReportStatus::Resolved),
        ];
        let counts = status_counts(&snapshot);
        assert_eq!(counts.pending, 1);
        assert_eq!(counts.acknowledged, 1);
        assert_eq!(counts.in_progress, 1);
        assert_eq!(counts.resolved, 2);
        assert_eq!(counts.resolved_pct, 40);
    }
}
