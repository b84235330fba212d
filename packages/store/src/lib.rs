#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Canonical report store.
//!
//! [`ReportStore`] owns the one authoritative list of [`Report`]s in a
//! process. All other components operate on read-only snapshots or submit
//! whole-record upserts; nothing holds a mutable reference into store
//! internals.
//!
//! Persistence is pluggable behind [`StorageBackend`]: the list is read
//! once at construction and written synchronously, wholesale, on every
//! mutation. An unavailable or corrupt backend degrades to process-local
//! memory with a warning — it never surfaces to callers and never
//! crashes.
//!
//! Every successful logical write publishes exactly one [`ReportEvent`]
//! on the attached [`ChangeBus`], tagged with the writing context so the
//! originator never hears its own write.

pub mod backend;

use std::sync::{Arc, RwLock};

use mangrove_watch_events::{ChangeBus, ContextId, ReportEvent};
use mangrove_watch_report_models::{Report, ReportStatus};
use thiserror::Error;

pub use backend::{FileBackend, MemoryBackend, REPORTS_FILE, StorageBackend, StorageError};

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No report with the requested id exists.
    #[error("no report with id '{id}'")]
    NotFound {
        /// The id that was looked up.
        id: String,
    },
}

/// The canonical, order-preserving list of reports.
///
/// Constructed once per process and shared via `Arc`. Interior locking
/// makes each logical write atomic with respect to in-process readers: a
/// snapshot never observes a partially applied write.
pub struct ReportStore {
    reports: RwLock<Vec<Report>>,
    backend: Arc<dyn StorageBackend>,
    bus: ChangeBus,
}

impl ReportStore {
    /// Opens the store over `backend`, reading whatever was persisted by a
    /// previous context.
    ///
    /// Never fails: an unreadable backend or a corrupt payload starts the
    /// store empty with a `log::warn!`, per the degradation contract.
    #[must_use]
    pub fn open(backend: Arc<dyn StorageBackend>, bus: ChangeBus) -> Self {
        let reports = match backend.load() {
            Ok(Some(payload)) => match serde_json::from_str(&payload) {
                Ok(list) => list,
                Err(e) => {
                    log::warn!("persisted reports are corrupt, starting empty: {e}");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("report storage unavailable, starting empty: {e}");
                Vec::new()
            }
        };

        log::debug!("report store opened with {} reports", reports.len());

        Self {
            reports: RwLock::new(reports),
            backend,
            bus,
        }
    }

    /// Returns a full, order-preserving copy of the current report list.
    ///
    /// # Panics
    ///
    /// Panics if the store lock is poisoned.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Report> {
        self.reports
            .read()
            .expect("report store lock poisoned")
            .clone()
    }

    /// Number of reports currently stored.
    ///
    /// # Panics
    ///
    /// Panics if the store lock is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.reports
            .read()
            .expect("report store lock poisoned")
            .len()
    }

    /// Whether the store holds no reports.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inserts or replaces a report, matching on `id`.
    ///
    /// An existing report is replaced in place, preserving its position;
    /// otherwise the report is appended. The list can therefore never
    /// contain two records with the same id. Publishes
    /// [`ReportEvent::NewReport`] for an append and [`ReportEvent::Sync`]
    /// for a replacement.
    ///
    /// # Panics
    ///
    /// Panics if the store lock is poisoned.
    pub fn upsert(&self, report: Report, origin: ContextId) {
        let event;
        {
            let mut reports = self.reports.write().expect("report store lock poisoned");
            match reports.iter().position(|r| r.id == report.id) {
                Some(idx) => {
                    reports[idx] = report;
                    event = ReportEvent::Sync;
                }
                None => {
                    event = ReportEvent::NewReport {
                        report: report.clone(),
                    };
                    reports.push(report);
                }
            }
            self.persist(&reports);
        }
        self.bus.publish(origin, event);
    }

    /// Removes the report with the given id.
    ///
    /// A complete no-op if no such report exists: no write, no event.
    /// Administrative/debug capability — the application flow never
    /// deletes reports.
    ///
    /// # Panics
    ///
    /// Panics if the store lock is poisoned.
    pub fn remove(&self, id: &str, origin: ContextId) {
        let removed;
        {
            let mut reports = self.reports.write().expect("report store lock poisoned");
            let before = reports.len();
            reports.retain(|r| r.id != id);
            removed = reports.len() != before;
            if removed {
                self.persist(&reports);
            }
        }
        if removed {
            self.bus.publish(origin, ReportEvent::Sync);
        }
    }

    /// Sets the status of the report with the given id, leaving every
    /// other field untouched.
    ///
    /// Publishes exactly one [`ReportEvent::StatusChanged`] on success and
    /// returns the updated report.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no report has this id; the
    /// store is left unchanged and nothing is published.
    ///
    /// # Panics
    ///
    /// Panics if the store lock is poisoned.
    pub fn set_status(
        &self,
        id: &str,
        status: ReportStatus,
        origin: ContextId,
    ) -> Result<Report, StoreError> {
        let updated;
        {
            let mut reports = self.reports.write().expect("report store lock poisoned");
            let Some(report) = reports.iter_mut().find(|r| r.id == id) else {
                return Err(StoreError::NotFound { id: id.to_string() });
            };
            report.status = status;
            updated = report.clone();
            self.persist(&reports);
        }
        self.bus.publish(
            origin,
            ReportEvent::StatusChanged {
                id: id.to_string(),
                status,
            },
        );
        Ok(updated)
    }

    /// Writes the full list through the backend.
    ///
    /// Failure is logged and otherwise ignored: the in-memory list stays
    /// authoritative for this process.
    fn persist(&self, reports: &[Report]) {
        match serde_json::to_string(reports) {
            Ok(payload) => {
                if let Err(e) = self.backend.store(&payload) {
                    log::warn!("failed to persist reports, keeping in-memory state: {e}");
                }
            }
            Err(e) => log::error!("failed to serialize reports: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mangrove_watch_report_models::ReportDraft;

    fn memory_store() -> (ReportStore, ChangeBus) {
        let bus = ChangeBus::default();
        let store = ReportStore::open(Arc::new(MemoryBackend::new()), bus.clone());
        (store, bus)
    }

    fn report(name: &str) -> Report {
        ReportDraft {
            reporter_name: name.to_string(),
            incident_type: "cutting".to_string(),
            description: "Mangrove branches cut near the jetty".to_string(),
            lat: 21.641,
            lng: 72.357,
            photo_data_url: None,
        }
        .submit()
        .unwrap()
    }

    #[test]
    fn upsert_appends_then_replaces_in_place() {
        let (store, _bus) = memory_store();
        let first = report("Asha");
        let second = report("Ravi");
        store.upsert(first.clone(), ContextId::new());
        store.upsert(second, ContextId::new());

        let mut replacement = first.clone();
        replacement.description = "Updated description".to_string();
        store.upsert(replacement.clone(), ContextId::new());

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 2);
        // Position preserved from first insertion, content replaced.
        assert_eq!(snapshot[0], replacement);
        assert_eq!(snapshot[1].reporter_name, "Ravi");
    }

    #[test]
    fn upsert_never_produces_duplicate_ids() {
        let (store, _bus) = memory_store();
        let base = report("Asha");
        for i in 0..10 {
            let mut r = base.clone();
            r.description = format!("revision {i}");
            store.upsert(r, ContextId::new());
        }
        assert_eq!(store.len(), 1);
        assert_eq!(store.snapshot()[0].description, "revision 9");
    }

    #[test]
    fn snapshot_contains_submitted_report_exactly() {
        let (store, _bus) = memory_store();
        let submitted = report("Asha");
        store.upsert(submitted.clone(), ContextId::new());
        assert_eq!(store.snapshot(), vec![submitted]);
    }

    #[test]
    fn set_status_on_unknown_id_leaves_store_unchanged() {
        let (store, _bus) = memory_store();
        store.upsert(report("Asha"), ContextId::new());
        let before = store.snapshot();

        let result = store.set_status("r_missing", ReportStatus::Resolved, ContextId::new());
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn set_status_changes_only_the_status_field() {
        let (store, _bus) = memory_store();
        let submitted = report("Asha");
        store.upsert(submitted.clone(), ContextId::new());

        let updated = store
            .set_status(&submitted.id, ReportStatus::Acknowledged, ContextId::new())
            .unwrap();

        assert_eq!(updated.status, ReportStatus::Acknowledged);
        assert_eq!(updated.id, submitted.id);
        assert_eq!(updated.created_at, submitted.created_at);
        assert_eq!(updated.lat, submitted.lat);
        assert_eq!(updated.lng, submitted.lng);
        assert_eq!(updated.reporter_name, submitted.reporter_name);
        assert_eq!(updated.description, submitted.description);
        assert_eq!(store.snapshot(), vec![updated]);
    }

    #[test]
    fn remove_is_a_no_op_for_unknown_ids() {
        let (store, _bus) = memory_store();
        let submitted = report("Asha");
        store.upsert(submitted.clone(), ContextId::new());

        store.remove("r_missing", ContextId::new());
        assert_eq!(store.len(), 1);

        store.remove(&submitted.id, ContextId::new());
        assert!(store.is_empty());
    }

    #[test]
    fn corrupt_persisted_payload_loads_as_empty() {
        let backend = Arc::new(MemoryBackend::with_payload("{not json"));
        let store = ReportStore::open(backend, ChangeBus::default());
        assert!(store.is_empty());
    }

    #[test]
    fn reports_survive_reopening_the_backend() {
        let backend = Arc::new(MemoryBackend::new());
        let submitted = report("Asha");
        {
            let store = ReportStore::open(backend.clone(), ChangeBus::default());
            store.upsert(submitted.clone(), ContextId::new());
        }

        let reopened = ReportStore::open(backend, ChangeBus::default());
        assert_eq!(reopened.snapshot(), vec![submitted]);
    }

    #[test]
    fn reports_survive_reopening_a_file_backend() {
        let dir = std::env::temp_dir().join(format!("mangrove-watch-test-{}", uuid::Uuid::new_v4()));
        let submitted = report("Asha");
        {
            let store = ReportStore::open(
                Arc::new(FileBackend::in_dir(&dir)),
                ChangeBus::default(),
            );
            store.upsert(submitted.clone(), ContextId::new());
        }

        let reopened = ReportStore::open(
            Arc::new(FileBackend::in_dir(&dir)),
            ChangeBus::default(),
        );
        assert_eq!(reopened.snapshot(), vec![submitted]);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn each_write_publishes_exactly_one_event() {
        let (store, bus) = memory_store();
        let writer = ContextId::new();
        let mut subscription = bus.subscribe(ContextId::new());

        let submitted = report("Asha");
        store.upsert(submitted.clone(), writer);
        assert_eq!(
            subscription.recv().await,
            Some(ReportEvent::NewReport {
                report: submitted.clone()
            })
        );

        store
            .set_status(&submitted.id, ReportStatus::Resolved, writer)
            .unwrap();
        assert_eq!(
            subscription.recv().await,
            Some(ReportEvent::StatusChanged {
                id: submitted.id.clone(),
                status: ReportStatus::Resolved,
            })
        );

        let mut replacement = submitted.clone();
        replacement.status = ReportStatus::Resolved;
        replacement.description = "edited".to_string();
        store.upsert(replacement, writer);
        assert_eq!(subscription.recv().await, Some(ReportEvent::Sync));

        store.remove(&submitted.id, writer);
        assert_eq!(subscription.recv().await, Some(ReportEvent::Sync));
    }

    #[tokio::test]
    async fn failed_lookups_publish_nothing() {
        let (store, bus) = memory_store();
        let mut subscription = bus.subscribe(ContextId::new());

        let result = store.set_status("r_missing", ReportStatus::Resolved, ContextId::new());
        assert!(result.is_err());
        store.remove("r_missing", ContextId::new());

        // The only event the subscriber ever sees is the marker write
        // published after the failed operations.
        store.upsert(report("Marker"), ContextId::new());
        assert!(matches!(
            subscription.recv().await,
            Some(ReportEvent::NewReport { .. })
        ));
    }

    #[tokio::test]
    async fn a_write_in_one_context_reaches_another_context() {
        let backend = Arc::new(MemoryBackend::new());
        let bus = ChangeBus::default();
        let context_x = ContextId::new();
        let context_y = ContextId::new();

        let store = ReportStore::open(backend, bus.clone());
        let mut subscription_y = bus.subscribe(context_y);

        let submitted = report("Asha");
        store.upsert(submitted.clone(), context_x);

        // Context Y hears about the write and its next projection render
        // (from a fresh snapshot) reflects it.
        assert_eq!(
            subscription_y.recv().await,
            Some(ReportEvent::NewReport {
                report: submitted.clone()
            })
        );
        assert_eq!(store.snapshot(), vec![submitted]);
    }
}
