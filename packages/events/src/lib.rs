#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Cross-context change notification for the report store.
//!
//! [`ChangeBus`] is a publish/subscribe hub backed by a
//! `tokio::sync::broadcast` channel. Every execution context (one open
//! client view, the CLI, a test) holds a [`ContextId`]; events published
//! from a context are delivered to every live subscription *except* the
//! originating context's own — it already has the fresh data from the
//! write it just performed.
//!
//! Delivery is fire-and-forget and at-most-once: zero subscribers is not
//! an error, missed events are not persisted, and a subscriber that falls
//! behind is handed a synthetic [`ReportEvent::Sync`] telling it to
//! re-read the full snapshot.

use mangrove_watch_report_models::{Report, ReportStatus};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// ContextId
// ---------------------------------------------------------------------------

/// Identity of one independent execution context.
///
/// Contexts share the persistence medium and the notification channel but
/// not memory; the id exists so the bus can suppress echo back to the
/// originator of a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(uuid::Uuid);

impl ContextId {
    /// Creates a fresh, unique context id.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ContextId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ContextId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ContextId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

// ---------------------------------------------------------------------------
// ReportEvent
// ---------------------------------------------------------------------------

/// A change that happened to the report store.
///
/// Each event is self-contained: a receiver can either apply the payload
/// locally (`NewReport`, `StatusChanged`) or unconditionally re-read the
/// full snapshot (`Sync`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReportEvent {
    /// Generic "re-read me": the store changed in a way not covered by a
    /// more specific event.
    Sync,
    /// A new report was added.
    NewReport {
        /// The report as stored.
        report: Report,
    },
    /// A report's status changed.
    StatusChanged {
        /// Id of the affected report.
        id: String,
        /// The status it now carries.
        status: ReportStatus,
    },
}

/// An event paired with the context that produced it.
#[derive(Debug, Clone)]
struct Published {
    origin: ContextId,
    event: ReportEvent,
}

// ---------------------------------------------------------------------------
// ChangeBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 64;

/// Fan-out bus for [`ReportEvent`]s.
///
/// Cheap to clone; all clones publish into the same channel. Designed to be
/// held by the store (publish side) and by each connected context
/// (subscribe side).
#[derive(Debug, Clone)]
pub struct ChangeBus {
    sender: broadcast::Sender<Published>,
}

impl ChangeBus {
    /// Creates a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest un-consumed events are dropped;
    /// affected subscribers are told to re-sync (see
    /// [`Subscription::recv`]).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event on behalf of `origin`.
    ///
    /// At-most-once, fire-and-forget: if there are no live subscribers the
    /// event is silently dropped, which is correct — the originating
    /// context already holds the fresh data.
    pub fn publish(&self, origin: ContextId, event: ReportEvent) {
        // SendError only means there are zero receivers.
        let _ = self.sender.send(Published { origin, event });
    }

    /// Subscribes as context `context`.
    ///
    /// The returned subscription yields every event published by *other*
    /// contexts from this point on; events published with `context` as the
    /// origin are filtered out.
    #[must_use]
    pub fn subscribe(&self, context: ContextId) -> Subscription {
        Subscription {
            context,
            receiver: self.sender.subscribe(),
        }
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// One context's view of the event stream.
pub struct Subscription {
    context: ContextId,
    receiver: broadcast::Receiver<Published>,
}

impl Subscription {
    /// Waits for the next event from another context.
    ///
    /// Returns `None` once the bus (every [`ChangeBus`] clone) has been
    /// dropped. If this subscriber lagged behind and events were dropped,
    /// a synthetic [`ReportEvent::Sync`] is returned so the caller
    /// re-reads the full snapshot instead of missing updates.
    pub async fn recv(&mut self) -> Option<ReportEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(published) if published.origin == self.context => {}
                Ok(published) => return Some(published.event),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    log::warn!("context {} lagged {missed} events; resyncing", self.context);
                    return Some(ReportEvent::Sync);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_changed(id: &str) -> ReportEvent {
        ReportEvent::StatusChanged {
            id: id.to_string(),
            status: ReportStatus::Resolved,
        }
    }

    #[tokio::test]
    async fn delivers_events_to_other_contexts() {
        let bus = ChangeBus::default();
        let writer = ContextId::new();
        let reader = ContextId::new();

        let mut subscription = bus.subscribe(reader);
        bus.publish(writer, status_changed("r_0000001"));

        assert_eq!(
            subscription.recv().await,
            Some(status_changed("r_0000001"))
        );
    }

    #[tokio::test]
    async fn suppresses_echo_to_the_originating_context() {
        let bus = ChangeBus::default();
        let writer = ContextId::new();
        let other = ContextId::new();

        let mut subscription = bus.subscribe(writer);
        bus.publish(writer, ReportEvent::Sync);
        bus.publish(other, status_changed("r_0000002"));

        // The writer's own event is skipped; the first thing it sees is
        // the other context's write.
        assert_eq!(
            subscription.recv().await,
            Some(status_changed("r_0000002"))
        );
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_a_no_op() {
        let bus = ChangeBus::default();
        bus.publish(ContextId::new(), ReportEvent::Sync);
    }

    #[tokio::test]
    async fn lagged_subscriber_is_told_to_resync() {
        let bus = ChangeBus::new(1);
        let writer = ContextId::new();
        let reader = ContextId::new();

        let mut subscription = bus.subscribe(reader);
        for i in 0..3 {
            bus.publish(writer, status_changed(&format!("r_000000{i}")));
        }

        assert_eq!(subscription.recv().await, Some(ReportEvent::Sync));
    }

    #[tokio::test]
    async fn recv_ends_when_the_bus_is_dropped() {
        let bus = ChangeBus::default();
        let mut subscription = bus.subscribe(ContextId::new());
        drop(bus);
        assert_eq!(subscription.recv().await, None);
    }

    #[test]
    fn events_serialize_with_tagged_wire_schema() {
        let sync = serde_json::to_value(ReportEvent::Sync).unwrap();
        assert_eq!(sync, serde_json::json!({"type": "sync"}));

        let changed = serde_json::to_value(status_changed("r_ab12cd3")).unwrap();
        assert_eq!(
            changed,
            serde_json::json!({
                "type": "status_changed",
                "id": "r_ab12cd3",
                "status": "resolved",
            })
        );
    }

    #[test]
    fn context_id_string_roundtrip() {
        let id = ContextId::new();
        let parsed: ContextId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<ContextId>().is_err());
    }
}
