//! Shared application state for the action API.
//!
//! [`AppState`] holds the shared world, the economy configuration and
//! clock the handlers act with, the broadcast channel for job reports,
//! the recent-history archive served by the history endpoint, and the
//! signal that wakes the persister.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Notify, RwLock, broadcast};

use tycoon_core::{Clock, JobKind, JobReport, SharedWorld};
use tycoon_economy::EconomyConfig;
use tycoon_types::{HistoryEntry, PlayerId};

/// Capacity of the broadcast channel for job reports.
///
/// If a subscriber falls behind by more than this many messages it will
/// receive a [`broadcast::error::RecvError::Lagged`] and skip to the
/// newest message.
const BROADCAST_CAPACITY: usize = 256;

/// Number of persisted history entries kept in memory.
pub const HISTORY_CAPACITY: usize = 10_000;

/// JSON message pushed over the `WebSocket` after each job run.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct JobBroadcast {
    /// Which job ran.
    pub job: JobKind,
    /// When it ran.
    pub at: DateTime<Utc>,
    /// Its counters.
    pub report: JobReport,
}

impl JobBroadcast {
    /// Wrap a job report.
    pub const fn new(at: DateTime<Utc>, report: JobReport) -> Self {
        Self {
            job: report.kind(),
            at,
            report,
        }
    }
}

/// Persisted history entries, newest first, capped at a fixed size.
///
/// Entries still pending in the world are not here; the history endpoint
/// merges both.
#[derive(Debug, Clone)]
pub struct RecentHistory {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl RecentHistory {
    /// An empty archive holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(HISTORY_CAPACITY)),
            capacity,
        }
    }

    /// Add entries in the order they happened.
    pub fn record(&mut self, entries: impl IntoIterator<Item = HistoryEntry>) {
        for entry in entries {
            self.entries.push_front(entry);
        }
        self.entries.truncate(self.capacity);
    }

    /// Up to `limit` entries for `player`, newest first.
    pub fn for_player(&self, player: PlayerId, limit: usize) -> Vec<HistoryEntry> {
        self.entries
            .iter()
            .filter(|e| e.player_id == player)
            .take(limit)
            .cloned()
            .collect()
    }

    /// Number of entries held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the archive is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for RecentHistory {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY)
    }
}

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// The live world.
    pub world: SharedWorld,
    /// Balance constants for every action.
    pub config: Arc<EconomyConfig>,
    /// Source of `now` for actions.
    pub clock: Arc<dyn Clock>,
    /// Broadcast sender for job reports.
    pub tx: broadcast::Sender<JobBroadcast>,
    /// Persisted history, fed by the persister.
    pub history: Arc<RwLock<RecentHistory>>,
    /// Wakes the persister; notifications coalesce.
    pub persist: Arc<Notify>,
}

impl AppState {
    /// Create application state around a shared world.
    pub fn new(world: SharedWorld, config: Arc<EconomyConfig>, clock: Arc<dyn Clock>) -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            world,
            config,
            clock,
            tx,
            history: Arc::new(RwLock::new(RecentHistory::default())),
            persist: Arc::new(Notify::new()),
        }
    }

    /// Subscribe to the job broadcast channel.
    pub fn subscribe(&self) -> broadcast::Receiver<JobBroadcast> {
        self.tx.subscribe()
    }

    /// Publish a job report to all connected clients.
    ///
    /// Returns the number of receivers that received the message, 0 when
    /// no client is connected.
    pub fn broadcast(&self, message: &JobBroadcast) -> usize {
        self.tx.send(message.clone()).unwrap_or(0)
    }

    /// Ask the persister to save the world.
    pub fn request_persist(&self) {
        self.persist.notify_one();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use tycoon_core::tick::ReplenishReport;
    use tycoon_types::{HistoryAction, HistoryEntryId};

    use super::*;

    fn entry(player: PlayerId, description: &str) -> HistoryEntry {
        HistoryEntry {
            id: HistoryEntryId::new(),
            player_id: player,
            action: HistoryAction::Mining,
            description: description.to_owned(),
            money_delta: Decimal::ZERO,
            gold_delta: Decimal::ZERO,
            at: Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn recent_history_is_newest_first_and_capped() {
        let ana = PlayerId::new();
        let bia = PlayerId::new();
        let mut history = RecentHistory::new(3);
        history.record([entry(ana, "a1"), entry(bia, "b1"), entry(ana, "a2")]);
        history.record([entry(ana, "a3")]);

        assert_eq!(history.len(), 3);
        let mine: Vec<String> = history
            .for_player(ana, 10)
            .into_iter()
            .map(|e| e.description)
            .collect();
        assert_eq!(mine, ["a3", "a2"]);
        assert_eq!(history.for_player(ana, 1).len(), 1);
    }

    #[test]
    fn job_broadcast_carries_the_kind() {
        let report = JobReport::ResourceReplenishment(ReplenishReport {
            regions_refilled: 4,
        });
        let message = JobBroadcast::new(Utc::now(), report);
        assert_eq!(message.job, JobKind::ResourceReplenishment);
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["job"], "resource_replenishment");
        assert_eq!(json["report"]["regions_refilled"], 4);
    }
}
