//! Job callback that feeds the action API.
//!
//! After each scheduled job, this callback broadcasts a [`JobBroadcast`]
//! to every connected `WebSocket` client and asks the persister to save
//! the world.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;
use tycoon_api::{AppState, JobBroadcast};
use tycoon_core::{JobCallback, JobReport};

/// Callback that bridges the scheduler to the action API.
pub struct ApiCallback {
    state: Arc<AppState>,
}

impl ApiCallback {
    /// Create a new callback backed by the given app state.
    pub const fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }
}

impl JobCallback for ApiCallback {
    fn on_job(&self, at: DateTime<Utc>, report: &JobReport) {
        let message = JobBroadcast::new(at, report.clone());
        let receivers = self.state.broadcast(&message);
        debug!(job = message.job.name(), receivers, "job broadcast sent");
        self.state.request_persist();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use chrono::TimeZone;
    use tokio::sync::Mutex;
    use tycoon_core::tick::ReplenishReport;
    use tycoon_core::{JobKind, ManualClock};
    use tycoon_economy::{EconomyConfig, World};

    use super::*;

    fn state() -> Arc<AppState> {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        Arc::new(AppState::new(
            Arc::new(Mutex::new(World::new())),
            Arc::new(EconomyConfig::default()),
            Arc::new(ManualClock::new(start)),
        ))
    }

    #[tokio::test]
    async fn job_is_broadcast_and_persisted() {
        let state = state();
        let mut rx = state.subscribe();
        let callback = ApiCallback::new(Arc::clone(&state));
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 18, 0, 0).unwrap();

        callback.on_job(
            at,
            &JobReport::ResourceReplenishment(ReplenishReport {
                regions_refilled: 3,
            }),
        );

        let message = rx.recv().await.unwrap();
        assert_eq!(message.job, JobKind::ResourceReplenishment);
        assert_eq!(message.at, at);
        tokio::time::timeout(Duration::from_millis(100), state.persist.notified())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn broadcast_without_clients_still_requests_a_save() {
        let state = state();
        let callback = ApiCallback::new(Arc::clone(&state));
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 18, 0, 0).unwrap();

        callback.on_job(
            at,
            &JobReport::ResourceReplenishment(ReplenishReport {
                regions_refilled: 0,
            }),
        );

        tokio::time::timeout(Duration::from_millis(100), state.persist.notified())
            .await
            .unwrap();
    }
}
