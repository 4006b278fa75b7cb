//! Background persistence of the shared world.
//!
//! Actions and jobs only mutate memory. They signal the persister through
//! [`AppState::request_persist`]; signals that arrive while a save is in
//! flight coalesce into one follow-up save. Pending history and journal
//! entries leave memory only after the transaction that wrote them has
//! committed, so a failed save is retried in full by the next one.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, error, info};
use tycoon_api::AppState;
use tycoon_db::{DbError, PostgresPool, WorldStore};

/// Saves the world whenever asked, until shutdown.
pub struct Persister {
    pool: PostgresPool,
    state: Arc<AppState>,
}

impl Persister {
    /// Create a persister writing through `pool`.
    pub const fn new(pool: PostgresPool, state: Arc<AppState>) -> Self {
        Self { pool, state }
    }

    /// Save the world once.
    ///
    /// Holds the world lock for the whole transaction so the saved state
    /// and the drained entries match. Returns the number of history
    /// entries written.
    pub async fn persist_once(&self) -> Result<usize, DbError> {
        let (history, journal) = {
            let mut world = self.state.world.lock().await;
            WorldStore::new(self.pool.pool()).save(&world).await?;
            world.drain_pending()
        };
        let written = history.len();
        debug!(history = written, journal = journal.len(), "pending entries flushed");
        self.state.history.write().await.record(history);
        Ok(written)
    }

    /// Save on every signal until `shutdown` turns true, then save once
    /// more.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        loop {
            tokio::select! {
                () = self.state.persist.notified() => {
                    if let Err(e) = self.persist_once().await {
                        error!(error = %e, "world save failed; will retry on next change");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        match self.persist_once().await {
            Ok(written) => info!(history = written, "final world save complete"),
            Err(e) => error!(error = %e, "final world save failed"),
        }
    }
}
