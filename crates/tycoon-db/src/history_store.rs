//! Reads of the append-only history and journal tables.

use sqlx::PgPool;

use tycoon_types::{HistoryEntry, LedgerEntry, PlayerId};

use crate::error::DbError;
use crate::rows::{HistoryRow, LedgerRow};

/// Operations on the `history` and `ledger` tables.
pub struct HistoryStore<'a> {
    pool: &'a PgPool,
}

impl<'a> HistoryStore<'a> {
    /// Create a history store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The most recent `limit` entries for `player`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails or a row is corrupt.
    pub async fn recent_for(
        &self,
        player: PlayerId,
        limit: u32,
    ) -> Result<Vec<HistoryEntry>, DbError> {
        sqlx::query_as::<_, HistoryRow>(
            r"SELECT * FROM history
              WHERE player_id = $1
              ORDER BY at DESC, id DESC
              LIMIT $2",
        )
        .bind(player.into_inner())
        .bind(i64::from(limit))
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(HistoryEntry::try_from)
        .collect()
    }

    /// The most recent `limit` entries across all players, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails or a row is corrupt.
    pub async fn recent(&self, limit: u32) -> Result<Vec<HistoryEntry>, DbError> {
        sqlx::query_as::<_, HistoryRow>(
            r"SELECT * FROM history
              ORDER BY at DESC, id DESC
              LIMIT $1",
        )
        .bind(i64::from(limit))
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(HistoryEntry::try_from)
        .collect()
    }

    /// Every journal entry, oldest first.
    ///
    /// Used to reconcile the persisted journal against persisted balances.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails or a row is corrupt.
    pub async fn journal(&self) -> Result<Vec<LedgerEntry>, DbError> {
        sqlx::query_as::<_, LedgerRow>("SELECT * FROM ledger ORDER BY at, id")
            .fetch_all(self.pool)
            .await?
            .into_iter()
            .map(LedgerEntry::try_from)
            .collect()
    }
}
