//! PostgreSQL-backed storage collaborator.
//!
//! `PgStore` implements the core storage contracts on top of a
//! `PostgresPool`. Concurrent writes to one plot are serialized by
//! PostgreSQL's row-level locking on `UPDATE`.

use crate::error::DbError;
use crate::pool::PostgresPool;
use async_trait::async_trait;
use tillage_core::{PlayerId, PlayerStore, PlotStore, StoreError, StoredPlayer, StoredPlot};
use tillage_flow::PlotId;

#[derive(Clone)]
pub struct PgStore {
    pool: PostgresPool,
}

impl PgStore {
    pub fn new(pool: PostgresPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PostgresPool {
        &self.pool
    }
}

/// Player ids are `SERIAL` columns; anything outside `i32` cannot exist.
fn row_id(player: PlayerId) -> Option<i32> {
    i32::try_from(player).ok()
}

fn plot_row((id, item, transition_at): (i16, i64, i64)) -> Result<StoredPlot, StoreError> {
    let id = u8::try_from(id).map_err(|_| StoreError::Backend(format!("bad plot id {id}")))?;
    Ok(StoredPlot {
        id,
        item,
        transition_at,
    })
}

#[async_trait]
impl PlotStore for PgStore {
    async fn load_plot(
        &self,
        player: PlayerId,
        plot: PlotId,
    ) -> Result<Option<StoredPlot>, StoreError> {
        let Some(player_id) = row_id(player) else {
            return Ok(None);
        };

        let row = sqlx::query_as::<_, (i16, i64, i64)>(
            "SELECT id, item, transition_at FROM plots WHERE player_id = $1 AND id = $2",
        )
        .bind(player_id)
        .bind(i16::from(plot.index()))
        .fetch_optional(self.pool.inner())
        .await
        .map_err(DbError::from_sqlx)?;

        row.map(plot_row).transpose()
    }

    async fn save_plot(&self, player: PlayerId, plot: &StoredPlot) -> Result<(), StoreError> {
        let missing = || StoreError::Missing(format!("player {player} plot {}", plot.id));
        let player_id = row_id(player).ok_or_else(missing)?;

        tracing::debug!(
            tillage.db.sql = "UPDATE plots",
            tillage.player = player,
            tillage.plot = plot.id,
            "Saving plot"
        );

        let result = sqlx::query(
            "UPDATE plots SET item = $3, transition_at = $4 WHERE player_id = $1 AND id = $2",
        )
        .bind(player_id)
        .bind(i16::from(plot.id))
        .bind(plot.item)
        .bind(plot.transition_at)
        .execute(self.pool.inner())
        .await
        .map_err(DbError::from_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(missing());
        }
        Ok(())
    }

    async fn advance_plot(
        &self,
        player: PlayerId,
        expected: &StoredPlot,
        new: &StoredPlot,
    ) -> Result<bool, StoreError> {
        let Some(player_id) = row_id(player) else {
            return Ok(false);
        };

        // The WHERE clause re-checks the row under PostgreSQL's row lock, so a
        // write that landed after the load makes this a no-op.
        let result = sqlx::query(
            "UPDATE plots SET item = $3, transition_at = $4 \
             WHERE player_id = $1 AND id = $2 AND item = $5 AND transition_at = $6",
        )
        .bind(player_id)
        .bind(i16::from(expected.id))
        .bind(new.item)
        .bind(new.transition_at)
        .bind(expected.item)
        .bind(expected.transition_at)
        .execute(self.pool.inner())
        .await
        .map_err(DbError::from_sqlx)?;

        let advanced = result.rows_affected() == 1;
        if !advanced {
            tracing::debug!(
                tillage.player = player,
                tillage.plot = expected.id,
                "Plot changed since load; advancement skipped"
            );
        }
        Ok(advanced)
    }
}

#[async_trait]
impl PlayerStore for PgStore {
    async fn create_player(&self, name: &str, auth: &str) -> Result<PlayerId, StoreError> {
        let mut tx = self
            .pool
            .inner()
            .begin()
            .await
            .map_err(|e| DbError::TransactionError(e.to_string()))?;

        // Any early return drops `tx`, which rolls it back.
        let (id,) = sqlx::query_as::<_, (i32,)>(
            "INSERT INTO players (name, auth) VALUES ($1, $2) RETURNING id",
        )
        .bind(name)
        .bind(auth)
        .fetch_one(&mut *tx)
        .await
        .map_err(DbError::from_sqlx)?;

        for plot in StoredPlot::initial_set() {
            sqlx::query("INSERT INTO plots (player_id, id) VALUES ($1, $2)")
                .bind(id)
                .bind(i16::from(plot.id))
                .execute(&mut *tx)
                .await
                .map_err(DbError::from_sqlx)?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionError(e.to_string()))?;

        Ok(PlayerId::from(id))
    }

    async fn list_players(&self) -> Result<Vec<StoredPlayer>, StoreError> {
        let rows = sqlx::query_as::<_, (i32, String, Option<i16>, Option<i64>, Option<i64>)>(
            "SELECT p.id, p.name, pl.id, pl.item, pl.transition_at \
             FROM players p LEFT JOIN plots pl ON pl.player_id = p.id \
             ORDER BY p.id, pl.id",
        )
        .fetch_all(self.pool.inner())
        .await
        .map_err(DbError::from_sqlx)?;

        let mut players: Vec<StoredPlayer> = Vec::new();
        for (player_id, name, plot_id, item, transition_at) in rows {
            let player_id = PlayerId::from(player_id);
            if players.last().map(|p| p.id) != Some(player_id) {
                players.push(StoredPlayer {
                    id: player_id,
                    name,
                    plots: Vec::new(),
                });
            }
            if let (Some(id), Some(item), Some(transition_at)) = (plot_id, item, transition_at) {
                let plot = plot_row((id, item, transition_at))?;
                if let Some(last) = players.last_mut() {
                    last.plots.push(plot);
                }
            }
        }
        Ok(players)
    }

    async fn player_exists(&self, player: PlayerId) -> Result<bool, StoreError> {
        let Some(player_id) = row_id(player) else {
            return Ok(false);
        };
        let (exists,) =
            sqlx::query_as::<_, (bool,)>("SELECT EXISTS (SELECT 1 FROM players WHERE id = $1)")
                .bind(player_id)
                .fetch_one(self.pool.inner())
                .await
                .map_err(DbError::from_sqlx)?;
        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_id_bounds() {
        assert_eq!(row_id(7), Some(7));
        assert_eq!(row_id(i64::MAX), None);
    }

    #[test]
    fn test_plot_row_rejects_negative_ids() {
        assert!(plot_row((-1, 0, 0)).is_err());
        assert_eq!(
            plot_row((4, 1, 10)).unwrap(),
            StoredPlot {
                id: 4,
                item: 1,
                transition_at: 10
            }
        );
    }
}
