//! Storage Collaborator Contracts
//!
//! The engine loads and saves raw rows through these traits. Rows carry
//! undecoded item codes and epoch seconds so that decoding (and rejecting
//! unknown items) stays in the engine.

use async_trait::async_trait;
use tillage_flow::{Plot, PlotId};

pub type PlayerId = i64;

/// A plot row as the storage layer holds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoredPlot {
    pub id: u8,
    pub item: i64,
    /// Epoch seconds, `0` when nothing is pending.
    pub transition_at: i64,
}

impl StoredPlot {
    pub fn empty(id: PlotId) -> Self {
        Self {
            id: id.index(),
            item: 0,
            transition_at: 0,
        }
    }

    /// Empty rows for a freshly created player.
    pub fn initial_set() -> Vec<StoredPlot> {
        PlotId::all().map(StoredPlot::empty).collect()
    }
}

impl From<&Plot> for StoredPlot {
    fn from(plot: &Plot) -> Self {
        Self {
            id: plot.id.index(),
            item: plot.item.code(),
            transition_at: plot.transition_epoch(),
        }
    }
}

/// A player row together with its plot rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPlayer {
    pub id: PlayerId,
    pub name: String,
    pub plots: Vec<StoredPlot>,
}

/// Storage-layer errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Row not found: {0}")]
    Missing(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Per-plot persistence.
///
/// `save_plot` is an unconditional overwrite (explicit writes win).
/// `advance_plot` is a compare-and-set used for read-side persistence, so an
/// advancement derived from an old row never replaces a newer write.
#[async_trait]
pub trait PlotStore: Send + Sync + 'static {
    /// Load one plot row. `Ok(None)` when the player or plot does not exist.
    async fn load_plot(
        &self,
        player: PlayerId,
        plot: PlotId,
    ) -> Result<Option<StoredPlot>, StoreError>;

    /// Overwrite one plot row.
    async fn save_plot(&self, player: PlayerId, plot: &StoredPlot) -> Result<(), StoreError>;

    /// Replace the row with `new` only if it still equals `expected`.
    ///
    /// `Ok(false)` when the row changed (or vanished) since it was loaded.
    async fn advance_plot(
        &self,
        player: PlayerId,
        expected: &StoredPlot,
        new: &StoredPlot,
    ) -> Result<bool, StoreError>;
}

/// Player persistence.
#[async_trait]
pub trait PlayerStore: Send + Sync + 'static {
    /// Create a player and its `PLOTS_PER_PLAYER` empty plots in one step.
    async fn create_player(&self, name: &str, auth: &str) -> Result<PlayerId, StoreError>;

    /// Every player with its plots, ordered by id.
    async fn list_players(&self) -> Result<Vec<StoredPlayer>, StoreError>;

    async fn player_exists(&self, player: PlayerId) -> Result<bool, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use tillage_flow::{Item, PLOTS_PER_PLAYER};

    #[test]
    fn test_initial_set_is_empty_and_complete() {
        let rows = StoredPlot::initial_set();
        assert_eq!(rows.len(), PLOTS_PER_PLAYER as usize);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.id as usize, i);
            assert_eq!((row.item, row.transition_at), (0, 0));
        }
    }

    #[test]
    fn test_from_plot_encodes_sentinel_and_code() {
        let plot = Plot {
            id: PlotId::new(3).unwrap(),
            item: Item::TomatoSeed,
            transition_at: DateTime::from_timestamp(1_600_000_030, 0),
        };
        assert_eq!(
            StoredPlot::from(&plot),
            StoredPlot {
                id: 3,
                item: 3,
                transition_at: 1_600_000_030
            }
        );

        let empty = Plot::empty(PlotId::new(0).unwrap());
        assert_eq!(StoredPlot::from(&empty).transition_at, 0);
    }
}
