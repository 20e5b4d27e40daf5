//! In-memory storage collaborator.
//!
//! Used by tests and by `tillage serve --memory`. A single lock guards all
//! rows, which also serializes concurrent writes to the same plot.

use crate::store::{PlayerId, PlayerStore, PlotStore, StoreError, StoredPlayer, StoredPlot};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tillage_flow::PlotId;

#[derive(Debug)]
struct PlayerRow {
    name: String,
    #[allow(dead_code)]
    auth: String,
    plots: Vec<StoredPlot>,
}

#[derive(Debug, Default)]
struct Rows {
    last_id: PlayerId,
    players: BTreeMap<PlayerId, PlayerRow>,
}

/// Cloneable handle to shared in-memory rows.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    rows: Arc<Mutex<Rows>>,
    writes: Arc<AtomicUsize>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of plot saves performed so far.
    pub fn plot_writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make every subsequent call fail with `StoreError::Backend`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Overwrite a plot row directly, bypassing the engine.
    pub fn put_raw(&self, player: PlayerId, plot: StoredPlot) -> Result<(), StoreError> {
        let mut rows = self.rows.lock();
        let row = rows
            .players
            .get_mut(&player)
            .and_then(|p| p.plots.iter_mut().find(|r| r.id == plot.id))
            .ok_or_else(|| StoreError::Missing(format!("player {player} plot {}", plot.id)))?;
        *row = plot;
        Ok(())
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("memory store marked unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl PlotStore for MemoryStore {
    async fn load_plot(
        &self,
        player: PlayerId,
        plot: PlotId,
    ) -> Result<Option<StoredPlot>, StoreError> {
        self.check_available()?;
        let rows = self.rows.lock();
        Ok(rows
            .players
            .get(&player)
            .and_then(|p| p.plots.iter().find(|r| r.id == plot.index()))
            .copied())
    }

    async fn save_plot(&self, player: PlayerId, plot: &StoredPlot) -> Result<(), StoreError> {
        self.check_available()?;
        self.put_raw(player, *plot)?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn advance_plot(
        &self,
        player: PlayerId,
        expected: &StoredPlot,
        new: &StoredPlot,
    ) -> Result<bool, StoreError> {
        self.check_available()?;
        let mut rows = self.rows.lock();
        let Some(row) = rows
            .players
            .get_mut(&player)
            .and_then(|p| p.plots.iter_mut().find(|r| r.id == expected.id))
        else {
            return Ok(false);
        };
        if *row != *expected {
            return Ok(false);
        }
        *row = *new;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }
}

#[async_trait]
impl PlayerStore for MemoryStore {
    async fn create_player(&self, name: &str, auth: &str) -> Result<PlayerId, StoreError> {
        self.check_available()?;
        let mut rows = self.rows.lock();
        if rows.players.values().any(|p| p.name == name) {
            return Err(StoreError::Conflict(format!("player name {name:?} exists")));
        }
        rows.last_id += 1;
        let id = rows.last_id;
        rows.players.insert(
            id,
            PlayerRow {
                name: name.to_string(),
                auth: auth.to_string(),
                plots: StoredPlot::initial_set(),
            },
        );
        Ok(id)
    }

    async fn list_players(&self) -> Result<Vec<StoredPlayer>, StoreError> {
        self.check_available()?;
        let rows = self.rows.lock();
        Ok(rows
            .players
            .iter()
            .map(|(id, p)| StoredPlayer {
                id: *id,
                name: p.name.clone(),
                plots: p.plots.clone(),
            })
            .collect())
    }

    async fn player_exists(&self, player: PlayerId) -> Result<bool, StoreError> {
        self.check_available()?;
        Ok(self.rows.lock().players.contains_key(&player))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ids_start_at_one_and_names_are_unique() {
        let store = MemoryStore::new();
        assert_eq!(store.create_player("foo", "a").await, Ok(1));
        assert_eq!(store.create_player("bar", "b").await, Ok(2));
        assert!(matches!(
            store.create_player("foo", "c").await,
            Err(StoreError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_new_player_has_empty_plots() {
        let store = MemoryStore::new();
        let id = store.create_player("foo", "a").await.unwrap();
        let plot = PlotId::new(4).unwrap();
        assert_eq!(
            store.load_plot(id, plot).await.unwrap(),
            Some(StoredPlot::empty(plot))
        );
        assert_eq!(store.load_plot(id + 1, plot).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_advance_only_replaces_the_expected_row() {
        let store = MemoryStore::new();
        let id = store.create_player("foo", "a").await.unwrap();
        let plot = PlotId::new(1).unwrap();
        let seed = StoredPlot {
            id: 1,
            item: 1,
            transition_at: 10,
        };
        let carrot = StoredPlot {
            id: 1,
            item: 2,
            transition_at: 0,
        };
        store.save_plot(id, &seed).await.unwrap();

        assert_eq!(
            store
                .advance_plot(id, &StoredPlot::empty(plot), &carrot)
                .await,
            Ok(false)
        );
        assert_eq!(store.load_plot(id, plot).await.unwrap(), Some(seed));

        assert_eq!(store.advance_plot(id, &seed, &carrot).await, Ok(true));
        assert_eq!(store.load_plot(id, plot).await.unwrap(), Some(carrot));
        assert_eq!(store.plot_writes(), 2);

        assert_eq!(store.advance_plot(id + 1, &seed, &carrot).await, Ok(false));
    }

    #[tokio::test]
    async fn test_unavailable_store_fails() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        assert!(matches!(
            store.list_players().await,
            Err(StoreError::Backend(_))
        ));
    }
}
