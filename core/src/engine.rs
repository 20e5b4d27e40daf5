//! # PlotEngine: Resolve and Plant
//!
//! The engine is the only place where stored rows, the rule table and the
//! clock meet.
//!
//! * **Reads** resolve the effective plot at `clock.now()` and persist it
//!   only when it advanced, and only if the row is unchanged since it was
//!   loaded. Otherwise the read starts over from the newer row.
//! * **Writes** validate the requested item before touching storage, then
//!   overwrite the plot with a freshly scheduled state.
//!
//! The engine holds no state of its own besides its collaborators; callers
//! may share it behind an `Arc`.

use crate::error::EngineError;
use crate::player::{Player, Registered, generate_token};
use crate::store::{PlayerId, PlayerStore, PlotStore, StoreError, StoredPlot};
use tillage_flow::{Clock, Item, Plot, PlotId, effective, plant};
use tracing::Instrument;

pub struct PlotEngine<S, C> {
    store: S,
    clock: C,
}

impl<S, C> PlotEngine<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }
}

impl<S, C> PlotEngine<S, C>
where
    S: PlotStore + PlayerStore,
    C: Clock,
{
    /// Effective state of a plot, saving it back if it matured.
    pub async fn resolve_and_maybe_persist(
        &self,
        player: PlayerId,
        plot: PlotId,
    ) -> Result<Plot, EngineError> {
        let span = tracing::debug_span!("ResolvePlot", tillage.player = player, tillage.plot = %plot);
        async move {
            loop {
                let row = self.load_row(player, plot).await?;
                let stored = Plot::from_parts(plot, row.item, row.transition_at)?;

                let ripening = effective(stored, self.clock.now());
                if !ripening.advanced {
                    return Ok(ripening.plot);
                }

                let saved = self
                    .store
                    .advance_plot(player, &row, &StoredPlot::from(&ripening.plot))
                    .await?;
                if saved {
                    tracing::debug!(
                        from = %stored.item,
                        to = %ripening.plot.item,
                        "Plot matured on read"
                    );
                    return Ok(ripening.plot);
                }
                // A write landed after the load: resolve the new row instead.
                tracing::debug!("Plot changed during read, reloading");
            }
        }
        .instrument(span)
        .await
    }

    /// Place `item_code` into a plot, replacing whatever was there.
    pub async fn plant(
        &self,
        player: PlayerId,
        plot: PlotId,
        item_code: i64,
    ) -> Result<Plot, EngineError> {
        let span = tracing::info_span!("PlantPlot", tillage.player = player, tillage.plot = %plot);
        async move {
            // Reject before any IO so an invalid request never persists anything.
            let item = Item::from_code(item_code)?;

            // Existence only: a write overwrites the old state unconditionally,
            // even an undecodable one.
            self.load_row(player, plot).await?;

            let planted = plant(Plot::empty(plot), item.code(), self.clock.now())?;
            self.store
                .save_plot(player, &StoredPlot::from(&planted))
                .await?;

            tracing::info!(
                %item,
                transition_at = planted.transition_epoch(),
                "Plot planted"
            );
            Ok(planted)
        }
        .instrument(span)
        .await
    }

    /// Create a player with an empty plot set.
    ///
    /// A bearer token is generated when `auth` is `None`.
    pub async fn register(
        &self,
        name: &str,
        auth: Option<String>,
    ) -> Result<Registered, EngineError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::InvalidName);
        }

        let (auth, generated_auth) = match auth {
            Some(auth) => (auth, None),
            None => {
                let token = generate_token();
                (token.clone(), Some(token))
            }
        };

        let id = self
            .store
            .create_player(name, &auth)
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => EngineError::NameTaken(name.to_string()),
                other => EngineError::Storage(other),
            })?;

        tracing::info!(tillage.player = id, name, "Player registered");
        Ok(Registered {
            id,
            name: name.to_string(),
            generated_auth,
        })
    }

    /// All players, with plots resolved at `clock.now()`.
    ///
    /// Listing derives effective states without saving them.
    pub async fn players(&self) -> Result<Vec<Player>, EngineError> {
        let now = self.clock.now();
        let rows = self.store.list_players().await?;

        rows.into_iter()
            .map(|row| -> Result<Player, EngineError> {
                let plots = row
                    .plots
                    .iter()
                    .map(|p| -> Result<Plot, EngineError> {
                        let id = PlotId::new(i64::from(p.id))?;
                        let stored = Plot::from_parts(id, p.item, p.transition_at)?;
                        Ok(effective(stored, now).plot)
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Player {
                    id: row.id,
                    name: row.name,
                    plots,
                })
            })
            .collect()
    }

    async fn load_row(&self, player: PlayerId, plot: PlotId) -> Result<StoredPlot, EngineError> {
        if let Some(row) = self.store.load_plot(player, plot).await? {
            return Ok(row);
        }
        if !self.store.player_exists(player).await? {
            return Err(EngineError::PlayerNotFound(player));
        }
        Err(EngineError::PlotNotFound {
            player,
            plot: plot.index().into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use tillage_flow::ManualClock;

    const T: i64 = 1_600_000_000;

    fn engine() -> (PlotEngine<MemoryStore, ManualClock>, ManualClock) {
        let clock = ManualClock::at_epoch(T);
        (PlotEngine::new(MemoryStore::new(), clock.clone()), clock)
    }

    #[tokio::test]
    async fn test_register_trims_and_rejects_empty_names() {
        let (engine, _) = engine();
        assert_eq!(
            engine.register("   ", None).await,
            Err(EngineError::InvalidName)
        );
        let registered = engine.register(" foo ", Some("abcde".into())).await.unwrap();
        assert_eq!(registered.name, "foo");
        assert_eq!(registered.generated_auth, None);
    }

    #[tokio::test]
    async fn test_register_generates_token_when_missing() {
        let (engine, _) = engine();
        let registered = engine.register("foo", None).await.unwrap();
        assert!(registered.generated_auth.is_some());
    }

    #[tokio::test]
    async fn test_duplicate_name_is_taken() {
        let (engine, _) = engine();
        engine.register("foo", None).await.unwrap();
        assert_eq!(
            engine.register("foo", None).await,
            Err(EngineError::NameTaken("foo".into()))
        );
    }

    #[tokio::test]
    async fn test_missing_player_and_plot() {
        let (engine, _) = engine();
        let plot = PlotId::new(0).unwrap();
        assert_eq!(
            engine.resolve_and_maybe_persist(9, plot).await,
            Err(EngineError::PlayerNotFound(9))
        );
        assert_eq!(
            engine.plant(9, plot, Item::CarrotSeed.code()).await,
            Err(EngineError::PlayerNotFound(9))
        );
    }
}
