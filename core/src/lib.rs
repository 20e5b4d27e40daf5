//! # Tillage Core
//!
//! The plot engine: ties the pure growth rules of `tillage-flow` to an
//! injected storage collaborator and an injected clock.
//!
//! The core is protocol-agnostic. It knows nothing about HTTP or SQL; those
//! live in `tillage-http` and `tillage-db`.

pub mod engine;
pub mod error;
pub mod memory;
pub mod player;
pub mod store;

pub use engine::PlotEngine;
pub use error::EngineError;
pub use memory::MemoryStore;
pub use player::{Player, Registered, generate_token};
pub use store::{PlayerId, PlayerStore, PlotStore, StoreError, StoredPlayer, StoredPlot};

pub mod prelude {
    pub use crate::engine::PlotEngine;
    pub use crate::error::EngineError;
    pub use crate::store::{PlayerId, PlayerStore, PlotStore, StoreError, StoredPlayer, StoredPlot};
    pub use tillage_flow::{Clock, Item, ManualClock, Plot, PlotId, SystemClock};
}
