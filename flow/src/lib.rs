//! Tillage Flow - Plot Growth Layer
//!
//! This crate defines the **rules** of the farm:
//! - `Item`: The closed enumeration of things a plot can hold
//! - `rules`: The transition rule table (what an item grows into, and when)
//! - `Plot`: The stored plot record
//! - `Clock`: The injected "current instant" capability
//! - `Ripen` / `Sow`: The resolver and mutation transitions
//!
//! **IMPORTANT**: This layer is Pure Rust - no IO, no Async.
//! Every function here is a deterministic function of its inputs and the
//! instant handed to it.

pub mod clock;
pub mod item;
pub mod plot;
pub mod rules;
pub mod transition;

pub use clock::{Clock, ManualClock, SystemClock};
pub use item::{InvalidItem, Item};
pub use plot::{PLOTS_PER_PLAYER, Plot, PlotError, PlotId};
pub use rules::{Growth, next_state, next_state_of_code};
pub use transition::{Ripen, Ripening, Sow, SowRequest, Transition, effective, plant};
