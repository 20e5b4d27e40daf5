//! Plot - The Stored Plot Record
//!
//! A plot holds one item and, while that item is growing, the instant at
//! which it matures. Storage and wire formats encode "no pending transition"
//! as epoch `0`; in memory it is `None`.

use crate::item::{InvalidItem, Item};
use chrono::{DateTime, Utc};
use std::fmt;

/// Number of plots every player owns.
pub const PLOTS_PER_PLAYER: u8 = 6;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlotError {
    #[error("Plot index {0} is out of range (expected < {})", PLOTS_PER_PLAYER)]
    OutOfRange(i64),

    #[error("Transition instant {0} is not representable")]
    BadInstant(i64),

    #[error(transparent)]
    InvalidItem(#[from] InvalidItem),
}

/// Index of a plot within its owner's plot set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlotId(u8);

impl PlotId {
    pub fn new(index: i64) -> Result<Self, PlotError> {
        u8::try_from(index)
            .ok()
            .filter(|i| *i < PLOTS_PER_PLAYER)
            .map(PlotId)
            .ok_or(PlotError::OutOfRange(index))
    }

    /// Every valid plot id, in order.
    pub fn all() -> impl Iterator<Item = PlotId> {
        (0..PLOTS_PER_PLAYER).map(PlotId)
    }

    pub fn index(self) -> u8 {
        self.0
    }
}

impl fmt::Display for PlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plot {
    pub id: PlotId,
    pub item: Item,
    /// When `item` becomes its successor. `None` means nothing is pending.
    pub transition_at: Option<DateTime<Utc>>,
}

impl Plot {
    /// A freshly created, empty plot.
    pub fn empty(id: PlotId) -> Self {
        Self {
            id,
            item: Item::None,
            transition_at: None,
        }
    }

    /// Rebuild a plot from its stored representation.
    ///
    /// `transition_epoch` is whole seconds since the Unix epoch, `0` for none.
    pub fn from_parts(id: PlotId, item_code: i64, transition_epoch: i64) -> Result<Self, PlotError> {
        let item = Item::from_code(item_code)?;
        let transition_at = match transition_epoch {
            0 => None,
            secs => Some(
                DateTime::from_timestamp(secs, 0).ok_or(PlotError::BadInstant(secs))?,
            ),
        };
        Ok(Self {
            id,
            item,
            transition_at,
        })
    }

    /// Transition instant as epoch seconds, `0` when nothing is pending.
    pub fn transition_epoch(&self) -> i64 {
        self.transition_at.map(|at| at.timestamp()).unwrap_or(0)
    }

    pub fn is_pending(&self) -> bool {
        self.transition_at.is_some()
    }
}
