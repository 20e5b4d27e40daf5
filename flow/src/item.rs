//! Item - The Closed Enumeration
//!
//! Every plot holds exactly one `Item`. Items carry a stable integer code,
//! which is what storage rows and wire payloads exchange.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Raised when a code does not name any known item.
///
/// Unknown codes are never coerced to `Item::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Invalid item code: {0}")]
pub struct InvalidItem(pub i64);

/// Things that can occupy a plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Item {
    /// Empty plot
    #[default]
    None,
    CarrotSeed,
    Carrot,
    TomatoSeed,
    TomatoSprout,
    Tomato,
}

impl Item {
    /// All items, in code order.
    pub const ALL: [Item; 6] = [
        Item::None,
        Item::CarrotSeed,
        Item::Carrot,
        Item::TomatoSeed,
        Item::TomatoSprout,
        Item::Tomato,
    ];

    /// Decode an item from its stable code.
    pub fn from_code(code: i64) -> Result<Self, InvalidItem> {
        match code {
            0 => Ok(Item::None),
            1 => Ok(Item::CarrotSeed),
            2 => Ok(Item::Carrot),
            3 => Ok(Item::TomatoSeed),
            4 => Ok(Item::TomatoSprout),
            5 => Ok(Item::Tomato),
            other => Err(InvalidItem(other)),
        }
    }

    /// The stable code stored in rows and sent over the wire.
    pub const fn code(self) -> i64 {
        match self {
            Item::None => 0,
            Item::CarrotSeed => 1,
            Item::Carrot => 2,
            Item::TomatoSeed => 3,
            Item::TomatoSprout => 4,
            Item::Tomato => 5,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Item::None => "none",
            Item::CarrotSeed => "carrot_seed",
            Item::Carrot => "carrot",
            Item::TomatoSeed => "tomato_seed",
            Item::TomatoSprout => "tomato_sprout",
            Item::Tomato => "tomato",
        }
    }

    /// Whether this item matures into something on its own.
    ///
    /// Derived from the rule table, never maintained separately.
    pub fn is_growing(self) -> bool {
        !crate::rules::next_state(self).is_terminal()
    }
}

impl TryFrom<i64> for Item {
    type Error = InvalidItem;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        Item::from_code(code)
    }
}

impl From<Item> for i64 {
    fn from(item: Item) -> Self {
        item.code()
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
