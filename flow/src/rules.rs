//! Rules - The Transition Rule Table
//!
//! The single source of truth for game rules: what an item grows into and
//! how long that takes. Consulted both when planting (to schedule the
//! transition) and when reading (to know what the item becomes).

use crate::item::{InvalidItem, Item};
use chrono::TimeDelta;

/// What an item does on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Growth {
    /// The item never transitions by itself.
    Terminal,
    /// The item becomes `into` once `after` has elapsed.
    Matures { into: Item, after: TimeDelta },
}

impl Growth {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Growth::Terminal)
    }
}

/// Look up the successor and maturation delay of `item`.
pub fn next_state(item: Item) -> Growth {
    match item {
        Item::CarrotSeed => Growth::Matures {
            into: Item::Carrot,
            after: TimeDelta::seconds(10),
        },
        Item::TomatoSeed => Growth::Matures {
            into: Item::TomatoSprout,
            after: TimeDelta::seconds(30),
        },
        Item::TomatoSprout => Growth::Matures {
            into: Item::Tomato,
            after: TimeDelta::seconds(60),
        },
        Item::None | Item::Carrot | Item::Tomato => Growth::Terminal,
    }
}

/// Same as [`next_state`], for a raw item code.
pub fn next_state_of_code(code: i64) -> Result<Growth, InvalidItem> {
    Item::from_code(code).map(next_state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_carrot_seed_matures_in_ten_seconds() {
        assert_eq!(
            next_state(Item::CarrotSeed),
            Growth::Matures {
                into: Item::Carrot,
                after: TimeDelta::seconds(10)
            }
        );
    }

    #[test]
    fn test_empty_and_produce_are_terminal() {
        assert!(next_state(Item::None).is_terminal());
        assert!(next_state(Item::Carrot).is_terminal());
        assert!(next_state(Item::Tomato).is_terminal());
    }

    #[test]
    fn test_growing_items_match_table() {
        let growing: Vec<Item> = Item::ALL.into_iter().filter(|i| i.is_growing()).collect();
        assert_eq!(
            growing,
            vec![Item::CarrotSeed, Item::TomatoSeed, Item::TomatoSprout]
        );
    }

    #[test]
    fn test_every_delay_is_positive() {
        for item in Item::ALL {
            if let Growth::Matures { after, .. } = next_state(item) {
                assert!(after > TimeDelta::zero(), "{item} has non-positive delay");
            }
        }
    }

    #[test]
    fn test_unknown_code_is_an_error() {
        assert_eq!(next_state_of_code(99), Err(InvalidItem(99)));
        assert!(next_state_of_code(0).unwrap().is_terminal());
    }
}
