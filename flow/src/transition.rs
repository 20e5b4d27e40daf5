//! Transition - Plot State Transitions
//!
//! Two transitions move a plot between states:
//! - `Ripen`: implicit, driven by time passing. Resolves the *effective*
//!   plot at an observed instant.
//! - `Sow`: explicit, driven by a write. Overwrites the item and schedules
//!   its maturation from the rule table.
//!
//! Both are pure: the same stored plot and the same instant always yield
//! the same result. Nothing here persists anything.

use crate::item::{InvalidItem, Item};
use crate::plot::Plot;
use crate::rules::{Growth, next_state};
use chrono::{DateTime, SubsecRound, Utc};
use std::convert::Infallible;

/// The core trait for plot state transitions.
///
/// A `Transition<From, To>` defines how to move from state `From` to state `To`.
///
/// # Example
/// ```rust
/// use chrono::DateTime;
/// use tillage_flow::{Plot, PlotId, Ripen, Transition};
///
/// let now = DateTime::from_timestamp(1_600_000_000, 0).unwrap();
/// let plot = Plot::empty(PlotId::new(0).unwrap());
/// let ripening = Ripen::transition(plot, &now).unwrap();
/// assert!(!ripening.advanced);
/// ```
pub trait Transition<From, To> {
    /// Error type for this transition
    type Error;

    /// Context the transition reads from (here: the observed instant)
    type Context;

    /// Perform the state transition
    fn transition(from: From, ctx: &Self::Context) -> Result<To, Self::Error>;
}

/// Result of resolving a plot at an instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ripening {
    pub plot: Plot,
    /// `true` when `plot` differs from the stored record and should be saved.
    pub advanced: bool,
}

/// Resolver: stored plot + observed instant -> effective plot.
pub struct Ripen;

impl Transition<Plot, Ripening> for Ripen {
    type Error = Infallible;
    type Context = DateTime<Utc>;

    fn transition(plot: Plot, now: &Self::Context) -> Result<Ripening, Self::Error> {
        let unchanged = Ripening {
            plot,
            advanced: false,
        };

        let Some(at) = plot.transition_at else {
            return Ok(unchanged);
        };

        let into = match next_state(plot.item) {
            Growth::Matures { into, .. } => into,
            // Terminal items never carry an instant, elapsed or not.
            Growth::Terminal => {
                return Ok(Ripening {
                    plot: Plot {
                        transition_at: None,
                        ..plot
                    },
                    advanced: true,
                });
            }
        };

        // Fires strictly after the instant; whole seconds on both sides.
        if now.timestamp() <= at.timestamp() {
            return Ok(unchanged);
        }

        Ok(Ripening {
            plot: Plot {
                id: plot.id,
                item: into,
                transition_at: schedule(into, *now),
            },
            advanced: true,
        })
    }
}

/// Input of a `Sow` transition.
#[derive(Debug, Clone, Copy)]
pub struct SowRequest {
    pub plot: Plot,
    /// Requested item, as an unvalidated code.
    pub item_code: i64,
}

/// Mutation: overwrite a plot's item and schedule its maturation.
pub struct Sow;

impl Transition<SowRequest, Plot> for Sow {
    type Error = InvalidItem;
    type Context = DateTime<Utc>;

    fn transition(request: SowRequest, now: &Self::Context) -> Result<Plot, Self::Error> {
        let item = Item::from_code(request.item_code)?;
        Ok(Plot {
            id: request.plot.id,
            item,
            transition_at: schedule(item, *now),
        })
    }
}

/// When `item`, placed at `from`, will mature. `None` for terminal items.
fn schedule(item: Item, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match next_state(item) {
        Growth::Terminal => None,
        Growth::Matures { after, .. } => Some(from.trunc_subsecs(0) + after),
    }
}

/// The effective state of `plot` at `now`.
pub fn effective(plot: Plot, now: DateTime<Utc>) -> Ripening {
    match Ripen::transition(plot, &now) {
        Ok(ripening) => ripening,
        Err(never) => match never {},
    }
}

/// Place the item with code `item_code` into `plot` at `now`.
pub fn plant(plot: Plot, item_code: i64, now: DateTime<Utc>) -> Result<Plot, InvalidItem> {
    Sow::transition(SowRequest { plot, item_code }, &now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::PlotId;
    use chrono::TimeDelta;

    const T: i64 = 1_600_000_000;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn plot5() -> Plot {
        Plot::empty(PlotId::new(5).unwrap())
    }

    #[test]
    fn test_empty_plot_never_changes() {
        let plot = plot5();
        for now in [0, 1, T, T + 1_000_000] {
            let r = effective(plot, at(now));
            assert_eq!(r.plot, plot);
            assert!(!r.advanced);
        }
    }

    #[test]
    fn test_plant_schedules_from_rule_table() {
        let planted = plant(plot5(), Item::CarrotSeed.code(), at(T)).unwrap();
        assert_eq!(planted.item, Item::CarrotSeed);
        assert_eq!(planted.transition_epoch(), T + 10);

        let terminal = plant(plot5(), Item::Carrot.code(), at(T)).unwrap();
        assert_eq!(terminal.transition_at, None);
    }

    #[test]
    fn test_plant_rejects_unknown_code() {
        assert_eq!(plant(plot5(), 1234, at(T)), Err(InvalidItem(1234)));
    }

    #[test]
    fn test_plant_truncates_subseconds() {
        let now = at(T) + TimeDelta::milliseconds(750);
        let planted = plant(plot5(), Item::CarrotSeed.code(), now).unwrap();
        assert_eq!(planted.transition_at, Some(at(T + 10)));
    }

    #[test]
    fn test_maturation_boundary_is_strict() {
        let planted = plant(plot5(), Item::CarrotSeed.code(), at(T)).unwrap();

        assert_eq!(effective(planted, at(T)).plot, planted);
        assert_eq!(effective(planted, at(T + 9)).plot, planted);
        assert_eq!(effective(planted, at(T + 10)).plot, planted);
        // Still the same whole second.
        let late_in_second = at(T + 10) + TimeDelta::milliseconds(999);
        assert!(!effective(planted, late_in_second).advanced);

        let matured = effective(planted, at(T + 11));
        assert!(matured.advanced);
        assert_eq!(matured.plot.item, Item::Carrot);
        assert_eq!(matured.plot.transition_at, None);
    }

    #[test]
    fn test_recorded_scenario() {
        let planted = plant(plot5(), Item::CarrotSeed.code(), at(T)).unwrap();
        assert_eq!(planted.transition_epoch(), 1_600_000_010);

        let early = effective(planted, at(T + 1)).plot;
        assert_eq!(early.item, Item::CarrotSeed);
        assert_eq!(early.transition_epoch(), 1_600_000_010);

        let late = effective(planted, at(T + 11)).plot;
        assert_eq!(late.item, Item::Carrot);
        assert_eq!(late.transition_epoch(), 0);
    }

    #[test]
    fn test_effective_is_idempotent() {
        let seeds = [
            plant(plot5(), Item::CarrotSeed.code(), at(T)).unwrap(),
            plant(plot5(), Item::TomatoSeed.code(), at(T)).unwrap(),
            plant(plot5(), Item::TomatoSprout.code(), at(T)).unwrap(),
            plot5(),
        ];
        for plot in seeds {
            for now in [T, T + 10, T + 11, T + 31, T + 500] {
                let once = effective(plot, at(now)).plot;
                let twice = effective(once, at(now));
                assert_eq!(twice.plot, once);
                assert!(!twice.advanced);
            }
        }
    }

    #[test]
    fn test_advances_one_step_per_observation() {
        let planted = plant(plot5(), Item::TomatoSeed.code(), at(T)).unwrap();

        // Both delays (30s + 60s) have long elapsed, yet only one step is taken.
        let first = effective(planted, at(T + 1_000));
        assert!(first.advanced);
        assert_eq!(first.plot.item, Item::TomatoSprout);
        // The sprout is scheduled from the observation instant.
        assert_eq!(first.plot.transition_epoch(), T + 1_000 + 60);

        let second = effective(first.plot, at(T + 1_061));
        assert_eq!(second.plot.item, Item::Tomato);
        assert_eq!(second.plot.transition_at, None);
    }

    #[test]
    fn test_stale_instant_on_terminal_item_is_cleared() {
        let stale = Plot {
            id: PlotId::new(0).unwrap(),
            item: Item::Carrot,
            transition_at: Some(at(T)),
        };
        let r = effective(stale, at(T + 1));
        assert!(r.advanced);
        assert_eq!(r.plot.item, Item::Carrot);
        assert_eq!(r.plot.transition_at, None);
    }

    #[test]
    fn test_future_instant_on_terminal_item_is_cleared_immediately() {
        let stale = Plot {
            id: PlotId::new(0).unwrap(),
            item: Item::Tomato,
            transition_at: Some(at(T + 500)),
        };
        let r = effective(stale, at(T));
        assert!(r.advanced);
        assert_eq!(r.plot.item, Item::Tomato);
        assert_eq!(r.plot.transition_epoch(), 0);

        // Already clean: nothing left to do.
        assert!(!effective(r.plot, at(T)).advanced);
    }
}
