//! JSON wire shapes.
//!
//! Items travel as their integer codes and transition instants as epoch
//! seconds; zero values are omitted.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tillage_core::{Player, Registered};
use tillage_flow::Plot;

fn is_zero(v: &i64) -> bool {
    *v == 0
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotBody {
    pub id: u8,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub item: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub transition: i64,
}

impl From<&Plot> for PlotBody {
    fn from(plot: &Plot) -> Self {
        Self {
            id: plot.id.index(),
            item: plot.item.code(),
            transition: plot.transition_epoch(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerBody {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub plots: BTreeMap<u8, PlotBody>,
    /// Present only in a registration response, when the server generated it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,
}

impl From<&Player> for PlayerBody {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id,
            name: player.name.clone(),
            plots: player
                .plots
                .iter()
                .map(|p| (p.id.index(), PlotBody::from(p)))
                .collect(),
            auth: None,
        }
    }
}

impl From<Registered> for PlayerBody {
    fn from(registered: Registered) -> Self {
        Self {
            id: registered.id,
            name: registered.name,
            plots: BTreeMap::new(),
            auth: registered.generated_auth,
        }
    }
}

/// `POST /players`
#[derive(Debug, Clone, Deserialize)]
pub struct NewPlayerBody {
    pub name: String,
    #[serde(default)]
    pub auth: Option<String>,
}

/// `PUT /players/{player}/plots/{plot}`
///
/// Other plot fields (`id`, `transition`) are accepted and ignored. A missing
/// `item` means `none`, so an empty plot as returned by `GET` clears a plot.
#[derive(Debug, Clone, Deserialize)]
pub struct PlantBody {
    #[serde(default)]
    pub item: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tillage_flow::{Item, PlotId};

    #[test]
    fn test_empty_plot_omits_zero_fields() {
        let plot = Plot::empty(PlotId::new(3).unwrap());
        assert_eq!(
            serde_json::to_value(PlotBody::from(&plot)).unwrap(),
            json!({ "id": 3 })
        );
    }

    #[test]
    fn test_registered_player_shape() {
        let body = PlayerBody::from(Registered {
            id: 1,
            name: "foo".into(),
            generated_auth: None,
        });
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({ "id": 1, "name": "foo" })
        );
    }

    #[test]
    fn test_plant_body_ignores_extra_fields() {
        let body: PlantBody =
            serde_json::from_value(json!({ "id": 5, "item": 1, "transition": 0 })).unwrap();
        assert_eq!(body.item, Item::CarrotSeed.code());
    }

    #[test]
    fn test_plant_body_without_item_is_none() {
        let body: PlantBody = serde_json::from_value(json!({ "id": 5 })).unwrap();
        assert_eq!(body.item, Item::None.code());
    }
}
