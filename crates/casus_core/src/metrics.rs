//! Numeric providers the scoring pipeline consumes.
//!
//! The host owns the map, the units and the diplomacy bookkeeping; the
//! engine only sees them through [`MetricProvider`]. Every method must be
//! free of side effects and deterministic for a given world state.

use serde::{Deserialize, Serialize};

use crate::agent::{Agent, CivId};
use crate::math::Fixed;

/// Identifier of a map tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileId(pub u32);

/// Read-only metrics for a pair of civilizations.
///
/// The agent-intrinsic metrics default to the fields of [`Agent`]; hosts
/// normally only implement the geographic ones.
pub trait MetricProvider {
    /// Total military strength, never negative.
    fn military_strength(&self, agent: &Agent) -> Fixed {
        agent.military_strength.max(Fixed::ZERO)
    }

    /// Net gold income per turn.
    fn gold_per_turn(&self, agent: &Agent) -> Fixed {
        agent.gold_per_turn
    }

    /// Total production per turn.
    fn production_total(&self, agent: &Agent) -> Fixed {
        agent.production_total
    }

    /// Tiles on the border between `us` and `them`, sorted and unique.
    fn shared_border_tiles(&self, us: &Agent, them: &Agent) -> Vec<TileId>;

    /// Military power `agent` has stationed on `tiles`, never negative.
    fn power_in_region(&self, agent: &Agent, tiles: &[TileId]) -> Fixed;

    /// Distance between the two capitals, never negative.
    fn capital_distance(&self, us: &Agent, them: &Agent) -> Fixed;

    /// Terrain favorability for `us` attacking `them`. 1.0 is neutral.
    fn terrain_advantage(&self, us: &Agent, them: &Agent) -> Fixed;

    /// How friendly `us` is towards `them`.
    fn relation(&self, us: &Agent, them: &Agent) -> Fixed {
        us.relation_with(them.id)
    }

    /// Allies of `agent`.
    fn allies<'a>(&'a self, agent: &'a Agent) -> &'a [CivId] {
        &agent.allies
    }
}

impl<M: MetricProvider + ?Sized> MetricProvider for &M {
    fn military_strength(&self, agent: &Agent) -> Fixed {
        (**self).military_strength(agent)
    }

    fn gold_per_turn(&self, agent: &Agent) -> Fixed {
        (**self).gold_per_turn(agent)
    }

    fn production_total(&self, agent: &Agent) -> Fixed {
        (**self).production_total(agent)
    }

    fn shared_border_tiles(&self, us: &Agent, them: &Agent) -> Vec<TileId> {
        (**self).shared_border_tiles(us, them)
    }

    fn power_in_region(&self, agent: &Agent, tiles: &[TileId]) -> Fixed {
        (**self).power_in_region(agent, tiles)
    }

    fn capital_distance(&self, us: &Agent, them: &Agent) -> Fixed {
        (**self).capital_distance(us, them)
    }

    fn terrain_advantage(&self, us: &Agent, them: &Agent) -> Fixed {
        (**self).terrain_advantage(us, them)
    }

    fn relation(&self, us: &Agent, them: &Agent) -> Fixed {
        (**self).relation(us, them)
    }

    fn allies<'a>(&'a self, agent: &'a Agent) -> &'a [CivId] {
        (**self).allies(agent)
    }
}

/// Metrics for a featureless map.
///
/// No shared borders, co-located capitals and neutral terrain. Useful for
/// hosts without a tile map and for isolating the non-geographic factors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlatMetrics;

impl MetricProvider for FlatMetrics {
    fn shared_border_tiles(&self, _us: &Agent, _them: &Agent) -> Vec<TileId> {
        Vec::new()
    }

    fn power_in_region(&self, _agent: &Agent, _tiles: &[TileId]) -> Fixed {
        Fixed::ZERO
    }

    fn capital_distance(&self, _us: &Agent, _them: &Agent) -> Fixed {
        Fixed::ZERO
    }

    fn terrain_advantage(&self, _us: &Agent, _them: &Agent) -> Fixed {
        Fixed::ONE
    }
}
