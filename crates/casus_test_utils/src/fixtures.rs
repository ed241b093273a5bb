//! Test fixtures and helpers.
//!
//! Builders for agents and world snapshots, plus the canned scenarios the
//! decision engine is expected to handle.

use casus_core::agent::{Agent, City, CivId, Turn};
use casus_core::math::{ratio, Vec2Fixed};
use casus_core::metrics::TileId;
use casus_core::params::ScoringParameters;
use casus_core::world::{BorderRegion, Capital, Garrison, TerrainEdge, WorldSnapshot};
use fixed::types::I32F32;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In engine code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// Builder for [`Agent`] fixtures.
///
/// ```ignore
/// let us = AgentBuilder::new(1).strength(100).economy(10, 10).build();
/// ```
#[derive(Debug, Clone)]
pub struct AgentBuilder {
    agent: Agent,
}

impl AgentBuilder {
    /// Start an agent named after its id with everything else zeroed.
    #[must_use]
    pub fn new(id: u32) -> Self {
        Self {
            agent: Agent::new(CivId(id), format!("civ {id}")),
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn name(mut self, name: &str) -> Self {
        self.agent.name = name.to_string();
        self
    }

    /// Set military strength.
    #[must_use]
    pub fn strength(mut self, strength: i32) -> Self {
        self.agent.military_strength = fixed(strength);
        self
    }

    /// Set gold per turn and production total.
    #[must_use]
    pub fn economy(mut self, gold: i32, production: i32) -> Self {
        self.agent.gold_per_turn = fixed(gold);
        self.agent.production_total = fixed(production);
        self
    }

    /// Add a city with the given defense.
    #[must_use]
    pub fn city(mut self, name: &str, defense: i32) -> Self {
        self.agent.cities.push(City::new(name, fixed(defense)));
        self
    }

    /// Add an active war.
    #[must_use]
    pub fn at_war_with(mut self, civ: u32) -> Self {
        self.agent.active_wars.push(CivId(civ));
        self
    }

    /// Set the turn of the last declared war.
    #[must_use]
    pub fn last_war(mut self, turn: Turn) -> Self {
        self.agent.last_war_turn = Some(turn);
        self
    }

    /// Set the opinion of `civ`.
    #[must_use]
    pub fn relation(mut self, civ: u32, value: i32) -> Self {
        self.agent.set_relation(CivId(civ), fixed(value));
        self
    }

    /// Add an ally.
    #[must_use]
    pub fn ally(mut self, civ: u32) -> Self {
        self.agent.allies.push(CivId(civ));
        self
    }

    /// Finish the agent.
    #[must_use]
    pub fn build(self) -> Agent {
        self.agent
    }
}

/// Builder for [`WorldSnapshot`] fixtures.
#[derive(Debug, Clone, Default)]
pub struct WorldBuilder {
    world: WorldSnapshot,
    agents: Vec<Agent>,
}

impl WorldBuilder {
    /// Start an empty world on `turn`.
    #[must_use]
    pub fn new(turn: Turn) -> Self {
        Self {
            world: WorldSnapshot::new(turn),
            agents: Vec::new(),
        }
    }

    /// Add an agent.
    #[must_use]
    pub fn agent(mut self, agent: Agent) -> Self {
        self.agents.push(agent);
        self
    }

    /// Add a shared border between `a` and `b`.
    #[must_use]
    pub fn border(mut self, a: u32, b: u32, tiles: &[u32]) -> Self {
        self.world.borders.push(BorderRegion {
            a: CivId(a),
            b: CivId(b),
            tiles: tiles.iter().copied().map(TileId).collect(),
        });
        self
    }

    /// Station `power` worth of units owned by `owner` on `tile`.
    #[must_use]
    pub fn garrison(mut self, owner: u32, tile: u32, power: i32) -> Self {
        self.world.garrisons.push(Garrison {
            owner: CivId(owner),
            tile: TileId(tile),
            power: fixed(power),
        });
        self
    }

    /// Place `civ`'s capital at (`x`, `y`).
    #[must_use]
    pub fn capital(mut self, civ: u32, x: i32, y: i32) -> Self {
        self.world.capitals.push(Capital {
            civ: CivId(civ),
            position: Vec2Fixed::new(fixed(x), fixed(y)),
        });
        self
    }

    /// Set the terrain favorability for `attacker` against `defender`.
    #[must_use]
    pub fn terrain(mut self, attacker: u32, defender: u32, advantage: I32F32) -> Self {
        self.world.terrain.push(TerrainEdge {
            attacker: CivId(attacker),
            defender: CivId(defender),
            advantage,
        });
        self
    }

    /// Finish the world.
    ///
    /// # Panics
    ///
    /// Panics if two agents share an id.
    #[must_use]
    pub fn build(self) -> WorldSnapshot {
        let mut world = self.world;
        for agent in self.agents {
            let id = agent.id;
            if let Err(e) = world.insert_agent(agent) {
                panic!("invalid fixture world, civ {id}: {e}");
            }
        }
        world
    }
}

/// Parse a world snapshot from RON.
///
/// # Panics
///
/// Panics if the RON does not describe a valid snapshot.
#[must_use]
pub fn world_from_ron(source: &str) -> WorldSnapshot {
    match ron::from_str(source) {
        Ok(world) => world,
        Err(e) => panic!("invalid fixture RON: {e}"),
    }
}

/// A strong attacker against a weaker neighbour with equal economy, zero
/// distance, neutral terrain and no diplomacy in play.
///
/// Returns `(us, them)`. With default parameters this declares war.
#[must_use]
pub fn favorable_war() -> (Agent, Agent) {
    let us = AgentBuilder::new(1)
        .name("Aurelia")
        .strength(100)
        .economy(10, 10)
        .build();
    let them = AgentBuilder::new(2)
        .name("Borealis")
        .strength(50)
        .economy(10, 10)
        .build();
    (us, them)
}

/// [`favorable_war`] with the attacker already fighting
/// `params.max_simultaneous_wars` wars.
#[must_use]
pub fn at_war_cap(params: &ScoringParameters) -> (Agent, Agent) {
    let (mut us, them) = favorable_war();
    us.active_wars = (0..params.max_simultaneous_wars)
        .map(|i| CivId(100 + i))
        .collect();
    (us, them)
}

/// [`favorable_war`] with the attacker friendly towards the target, one
/// point above `params.ally_evaluation_threshold`.
#[must_use]
pub fn friendly_neighbour(params: &ScoringParameters) -> (Agent, Agent) {
    let (mut us, them) = favorable_war();
    us.set_relation(
        them.id,
        params.ally_evaluation_threshold + I32F32::ONE,
    );
    (us, them)
}

/// Parameters that make the score equal to the terrain advantage.
#[must_use]
pub fn terrain_only_params() -> ScoringParameters {
    ScoringParameters {
        military_weight: I32F32::ZERO,
        economic_weight: I32F32::ZERO,
        geographic_weight: I32F32::ONE,
        ..ScoringParameters::default()
    }
}

/// Civilization 1 facing candidates 2, 3 and 4, scored 0.70, 0.90 and
/// 0.90 under [`terrain_only_params`]. The best target is civilization 3.
#[must_use]
pub fn tied_candidates() -> WorldSnapshot {
    let mut builder = WorldBuilder::new(50);
    for id in 1..=4 {
        builder = builder.agent(AgentBuilder::new(id).strength(100).economy(10, 10).build());
    }
    builder
        .terrain(1, 2, ratio(7, 10))
        .terrain(1, 3, ratio(9, 10))
        .terrain(1, 4, ratio(9, 10))
        .build()
}

/// Sixteen civilizations on a four by four grid.
///
/// Neighbours share a border with garrisons on both sides, strengths and
/// economies vary by position, and a few alliances and wars are in place.
#[must_use]
pub fn sixteen_civ_world() -> WorldSnapshot {
    const SIDE: u32 = 4;
    let id_at = |row: u32, col: u32| row * SIDE + col + 1;

    let mut builder = WorldBuilder::new(120);
    for row in 0..SIDE {
        for col in 0..SIDE {
            let id = id_at(row, col);
            let spread = i32::try_from((id * 37) % 11).unwrap_or(0);
            let mut agent = AgentBuilder::new(id)
                .strength(40 + spread * 15)
                .economy(5 + spread, 20 - spread)
                .city("capital", 10 + spread * 3)
                .city("outpost", 5 + spread);
            if id % 5 == 0 {
                agent = agent.ally(id - 1);
            }
            if id % 7 == 0 {
                agent = agent.last_war(115);
            }
            builder = builder
                .agent(agent.build())
                .capital(id, i32::try_from(col * 20).unwrap_or(0), i32::try_from(row * 20).unwrap_or(0));
        }
    }

    let mut tile = 0;
    for row in 0..SIDE {
        for col in 0..SIDE {
            let id = id_at(row, col);
            let neighbours = [
                (col + 1 < SIDE).then(|| id_at(row, col + 1)),
                (row + 1 < SIDE).then(|| id_at(row + 1, col)),
            ];
            for other in neighbours.into_iter().flatten() {
                builder = builder
                    .border(id, other, &[tile, tile + 1])
                    .garrison(id, tile, 2 + i32::try_from(id % 3).unwrap_or(0))
                    .garrison(other, tile + 1, 2 + i32::try_from(other % 4).unwrap_or(0));
                tile += 2;
            }
        }
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_builder() {
        let agent = AgentBuilder::new(7)
            .strength(30)
            .economy(4, 6)
            .city("Keep", 12)
            .at_war_with(2)
            .last_war(9)
            .relation(3, 60)
            .ally(4)
            .build();

        assert_eq!(agent.id, CivId(7));
        assert_eq!(agent.military_strength, fixed(30));
        assert_eq!(agent.cities.len(), 1);
        assert!(agent.is_at_war_with(CivId(2)));
        assert_eq!(agent.last_war_turn, Some(9));
        assert_eq!(agent.relation_with(CivId(3)), fixed(60));
        assert!(agent.is_allied_with(CivId(4)));
    }

    #[test]
    fn test_sixteen_civ_world_shape() {
        let world = sixteen_civ_world();
        assert_eq!(world.agent_count(), 16);
        // 4 × 3 horizontal plus 3 × 4 vertical neighbour pairs.
        assert_eq!(world.borders.len(), 24);
        assert_eq!(world.capitals.len(), 16);
    }

    #[test]
    fn test_world_from_ron() {
        let world = world_from_ron(
            "(turn: 3, agents: [(id: 1, military_strength: 5, gold_per_turn: 0, production_total: 0)])",
        );
        assert_eq!(world.turn, 3);
        assert_eq!(world.agent_count(), 1);
    }
}
