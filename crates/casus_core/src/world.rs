//! Immutable world snapshot for one decision turn.
//!
//! The host copies the relevant parts of its world model into a
//! [`WorldSnapshot`] once per turn. Decisions for any number of
//! civilizations can then run over shared `&WorldSnapshot` references,
//! including from several threads at once, without racing the simulation.
//! Declarations collected in a [`WarLedger`] are applied afterwards with
//! [`WorldSnapshot::apply_declarations`].
//!
//! The snapshot also serves as the default [`MetricProvider`]: borders,
//! garrisons, capitals and terrain are plain tables here.

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::agent::{Agent, CivId, Turn};
use crate::decision::{Decision, DecisionEngine, WarDeclaration, WarDeclarer, WarLedger};
use crate::error::{CasusError, Result};
use crate::math::{fixed_serde, Fixed, Vec2Fixed};
use crate::metrics::{MetricProvider, TileId};
use crate::params::ScoringParameters;

/// Tiles where two civilizations' territories meet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BorderRegion {
    /// One side of the border.
    pub a: CivId,
    /// The other side of the border.
    pub b: CivId,
    /// Border tiles.
    pub tiles: Vec<TileId>,
}

impl BorderRegion {
    fn separates(&self, x: CivId, y: CivId) -> bool {
        (self.a == x && self.b == y) || (self.a == y && self.b == x)
    }
}

/// Military power a civilization has stationed on a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Garrison {
    /// Owning civilization.
    pub owner: CivId,
    /// Tile the units stand on.
    pub tile: TileId,
    /// Combined strength of the units.
    #[serde(with = "fixed_serde")]
    pub power: Fixed,
}

/// Location of a civilization's capital.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Capital {
    /// Owning civilization.
    pub civ: CivId,
    /// Map position.
    pub position: Vec2Fixed,
}

/// Terrain favorability for one attacker against one defender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TerrainEdge {
    /// Attacking civilization.
    pub attacker: CivId,
    /// Defending civilization.
    pub defender: CivId,
    /// Favorability multiplier, 1.0 being neutral.
    #[serde(with = "fixed_serde")]
    pub advantage: Fixed,
}

/// Everything the engine reads about the world for one turn.
///
/// # Example RON
///
/// ```ron
/// WorldSnapshot(
///     turn: 42,
///     agents: [
///         Agent(id: 1, name: "Aurelia", military_strength: 100, gold_per_turn: 10, production_total: 10),
///         Agent(id: 2, name: "Borealis", military_strength: 50, gold_per_turn: 10, production_total: 10),
///     ],
///     borders: [BorderRegion(a: 1, b: 2, tiles: [10, 11])],
///     garrisons: [Garrison(owner: 1, tile: 10, power: 6)],
///     capitals: [
///         Capital(civ: 1, position: (x: 0, y: 0)),
///         Capital(civ: 2, position: (x: 30, y: 40)),
///     ],
///     terrain: [TerrainEdge(attacker: 1, defender: 2, advantage: 1.2)],
/// )
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Turn the snapshot was taken on.
    pub turn: Turn,

    #[serde(with = "agent_list")]
    agents: BTreeMap<CivId, Agent>,

    /// Shared borders between civilization pairs.
    #[serde(default)]
    pub borders: Vec<BorderRegion>,

    /// Stationed military power per tile.
    #[serde(default)]
    pub garrisons: Vec<Garrison>,

    /// Capital positions.
    #[serde(default)]
    pub capitals: Vec<Capital>,

    /// Directed terrain favorability. Missing pairs are neutral.
    #[serde(default)]
    pub terrain: Vec<TerrainEdge>,
}

impl WorldSnapshot {
    /// Create an empty snapshot for `turn`.
    #[must_use]
    pub fn new(turn: Turn) -> Self {
        Self {
            turn,
            ..Self::default()
        }
    }

    /// Add an agent.
    ///
    /// # Errors
    ///
    /// Returns an error if an agent with the same id is already present.
    pub fn insert_agent(&mut self, agent: Agent) -> Result<()> {
        if self.agents.contains_key(&agent.id) {
            return Err(CasusError::InvalidState(format!(
                "duplicate civilization {}",
                agent.id
            )));
        }
        self.agents.insert(agent.id, agent);
        Ok(())
    }

    /// Look up an agent.
    ///
    /// # Errors
    ///
    /// Returns [`CasusError::UnknownCiv`] if the id is not present.
    pub fn agent(&self, id: CivId) -> Result<&Agent> {
        self.agents.get(&id).ok_or(CasusError::UnknownCiv(id))
    }

    /// All agents in id order.
    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    /// Number of agents.
    #[must_use]
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Civilizations `civ` could declare war on: every other agent it is not
    /// already fighting, in id order.
    ///
    /// # Errors
    ///
    /// Returns [`CasusError::UnknownCiv`] if `civ` is not present.
    pub fn candidates_for(&self, civ: CivId) -> Result<Vec<&Agent>> {
        let us = self.agent(civ)?;
        Ok(self
            .agents
            .values()
            .filter(|other| other.id != civ && !us.is_at_war_with(other.id))
            .collect())
    }

    /// Run a decision for `civ` against [`Self::candidates_for`].
    ///
    /// # Errors
    ///
    /// Returns [`CasusError::UnknownCiv`] if `civ` is not present.
    pub fn decide_for<D>(
        &self,
        civ: CivId,
        params: &ScoringParameters,
        declarer: &mut D,
    ) -> Result<Decision>
    where
        D: WarDeclarer + ?Sized,
    {
        let us = self.agent(civ)?;
        let candidates = self.candidates_for(civ)?;
        let engine = DecisionEngine::new(params, self, self.turn);
        Ok(engine.decide(us, candidates, declarer))
    }

    /// Run a decision for every civilization, in id order, against this
    /// same snapshot.
    ///
    /// Earlier declarations do not influence later decisions; apply the
    /// returned ledger to the next turn's snapshot.
    #[must_use]
    pub fn decide_all(&self, params: &ScoringParameters) -> (Vec<Decision>, WarLedger) {
        let mut ledger = WarLedger::new(self.turn);
        let engine = DecisionEngine::new(params, self, self.turn);

        let decisions = self
            .agents
            .values()
            .map(|us| {
                let candidates = self
                    .agents
                    .values()
                    .filter(|other| other.id != us.id && !us.is_at_war_with(other.id));
                engine.decide(us, candidates, &mut ledger)
            })
            .collect();

        (decisions, ledger)
    }

    /// Apply recorded declarations to the agents in this snapshot.
    ///
    /// All declarations are checked before any agent is modified.
    ///
    /// # Errors
    ///
    /// Returns [`CasusError::UnknownCiv`] if a declaration names a missing
    /// civilization.
    pub fn apply_declarations(&mut self, declarations: &[WarDeclaration]) -> Result<()> {
        for declaration in declarations {
            self.agent(declaration.attacker)?;
            self.agent(declaration.target)?;
        }

        for declaration in declarations {
            if let Some(attacker) = self.agents.get_mut(&declaration.attacker) {
                attacker.record_war_declared(declaration.target, declaration.turn);
            }
            if let Some(target) = self.agents.get_mut(&declaration.target) {
                target.record_war_received(declaration.attacker);
            }
        }

        Ok(())
    }

    /// Compute a hash of the snapshot.
    ///
    /// Agents are hashed in id order, so equal snapshots hash equally.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }

    /// Serialize the snapshot to bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| CasusError::InvalidState(format!("Failed to serialize snapshot: {e}")))
    }

    /// Deserialize a snapshot from bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data)
            .map_err(|e| CasusError::InvalidState(format!("Failed to deserialize snapshot: {e}")))
    }
}

impl MetricProvider for WorldSnapshot {
    fn shared_border_tiles(&self, us: &Agent, them: &Agent) -> Vec<TileId> {
        let mut tiles: Vec<TileId> = self
            .borders
            .iter()
            .filter(|region| region.separates(us.id, them.id))
            .flat_map(|region| region.tiles.iter().copied())
            .collect();
        tiles.sort_unstable();
        tiles.dedup();
        tiles
    }

    fn power_in_region(&self, agent: &Agent, tiles: &[TileId]) -> Fixed {
        self.garrisons
            .iter()
            .filter(|g| g.owner == agent.id && tiles.contains(&g.tile))
            .fold(Fixed::ZERO, |sum, g| {
                sum.saturating_add(g.power.max(Fixed::ZERO))
            })
    }

    fn capital_distance(&self, us: &Agent, them: &Agent) -> Fixed {
        let ours = self.capitals.iter().find(|c| c.civ == us.id);
        let theirs = self.capitals.iter().find(|c| c.civ == them.id);
        match (ours, theirs) {
            (Some(ours), Some(theirs)) => ours.position.distance(theirs.position),
            _ => Fixed::ZERO,
        }
    }

    fn terrain_advantage(&self, us: &Agent, them: &Agent) -> Fixed {
        self.terrain
            .iter()
            .find(|edge| edge.attacker == us.id && edge.defender == them.id)
            .map_or(Fixed::ONE, |edge| edge.advantage.max(Fixed::ZERO))
    }
}

/// Serializes the agent map as a plain list, rejecting duplicate ids.
mod agent_list {
    use std::collections::BTreeMap;

    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::agent::{Agent, CivId};

    pub fn serialize<S>(agents: &BTreeMap<CivId, Agent>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(agents.values())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<CivId, Agent>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let list = Vec::<Agent>::deserialize(deserializer)?;
        let mut agents = BTreeMap::new();
        for agent in list {
            let id = agent.id;
            if agents.insert(id, agent).is_some() {
                return Err(D::Error::custom(format!("duplicate civilization {id}")));
            }
        }
        Ok(agents)
    }
}
