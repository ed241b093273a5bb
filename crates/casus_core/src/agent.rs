//! Civilization read model.
//!
//! Agents and cities are owned by the host simulation. The engine only reads
//! them, apart from the bookkeeping in [`Agent::record_war_declared`] and
//! [`Agent::record_war_received`] that a host applies after a decision.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::math::{fixed_serde, Fixed};

/// Simulation turn counter.
pub type Turn = u32;

/// Unique identifier for a civilization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CivId(pub u32);

impl fmt::Display for CivId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "civ#{}", self.0)
    }
}

/// A city owned by exactly one civilization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct City {
    /// Display name.
    pub name: String,

    /// Garrison and wall strength (non-negative).
    #[serde(with = "fixed_serde")]
    pub defense_strength: Fixed,
}

impl City {
    /// Create a new city.
    #[must_use]
    pub fn new(name: impl Into<String>, defense_strength: Fixed) -> Self {
        Self {
            name: name.into(),
            defense_strength,
        }
    }
}

/// Opinion one civilization holds of another. Higher is friendlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation {
    /// The civilization the opinion is about.
    pub civ: CivId,

    /// Opinion value.
    #[serde(with = "fixed_serde")]
    pub value: Fixed,
}

/// A civilization as seen by the decision engine.
///
/// # Example RON
///
/// ```ron
/// Agent(
///     id: 1,
///     name: "Aurelia",
///     military_strength: 100,
///     gold_per_turn: 12.5,
///     production_total: 30,
///     cities: [City(name: "Aurum", defense_strength: 20)],
///     active_wars: [],
///     last_war_turn: Some(4),
///     relations: [Relation(civ: 2, value: -10)],
///     allies: [3],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Agent {
    /// Civilization identifier.
    pub id: CivId,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Total military strength (non-negative).
    #[serde(with = "fixed_serde")]
    pub military_strength: Fixed,

    /// Net gold income per turn. May be negative.
    #[serde(with = "fixed_serde")]
    pub gold_per_turn: Fixed,

    /// Total production output per turn.
    #[serde(with = "fixed_serde")]
    pub production_total: Fixed,

    /// Cities owned by this civilization.
    #[serde(default)]
    pub cities: Vec<City>,

    /// Civilizations this one is currently at war with.
    #[serde(default)]
    pub active_wars: Vec<CivId>,

    /// Turn of the last war this civilization declared (`None` if never).
    #[serde(default)]
    pub last_war_turn: Option<Turn>,

    /// Opinions of other civilizations. Missing entries are neutral.
    #[serde(default)]
    pub relations: Vec<Relation>,

    /// Allied civilizations.
    #[serde(default)]
    pub allies: Vec<CivId>,
}

impl Agent {
    /// Create an agent with no strength, economy, cities or relations.
    #[must_use]
    pub fn new(id: CivId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            military_strength: Fixed::ZERO,
            gold_per_turn: Fixed::ZERO,
            production_total: Fixed::ZERO,
            cities: Vec::new(),
            active_wars: Vec::new(),
            last_war_turn: None,
            relations: Vec::new(),
            allies: Vec::new(),
        }
    }

    /// Opinion of `other`, neutral (zero) when no relation is recorded.
    #[must_use]
    pub fn relation_with(&self, other: CivId) -> Fixed {
        self.relations
            .iter()
            .find(|r| r.civ == other)
            .map_or(Fixed::ZERO, |r| r.value)
    }

    /// Set the opinion of `other`, replacing any previous value.
    pub fn set_relation(&mut self, other: CivId, value: Fixed) {
        match self.relations.iter_mut().find(|r| r.civ == other) {
            Some(relation) => relation.value = value,
            None => self.relations.push(Relation { civ: other, value }),
        }
    }

    /// Check if this civilization is at war with `other`.
    #[must_use]
    pub fn is_at_war_with(&self, other: CivId) -> bool {
        self.active_wars.contains(&other)
    }

    /// Check if this civilization is allied with `other`.
    #[must_use]
    pub fn is_allied_with(&self, other: CivId) -> bool {
        self.allies.contains(&other)
    }

    /// Record that this civilization declared war on `target` at `turn`.
    pub fn record_war_declared(&mut self, target: CivId, turn: Turn) {
        if !self.is_at_war_with(target) {
            self.active_wars.push(target);
        }
        self.last_war_turn = Some(turn);
    }

    /// Record that `attacker` declared war on this civilization.
    ///
    /// Does not touch `last_war_turn`; being attacked is not a declaration.
    pub fn record_war_received(&mut self, attacker: CivId) {
        if !self.is_at_war_with(attacker) {
            self.active_wars.push(attacker);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_defaults_to_neutral() {
        let agent = Agent::new(CivId(1), "Aurelia");
        assert_eq!(agent.relation_with(CivId(2)), Fixed::ZERO);
    }

    #[test]
    fn test_set_relation_replaces() {
        let mut agent = Agent::new(CivId(1), "Aurelia");
        agent.set_relation(CivId(2), Fixed::from_num(10));
        agent.set_relation(CivId(2), Fixed::from_num(-5));

        assert_eq!(agent.relations.len(), 1);
        assert_eq!(agent.relation_with(CivId(2)), Fixed::from_num(-5));
    }

    #[test]
    fn test_record_war_declared() {
        let mut agent = Agent::new(CivId(1), "Aurelia");
        agent.record_war_declared(CivId(2), 7);
        agent.record_war_declared(CivId(2), 9);

        assert_eq!(agent.active_wars, vec![CivId(2)]);
        assert_eq!(agent.last_war_turn, Some(9));
        assert!(agent.is_at_war_with(CivId(2)));
    }

    #[test]
    fn test_record_war_received_keeps_cooldown() {
        let mut agent = Agent::new(CivId(2), "Borealis");
        agent.record_war_received(CivId(1));

        assert!(agent.is_at_war_with(CivId(1)));
        assert_eq!(agent.last_war_turn, None);
    }

    #[test]
    fn test_agent_from_ron() {
        let agent: Agent = ron::from_str(
            r#"Agent(
                id: 1,
                name: "Aurelia",
                military_strength: 100,
                gold_per_turn: 12.5,
                production_total: "30",
                cities: [City(name: "Aurum", defense_strength: 20)],
                allies: [3],
            )"#,
        )
        .unwrap();

        assert_eq!(agent.id, CivId(1));
        assert_eq!(agent.gold_per_turn, Fixed::from_num(12.5));
        assert_eq!(agent.cities.len(), 1);
        assert!(agent.is_allied_with(CivId(3)));
        assert_eq!(agent.last_war_turn, None);
    }
}
