//! Decision entry point: select a target and declare war on it.
//!
//! [`DecisionEngine`] wires the scoring pipeline together for one turn. The
//! only side effect is a single call to [`WarDeclarer::declare_war`] when a
//! target is chosen; the host decides how to apply it to its world state.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::agent::{Agent, CivId, Turn};
use crate::gate::WarGate;
use crate::math::{option_fixed_serde, Fixed};
use crate::metrics::MetricProvider;
use crate::params::ScoringParameters;
use crate::scoring::ScoreCalculator;
use crate::selector::TargetSelector;

/// Receives war declarations produced by a decision.
pub trait WarDeclarer {
    /// `attacker` declares war on `target`.
    fn declare_war(&mut self, attacker: &Agent, target: &Agent);
}

impl<F> WarDeclarer for F
where
    F: FnMut(&Agent, &Agent),
{
    fn declare_war(&mut self, attacker: &Agent, target: &Agent) {
        self(attacker, target);
    }
}

/// Outcome of one decision call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Decision {
    /// Civilization that deliberated.
    pub attacker: CivId,
    /// Whether war was declared.
    pub declare: bool,
    /// Target of the declaration.
    pub target: Option<CivId>,
    /// Score of the chosen target.
    #[serde(with = "option_fixed_serde")]
    pub score: Option<Fixed>,
}

impl Decision {
    /// No war this turn.
    #[must_use]
    pub const fn hold(attacker: CivId) -> Self {
        Self {
            attacker,
            declare: false,
            target: None,
            score: None,
        }
    }

    /// War declared on `target`.
    #[must_use]
    pub const fn war(attacker: CivId, target: CivId, score: Fixed) -> Self {
        Self {
            attacker,
            declare: true,
            target: Some(target),
            score: Some(score),
        }
    }
}

/// A recorded declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WarDeclaration {
    /// Declaring civilization.
    pub attacker: CivId,
    /// Civilization declared upon.
    pub target: CivId,
    /// Turn of the declaration.
    pub turn: Turn,
}

/// A [`WarDeclarer`] that records declarations for later application.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WarLedger {
    turn: Turn,
    declarations: Vec<WarDeclaration>,
}

impl WarLedger {
    /// Create an empty ledger stamping declarations with `turn`.
    #[must_use]
    pub const fn new(turn: Turn) -> Self {
        Self {
            turn,
            declarations: Vec::new(),
        }
    }

    /// Recorded declarations, in the order they were made.
    #[must_use]
    pub fn declarations(&self) -> &[WarDeclaration] {
        &self.declarations
    }

    /// Consume the ledger, returning its declarations.
    #[must_use]
    pub fn into_declarations(self) -> Vec<WarDeclaration> {
        self.declarations
    }

    /// Append all declarations from `other`.
    pub fn merge(&mut self, other: Self) {
        self.declarations.extend(other.declarations);
    }

    /// Number of recorded declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    /// Whether nothing has been declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

impl WarDeclarer for WarLedger {
    fn declare_war(&mut self, attacker: &Agent, target: &Agent) {
        self.declarations.push(WarDeclaration {
            attacker: attacker.id,
            target: target.id,
            turn: self.turn,
        });
    }
}

/// The full pipeline for one turn: scoring, gating and target selection.
#[derive(Debug)]
pub struct DecisionEngine<'a, M: ?Sized> {
    selector: TargetSelector<'a, M>,
}

impl<M: ?Sized> Clone for DecisionEngine<'_, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: ?Sized> Copy for DecisionEngine<'_, M> {}

impl<'a, M: MetricProvider + ?Sized> DecisionEngine<'a, M> {
    /// Create an engine evaluating on `current_turn`.
    #[must_use]
    pub const fn new(params: &'a ScoringParameters, metrics: &'a M, current_turn: Turn) -> Self {
        let calculator = ScoreCalculator::new(params, metrics);
        let gate = WarGate::new(calculator, current_turn);
        Self {
            selector: TargetSelector::new(gate),
        }
    }

    /// Score calculator in use.
    #[must_use]
    pub const fn calculator(&self) -> &ScoreCalculator<'a, M> {
        self.selector.gate().calculator()
    }

    /// Gate in use.
    #[must_use]
    pub const fn gate(&self) -> &WarGate<'a, M> {
        self.selector.gate()
    }

    /// Selector in use.
    #[must_use]
    pub const fn selector(&self) -> &TargetSelector<'a, M> {
        &self.selector
    }

    /// Decide whether `us` goes to war and against whom.
    ///
    /// Calls `declarer` at most once.
    pub fn decide<'c, I, D>(&self, us: &Agent, candidates: I, declarer: &mut D) -> Decision
    where
        I: IntoIterator<Item = &'c Agent>,
        D: WarDeclarer + ?Sized,
    {
        match self.selector.select(us, candidates) {
            Some(choice) => {
                info!(
                    attacker = %us.id,
                    target = %choice.target.id,
                    score = %choice.score,
                    turn = self.gate().current_turn(),
                    "declaring war"
                );
                declarer.declare_war(us, choice.target);
                Decision::war(us.id, choice.target.id, choice.score)
            }
            None => {
                debug!(attacker = %us.id, "no eligible war target");
                Decision::hold(us.id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::FlatMetrics;

    fn agent(id: u32, strength: i32) -> Agent {
        let mut agent = Agent::new(CivId(id), format!("civ {id}"));
        agent.military_strength = Fixed::from_num(strength);
        agent.gold_per_turn = Fixed::from_num(10);
        agent.production_total = Fixed::from_num(10);
        agent
    }

    #[test]
    fn test_declares_on_best_target() {
        let params = ScoringParameters::default();
        let engine = DecisionEngine::new(&params, &FlatMetrics, 30);
        let us = agent(1, 100);
        let candidates = [agent(2, 80), agent(3, 60)];
        let mut ledger = WarLedger::new(30);

        let decision = engine.decide(&us, &candidates, &mut ledger);

        assert!(decision.declare);
        assert_eq!(decision.target, Some(CivId(3)));
        assert_eq!(
            ledger.declarations(),
            &[WarDeclaration {
                attacker: CivId(1),
                target: CivId(3),
                turn: 30,
            }]
        );
    }

    #[test]
    fn test_holds_without_candidates() {
        let params = ScoringParameters::default();
        let engine = DecisionEngine::new(&params, &FlatMetrics, 30);
        let us = agent(1, 100);
        let mut ledger = WarLedger::new(30);

        let decision = engine.decide(&us, std::iter::empty(), &mut ledger);

        assert_eq!(decision, Decision::hold(CivId(1)));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_closure_declarer_called_once() {
        let params = ScoringParameters::default();
        let engine = DecisionEngine::new(&params, &FlatMetrics, 30);
        let us = agent(1, 100);
        let candidates = [agent(2, 60), agent(3, 60), agent(4, 70)];

        let mut calls = Vec::new();
        let mut record = |attacker: &Agent, target: &Agent| calls.push((attacker.id, target.id));
        let decision = engine.decide(&us, &candidates, &mut record);

        assert_eq!(decision.target, Some(CivId(2)));
        assert_eq!(calls, vec![(CivId(1), CivId(2))]);
    }

    #[test]
    fn test_decision_json_shape() {
        let decision = Decision::war(CivId(1), CivId(2), Fixed::from_num(1.5));
        let json = serde_json::to_string(&decision).unwrap();
        assert_eq!(
            json,
            r#"{"attacker":1,"declare":true,"target":2,"score":"1.5"}"#
        );

        let hold = serde_json::to_string(&Decision::hold(CivId(4))).unwrap();
        assert_eq!(
            hold,
            r#"{"attacker":4,"declare":false,"target":null,"score":null}"#
        );
    }

    #[test]
    fn test_ledger_merge() {
        let mut first = WarLedger::new(3);
        let us = agent(1, 100);
        let them = agent(2, 10);
        first.declare_war(&us, &them);

        let mut second = WarLedger::new(3);
        second.declare_war(&them, &us);

        first.merge(second);
        assert_eq!(first.len(), 2);
        assert_eq!(first.declarations()[1].attacker, CivId(2));
    }
}
