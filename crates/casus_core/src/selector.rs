//! Choosing a war target among several candidates.

use crate::agent::Agent;
use crate::gate::{GateVerdict, WarGate};
use crate::math::Fixed;
use crate::metrics::MetricProvider;

/// An eligible candidate and its score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetChoice<'c> {
    /// The chosen target.
    pub target: &'c Agent,
    /// Its desirability score.
    pub score: Fixed,
    /// Position in the candidate sequence.
    pub index: usize,
}

/// Picks the best eligible target from a candidate sequence.
#[derive(Debug)]
pub struct TargetSelector<'a, M: ?Sized> {
    gate: WarGate<'a, M>,
}

impl<M: ?Sized> Clone for TargetSelector<'_, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: ?Sized> Copy for TargetSelector<'_, M> {}

impl<'a, M: MetricProvider + ?Sized> TargetSelector<'a, M> {
    /// Create a selector filtering through `gate`.
    #[must_use]
    pub const fn new(gate: WarGate<'a, M>) -> Self {
        Self { gate }
    }

    /// Gate in use.
    #[must_use]
    pub const fn gate(&self) -> &WarGate<'a, M> {
        &self.gate
    }

    /// Every candidate that passes the gate, in input order.
    pub fn eligible<'c, I>(&self, us: &Agent, candidates: I) -> Vec<TargetChoice<'c>>
    where
        I: IntoIterator<Item = &'c Agent>,
    {
        candidates
            .into_iter()
            .enumerate()
            .filter_map(|(index, target)| self.admit(us, index, target))
            .collect()
    }

    /// The highest-scoring eligible candidate.
    ///
    /// Returns `None` when there are no candidates or none pass the gate.
    /// On equal scores the candidate that appears first wins.
    pub fn select<'c, I>(&self, us: &Agent, candidates: I) -> Option<TargetChoice<'c>>
    where
        I: IntoIterator<Item = &'c Agent>,
    {
        candidates
            .into_iter()
            .enumerate()
            .filter_map(|(index, target)| self.admit(us, index, target))
            .fold(None, |best, choice| match best {
                Some(best) if choice.score <= best.score => Some(best),
                _ => Some(choice),
            })
    }

    fn admit<'c>(&self, us: &Agent, index: usize, target: &'c Agent) -> Option<TargetChoice<'c>> {
        match self.gate.check(us, target) {
            GateVerdict::Eligible { score } => Some(TargetChoice {
                target,
                score,
                index,
            }),
            GateVerdict::Rejected(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::CivId;
    use crate::metrics::FlatMetrics;
    use crate::params::ScoringParameters;
    use crate::scoring::ScoreCalculator;

    fn agent(id: u32, strength: i32) -> Agent {
        let mut agent = Agent::new(CivId(id), format!("civ {id}"));
        agent.military_strength = Fixed::from_num(strength);
        agent.gold_per_turn = Fixed::from_num(10);
        agent.production_total = Fixed::from_num(10);
        agent
    }

    fn selector(params: &ScoringParameters) -> TargetSelector<'_, FlatMetrics> {
        TargetSelector::new(WarGate::new(ScoreCalculator::new(params, &FlatMetrics), 50))
    }

    #[test]
    fn test_empty_candidates() {
        let params = ScoringParameters::default();
        let us = agent(1, 100);
        assert!(selector(&params)
            .select(&us, std::iter::empty::<&Agent>())
            .is_none());
    }

    #[test]
    fn test_all_rejected() {
        let params = ScoringParameters::default();
        let us = agent(1, 100);
        let fortress = agent(2, 900);
        let bastion = agent(3, 700);
        assert!(selector(&params).select(&us, [&fortress, &bastion]).is_none());
    }

    #[test]
    fn test_picks_highest_score() {
        let params = ScoringParameters::default();
        let us = agent(1, 100);
        let strong = agent(2, 80);
        let weak = agent(3, 60);

        let choice = selector(&params).select(&us, [&strong, &weak]).unwrap();
        assert_eq!(choice.target.id, CivId(3));
        assert_eq!(choice.index, 1);
    }

    #[test]
    fn test_tie_keeps_first() {
        let params = ScoringParameters::default();
        let us = agent(1, 100);
        let first = agent(2, 60);
        let second = agent(3, 60);

        let choice = selector(&params).select(&us, [&first, &second]).unwrap();
        assert_eq!(choice.target.id, CivId(2));
        assert_eq!(choice.index, 0);
    }

    #[test]
    fn test_duplicates_score_identically() {
        let params = ScoringParameters::default();
        let us = agent(1, 100);
        let target = agent(2, 60);

        let eligible = selector(&params).eligible(&us, [&target, &target]);
        assert_eq!(eligible.len(), 2);
        assert_eq!(eligible[0].score, eligible[1].score);
        assert_eq!(
            selector(&params).select(&us, [&target, &target]).unwrap().index,
            0
        );
    }

    #[test]
    fn test_rejected_candidates_are_skipped() {
        let params = ScoringParameters::default();
        let us = agent(1, 100);
        let fortress = agent(2, 900);
        let target = agent(3, 60);

        let choice = selector(&params).select(&us, [&fortress, &target]).unwrap();
        assert_eq!(choice.target.id, CivId(3));
        assert_eq!(choice.index, 1);
    }
}
