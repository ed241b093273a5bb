//! Target desirability scoring.
//!
//! The score of an (attacker, target) pair is a weighted sum of three
//! advantage sub-scores, scaled by a diplomatic factor:
//!
//! ```text
//! total = military × Wmil + economic × Weco + geographic × Wgeo
//! final = total × diplomatic
//! ```
//!
//! Sub-scores:
//!
//! ```text
//! military   = ourPower / (theirPower + 0.1) × borderRatio × (1 - fortifiedCityFraction)
//! borderRatio = (ourBorderPower + 0.5) / (theirBorderPower + 0.5) × borderTension
//! economic   = (ourGold + ourProduction) / (theirGold + theirProduction + 1)
//! geographic = 1 / (1 + capitalDistance × 0.1) × terrainAdvantage
//! diplomatic = 0.3 if relation > allyThreshold, else 1 / (1 + allies × 0.2)
//! ```
//!
//! Every division is guarded by an epsilon or saturates to `Fixed::MAX`, so
//! scores are always finite and never negative.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::agent::Agent;
use crate::math::{fixed_serde, ratio, saturating_ratio, Fixed};
use crate::metrics::MetricProvider;
use crate::params::ScoringParameters;

/// Added to the target's strength so a defenseless target never divides by zero.
pub const MILITARY_EPSILON: Fixed = ratio(1, 10);

/// Added to both sides of the border power ratio.
pub const BORDER_EPSILON: Fixed = ratio(1, 2);

/// How quickly desirability falls off with capital distance.
pub const DISTANCE_FALLOFF: Fixed = ratio(1, 10);

/// Diplomatic factor applied to targets we are friendly with.
pub const CAPPED_DIPLOMATIC_FACTOR: Fixed = ratio(3, 10);

/// Penalty per ally of the target.
pub const ALLY_PENALTY: Fixed = ratio(1, 5);

/// Outcome of the diplomatic evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiplomaticFactor {
    /// Relation is above the ally threshold; the factor is fixed at 0.3 and
    /// the target's alliances are not considered.
    Capped,
    /// Factor derived from the number of the target's allies, in (0, 1].
    Computed(#[serde(with = "fixed_serde")] Fixed),
}

impl DiplomaticFactor {
    /// Numeric multiplier.
    #[must_use]
    pub const fn value(self) -> Fixed {
        match self {
            Self::Capped => CAPPED_DIPLOMATIC_FACTOR,
            Self::Computed(value) => value,
        }
    }

    /// Whether the friendly-relation cap applied.
    #[must_use]
    pub const fn is_capped(self) -> bool {
        matches!(self, Self::Capped)
    }
}

/// Every intermediate value of one target evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Military advantage sub-score.
    #[serde(with = "fixed_serde")]
    pub military: Fixed,
    /// Economic advantage sub-score.
    #[serde(with = "fixed_serde")]
    pub economic: Fixed,
    /// Geographic advantage sub-score.
    #[serde(with = "fixed_serde")]
    pub geographic: Fixed,
    /// Diplomatic multiplier.
    pub diplomatic: DiplomaticFactor,
    /// Weighted sum before the diplomatic multiplier.
    #[serde(with = "fixed_serde")]
    pub total: Fixed,
    /// Final desirability score.
    #[serde(with = "fixed_serde")]
    pub final_score: Fixed,
}

/// Computes target desirability from metrics and parameters.
#[derive(Debug)]
pub struct ScoreCalculator<'a, M: ?Sized> {
    params: &'a ScoringParameters,
    metrics: &'a M,
}

impl<M: ?Sized> Clone for ScoreCalculator<'_, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: ?Sized> Copy for ScoreCalculator<'_, M> {}

impl<'a, M: MetricProvider + ?Sized> ScoreCalculator<'a, M> {
    /// Create a calculator over the given parameters and metrics.
    #[must_use]
    pub const fn new(params: &'a ScoringParameters, metrics: &'a M) -> Self {
        Self { params, metrics }
    }

    /// Parameters in use.
    #[must_use]
    pub const fn params(&self) -> &'a ScoringParameters {
        self.params
    }

    /// Metrics in use.
    #[must_use]
    pub const fn metrics(&self) -> &'a M {
        self.metrics
    }

    /// Desirability of attacking `them`.
    #[must_use]
    pub fn evaluate_target(&self, us: &Agent, them: &Agent) -> Fixed {
        self.breakdown(us, them).final_score
    }

    /// Desirability of attacking `them`, with every sub-score.
    #[must_use]
    pub fn breakdown(&self, us: &Agent, them: &Agent) -> ScoreBreakdown {
        let military = self.military_score(us, them);
        let economic = self.economic_score(us, them);
        let geographic = self.geographic_score(us, them);
        let diplomatic = self.diplomatic_factor(us, them);

        let total = military
            .saturating_mul(self.params.military_weight)
            .saturating_add(economic.saturating_mul(self.params.economic_weight))
            .saturating_add(geographic.saturating_mul(self.params.geographic_weight));
        let final_score = total.saturating_mul(diplomatic.value());

        trace!(
            attacker = %us.id,
            target = %them.id,
            %military,
            %economic,
            %geographic,
            diplomatic = %diplomatic.value(),
            %final_score,
            "evaluated target"
        );

        ScoreBreakdown {
            military,
            economic,
            geographic,
            diplomatic,
            total,
            final_score,
        }
    }

    /// Military advantage, discounted by border presence and fortified cities.
    #[must_use]
    pub fn military_score(&self, us: &Agent, them: &Agent) -> Fixed {
        let our_power = self.metrics.military_strength(us);
        let their_power = self.metrics.military_strength(them);

        let advantage = saturating_ratio(our_power, their_power.saturating_add(MILITARY_EPSILON));
        let border = self.border_power_ratio(us, them);
        let undefended = Fixed::ONE - self.city_defense_fraction(them, our_power);

        advantage.saturating_mul(border).saturating_mul(undefended)
    }

    /// Ratio of our forces to theirs on the shared border.
    ///
    /// With no shared tiles both sides count as zero, leaving just the
    /// tension multiplier.
    #[must_use]
    pub fn border_power_ratio(&self, us: &Agent, them: &Agent) -> Fixed {
        let tiles = self.metrics.shared_border_tiles(us, them);
        let ours = self.metrics.power_in_region(us, &tiles).max(Fixed::ZERO);
        let theirs = self.metrics.power_in_region(them, &tiles).max(Fixed::ZERO);

        saturating_ratio(
            ours.saturating_add(BORDER_EPSILON),
            theirs.saturating_add(BORDER_EPSILON),
        )
        .saturating_mul(self.params.border_tension_multiplier)
    }

    /// Fraction of `them`'s cities whose defense exceeds
    /// `city_defense_threshold × our_power`. Zero for a target with no cities.
    #[must_use]
    pub fn city_defense_fraction(&self, them: &Agent, our_power: Fixed) -> Fixed {
        if them.cities.is_empty() {
            return Fixed::ZERO;
        }

        let bar = self.params.city_defense_threshold.saturating_mul(our_power);
        let fortified = them
            .cities
            .iter()
            .filter(|city| city.defense_strength > bar)
            .count();

        Fixed::saturating_from_num(fortified) / Fixed::saturating_from_num(them.cities.len())
    }

    /// Relative economic output.
    ///
    /// Saturates when their denominator is exactly zero and our output is
    /// positive. Any negative ratio clamps to zero.
    #[must_use]
    pub fn economic_score(&self, us: &Agent, them: &Agent) -> Fixed {
        let ours = self
            .metrics
            .gold_per_turn(us)
            .saturating_add(self.metrics.production_total(us));
        let theirs = self
            .metrics
            .gold_per_turn(them)
            .saturating_add(self.metrics.production_total(them))
            .saturating_add(Fixed::ONE);

        if theirs == Fixed::ZERO {
            if ours > Fixed::ZERO {
                Fixed::MAX
            } else {
                Fixed::ZERO
            }
        } else {
            ours.saturating_div(theirs).max(Fixed::ZERO)
        }
    }

    /// Proximity of the capitals scaled by terrain favorability.
    #[must_use]
    pub fn geographic_score(&self, us: &Agent, them: &Agent) -> Fixed {
        let distance = self.metrics.capital_distance(us, them).max(Fixed::ZERO);
        let proximity = Fixed::ONE
            .saturating_div(Fixed::ONE.saturating_add(distance.saturating_mul(DISTANCE_FALLOFF)));
        let terrain = self.metrics.terrain_advantage(us, them).max(Fixed::ZERO);

        proximity.saturating_mul(terrain)
    }

    /// Diplomatic multiplier for attacking `them`.
    #[must_use]
    pub fn diplomatic_factor(&self, us: &Agent, them: &Agent) -> DiplomaticFactor {
        if self.metrics.relation(us, them) > self.params.ally_evaluation_threshold {
            return DiplomaticFactor::Capped;
        }

        let allies = Fixed::saturating_from_num(self.metrics.allies(them).len());
        let penalty = Fixed::ONE.saturating_add(allies.saturating_mul(ALLY_PENALTY));
        DiplomaticFactor::Computed(Fixed::ONE.saturating_div(penalty))
    }
}
