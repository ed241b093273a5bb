//! Tunable weights and thresholds for war evaluation.
//!
//! A [`ScoringParameters`] value is built once (usually loaded from RON by
//! the host) and then passed by reference into every evaluation. Nothing in
//! the engine mutates it.

use serde::{Deserialize, Serialize};

use crate::error::{CasusError, Result};
use crate::math::{fixed_serde, ratio, Fixed};

/// Weights and thresholds consumed by scoring and gating.
///
/// Weights are used as given; they are not renormalized.
///
/// # Example RON
///
/// ```ron
/// ScoringParameters(
///     military_weight: 0.5,
///     economic_weight: 0.3,
///     geographic_weight: 0.2,
///     city_defense_threshold: 0.5,
///     border_tension_multiplier: 1.0,
///     ally_evaluation_threshold: 50,
///     max_simultaneous_wars: 2,
///     war_cooldown: 10,
///     min_power_ratio_for_war: 0.5,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScoringParameters {
    /// Weight of the military sub-score.
    #[serde(with = "fixed_serde")]
    pub military_weight: Fixed,

    /// Weight of the economic sub-score.
    #[serde(with = "fixed_serde")]
    pub economic_weight: Fixed,

    /// Weight of the geographic sub-score.
    #[serde(with = "fixed_serde")]
    pub geographic_weight: Fixed,

    /// A target city counts as fortified when its defense exceeds this
    /// fraction of our military strength.
    #[serde(with = "fixed_serde")]
    pub city_defense_threshold: Fixed,

    /// Scales the border power ratio.
    #[serde(with = "fixed_serde")]
    pub border_tension_multiplier: Fixed,

    /// Relations above this value cap the diplomatic factor.
    #[serde(with = "fixed_serde")]
    pub ally_evaluation_threshold: Fixed,

    /// Maximum number of wars a civilization may wage at once.
    pub max_simultaneous_wars: u32,

    /// Turns that must pass between two declarations.
    pub war_cooldown: u32,

    /// Scales the attacker/target strength ratio the score must exceed.
    #[serde(with = "fixed_serde")]
    pub min_power_ratio_for_war: Fixed,
}

impl Default for ScoringParameters {
    fn default() -> Self {
        Self {
            military_weight: ratio(1, 2),
            economic_weight: ratio(3, 10),
            geographic_weight: ratio(1, 5),
            city_defense_threshold: ratio(1, 2),
            border_tension_multiplier: Fixed::ONE,
            ally_evaluation_threshold: ratio(50, 1),
            max_simultaneous_wars: 2,
            war_cooldown: 10,
            min_power_ratio_for_war: ratio(1, 2),
        }
    }
}

impl ScoringParameters {
    /// Validate the parameters.
    ///
    /// Returns a list of problems, empty when the parameters are usable.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let non_negative = [
            ("military_weight", self.military_weight),
            ("economic_weight", self.economic_weight),
            ("geographic_weight", self.geographic_weight),
            ("city_defense_threshold", self.city_defense_threshold),
            ("border_tension_multiplier", self.border_tension_multiplier),
            ("min_power_ratio_for_war", self.min_power_ratio_for_war),
        ];
        for (name, value) in non_negative {
            if value < Fixed::ZERO {
                errors.push(format!("{name} must not be negative (got {value})"));
            }
        }

        if self.military_weight == Fixed::ZERO
            && self.economic_weight == Fixed::ZERO
            && self.geographic_weight == Fixed::ZERO
        {
            errors.push("at least one scoring weight must be positive".to_string());
        }

        if self.max_simultaneous_wars == 0 {
            errors.push("max_simultaneous_wars of 0 forbids every war".to_string());
        }

        errors
    }

    /// Validate and return `self`, or every problem found as an error.
    pub fn validated(self) -> Result<Self> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(CasusError::InvalidParameters(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(ScoringParameters::default().validate().is_empty());
    }

    #[test]
    fn test_negative_weight_rejected() {
        let params = ScoringParameters {
            economic_weight: Fixed::from_num(-1),
            ..ScoringParameters::default()
        };
        let errors = params.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("economic_weight"));
    }

    #[test]
    fn test_all_zero_weights_rejected() {
        let params = ScoringParameters {
            military_weight: Fixed::ZERO,
            economic_weight: Fixed::ZERO,
            geographic_weight: Fixed::ZERO,
            ..ScoringParameters::default()
        };
        assert!(matches!(
            params.validated(),
            Err(CasusError::InvalidParameters(errors)) if errors.len() == 1
        ));
    }

    #[test]
    fn test_zero_war_cap_rejected() {
        let params = ScoringParameters {
            max_simultaneous_wars: 0,
            ..ScoringParameters::default()
        };
        assert!(params.validated().is_err());
    }

    #[test]
    fn test_weights_are_not_renormalized() {
        let params: ScoringParameters = ron::from_str(
            "(military_weight: 2, economic_weight: 2, geographic_weight: 2,
              city_defense_threshold: 0.5, border_tension_multiplier: 1.0,
              ally_evaluation_threshold: 50, max_simultaneous_wars: 2,
              war_cooldown: 10, min_power_ratio_for_war: 0.5)",
        )
        .unwrap();
        assert_eq!(params.military_weight, Fixed::from_num(2));
        assert!(params.validate().is_empty());
    }
}
