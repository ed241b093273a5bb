//! Eligibility rules for declaring war on a specific target.
//!
//! Checks run cheapest first and stop at the first failure:
//!
//! 1. Fewer active wars than `max_simultaneous_wars`.
//! 2. At least `war_cooldown` turns since our last declaration.
//! 3. Target score above [`WAR_SCORE_THRESHOLD`].
//! 4. Target score above `(ourStrength / theirStrength) × min_power_ratio_for_war`.
//!
//! A rejection is an ordinary outcome of deliberation, not an error.

use std::fmt;

use tracing::debug;

use crate::agent::{Agent, Turn};
use crate::math::{ratio, saturating_ratio, Fixed};
use crate::metrics::MetricProvider;
use crate::scoring::ScoreCalculator;

/// Minimum desirability score for any war.
pub const WAR_SCORE_THRESHOLD: Fixed = ratio(13, 20);

/// Why a war was not permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Already fighting the maximum number of wars.
    TooManyWars {
        /// Wars currently being fought.
        active: usize,
        /// Configured maximum.
        max: u32,
    },
    /// Declared a war too recently.
    Cooldown {
        /// Turn of the last declaration.
        last_war_turn: Turn,
        /// Turns until the cooldown expires.
        turns_remaining: u32,
    },
    /// Target is not desirable enough.
    ScoreTooLow {
        /// Target score.
        score: Fixed,
    },
    /// Score does not beat the scaled power ratio.
    PowerRatio {
        /// Target score.
        score: Fixed,
        /// Score that had to be exceeded.
        required: Fixed,
    },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManyWars { active, max } => {
                write!(f, "already at war with {active} civilizations (max {max})")
            }
            Self::Cooldown {
                last_war_turn,
                turns_remaining,
            } => write!(
                f,
                "last war declared on turn {last_war_turn}, {turns_remaining} turns of cooldown left"
            ),
            Self::ScoreTooLow { score } => {
                write!(f, "score {score} does not exceed {WAR_SCORE_THRESHOLD}")
            }
            Self::PowerRatio { score, required } => {
                write!(f, "score {score} does not exceed power ratio bar {required}")
            }
        }
    }
}

/// Result of running the gate on one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateVerdict {
    /// War is permitted; carries the target score.
    Eligible {
        /// Target score.
        score: Fixed,
    },
    /// War is not permitted.
    Rejected(RejectReason),
}

impl GateVerdict {
    /// Whether war is permitted.
    #[must_use]
    pub const fn is_eligible(&self) -> bool {
        matches!(self, Self::Eligible { .. })
    }

    /// Target score, if the gate got far enough to compute it.
    #[must_use]
    pub fn score(&self) -> Option<Fixed> {
        match self {
            Self::Eligible { score }
            | Self::Rejected(
                RejectReason::ScoreTooLow { score } | RejectReason::PowerRatio { score, .. },
            ) => Some(*score),
            Self::Rejected(_) => None,
        }
    }
}

/// Applies the war eligibility rules for one turn.
#[derive(Debug)]
pub struct WarGate<'a, M: ?Sized> {
    calculator: ScoreCalculator<'a, M>,
    current_turn: Turn,
}

impl<M: ?Sized> Clone for WarGate<'_, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: ?Sized> Copy for WarGate<'_, M> {}

impl<'a, M: MetricProvider + ?Sized> WarGate<'a, M> {
    /// Create a gate evaluating on `current_turn`.
    #[must_use]
    pub const fn new(calculator: ScoreCalculator<'a, M>, current_turn: Turn) -> Self {
        Self {
            calculator,
            current_turn,
        }
    }

    /// Score calculator in use.
    #[must_use]
    pub const fn calculator(&self) -> &ScoreCalculator<'a, M> {
        &self.calculator
    }

    /// Turn being evaluated.
    #[must_use]
    pub const fn current_turn(&self) -> Turn {
        self.current_turn
    }

    /// Whether `us` may declare war on `them` this turn.
    #[must_use]
    pub fn can_declare_war(&self, us: &Agent, them: &Agent) -> bool {
        self.check(us, them).is_eligible()
    }

    /// Run every check, stopping at the first failure.
    #[must_use]
    pub fn check(&self, us: &Agent, them: &Agent) -> GateVerdict {
        let verdict = match self.evaluate(us, them) {
            Ok(score) => GateVerdict::Eligible { score },
            Err(reason) => GateVerdict::Rejected(reason),
        };

        if let GateVerdict::Rejected(reason) = &verdict {
            debug!(
                attacker = %us.id,
                target = %them.id,
                turn = self.current_turn,
                %reason,
                "war rejected"
            );
        }

        verdict
    }

    fn evaluate(&self, us: &Agent, them: &Agent) -> Result<Fixed, RejectReason> {
        let params = self.calculator.params();

        if us.active_wars.len() >= params.max_simultaneous_wars as usize {
            return Err(RejectReason::TooManyWars {
                active: us.active_wars.len(),
                max: params.max_simultaneous_wars,
            });
        }

        if let Some(last_war_turn) = us.last_war_turn {
            let elapsed = i64::from(self.current_turn) - i64::from(last_war_turn);
            let cooldown = i64::from(params.war_cooldown);
            if elapsed < cooldown {
                return Err(RejectReason::Cooldown {
                    last_war_turn,
                    turns_remaining: u32::try_from(cooldown - elapsed).unwrap_or(u32::MAX),
                });
            }
        }

        let score = self.calculator.evaluate_target(us, them);
        if score <= WAR_SCORE_THRESHOLD {
            return Err(RejectReason::ScoreTooLow { score });
        }

        let metrics = self.calculator.metrics();
        let required = saturating_ratio(
            metrics.military_strength(us),
            metrics.military_strength(them),
        )
        .saturating_mul(params.min_power_ratio_for_war);
        if score <= required {
            return Err(RejectReason::PowerRatio { score, required });
        }

        Ok(score)
    }
}
