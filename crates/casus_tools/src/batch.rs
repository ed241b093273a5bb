//! Whole-world decisions in parallel.
//!
//! Every civilization decides against the same shared snapshot on the
//! rayon thread pool. Declarations go into one ledger per civilization and
//! are merged in id order, so the result matches a sequential
//! [`WorldSnapshot::decide_all`] exactly.

use casus_core::agent::{CivId, Turn};
use casus_core::decision::{Decision, WarDeclaration, WarLedger};
use casus_core::error::Result;
use casus_core::params::ScoringParameters;
use casus_core::world::WorldSnapshot;
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

/// Decisions of every civilization for one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnDecisions {
    /// Turn the decisions were made on.
    pub turn: Turn,
    /// One decision per civilization, in id order.
    pub decisions: Vec<Decision>,
    /// Declarations to apply, in id order of the attacker.
    pub declarations: Vec<WarDeclaration>,
}

impl TurnDecisions {
    /// Number of civilizations that declared war.
    #[must_use]
    pub fn wars_declared(&self) -> usize {
        self.declarations.len()
    }
}

/// Decide for every civilization in `world` on the rayon pool.
///
/// # Errors
///
/// Returns an error if a civilization lookup in the snapshot fails.
pub fn decide_parallel(world: &WorldSnapshot, params: &ScoringParameters) -> Result<TurnDecisions> {
    let civs: Vec<CivId> = world.agents().map(|agent| agent.id).collect();

    let results: Vec<(Decision, WarLedger)> = civs
        .par_iter()
        .map(|&civ| {
            let mut ledger = WarLedger::new(world.turn);
            let decision = world.decide_for(civ, params, &mut ledger)?;
            Ok((decision, ledger))
        })
        .collect::<Result<_>>()?;

    let mut merged = WarLedger::new(world.turn);
    let mut decisions = Vec::with_capacity(results.len());
    for (decision, ledger) in results {
        decisions.push(decision);
        merged.merge(ledger);
    }

    debug!(
        turn = world.turn,
        civilizations = decisions.len(),
        wars = merged.len(),
        "parallel decisions complete"
    );

    Ok(TurnDecisions {
        turn: world.turn,
        decisions,
        declarations: merged.into_declarations(),
    })
}
