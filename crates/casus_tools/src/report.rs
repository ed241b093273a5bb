//! Human-readable and JSON reports of how a civilization sees its
//! neighbours.

use std::fmt::Write as _;

use casus_core::agent::{Agent, CivId};
use casus_core::decision::{Decision, DecisionEngine};
use casus_core::error::Result;
use casus_core::gate::GateVerdict;
use casus_core::params::ScoringParameters;
use casus_core::scoring::ScoreBreakdown;
use casus_core::world::WorldSnapshot;
use serde::Serialize;

/// Score breakdown and gate verdict for one candidate.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateReport {
    /// Candidate civilization.
    pub target: CivId,
    /// Candidate display name.
    pub name: String,
    /// Every sub-score of the evaluation.
    pub breakdown: ScoreBreakdown,
    /// Whether war on this candidate is permitted.
    pub eligible: bool,
    /// Why war is not permitted, if it is not.
    pub rejection: Option<String>,
}

/// Evaluate every candidate of `civ` without declaring anything.
///
/// # Errors
///
/// Returns an error if `civ` is not in the snapshot.
pub fn evaluate_candidates(
    world: &WorldSnapshot,
    params: &ScoringParameters,
    civ: CivId,
) -> Result<Vec<CandidateReport>> {
    let us = world.agent(civ)?;
    let engine = DecisionEngine::new(params, world, world.turn);

    Ok(world
        .candidates_for(civ)?
        .into_iter()
        .map(|them| {
            let verdict = engine.gate().check(us, them);
            CandidateReport {
                target: them.id,
                name: them.name.clone(),
                breakdown: engine.calculator().breakdown(us, them),
                eligible: verdict.is_eligible(),
                rejection: match verdict {
                    GateVerdict::Eligible { .. } => None,
                    GateVerdict::Rejected(reason) => Some(reason.to_string()),
                },
            }
        })
        .collect())
}

/// Render candidate reports as an aligned text table.
#[must_use]
pub fn format_candidate_table(reports: &[CandidateReport]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<10} {:<16} {:>9} {:>9} {:>9} {:>9} {:>9}  verdict",
        "target", "name", "military", "economic", "geo", "diplo", "score"
    );

    for report in reports {
        let b = &report.breakdown;
        let verdict = report.rejection.as_deref().unwrap_or("eligible");
        let _ = writeln!(
            out,
            "{:<10} {:<16} {:>9.3} {:>9.3} {:>9.3} {:>9.3} {:>9.3}  {}",
            report.target.to_string(),
            report.name,
            b.military.to_num::<f64>(),
            b.economic.to_num::<f64>(),
            b.geographic.to_num::<f64>(),
            b.diplomatic.value().to_num::<f64>(),
            b.final_score.to_num::<f64>(),
            verdict
        );
    }

    out
}

fn label(world: &WorldSnapshot, civ: CivId) -> String {
    match world.agent(civ) {
        Ok(Agent { name, .. }) if !name.is_empty() => format!("{civ} ({name})"),
        _ => civ.to_string(),
    }
}

/// One line describing a decision.
#[must_use]
pub fn format_decision(world: &WorldSnapshot, decision: &Decision) -> String {
    match (decision.target, decision.score) {
        (Some(target), Some(score)) if decision.declare => format!(
            "{} declares war on {} (score {:.3})",
            label(world, decision.attacker),
            label(world, target),
            score.to_num::<f64>()
        ),
        _ => format!("{} holds", label(world, decision.attacker)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casus_test_utils::fixtures::{favorable_war, WorldBuilder};

    fn world() -> WorldSnapshot {
        let (us, them) = favorable_war();
        WorldBuilder::new(20).agent(us).agent(them).build()
    }

    #[test]
    fn test_evaluate_candidates() {
        let world = world();
        let params = ScoringParameters::default();

        let reports = evaluate_candidates(&world, &params, CivId(1)).unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].target, CivId(2));
        assert!(reports[0].eligible);
        assert!(reports[0].rejection.is_none());

        let table = format_candidate_table(&reports);
        assert!(table.contains("Borealis"));
        assert!(table.contains("eligible"));
    }

    #[test]
    fn test_rejection_reason_reported() {
        let world = world();
        let params = ScoringParameters {
            max_simultaneous_wars: 0,
            ..ScoringParameters::default()
        };

        let reports = evaluate_candidates(&world, &params, CivId(1)).unwrap();
        assert!(!reports[0].eligible);
        assert!(reports[0]
            .rejection
            .as_deref()
            .unwrap()
            .contains("already at war"));
    }

    #[test]
    fn test_format_decision() {
        let world = world();
        let war = Decision::war(CivId(1), CivId(2), casus_core::math::Fixed::from_num(1.5));
        assert_eq!(
            format_decision(&world, &war),
            "civ#1 (Aurelia) declares war on civ#2 (Borealis) (score 1.500)"
        );
        assert_eq!(
            format_decision(&world, &Decision::hold(CivId(2))),
            "civ#2 (Borealis) holds"
        );
    }
}
