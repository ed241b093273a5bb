//! End-to-end decision scenarios.
//!
//! Each scenario runs the full pipeline (scoring, gate, selection and
//! declaration) against a hand-built world.

use casus_core::prelude::*;
use casus_test_utils::fixtures::{
    at_war_cap, favorable_war, fixed, friendly_neighbour, terrain_only_params, tied_candidates,
    AgentBuilder, WorldBuilder,
};

// ==========================================================================
// Scenario 1: a strong attacker against a weaker neighbour
// ==========================================================================

#[test]
fn test_favorable_war_is_declared() {
    let params = ScoringParameters::default();
    let (us, them) = favorable_war();
    let engine = DecisionEngine::new(&params, &FlatMetrics, 40);

    let breakdown = engine.calculator().breakdown(&us, &them);
    assert!(breakdown.military > Fixed::ONE);
    assert!(breakdown.final_score > WAR_SCORE_THRESHOLD);

    // Power ratio bar is 100 / 50 × 0.5.
    let bar = fixed(2) * params.min_power_ratio_for_war;
    assert!(breakdown.final_score > bar);

    let mut ledger = WarLedger::new(40);
    let decision = engine.decide(&us, [&them], &mut ledger);

    assert!(decision.declare);
    assert_eq!(decision.target, Some(them.id));
    assert_eq!(decision.score, Some(breakdown.final_score));
    assert_eq!(ledger.len(), 1);
}

#[test]
fn test_favorable_war_blocked_by_stricter_power_ratio() {
    let params = ScoringParameters {
        min_power_ratio_for_war: Fixed::ONE,
        ..ScoringParameters::default()
    };
    let (us, them) = favorable_war();
    let engine = DecisionEngine::new(&params, &FlatMetrics, 40);
    let mut ledger = WarLedger::new(40);

    let decision = engine.decide(&us, [&them], &mut ledger);

    assert!(!decision.declare);
    assert!(ledger.is_empty());
}

// ==========================================================================
// Scenario 2: attacker already at the war cap
// ==========================================================================

#[test]
fn test_war_cap_always_rejects() {
    let params = ScoringParameters::default();
    let (us, them) = at_war_cap(&params);
    let engine = DecisionEngine::new(&params, &FlatMetrics, 40);

    assert!(matches!(
        engine.gate().check(&us, &them),
        GateVerdict::Rejected(RejectReason::TooManyWars { .. })
    ));

    let mut calls = 0;
    let decision = engine.decide(&us, [&them], &mut |_: &Agent, _: &Agent| calls += 1);
    assert_eq!(decision, Decision::hold(us.id));
    assert_eq!(calls, 0);
}

#[test]
fn test_war_cap_rejects_even_defenseless_target() {
    let params = ScoringParameters {
        min_power_ratio_for_war: Fixed::ZERO,
        ..ScoringParameters::default()
    };
    let (us, _) = at_war_cap(&params);
    let defenseless = AgentBuilder::new(9).economy(0, 0).build();
    let engine = DecisionEngine::new(&params, &FlatMetrics, 40);
    let gate = engine.gate();

    assert!(gate.calculator().evaluate_target(&us, &defenseless) > fixed(100));
    assert!(!gate.can_declare_war(&us, &defenseless));
}

// ==========================================================================
// Scenario 3: friendly relation caps the diplomatic factor
// ==========================================================================

#[test]
fn test_friendly_neighbour_is_spared() {
    let params = ScoringParameters::default();
    let (us, them) = friendly_neighbour(&params);
    let engine = DecisionEngine::new(&params, &FlatMetrics, 40);

    let breakdown = engine.calculator().breakdown(&us, &them);
    assert_eq!(breakdown.diplomatic, DiplomaticFactor::Capped);
    assert_eq!(
        breakdown.final_score,
        breakdown.total * breakdown.diplomatic.value()
    );
    assert!(breakdown.final_score < WAR_SCORE_THRESHOLD);

    let mut ledger = WarLedger::new(40);
    assert!(!engine.decide(&us, [&them], &mut ledger).declare);
}

// ==========================================================================
// Scenario 4: tied best scores keep the earliest candidate
// ==========================================================================

#[test]
fn test_tied_candidates_pick_first_maximum() {
    let params = terrain_only_params();
    let world = tied_candidates();
    let us = world.agent(CivId(1)).unwrap();
    let candidates = world.candidates_for(us.id).unwrap();
    let engine = DecisionEngine::new(&params, &world, world.turn);

    let eligible = engine.selector().eligible(us, candidates.iter().copied());
    let scores: Vec<Fixed> = eligible.iter().map(|c| c.score).collect();
    assert_eq!(
        scores,
        vec![
            casus_core::math::ratio(7, 10),
            casus_core::math::ratio(9, 10),
            casus_core::math::ratio(9, 10),
        ]
    );

    let mut ledger = WarLedger::new(world.turn);
    let decision = engine.decide(us, candidates, &mut ledger);
    assert_eq!(decision.target, Some(CivId(3)));
}

// ==========================================================================
// Snapshot-driven decisions
// ==========================================================================

#[test]
fn test_border_garrisons_shift_the_decision() {
    // Equal armies: only the border presence decides.
    let world = |ours: i32, theirs: i32| {
        WorldBuilder::new(10)
            .agent(AgentBuilder::new(1).strength(100).economy(10, 10).build())
            .agent(AgentBuilder::new(2).strength(100).economy(10, 10).build())
            .border(1, 2, &[1, 2, 3])
            .garrison(1, 1, ours)
            .garrison(2, 3, theirs)
            .build()
    };
    let params = ScoringParameters::default();

    let massed = world(20, 1);
    let mut ledger = WarLedger::new(10);
    assert!(massed.decide_for(CivId(1), &params, &mut ledger).unwrap().declare);

    let outnumbered = world(1, 20);
    let mut ledger = WarLedger::new(10);
    assert!(!outnumbered.decide_for(CivId(1), &params, &mut ledger).unwrap().declare);
}

#[test]
fn test_declared_war_starts_cooldown_next_turn() {
    let params = ScoringParameters::default();
    let (us, them) = favorable_war();
    let third = AgentBuilder::new(3).strength(40).economy(10, 10).build();
    let mut world = WorldBuilder::new(40).agent(us).agent(them).agent(third).build();

    let mut ledger = WarLedger::new(world.turn);
    let first = world.decide_for(CivId(1), &params, &mut ledger).unwrap();
    assert!(first.declare);
    world.apply_declarations(ledger.declarations()).unwrap();

    // The remaining civilization would be a fine target but the cooldown holds.
    world.turn += 1;
    let mut ledger = WarLedger::new(world.turn);
    let second = world.decide_for(CivId(1), &params, &mut ledger).unwrap();
    assert!(!second.declare);

    world.turn = 40 + params.war_cooldown;
    let mut ledger = WarLedger::new(world.turn);
    let third = world.decide_for(CivId(1), &params, &mut ledger).unwrap();
    assert!(third.declare);
    assert_ne!(third.target, first.target);
}

#[test]
fn test_indebted_stronger_neighbour_is_not_attacked() {
    let params = ScoringParameters::default();
    let us = AgentBuilder::new(1).strength(100).economy(1, 0).build();
    let indebted = AgentBuilder::new(2).strength(500).economy(-8, 6).build();
    let engine = DecisionEngine::new(&params, &FlatMetrics, 40);

    let breakdown = engine.calculator().breakdown(&us, &indebted);
    assert_eq!(breakdown.economic, Fixed::ZERO);
    assert!(breakdown.final_score <= WAR_SCORE_THRESHOLD);

    let mut ledger = WarLedger::new(40);
    assert!(!engine.decide(&us, [&indebted], &mut ledger).declare);
    assert!(ledger.is_empty());
}

#[test]
fn test_unknown_civ_is_an_error() {
    let world = tied_candidates();
    let mut ledger = WarLedger::new(world.turn);
    let result = world.decide_for(CivId(99), &ScoringParameters::default(), &mut ledger);
    assert!(matches!(result, Err(CasusError::UnknownCiv(CivId(99)))));
}
