//! Determinism testing utilities.
//!
//! Provides a harness for verifying that decisions come out identical
//! given identical inputs, whether repeated, run on other threads, or run
//! on a snapshot that went through serialization.
//!
//! # Testing Strategy
//!
//! AI decisions must be reproducible so that replays and networked games
//! agree on who declared war on whom. Sources of non-determinism include:
//!
//! - **Floating-point math**: Different CPUs can produce different results.
//!   We use fixed-point arithmetic via [`casus_core::math::Fixed`] throughout.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Snapshots keep agents in a `BTreeMap` and iterate in id order.
//!
//! - **Shared mutable state**: Decisions read one immutable snapshot and
//!   report declarations through a ledger applied afterwards.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use casus_core::decision::Decision;
use casus_core::params::ScoringParameters;
use casus_core::world::WorldSnapshot;
use tracing::debug;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of turns played per run.
    pub turns: u32,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic engine).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run agreed, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Decisions are non-deterministic!\n\
                 Runs: {}\n\
                 Turns: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.turns,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a turn-based process multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the process
/// * `turns` - Number of turns to play per run
/// * `setup` - Function to create initial state
/// * `step` - Function to advance state by one turn
/// * `hash` - Function to compute state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    turns: u32,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..turns {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        turns,
    }
}

/// Play one turn: every civilization decides against the same snapshot,
/// then all declarations are applied and the turn counter advances.
///
/// # Panics
///
/// Panics if a declaration names a civilization missing from the world,
/// which would mean the engine invented a target.
pub fn play_turn(world: &mut WorldSnapshot, params: &ScoringParameters) -> Vec<Decision> {
    let (decisions, ledger) = world.decide_all(params);
    if let Err(e) = world.apply_declarations(ledger.declarations()) {
        panic!("declaration could not be applied on turn {}: {e}", world.turn);
    }
    world.turn += 1;
    decisions
}

/// Play several turns from the world produced by `setup_fn`, twice, and
/// verify the final snapshots hash identically.
pub fn verify_world_determinism<F>(setup_fn: F, params: &ScoringParameters, turns: u32) -> bool
where
    F: Fn() -> WorldSnapshot,
{
    let result = verify_determinism(
        2,
        turns,
        &setup_fn,
        |world| {
            play_turn(world, params);
        },
        WorldSnapshot::state_hash,
    );
    result.is_deterministic
}

/// Result of parallel decision runs.
#[derive(Debug, Clone)]
pub struct ParallelDecisionResult {
    /// Hash of every run's decisions and declarations.
    pub hashes: Vec<u64>,
    /// Number of runs.
    pub num_runs: usize,
}

impl ParallelDecisionResult {
    /// Check if all runs produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all runs matched.
    ///
    /// # Panics
    ///
    /// Panics if runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            let mut unique: Vec<u64> = self.hashes.clone();
            unique.sort_unstable();
            unique.dedup();
            panic!(
                "Parallel decisions diverged!\n\
                 Runs: {}\n\
                 Unique hashes: {}\n\
                 All hashes: {:?}",
                self.num_runs,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Hash every decision and declaration made for `world` this turn.
#[must_use]
pub fn decision_hash(world: &WorldSnapshot, params: &ScoringParameters) -> u64 {
    let (decisions, ledger) = world.decide_all(params);
    compute_hash(&(decisions, ledger.into_declarations()))
}

/// Decide for every civilization of one shared snapshot on `num_runs`
/// scoped threads and collect the result hashes.
///
/// # Panics
///
/// Panics if a worker thread panics.
pub fn run_parallel_decisions(
    world: &WorldSnapshot,
    params: &ScoringParameters,
    num_runs: usize,
) -> ParallelDecisionResult {
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_runs)
            .map(|_| s.spawn(|| decision_hash(world, params)))
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    ParallelDecisionResult {
        hashes,
        num_runs,
    }
}

/// Verify that a serialization round-trip preserves the snapshot and the
/// decisions made on it.
pub fn verify_serialization_determinism(world: &WorldSnapshot, params: &ScoringParameters) -> bool {
    let Ok(bytes) = world.serialize() else {
        return false;
    };
    let Ok(restored) = WorldSnapshot::deserialize(&bytes) else {
        return false;
    };

    let same_state = restored.state_hash() == world.state_hash();
    let same_decisions = decision_hash(&restored, params) == decision_hash(world, params);
    if !(same_state && same_decisions) {
        debug!(same_state, same_decisions, "serialization changed the snapshot");
    }
    same_state && same_decisions
}

/// Find the first turn on which two runs from the same setup diverge.
///
/// # Returns
///
/// `None` if the runs agree for all `turns`, `Some(turn)` otherwise.
pub fn find_first_divergence<F>(setup_fn: F, params: &ScoringParameters, turns: u32) -> Option<u32>
where
    F: Fn() -> WorldSnapshot,
{
    let mut first = setup_fn();
    let mut second = setup_fn();

    if first.state_hash() != second.state_hash() {
        return Some(0);
    }

    for turn in 1..=turns {
        play_turn(&mut first, params);
        play_turn(&mut second, params);

        if first.state_hash() != second.state_hash() {
            return Some(turn);
        }
    }

    None
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for engine testing.
///
/// These strategies generate random but reproducible agents, parameters
/// and candidate lists for property-based testing.
pub mod strategies {
    use casus_core::agent::{Agent, City, CivId};
    use casus_core::math::Fixed;
    use casus_core::params::ScoringParameters;
    use proptest::prelude::*;

    /// Generate a military strength.
    ///
    /// Range: 0 to 1000, zero included to exercise powerless targets.
    pub fn arb_strength() -> impl Strategy<Value = Fixed> {
        (0i32..1000i32).prop_map(Fixed::from_num)
    }

    /// Generate an income or production value, possibly negative.
    pub fn arb_income() -> impl Strategy<Value = Fixed> {
        (-50i32..200i32).prop_map(Fixed::from_num)
    }

    /// Generate a relation value.
    pub fn arb_relation() -> impl Strategy<Value = Fixed> {
        (-100i32..100i32).prop_map(Fixed::from_num)
    }

    /// Generate a city.
    pub fn arb_city() -> impl Strategy<Value = City> {
        (0i32..500i32).prop_map(|defense| City::new("city", Fixed::from_num(defense)))
    }

    /// Generate an agent with the given id.
    ///
    /// Wars, cooldown and relations refer to civilizations 1 to 20.
    pub fn arb_agent(id: u32) -> impl Strategy<Value = Agent> {
        (
            arb_strength(),
            arb_income(),
            arb_income(),
            proptest::collection::vec(arb_city(), 0..5),
            proptest::collection::vec(1u32..20, 0..4),
            proptest::option::of(0u32..100),
            proptest::collection::vec((1u32..20, arb_relation()), 0..4),
            proptest::collection::vec(1u32..20, 0..4),
        )
            .prop_map(
                move |(strength, gold, production, cities, wars, last_war, relations, allies)| {
                    let mut agent = Agent::new(CivId(id), format!("civ {id}"));
                    agent.military_strength = strength;
                    agent.gold_per_turn = gold;
                    agent.production_total = production;
                    agent.cities = cities;
                    agent.active_wars = wars.into_iter().map(CivId).collect();
                    agent.last_war_turn = last_war;
                    for (civ, value) in relations {
                        agent.set_relation(CivId(civ), value);
                    }
                    agent.allies = allies.into_iter().map(CivId).collect();
                    agent
                },
            )
    }

    /// Generate `1..max_len` candidates with ids starting at 100.
    pub fn arb_candidates(max_len: usize) -> impl Strategy<Value = Vec<Agent>> {
        proptest::collection::vec(arb_agent(0), 1..max_len).prop_map(|mut agents| {
            for (index, agent) in agents.iter_mut().enumerate() {
                agent.id = CivId(100 + u32::try_from(index).unwrap_or(0));
            }
            agents
        })
    }

    /// Generate a non-negative weight or ratio between 0 and 2.
    pub fn arb_weight() -> impl Strategy<Value = Fixed> {
        (0i32..=200i32).prop_map(|n| Fixed::from_num(n) / Fixed::from_num(100))
    }

    /// Generate valid scoring parameters.
    pub fn arb_params() -> impl Strategy<Value = ScoringParameters> {
        (
            (arb_weight(), arb_weight(), arb_weight()),
            arb_weight(),
            arb_weight(),
            arb_relation(),
            1u32..5,
            0u32..30,
            arb_weight(),
        )
            .prop_map(
                |(
                    (military, economic, geographic),
                    city_defense,
                    border_tension,
                    ally_threshold,
                    max_wars,
                    cooldown,
                    min_power_ratio,
                )| ScoringParameters {
                    military_weight: military,
                    economic_weight: economic,
                    geographic_weight: geographic,
                    city_defense_threshold: city_defense,
                    border_tension_multiplier: border_tension,
                    ally_evaluation_threshold: ally_threshold,
                    max_simultaneous_wars: max_wars,
                    war_cooldown: cooldown,
                    min_power_ratio_for_war: min_power_ratio,
                },
            )
    }
}
