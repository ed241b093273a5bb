//! # Casus Core
//!
//! War-declaration decision engine for strategy-game AI civilizations.
//!
//! Given a deciding civilization, a set of candidate targets and a
//! [`ScoringParameters`](params::ScoringParameters) record, the engine
//! scores every candidate, filters them through the war gate and picks at
//! most one target to declare war on.
//!
//! This crate contains **only** deterministic logic:
//! - No IO
//! - No randomness
//! - No floating-point math (uses fixed-point)
//! - No shared mutable state between decisions
//!
//! ## Crate Structure
//!
//! - [`metrics`] - Numeric contract the host world model fulfils
//! - [`scoring`] - Target desirability and its sub-scores
//! - [`gate`] - War eligibility rules
//! - [`selector`] - Best-target selection with first-wins tie-break
//! - [`decision`] - Decision entry point and war declaration sink
//! - [`world`] - Serializable world snapshot usable as a metric provider
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod agent;
pub mod decision;
pub mod error;
pub mod gate;
pub mod math;
pub mod metrics;
pub mod params;
pub mod scoring;
pub mod selector;
pub mod world;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::agent::{Agent, City, CivId, Relation, Turn};
    pub use crate::decision::{Decision, DecisionEngine, WarDeclaration, WarDeclarer, WarLedger};
    pub use crate::error::{CasusError, Result};
    pub use crate::gate::{GateVerdict, RejectReason, WarGate, WAR_SCORE_THRESHOLD};
    pub use crate::math::{Fixed, Vec2Fixed};
    pub use crate::metrics::{FlatMetrics, MetricProvider, TileId};
    pub use crate::params::ScoringParameters;
    pub use crate::scoring::{DiplomaticFactor, ScoreBreakdown, ScoreCalculator};
    pub use crate::selector::{TargetChoice, TargetSelector};
    pub use crate::world::{BorderRegion, Capital, Garrison, TerrainEdge, WorldSnapshot};
}
