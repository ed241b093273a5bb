//! # Casus Development Tools
//!
//! Command-line tools for tuning the decision engine:
//! - Data loaders and validators
//! - Per-candidate score reports
//! - Parallel whole-world decisions

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod batch;
pub mod loader;
pub mod report;
pub mod validate;
