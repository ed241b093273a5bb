//! Loading scoring parameters and world snapshots from RON files.
//!
//! All validation happens at load time, so the engine only ever sees
//! parameters and snapshots that passed it.

use std::path::Path;

use casus_core::params::ScoringParameters;
use casus_core::world::WorldSnapshot;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::validate::world_problems;

/// Errors that can occur during data loading.
#[derive(Debug, Error)]
pub enum DataLoadError {
    /// Failed to read file.
    #[error("Failed to read file '{path}': {source}")]
    IoError {
        /// Path to the file.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse RON file.
    #[error("Failed to parse RON file '{path}': {source}")]
    ParseError {
        /// Path to the file.
        path: String,
        /// Underlying parse error.
        #[source]
        source: ron::error::SpannedError,
    },

    /// Loaded data failed validation.
    #[error("Validation failed for '{path}': {}", .errors.join("; "))]
    ValidationError {
        /// Path to the file.
        path: String,
        /// List of validation errors.
        errors: Vec<String>,
    },

    /// Directory holds none of the expected data files.
    #[error("No data files found in '{0}'")]
    NoDataFiles(String),
}

/// Result type for data loading operations.
pub type DataLoadResult<T> = Result<T, DataLoadError>;

fn load_ron<T: DeserializeOwned>(path: &Path) -> DataLoadResult<T> {
    let path_str = path.display().to_string();

    let contents = std::fs::read_to_string(path).map_err(|e| DataLoadError::IoError {
        path: path_str.clone(),
        source: e,
    })?;

    ron::from_str(&contents).map_err(|e| DataLoadError::ParseError {
        path: path_str,
        source: e,
    })
}

/// Load scoring parameters from a RON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or validated.
pub fn load_params(path: &Path) -> DataLoadResult<ScoringParameters> {
    let params: ScoringParameters = load_ron(path)?;

    let errors = params.validate();
    if !errors.is_empty() {
        return Err(DataLoadError::ValidationError {
            path: path.display().to_string(),
            errors,
        });
    }

    tracing::info!(
        "Loaded scoring parameters from {} (weights {}/{}/{})",
        path.display(),
        params.military_weight,
        params.economic_weight,
        params.geographic_weight
    );

    Ok(params)
}

/// Load a world snapshot from a RON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or validated.
pub fn load_world(path: &Path) -> DataLoadResult<WorldSnapshot> {
    let world: WorldSnapshot = load_ron(path)?;

    let errors = world_problems(&world);
    if !errors.is_empty() {
        return Err(DataLoadError::ValidationError {
            path: path.display().to_string(),
            errors,
        });
    }

    tracing::info!(
        "Loaded world for turn {} with {} civilizations, {} borders, {} garrisons",
        world.turn,
        world.agent_count(),
        world.borders.len(),
        world.garrisons.len()
    );

    Ok(world)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const PARAMS: &str = r"
        ScoringParameters(
            military_weight: 0.5,
            economic_weight: 0.3,
            geographic_weight: 0.2,
            city_defense_threshold: 0.5,
            border_tension_multiplier: 1,
            ally_evaluation_threshold: 50,
            max_simultaneous_wars: 2,
            war_cooldown: 10,
            min_power_ratio_for_war: 0.5,
        )
    ";

    #[test]
    fn test_load_params() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.ron");
        fs::write(&path, PARAMS).unwrap();

        let params = load_params(&path).unwrap();
        assert_eq!(params, ScoringParameters::default());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_params(&dir.path().join("absent.ron"));
        assert!(matches!(result, Err(DataLoadError::IoError { .. })));
    }

    #[test]
    fn test_parse_error_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ron");
        fs::write(&path, "ScoringParameters(military_weight: )").unwrap();

        let err = load_params(&path).unwrap_err();
        assert!(matches!(err, DataLoadError::ParseError { .. }));
        assert!(err.to_string().contains("broken.ron"));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.ron");
        fs::write(&path, PARAMS.replace("max_simultaneous_wars: 2", "max_simultaneous_wars: 0"))
            .unwrap();

        match load_params(&path) {
            Err(DataLoadError::ValidationError { errors, .. }) => {
                assert!(errors.iter().any(|e| e.contains("max_simultaneous_wars")));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_world() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("world.ron");
        fs::write(
            &path,
            r#"
            WorldSnapshot(
                turn: 12,
                agents: [
                    Agent(id: 1, name: "Aurelia", military_strength: 100, gold_per_turn: 10, production_total: 10),
                    Agent(id: 2, name: "Borealis", military_strength: 50, gold_per_turn: 10, production_total: 10),
                ],
                capitals: [
                    Capital(civ: 1, position: (x: 0, y: 0)),
                    Capital(civ: 2, position: (x: 3, y: 4)),
                ],
            )
            "#,
        )
        .unwrap();

        let world = load_world(&path).unwrap();
        assert_eq!(world.turn, 12);
        assert_eq!(world.agent_count(), 2);
    }

    #[test]
    fn test_world_with_dangling_reference_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("world.ron");
        fs::write(
            &path,
            r"
            WorldSnapshot(
                turn: 1,
                agents: [
                    Agent(id: 1, military_strength: 10, gold_per_turn: 0, production_total: 0, allies: [9]),
                ],
            )
            ",
        )
        .unwrap();

        assert!(matches!(
            load_world(&path),
            Err(DataLoadError::ValidationError { .. })
        ));
    }
}
