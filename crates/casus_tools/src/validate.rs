//! Data validation utilities.

use std::collections::BTreeSet;
use std::path::Path;

use casus_core::agent::CivId;
use casus_core::math::Fixed;
use casus_core::world::WorldSnapshot;

use crate::loader::{load_params, load_world, DataLoadError, DataLoadResult};

/// File name of the scoring parameters inside a data directory.
pub const PARAMS_FILE: &str = "params.ron";

/// File name of the world snapshot inside a data directory.
pub const WORLD_FILE: &str = "world.ron";

/// Check a world snapshot for inconsistencies the engine would silently
/// tolerate: references to civilizations that do not exist, civilizations
/// at war with or allied to themselves, and negative strengths.
///
/// Returns a list of problems, empty when the snapshot is consistent.
#[must_use]
pub fn world_problems(world: &WorldSnapshot) -> Vec<String> {
    let known: BTreeSet<CivId> = world.agents().map(|agent| agent.id).collect();
    let mut errors = Vec::new();
    let mut check = |context: String, civ: CivId| {
        if !known.contains(&civ) {
            errors.push(format!("{context} refers to unknown {civ}"));
        }
    };

    for agent in world.agents() {
        for &enemy in &agent.active_wars {
            check(format!("{} active war", agent.id), enemy);
        }
        for &ally in &agent.allies {
            check(format!("{} alliance", agent.id), ally);
        }
        for relation in &agent.relations {
            check(format!("{} relation", agent.id), relation.civ);
        }
    }
    for border in &world.borders {
        check("border".to_string(), border.a);
        check("border".to_string(), border.b);
    }
    for garrison in &world.garrisons {
        check(format!("garrison on tile {}", garrison.tile.0), garrison.owner);
    }
    for capital in &world.capitals {
        check("capital".to_string(), capital.civ);
    }
    for edge in &world.terrain {
        check("terrain".to_string(), edge.attacker);
        check("terrain".to_string(), edge.defender);
    }

    for agent in world.agents() {
        if agent.is_at_war_with(agent.id) {
            errors.push(format!("{} is at war with itself", agent.id));
        }
        if agent.is_allied_with(agent.id) {
            errors.push(format!("{} is allied with itself", agent.id));
        }
        if agent.military_strength < Fixed::ZERO {
            errors.push(format!(
                "{} has negative military strength {}",
                agent.id, agent.military_strength
            ));
        }
        for city in &agent.cities {
            if city.defense_strength < Fixed::ZERO {
                errors.push(format!(
                    "{} city '{}' has negative defense {}",
                    agent.id, city.name, city.defense_strength
                ));
            }
        }
    }

    errors
}

/// Validate the RON data files in a directory.
///
/// Loads `params.ron` and `world.ron` if present; at least one must exist.
///
/// # Errors
///
/// Returns an error if a data file fails to load or validate, or if the
/// directory contains neither file.
pub fn validate_data_directory(path: &Path) -> DataLoadResult<()> {
    let params_path = path.join(PARAMS_FILE);
    let world_path = path.join(WORLD_FILE);
    let mut found = false;

    if params_path.exists() {
        load_params(&params_path)?;
        found = true;
    }
    if world_path.exists() {
        load_world(&world_path)?;
        found = true;
    }

    if found {
        Ok(())
    } else {
        Err(DataLoadError::NoDataFiles(path.display().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casus_test_utils::fixtures::{sixteen_civ_world, AgentBuilder, WorldBuilder};

    #[test]
    fn test_consistent_world_has_no_problems() {
        assert!(world_problems(&sixteen_civ_world()).is_empty());
    }

    #[test]
    fn test_dangling_references_reported() {
        let world = WorldBuilder::new(1)
            .agent(AgentBuilder::new(1).strength(10).at_war_with(5).relation(6, 10).build())
            .border(1, 7, &[1])
            .capital(8, 0, 0)
            .build();

        let problems = world_problems(&world);
        assert_eq!(problems.len(), 4);
        assert!(problems.iter().any(|p| p.contains("civ#5")));
        assert!(problems.iter().any(|p| p.contains("civ#8")));
    }

    #[test]
    fn test_self_references_reported() {
        let world = WorldBuilder::new(1)
            .agent(AgentBuilder::new(1).at_war_with(1).ally(1).build())
            .build();

        let problems = world_problems(&world);
        assert!(problems.iter().any(|p| p.contains("at war with itself")));
        assert!(problems.iter().any(|p| p.contains("allied with itself")));
    }

    #[test]
    fn test_empty_directory_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            validate_data_directory(dir.path()),
            Err(DataLoadError::NoDataFiles(_))
        ));
    }

    #[test]
    fn test_shipped_data_is_valid() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/data");
        validate_data_directory(&dir).unwrap();
    }
}
