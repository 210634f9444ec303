//! Tunable world parameters.
//!
//! These deserialize straight out of the `progression` section of
//! `guildhall-config.yaml`; every field has a default so a partial section
//! is valid.

use serde::{Deserialize, Serialize};

use crate::error::WorldError;
use crate::state::{FINAL_PHASE, MAX_LEVEL};

/// Contribution total at which the world advances to `phase`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseThreshold {
    /// Phase entered when the threshold is crossed (2 or 3).
    pub phase: u8,
    /// Combined contribution of all heroes required to enter the phase.
    pub total_contribution: u64,
    /// Artifacts revealed on entering the phase.
    #[serde(default)]
    pub reveals: Vec<String>,
}

/// Parameters of one world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSettings {
    /// Starting stability.
    pub initial_stability: u32,
    /// Starting corruption.
    pub initial_corruption: u32,
    /// Artifacts revealed from the start.
    pub initial_artifacts: Vec<String>,
    /// Phase thresholds, phase 2 then phase 3.
    pub thresholds: Vec<PhaseThreshold>,
    /// Contribution awarded for claiming an artifact.
    pub achievement_bonus: u64,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            initial_stability: 60,
            initial_corruption: 20,
            initial_artifacts: vec![String::from("Ancient Map")],
            thresholds: vec![
                PhaseThreshold {
                    phase: 2,
                    total_contribution: 100,
                    reveals: vec![String::from("Sunstone Amulet"), String::from("Moonsilver Blade")],
                },
                PhaseThreshold {
                    phase: FINAL_PHASE,
                    total_contribution: 250,
                    reveals: vec![String::from("Crown of Embers")],
                },
            ],
            achievement_bonus: 25,
        }
    }
}

impl WorldSettings {
    /// Check levels and threshold ordering.
    ///
    /// # Errors
    ///
    /// Returns the first [`WorldError`] found.
    pub fn validate(&self) -> Result<(), WorldError> {
        if self.initial_stability > MAX_LEVEL {
            return Err(WorldError::LevelOutOfRange {
                field: "initial_stability",
                value: self.initial_stability,
            });
        }
        if self.initial_corruption > MAX_LEVEL {
            return Err(WorldError::LevelOutOfRange {
                field: "initial_corruption",
                value: self.initial_corruption,
            });
        }

        let phases: Vec<u8> = self.thresholds.iter().map(|t| t.phase).collect();
        if phases != [2, FINAL_PHASE] {
            return Err(WorldError::BadPhaseSequence { phases });
        }

        let mut previous = 0_u64;
        for threshold in &self.thresholds {
            if threshold.total_contribution <= previous {
                return Err(WorldError::NonIncreasingThreshold {
                    phase: threshold.phase,
                    total: threshold.total_contribution,
                    previous,
                });
            }
            previous = threshold.total_contribution;
        }
        Ok(())
    }

    /// Every artifact that exists once `phase` has been reached.
    pub fn artifacts_through(&self, phase: u8) -> Vec<String> {
        self.initial_artifacts
            .iter()
            .chain(
                self.thresholds
                    .iter()
                    .filter(|t| t.phase <= phase)
                    .flat_map(|t| t.reveals.iter()),
            )
            .cloned()
            .collect()
    }
}
