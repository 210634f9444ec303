//! Shared world progression state.
//!
//! # Locking
//!
//! Three independent primitives, never nested:
//!
//! - `progress` (`RwLock`): stability, corruption, phase and outcome. Every
//!   read-then-write of derived state (phase advancement, drift, outcome)
//!   happens in its write section; [`WorldState::status`] uses the read
//!   section.
//! - `contributions` (`Mutex`): per-hero counters.
//! - `artifacts` (`Mutex`): revealed artifacts and their claimant, set once.
//!
//! Phase advancement reads the contribution total first, releases that
//! mutex, then re-checks the threshold inside the progress write section.
//! Only the call that moves the phase forward gets a [`PhaseAdvance`] back,
//! so reveals happen exactly once no matter how many callers cross the
//! threshold together.

use std::collections::BTreeMap;
use std::sync::{Mutex, RwLock};

use guildhall_types::{ArtifactStatus, DefeatReason, Outcome, WorldStatus, sync};
use tracing::{debug, info};

use crate::events::WorldEvent;
use crate::settings::WorldSettings;

/// Upper bound of stability and corruption.
pub const MAX_LEVEL: u32 = 100;

/// Phase the world starts in.
pub const FIRST_PHASE: u8 = 1;

/// Last phase.
pub const FINAL_PHASE: u8 = 3;

/// A phase transition, returned only to the caller that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseAdvance {
    /// Phase entered.
    pub phase: u8,
    /// Artifacts revealed by the transition.
    pub reveals: Vec<String>,
}

/// Result of an artifact claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// The caller now owns the artifact.
    Claimed {
        /// Phase transitions triggered by the achievement bonus.
        advances: Vec<PhaseAdvance>,
    },
    /// Someone got there first.
    AlreadyClaimed {
        /// The hero holding the artifact.
        by: String,
    },
    /// No such artifact has been revealed yet.
    NotRevealed,
}

#[derive(Debug)]
struct Progress {
    stability: u32,
    corruption: u32,
    phase: u8,
    outcome: Option<Outcome>,
}

/// Global progression counters shared by every hero and the supervisor.
#[derive(Debug)]
pub struct WorldState {
    settings: WorldSettings,
    progress: RwLock<Progress>,
    contributions: Mutex<BTreeMap<String, u64>>,
    artifacts: Mutex<BTreeMap<String, Option<String>>>,
}

impl Default for WorldState {
    fn default() -> Self {
        Self::new(WorldSettings::default())
    }
}

impl WorldState {
    /// Create a world in phase 1 with the initial artifacts revealed.
    ///
    /// Starting levels above [`MAX_LEVEL`] are clamped.
    pub fn new(settings: WorldSettings) -> Self {
        let artifacts = settings
            .initial_artifacts
            .iter()
            .map(|name| (name.clone(), None))
            .collect();
        Self {
            progress: RwLock::new(Progress {
                stability: settings.initial_stability.min(MAX_LEVEL),
                corruption: settings.initial_corruption.min(MAX_LEVEL),
                phase: FIRST_PHASE,
                outcome: None,
            }),
            contributions: Mutex::new(BTreeMap::new()),
            artifacts: Mutex::new(artifacts),
            settings,
        }
    }

    /// Settings this world was built from.
    pub const fn settings(&self) -> &WorldSettings {
        &self.settings
    }

    /// Credit `agent` with `amount` contribution and advance the phase if a
    /// threshold has been crossed.
    ///
    /// Returns the transitions this call performed; empty when the phase
    /// did not move (including when a concurrent caller moved it first).
    pub fn record_contribution(&self, agent: &str, amount: u64) -> Vec<PhaseAdvance> {
        let total = {
            let mut contributions = sync::lock(&self.contributions);
            let entry = contributions.entry(agent.to_owned()).or_insert(0);
            *entry = entry.saturating_add(amount);
            contributions
                .values()
                .fold(0_u64, |acc, v| acc.saturating_add(*v))
        };

        let advances = {
            let mut progress = sync::write(&self.progress);
            let mut advances = Vec::new();
            for threshold in &self.settings.thresholds {
                if threshold.phase > progress.phase
                    && progress.phase < FINAL_PHASE
                    && total >= threshold.total_contribution
                {
                    progress.phase = threshold.phase;
                    advances.push(PhaseAdvance {
                        phase: threshold.phase,
                        reveals: threshold.reveals.clone(),
                    });
                }
            }
            advances
        };

        if !advances.is_empty() {
            let mut artifacts = sync::lock(&self.artifacts);
            for advance in &advances {
                for name in &advance.reveals {
                    artifacts.entry(name.clone()).or_insert(None);
                }
            }
        }
        for advance in &advances {
            info!(
                phase = advance.phase,
                total,
                trigger = agent,
                reveals = ?advance.reveals,
                "world advanced to a new phase"
            );
        }
        advances
    }

    /// Claim `artifact` for `agent`. Set-once: the first claim wins.
    ///
    /// A successful claim is an achievement worth the configured bonus,
    /// credited after the artifact mutex is released.
    pub fn claim_artifact(&self, artifact: &str, agent: &str) -> ClaimOutcome {
        {
            let mut artifacts = sync::lock(&self.artifacts);
            let Some(slot) = artifacts.get_mut(artifact) else {
                return ClaimOutcome::NotRevealed;
            };
            if let Some(by) = slot {
                return ClaimOutcome::AlreadyClaimed { by: by.clone() };
            }
            *slot = Some(agent.to_owned());
        }
        info!(artifact, agent, "artifact claimed");
        let advances = self.record_contribution(agent, self.settings.achievement_bonus);
        ClaimOutcome::Claimed { advances }
    }

    /// Shift stability and corruption, clamped to `0..=MAX_LEVEL`.
    ///
    /// Returns the new `(stability, corruption)`.
    pub fn adjust(&self, stability_delta: i32, corruption_delta: i32) -> (u32, u32) {
        let mut progress = sync::write(&self.progress);
        progress.stability = shift(progress.stability, stability_delta);
        progress.corruption = shift(progress.corruption, corruption_delta);
        (progress.stability, progress.corruption)
    }

    /// Apply the world's share of `event`.
    ///
    /// Returns the new `(stability, corruption)`.
    pub fn apply_event(&self, event: WorldEvent) -> (u32, u32) {
        let (stability, corruption) = event.world_deltas();
        let levels = self.adjust(stability, corruption);
        debug!(event = %event, stability = levels.0, corruption = levels.1, "world event applied");
        levels
    }

    /// Decide the run's outcome if it is decided, and remember it.
    ///
    /// Defeat when corruption reaches [`MAX_LEVEL`] or stability reaches 0.
    /// Victory when the final phase is reached and every artifact revealed
    /// so far has been claimed; the champion is the top contributor. Once
    /// set, the outcome never changes.
    pub fn evaluate_outcome(&self) -> Option<Outcome> {
        // Claims and contributions only grow, so a snapshot taken before the
        // write section can delay a victory but never fake one.
        let claimed: BTreeMap<String, Option<String>> = sync::lock(&self.artifacts).clone();
        let champion = self.top_contributor();

        let mut progress = sync::write(&self.progress);
        if progress.outcome.is_some() {
            return progress.outcome.clone();
        }

        let outcome = if progress.corruption >= MAX_LEVEL {
            Some(Outcome::Defeat {
                reason: DefeatReason::CorruptionOverwhelmed,
            })
        } else if progress.stability == 0 {
            Some(Outcome::Defeat {
                reason: DefeatReason::StabilityCollapsed,
            })
        } else if progress.phase >= FINAL_PHASE {
            let expected = self.settings.artifacts_through(progress.phase);
            let all_claimed = !expected.is_empty()
                && expected
                    .iter()
                    .all(|name| matches!(claimed.get(name), Some(Some(_))));
            all_claimed.then(|| Outcome::Victory {
                champion: champion.unwrap_or_else(|| String::from("the guild")),
            })
        } else {
            None
        };

        if let Some(decided) = &outcome {
            info!(outcome = ?decided, "run outcome decided");
            progress.outcome = Some(decided.clone());
        }
        outcome
    }

    /// Revealed artifacts nobody has claimed yet.
    pub fn unclaimed_artifacts(&self) -> Vec<String> {
        sync::lock(&self.artifacts)
            .iter()
            .filter(|(_, by)| by.is_none())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Hero with the highest contribution; ties go to the first name in
    /// alphabetical order.
    pub fn top_contributor(&self) -> Option<String> {
        sync::lock(&self.contributions)
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(name, _)| name.clone())
    }

    /// Contribution credited to `agent`.
    pub fn contribution(&self, agent: &str) -> u64 {
        sync::lock(&self.contributions)
            .get(agent)
            .copied()
            .unwrap_or(0)
    }

    /// Current phase.
    pub fn phase(&self) -> u8 {
        sync::read(&self.progress).phase
    }

    /// Current outcome, if decided.
    pub fn outcome(&self) -> Option<Outcome> {
        sync::read(&self.progress).outcome.clone()
    }

    /// Snapshot for display.
    ///
    /// Levels, phase and outcome come from one read section; contributions
    /// and artifacts are read afterwards under their own mutexes.
    pub fn status(&self) -> WorldStatus {
        let (stability, corruption, phase, outcome) = {
            let progress = sync::read(&self.progress);
            (
                progress.stability,
                progress.corruption,
                progress.phase,
                progress.outcome.clone(),
            )
        };
        let contributions = sync::lock(&self.contributions).clone();
        let artifacts = sync::lock(&self.artifacts)
            .iter()
            .map(|(name, by)| ArtifactStatus {
                name: name.clone(),
                claimed_by: by.clone(),
            })
            .collect();
        WorldStatus {
            stability,
            corruption,
            phase,
            contributions,
            artifacts,
            outcome,
        }
    }
}

/// `current + delta`, clamped to `0..=MAX_LEVEL`.
fn shift(current: u32, delta: i32) -> u32 {
    let shifted = i64::from(current)
        .saturating_add(i64::from(delta))
        .clamp(0, i64::from(MAX_LEVEL));
    u32::try_from(shifted).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::PhaseThreshold;

    fn small_world() -> WorldState {
        WorldState::new(WorldSettings {
            initial_stability: 50,
            initial_corruption: 50,
            initial_artifacts: vec![String::from("Map")],
            thresholds: vec![
                PhaseThreshold {
                    phase: 2,
                    total_contribution: 10,
                    reveals: vec![String::from("Amulet")],
                },
                PhaseThreshold {
                    phase: 3,
                    total_contribution: 20,
                    reveals: vec![String::from("Crown")],
                },
            ],
            achievement_bonus: 1,
        })
    }

    #[test]
    fn shift_clamps_both_ends() {
        assert_eq!(shift(95, 10), 100);
        assert_eq!(shift(3, -10), 0);
        assert_eq!(shift(50, i32::MIN), 0);
        assert_eq!(shift(50, i32::MAX), 100);
    }

    #[test]
    fn adjust_clamps() {
        let world = small_world();
        assert_eq!(world.adjust(80, -80), (100, 0));
        assert_eq!(world.adjust(-150, 150), (0, 100));
    }

    #[test]
    fn contribution_crosses_thresholds_once() {
        let world = small_world();
        assert!(world.record_contribution("Aldric", 9).is_empty());
        let advance = world.record_contribution("Vex", 1);
        assert_eq!(
            advance,
            vec![PhaseAdvance {
                phase: 2,
                reveals: vec![String::from("Amulet")],
            }]
        );
        assert!(world.record_contribution("Vex", 1).is_empty());
        assert_eq!(world.phase(), 2);
        assert_eq!(world.contribution("Vex"), 2);
    }

    #[test]
    fn one_big_contribution_skips_to_final_phase() {
        let world = small_world();
        let advances = world.record_contribution("Mira", 50);
        let phases: Vec<u8> = advances.iter().map(|a| a.phase).collect();
        assert_eq!(phases, vec![2, 3]);
        assert_eq!(world.unclaimed_artifacts().len(), 3);
    }

    #[test]
    fn claims_are_set_once() {
        let world = small_world();
        assert!(matches!(world.claim_artifact("Map", "Aldric"), ClaimOutcome::Claimed { .. }));
        assert_eq!(
            world.claim_artifact("Map", "Vex"),
            ClaimOutcome::AlreadyClaimed {
                by: String::from("Aldric")
            }
        );
        assert_eq!(world.claim_artifact("Crown", "Vex"), ClaimOutcome::NotRevealed);
        assert_eq!(world.contribution("Aldric"), 1);
    }

    #[test]
    fn victory_needs_final_phase_and_all_claims() {
        let world = small_world();
        world.record_contribution("Aldric", 30);
        assert!(world.evaluate_outcome().is_none());
        for artifact in ["Map", "Amulet"] {
            world.claim_artifact(artifact, "Aldric");
        }
        assert!(world.evaluate_outcome().is_none());
        world.claim_artifact("Crown", "Mira");
        assert_eq!(
            world.evaluate_outcome(),
            Some(Outcome::Victory {
                champion: String::from("Aldric")
            })
        );
    }

    #[test]
    fn defeat_is_permanent() {
        let world = small_world();
        world.adjust(0, 60);
        let outcome = world.evaluate_outcome();
        assert_eq!(
            outcome,
            Some(Outcome::Defeat {
                reason: DefeatReason::CorruptionOverwhelmed
            })
        );
        world.adjust(0, -100);
        assert_eq!(world.evaluate_outcome(), outcome);
        assert_eq!(world.status().outcome, outcome);
    }

    #[test]
    fn stability_collapse_defeats() {
        let world = small_world();
        world.adjust(-50, 0);
        assert_eq!(
            world.evaluate_outcome(),
            Some(Outcome::Defeat {
                reason: DefeatReason::StabilityCollapsed
            })
        );
    }

    #[test]
    fn top_contributor_breaks_ties_by_name() {
        let world = small_world();
        assert!(world.top_contributor().is_none());
        world.record_contribution("Vex", 5);
        world.record_contribution("Aldric", 5);
        assert_eq!(world.top_contributor().as_deref(), Some("Aldric"));
        world.record_contribution("Vex", 1);
        assert_eq!(world.top_contributor().as_deref(), Some("Vex"));
    }

    #[test]
    fn status_reports_everything() {
        let world = small_world();
        world.record_contribution("Aldric", 4);
        world.claim_artifact("Map", "Aldric");
        let status = world.status();
        assert_eq!(status.phase, 1);
        assert_eq!(status.stability, 50);
        assert_eq!(status.contributions.get("Aldric"), Some(&5));
        assert_eq!(
            status.artifacts,
            vec![ArtifactStatus {
                name: String::from("Map"),
                claimed_by: Some(String::from("Aldric")),
            }]
        );
    }

    #[test]
    fn apply_event_moves_levels() {
        let world = small_world();
        assert_eq!(world.apply_event(WorldEvent::Blight), (50, 56));
        assert_eq!(world.apply_event(WorldEvent::Windfall { gold: 5 }), (50, 56));
    }
}
