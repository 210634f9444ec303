//! Console commands and their plain-text rendering.

use guildhall_core::{ShutdownReport, SimulationStatus};

use crate::error::EngineError;

/// Command list printed by `help`.
pub const HELP: &str = "\
commands:
  status        show heroes, world and shared resources
  status json   the same, as JSON
  pause         stop every hero after its current action
  resume        relaunch the heroes where they left off
  quit          shut down and print final statistics
  help          this list";

/// One console command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Print the current status.
    Status {
        /// Print JSON instead of text.
        json: bool,
    },
    /// Pause the run.
    Pause,
    /// Resume a paused run.
    Resume,
    /// Shut down and exit.
    Quit,
    /// Print the command list.
    Help,
}

impl Command {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, EngineError> {
        let lowered: Vec<String> = line.split_whitespace().map(str::to_lowercase).collect();
        let words: Vec<&str> = lowered.iter().map(String::as_str).collect();
        let command = match words.as_slice() {
            [] => return Ok(None),
            ["status" | "s"] => Self::Status { json: false },
            ["status" | "s", "json"] => Self::Status { json: true },
            ["pause" | "p"] => Self::Pause,
            ["resume" | "r"] => Self::Resume,
            ["quit" | "q" | "exit"] => Self::Quit,
            ["help" | "h" | "?"] => Self::Help,
            _ => {
                return Err(EngineError::UnknownCommand {
                    input: line.trim().to_owned(),
                });
            }
        };
        Ok(Some(command))
    }
}

/// Text rendering of a [`SimulationStatus`].
pub struct StatusView<'a>(pub &'a SimulationStatus);

impl core::fmt::Display for StatusView<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let status = self.0;
        write!(f, "state: {}  elapsed: {}s", status.state, status.elapsed_seconds)?;
        if let Some(reason) = &status.end_reason {
            write!(f, "  ended: {reason}")?;
        }
        writeln!(f)?;

        let world = &status.world;
        writeln!(
            f,
            "world: stability {}  corruption {}  phase {}",
            world.stability, world.corruption, world.phase
        )?;
        for artifact in &world.artifacts {
            match &artifact.claimed_by {
                Some(hero) => writeln!(f, "  artifact {}: claimed by {hero}", artifact.name)?,
                None => writeln!(f, "  artifact {}: unclaimed", artifact.name)?,
            }
        }

        let store = &status.store;
        let vault: Vec<String> = store
            .vault
            .iter()
            .map(|(kind, amount)| format!("{kind} {amount}"))
            .collect();
        writeln!(
            f,
            "store: vault [{}]  mana {}  loot {}/{}  shared items {}  for sale {}",
            vault.join(", "),
            store.mana_pool,
            store.loot_queued,
            store.loot_capacity,
            store.shared_inventory.len(),
            store.items_for_sale.len()
        )?;

        writeln!(f, "heroes ({}/{} standing):", status.heroes_alive, status.heroes.len())?;
        for hero in &status.heroes {
            let condition = match (hero.alive, hero.active) {
                (false, _) => "fallen",
                (true, true) => "active",
                (true, false) => "idle",
            };
            writeln!(
                f,
                "  {:<10} {:<8} hp {:>3}/{:<3} at {:<10} {} {:<3} items {:<2} {condition}",
                hero.name,
                hero.role.name(),
                hero.health,
                hero.max_health,
                hero.position.to_string(),
                hero.headline_label,
                hero.headline_value,
                hero.inventory_len,
            )?;
        }
        Ok(())
    }
}

/// Text rendering of the final statistics in a [`ShutdownReport`].
pub struct ReportView<'a>(pub &'a ShutdownReport);

impl core::fmt::Display for ReportView<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let report = self.0;
        writeln!(f, "{}", StatusView(&report.status))?;
        writeln!(f, "final statistics: {} recorded actions", report.stats.total)?;
        for (category, count) in &report.stats.by_category {
            writeln!(f, "  {category:?}: {count}")?;
        }
        for (actor, count) in &report.stats.by_actor {
            let contribution = report
                .status
                .world
                .contributions
                .get(actor)
                .copied()
                .unwrap_or(0);
            writeln!(f, "  {actor}: {count} actions, contribution {contribution}")?;
        }
        if !report.lagging.is_empty() {
            writeln!(f, "aborted after the shutdown timeout: {}", report.lagging.join(", "))?;
        }
        write!(f, "cancelled timers: {}", report.cancelled_timers)
    }
}
