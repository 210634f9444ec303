//! Party assembly.
//!
//! Names identify heroes in the vault, the world's contribution table and
//! every log line, so a party with two heroes of the same name is rejected
//! before any hero is built.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::info;

use crate::agent::{Agent, AgentDeps};
use crate::config::AgentConfig;
use crate::error::AgentError;

/// Build every hero in `configs` and introduce them to each other.
///
/// # Errors
///
/// Returns [`AgentError::DuplicateName`] for the first repeated name.
pub fn assemble_party<I>(configs: I, deps: &AgentDeps) -> Result<Vec<Arc<Agent>>, AgentError>
where
    I: IntoIterator<Item = AgentConfig>,
{
    let configs: Vec<AgentConfig> = configs.into_iter().collect();
    let mut seen = BTreeSet::new();
    for config in &configs {
        if !seen.insert(config.name.as_str()) {
            return Err(AgentError::DuplicateName(config.name.clone()));
        }
    }

    let party: Vec<Arc<Agent>> = configs
        .into_iter()
        .map(|config| Arc::new(Agent::new(config, deps)))
        .collect();
    let profiles: Vec<_> = party.iter().map(|hero| hero.profile()).collect();
    for hero in &party {
        hero.set_peers(profiles.iter().cloned());
    }

    info!(heroes = party.len(), "party assembled");
    Ok(party)
}
