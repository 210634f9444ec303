//! Configuration loading and typed config structures for the Guildhall
//! simulation.
//!
//! The canonical configuration lives in `guildhall-config.yaml` in the
//! working directory. Every section and every field has a default, so a
//! missing file, an empty file or a partial file all produce a runnable
//! simulation. [`SimulationConfig::validate`] rejects the combinations that
//! would not run (no heroes, clashing names, zero intervals, bad phase
//! thresholds).

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::time::Duration;

use guildhall_agents::{AgentConfig, default_max_health};
use guildhall_store::{GOLD, StoreConfig};
use guildhall_types::{Position, Role};
use guildhall_world::{PhaseThreshold, WorldError, WorldSettings};
use serde::Deserialize;
use tracing::info;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but cannot drive a simulation.
    #[error("invalid config: {reason}")]
    Invalid {
        /// What is wrong.
        reason: String,
    },

    /// The `progression` section describes an impossible world.
    #[error("invalid progression settings: {source}")]
    Progression {
        /// The underlying world settings error.
        #[from]
        source: WorldError,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `guildhall-config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// Name and wall-clock bound of the run.
    #[serde(default)]
    pub world: WorldConfig,

    /// The party roster.
    #[serde(default = "default_heroes")]
    pub heroes: Vec<HeroConfig>,

    /// Hero pacing and effect timings.
    #[serde(default)]
    pub timing: TimingConfig,

    /// Initial contents of the shared resources.
    #[serde(default)]
    pub store: StoreSection,

    /// World progression and the event generator.
    #[serde(default)]
    pub progression: ProgressionConfig,

    /// Monitor and shutdown timings.
    #[serde(default)]
    pub supervisor: SupervisorConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            heroes: default_heroes(),
            timing: TimingConfig::default(),
            store: StoreSection::default(),
            progression: ProgressionConfig::default(),
            supervisor: SupervisorConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }

    /// Load `path` if it exists (defaults otherwise) and validate the result.
    ///
    /// # Errors
    ///
    /// Any read, parse or validation failure.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = if path.exists() {
            Self::from_file(path)?
        } else {
            info!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot drive a simulation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] or [`ConfigError::Progression`]
    /// describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.heroes.is_empty() {
            return Err(invalid("the roster has no heroes"));
        }
        let mut names = BTreeSet::new();
        for hero in &self.heroes {
            if hero.name.trim().is_empty() {
                return Err(invalid("a hero has an empty name"));
            }
            if !names.insert(hero.name.as_str()) {
                return Err(invalid(format!("hero name {} is used twice", hero.name)));
            }
            if hero.max_health == Some(0) {
                return Err(invalid(format!("hero {} has zero max_health", hero.name)));
            }
        }

        let intervals = [
            ("timing.warrior_interval_ms", self.timing.warrior_interval_ms),
            ("timing.stealth_interval_ms", self.timing.stealth_interval_ms),
            ("timing.caster_interval_ms", self.timing.caster_interval_ms),
            ("store.loot_interval_ms", self.store.loot_interval_ms),
            ("progression.event_interval_ms", self.progression.event_interval_ms),
            ("supervisor.monitor_interval_ms", self.supervisor.monitor_interval_ms),
        ];
        if let Some((field, _)) = intervals.iter().find(|(_, ms)| *ms == 0) {
            return Err(invalid(format!("{field} must be greater than zero")));
        }
        if self.store.loot_capacity == 0 {
            return Err(invalid("store.loot_capacity must be greater than zero"));
        }
        if self.store.loot_table.is_empty() {
            return Err(invalid("store.loot_table is empty"));
        }

        self.world_settings().validate()?;
        Ok(())
    }

    /// One hero configuration per roster entry.
    pub fn agent_configs(&self) -> Vec<AgentConfig> {
        self.heroes
            .iter()
            .map(|hero| AgentConfig {
                name: hero.name.clone(),
                role: hero.role,
                max_health: hero.max_health.unwrap_or_else(|| default_max_health(hero.role)),
                start: hero.start,
                inventory_capacity: hero.inventory_capacity,
                interval: self.timing.interval(hero.role),
                effect_duration: Duration::from_millis(self.timing.effect_duration_ms),
                lurk_timeout: Duration::from_millis(self.timing.lurk_timeout_ms),
            })
            .collect()
    }

    /// Configuration of the shared resource store.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            vault: self.store.vault.clone(),
            mana_pool: self.store.mana_pool,
            loot_capacity: self.store.loot_capacity,
            restock_delay: Duration::from_millis(self.store.restock_delay_ms),
            trade_goods: self.store.trade_goods.clone(),
        }
    }

    /// World progression parameters.
    pub fn world_settings(&self) -> WorldSettings {
        let progression = &self.progression;
        WorldSettings {
            initial_stability: progression.initial_stability,
            initial_corruption: progression.initial_corruption,
            initial_artifacts: progression.initial_artifacts.clone(),
            thresholds: progression.thresholds.clone(),
            achievement_bonus: progression.achievement_bonus,
        }
    }
}

fn invalid(reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.into(),
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable simulation name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Maximum wall-clock seconds before the run ends (0 = unlimited).
    #[serde(default)]
    pub max_real_time_seconds: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            max_real_time_seconds: 0,
        }
    }
}

/// One roster entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HeroConfig {
    /// Unique hero name.
    pub name: String,

    /// Hero role.
    pub role: Role,

    /// Maximum health; the role default when omitted.
    #[serde(default)]
    pub max_health: Option<u32>,

    /// Starting position.
    #[serde(default)]
    pub start: Position,

    /// Private inventory slots; unbounded when omitted.
    #[serde(default)]
    pub inventory_capacity: Option<usize>,
}

impl HeroConfig {
    fn new(name: &str, role: Role, start: Position) -> Self {
        Self {
            name: name.to_owned(),
            role,
            max_health: None,
            start,
            inventory_capacity: None,
        }
    }
}

/// Hero pacing and effect timings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TimingConfig {
    /// Pause between two Warrior actions.
    #[serde(default = "default_warrior_interval_ms")]
    pub warrior_interval_ms: u64,

    /// Pause between two Stealth actions.
    #[serde(default = "default_stealth_interval_ms")]
    pub stealth_interval_ms: u64,

    /// Pause between two Caster actions.
    #[serde(default = "default_caster_interval_ms")]
    pub caster_interval_ms: u64,

    /// Lifetime of a special ability effect.
    #[serde(default = "default_effect_duration_ms")]
    pub effect_duration_ms: u64,

    /// Longest a Lurk waits for loot.
    #[serde(default = "default_lurk_timeout_ms")]
    pub lurk_timeout_ms: u64,
}

impl TimingConfig {
    /// Action interval for `role`.
    pub const fn interval(&self, role: Role) -> Duration {
        let ms = match role {
            Role::Warrior => self.warrior_interval_ms,
            Role::Stealth => self.stealth_interval_ms,
            Role::Caster => self.caster_interval_ms,
        };
        Duration::from_millis(ms)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            warrior_interval_ms: default_warrior_interval_ms(),
            stealth_interval_ms: default_stealth_interval_ms(),
            caster_interval_ms: default_caster_interval_ms(),
            effect_duration_ms: default_effect_duration_ms(),
            lurk_timeout_ms: default_lurk_timeout_ms(),
        }
    }
}

/// Initial contents of the shared resources and the loot generator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreSection {
    /// Initial vault balances per resource kind.
    #[serde(default = "default_vault")]
    pub vault: BTreeMap<String, u64>,

    /// Initial mana pool level.
    #[serde(default = "default_mana_pool")]
    pub mana_pool: u64,

    /// Loot queue capacity.
    #[serde(default = "default_loot_capacity")]
    pub loot_capacity: usize,

    /// Pause between two generated loot items.
    #[serde(default = "default_loot_interval_ms")]
    pub loot_interval_ms: u64,

    /// Items the loot generator draws from.
    #[serde(default = "default_loot_table")]
    pub loot_table: Vec<String>,

    /// Delay between a trading post sale and its restock.
    #[serde(default = "default_restock_delay_ms")]
    pub restock_delay_ms: u64,

    /// Goods listed at the trading post.
    #[serde(default = "default_trade_goods")]
    pub trade_goods: Vec<String>,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            vault: default_vault(),
            mana_pool: default_mana_pool(),
            loot_capacity: default_loot_capacity(),
            loot_interval_ms: default_loot_interval_ms(),
            loot_table: default_loot_table(),
            restock_delay_ms: default_restock_delay_ms(),
            trade_goods: default_trade_goods(),
        }
    }
}

/// World progression parameters and the world-event generator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProgressionConfig {
    /// Starting stability (0-100).
    #[serde(default = "default_initial_stability")]
    pub initial_stability: u32,

    /// Starting corruption (0-100).
    #[serde(default = "default_initial_corruption")]
    pub initial_corruption: u32,

    /// Artifacts revealed from the start.
    #[serde(default = "default_initial_artifacts")]
    pub initial_artifacts: Vec<String>,

    /// Contribution thresholds for phases 2 and 3.
    #[serde(default = "default_thresholds")]
    pub thresholds: Vec<PhaseThreshold>,

    /// Contribution awarded for claiming an artifact.
    #[serde(default = "default_achievement_bonus")]
    pub achievement_bonus: u64,

    /// Pause between two world events.
    #[serde(default = "default_event_interval_ms")]
    pub event_interval_ms: u64,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            initial_stability: default_initial_stability(),
            initial_corruption: default_initial_corruption(),
            initial_artifacts: default_initial_artifacts(),
            thresholds: default_thresholds(),
            achievement_bonus: default_achievement_bonus(),
            event_interval_ms: default_event_interval_ms(),
        }
    }
}

/// Supervisor timings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SupervisorConfig {
    /// Pause between two monitor passes.
    #[serde(default = "default_monitor_interval_ms")]
    pub monitor_interval_ms: u64,

    /// Longest shutdown waits for each task before aborting it.
    #[serde(default = "default_shutdown_timeout_ms")]
    pub shutdown_timeout_ms: u64,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            monitor_interval_ms: default_monitor_interval_ms(),
            shutdown_timeout_ms: default_shutdown_timeout_ms(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default log level when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    String::from("The Guildhall")
}

fn default_heroes() -> Vec<HeroConfig> {
    vec![
        HeroConfig::new("Aldric", Role::Warrior, Position::new(0, 0)),
        HeroConfig::new("Vex", Role::Stealth, Position::new(2, 1)),
        HeroConfig::new("Mira", Role::Caster, Position::new(-1, 2)),
    ]
}

const fn default_warrior_interval_ms() -> u64 {
    2000
}

const fn default_stealth_interval_ms() -> u64 {
    1500
}

const fn default_caster_interval_ms() -> u64 {
    2500
}

const fn default_effect_duration_ms() -> u64 {
    6000
}

const fn default_lurk_timeout_ms() -> u64 {
    3000
}

fn default_vault() -> BTreeMap<String, u64> {
    BTreeMap::from([
        (String::from(GOLD), 500),
        (String::from("Gems"), 40),
        (String::from("Relics"), 5),
    ])
}

const fn default_mana_pool() -> u64 {
    1000
}

const fn default_loot_capacity() -> usize {
    50
}

const fn default_loot_interval_ms() -> u64 {
    1200
}

fn default_loot_table() -> Vec<String> {
    [
        "Ruby",
        "Silver Ring",
        "Healing Herb",
        "Ancient Coin",
        "Dragon Scale",
        "Elven Bow",
        "Moonstone",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

const fn default_restock_delay_ms() -> u64 {
    5000
}

fn default_trade_goods() -> Vec<String> {
    StoreConfig::default().trade_goods
}

fn default_initial_stability() -> u32 {
    WorldSettings::default().initial_stability
}

fn default_initial_corruption() -> u32 {
    WorldSettings::default().initial_corruption
}

fn default_initial_artifacts() -> Vec<String> {
    WorldSettings::default().initial_artifacts
}

fn default_thresholds() -> Vec<PhaseThreshold> {
    WorldSettings::default().thresholds
}

fn default_achievement_bonus() -> u64 {
    WorldSettings::default().achievement_bonus
}

const fn default_event_interval_ms() -> u64 {
    4000
}

const fn default_monitor_interval_ms() -> u64 {
    1000
}

const fn default_shutdown_timeout_ms() -> u64 {
    5000
}

fn default_log_level() -> String {
    String::from("info")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.heroes.len(), 3);
        assert_eq!(config.timing.interval(Role::Stealth), Duration::from_millis(1500));
        assert_eq!(config.store.vault.get(GOLD), Some(&500));
        assert_eq!(config.world_settings(), WorldSettings::default());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
world:
  name: "Test Hall"
  max_real_time_seconds: 30

heroes:
  - name: Brienne
    role: warrior
    max_health: 150
    start: { x: 3, y: -2 }
  - name: Shade
    role: stealth
    inventory_capacity: 5

timing:
  warrior_interval_ms: 100
  stealth_interval_ms: 80
  caster_interval_ms: 120
  effect_duration_ms: 500
  lurk_timeout_ms: 200

store:
  vault:
    Gold: 900
  mana_pool: 300
  loot_capacity: 10
  loot_interval_ms: 50
  loot_table: [Pearl]
  restock_delay_ms: 250
  trade_goods: [Lantern, Rope]

progression:
  initial_stability: 70
  initial_corruption: 10
  initial_artifacts: [Old Key]
  thresholds:
    - phase: 2
      total_contribution: 40
      reveals: [Silver Lock]
    - phase: 3
      total_contribution: 90
  achievement_bonus: 5
  event_interval_ms: 75

supervisor:
  monitor_interval_ms: 60
  shutdown_timeout_ms: 900

logging:
  level: "debug"
"#;

        let config = SimulationConfig::parse(yaml);
        assert!(config.is_ok(), "{config:?}");
        let config = config.ok().unwrap_or_default();
        assert!(config.validate().is_ok());

        assert_eq!(config.world.name, "Test Hall");
        assert_eq!(config.world.max_real_time_seconds, 30);
        assert_eq!(config.store.loot_table, vec![String::from("Pearl")]);
        assert_eq!(config.progression.event_interval_ms, 75);
        assert_eq!(config.logging.level, "debug");

        let heroes = config.agent_configs();
        assert_eq!(heroes.len(), 2);
        let brienne = heroes.first().cloned();
        assert_eq!(brienne.as_ref().map(|h| h.max_health), Some(150));
        assert_eq!(brienne.as_ref().map(|h| h.start), Some(Position::new(3, -2)));
        assert_eq!(brienne.map(|h| h.interval), Some(Duration::from_millis(100)));
        let shade = heroes.get(1).cloned();
        assert_eq!(shade.as_ref().map(|h| h.max_health), Some(90));
        assert_eq!(shade.map(|h| h.inventory_capacity), Some(Some(5)));

        let store = config.store_config();
        assert_eq!(store.restock_delay, Duration::from_millis(250));
        assert_eq!(store.trade_goods.len(), 2);

        let world = config.world_settings();
        assert_eq!(world.initial_artifacts, vec![String::from("Old Key")]);
        assert_eq!(world.artifacts_through(3).len(), 2);
    }

    #[test]
    fn parse_minimal_yaml() {
        let yaml = "world:\n  name: Small Hall\n";
        let config = SimulationConfig::parse(yaml);
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        // Name is overridden
        assert_eq!(config.world.name, "Small Hall");
        // Everything else uses defaults
        assert_eq!(config.heroes.len(), 3);
        assert_eq!(config.store.mana_pool, 1000);
        assert_eq!(config.supervisor.shutdown_timeout_ms, 5000);
    }

    #[test]
    fn parse_empty_yaml() {
        let config = SimulationConfig::parse("");
        assert!(config.is_ok());
    }

    #[test]
    fn empty_roster_is_rejected() {
        let config = SimulationConfig::parse("heroes: []\n").ok().unwrap_or_default();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let yaml = "heroes:\n  - { name: Aldric, role: warrior }\n  - { name: Aldric, role: caster }\n";
        let config = SimulationConfig::parse(yaml).ok().unwrap_or_default();
        let err = config.validate();
        assert!(
            matches!(&err, Err(ConfigError::Invalid { reason }) if reason.contains("Aldric")),
            "{err:?}"
        );
    }

    #[test]
    fn zero_interval_is_rejected() {
        let mut config = SimulationConfig::default();
        config.supervisor.monitor_interval_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn non_increasing_thresholds_are_rejected() {
        let yaml = r"
progression:
  thresholds:
    - { phase: 2, total_contribution: 100 }
    - { phase: 3, total_contribution: 100 }
";
        let config = SimulationConfig::parse(yaml).ok().unwrap_or_default();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Progression {
                source: WorldError::NonIncreasingThreshold { .. }
            })
        ));
    }

    #[test]
    fn malformed_yaml_is_a_yaml_error() {
        let result = SimulationConfig::parse("heroes: [ { name: Aldric, role: bard } ]");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = SimulationConfig::load(Path::new("does-not-exist/guildhall-config.yaml"));
        assert!(config.is_ok());
        assert_eq!(config.ok().unwrap_or_default(), SimulationConfig::default());
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("guildhall-config.yaml");
        if path.exists() {
            let config = SimulationConfig::load(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
