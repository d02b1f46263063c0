//! Configuration loading and typed config structures for the Granary
//! simulation.
//!
//! Configuration is an optional YAML file (`granary.yaml` by convention).
//! Every field has a default equal to the tuned constants of the city
//! model, so an empty document and a missing file both yield the standard
//! game.

use std::path::Path;

use serde::Deserialize;

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

    /// A value parsed but makes no sense for the simulation.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// Starting state and seed.
    #[serde(default)]
    pub world: WorldConfig,

    /// Grain consumption and random shocks.
    #[serde(default)]
    pub economy: EconomyConfig,

    /// Contract deadlines, rewards, and resolution odds.
    #[serde(default)]
    pub contracts: ContractConfig,

    /// Unrest pressure weights.
    #[serde(default)]
    pub unrest: UnrestConfig,

    /// Event log retention.
    #[serde(default)]
    pub events: EventLogConfig,

    /// Dashboard server settings.
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// Config file looked for in the working directory when none is given.
pub const DEFAULT_CONFIG_PATH: &str = "granary.yaml";

impl SimulationConfig {
    /// Load configuration for a front end.
    ///
    /// An explicit path must exist. Without one, [`DEFAULT_CONFIG_PATH`] is
    /// read if present and the built-in defaults are used otherwise.
    ///
    /// # Errors
    ///
    /// Same as [`SimulationConfig::from_file`].
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_PATH);
                if fallback.is_file() {
                    Self::from_file(fallback)
                } else {
                    Self::parse("")
                }
            }
        }
    }

    /// Load configuration from a YAML file at the given path.
    ///
    /// `GRANARY_PORT` overrides `dashboard.port` when set to a valid port.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // serde_yml rejects an empty document; treat it as "all defaults".
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.dashboard.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let percentages = [
            ("economy.shortage_chance_pct", self.economy.shortage_chance_pct),
            ("economy.relief_chance_pct", self.economy.relief_chance_pct),
            ("contracts.success_pct.stable", self.contracts.success_pct.stable),
            ("contracts.success_pct.tight", self.contracts.success_pct.tight),
            ("contracts.success_pct.scarce", self.contracts.success_pct.scarce),
            ("contracts.success_pct.critical", self.contracts.success_pct.critical),
            ("contracts.success_cap_pct", self.contracts.success_cap_pct),
        ];
        for (name, value) in percentages {
            if value > 100 {
                return Err(ConfigError::Invalid {
                    reason: format!("{name} must be at most 100, got {value}"),
                });
            }
        }
        if !(0..=100).contains(&self.world.starting_unrest) {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "world.starting_unrest must be within 0..=100, got {}",
                    self.world.starting_unrest
                ),
            });
        }
        if self.world.starting_grain < 0 {
            return Err(ConfigError::Invalid {
                reason: "world.starting_grain must not be negative".to_owned(),
            });
        }
        if self.economy.consumption_jitter < 0 {
            return Err(ConfigError::Invalid {
                reason: "economy.consumption_jitter must not be negative".to_owned(),
            });
        }
        if self.unrest.critical_streak_ticks == 0 {
            return Err(ConfigError::Invalid {
                reason: "unrest.critical_streak_ticks must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}

/// Starting state and seed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Random seed. Zero asks the front end to derive one from the clock.
    #[serde(default)]
    pub seed: u64,

    /// Grain in store on day 1.
    #[serde(default = "default_starting_grain")]
    pub starting_grain: i64,

    /// Unrest on day 1.
    #[serde(default)]
    pub starting_unrest: i64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            starting_grain: default_starting_grain(),
            starting_unrest: 0,
        }
    }
}

/// Grain consumption and random shocks.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EconomyConfig {
    /// Fixed grain eaten every tick.
    #[serde(default = "default_base_consumption")]
    pub base_consumption: i64,

    /// Upper bound (inclusive) of the extra uniform draw on top of the base.
    #[serde(default = "default_consumption_jitter")]
    pub consumption_jitter: i64,

    /// Percent chance per tick of a shortage.
    #[serde(default = "default_shortage_chance_pct")]
    pub shortage_chance_pct: u32,

    /// Grain lost to a shortage.
    #[serde(default = "default_shortage_amount")]
    pub shortage_amount: i64,

    /// Percent chance per tick of a relief shipment while grain is not Stable.
    #[serde(default = "default_relief_chance_pct")]
    pub relief_chance_pct: u32,

    /// Grain gained from a relief shipment.
    #[serde(default = "default_relief_amount")]
    pub relief_amount: i64,
}

impl EconomyConfig {
    /// Turn off both random shocks, leaving only consumption.
    #[must_use]
    pub const fn without_shocks(mut self) -> Self {
        self.shortage_chance_pct = 0;
        self.relief_chance_pct = 0;
        self
    }
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            base_consumption: default_base_consumption(),
            consumption_jitter: default_consumption_jitter(),
            shortage_chance_pct: default_shortage_chance_pct(),
            shortage_amount: default_shortage_amount(),
            relief_chance_pct: default_relief_chance_pct(),
            relief_amount: default_relief_amount(),
        }
    }
}

/// Per-tier base success chance for contract resolution.
///
/// Tiers left out of a YAML block keep their default chance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TierChances {
    /// Chance while grain is Stable.
    pub stable: u32,
    /// Chance while grain is Tight.
    pub tight: u32,
    /// Chance while grain is Scarce.
    pub scarce: u32,
    /// Chance while grain is Critical.
    pub critical: u32,
}

impl TierChances {
    /// The same chance at every tier.
    pub const fn flat(pct: u32) -> Self {
        Self {
            stable: pct,
            tight: pct,
            scarce: pct,
            critical: pct,
        }
    }
}

impl Default for TierChances {
    fn default() -> Self {
        Self {
            stable: 70,
            tight: 55,
            scarce: 40,
            critical: 25,
        }
    }
}

/// Contract deadlines, rewards, and resolution odds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContractConfig {
    /// Ticks an Emergency contract stays open.
    #[serde(default = "default_emergency_deadline")]
    pub emergency_deadline: i32,

    /// Ticks a Smuggling contract stays open.
    #[serde(default = "default_smuggling_deadline")]
    pub smuggling_deadline: i32,

    /// Grain delivered when an Emergency contract is fulfilled.
    #[serde(default = "default_emergency_reward")]
    pub emergency_reward: i64,

    /// Grain delivered when a Smuggling contract is fulfilled.
    #[serde(default = "default_smuggling_reward")]
    pub smuggling_reward: i64,

    /// Base success chance by grain tier.
    #[serde(default)]
    pub success_pct: TierChances,

    /// Extra success chance for contracts the player accepted.
    #[serde(default = "default_accepted_bonus_pct")]
    pub accepted_bonus_pct: u32,

    /// Ceiling applied after the accepted bonus.
    #[serde(default = "default_success_cap_pct")]
    pub success_cap_pct: u32,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            emergency_deadline: default_emergency_deadline(),
            smuggling_deadline: default_smuggling_deadline(),
            emergency_reward: default_emergency_reward(),
            smuggling_reward: default_smuggling_reward(),
            success_pct: TierChances::default(),
            accepted_bonus_pct: default_accepted_bonus_pct(),
            success_cap_pct: default_success_cap_pct(),
        }
    }
}

/// Unrest pressure weights.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UnrestConfig {
    /// Unrest added while the effective market multiplier is at least 2.0.
    #[serde(default = "default_price_pressure")]
    pub price_pressure: i64,

    /// Consecutive Critical ticks before the streak penalty fires.
    #[serde(default = "default_critical_streak_ticks")]
    pub critical_streak_ticks: u32,

    /// Unrest added when the streak penalty fires.
    #[serde(default = "default_critical_streak_penalty")]
    pub critical_streak_penalty: i64,

    /// Unrest added per failed contract.
    #[serde(default = "default_failure_penalty")]
    pub failure_penalty: i64,

    /// Unrest removed per fulfilled contract.
    #[serde(default = "default_fulfillment_relief")]
    pub fulfillment_relief: i64,

    /// Unrest removed by an investigation.
    #[serde(default = "default_investigate_relief")]
    pub investigate_relief: i64,
}

impl Default for UnrestConfig {
    fn default() -> Self {
        Self {
            price_pressure: default_price_pressure(),
            critical_streak_ticks: default_critical_streak_ticks(),
            critical_streak_penalty: default_critical_streak_penalty(),
            failure_penalty: default_failure_penalty(),
            fulfillment_relief: default_fulfillment_relief(),
            investigate_relief: default_investigate_relief(),
        }
    }
}

/// Event log retention.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EventLogConfig {
    /// Maximum retained events. `null` keeps everything.
    #[serde(default = "default_event_capacity")]
    pub capacity: Option<usize>,
}

impl Default for EventLogConfig {
    fn default() -> Self {
        Self {
            capacity: default_event_capacity(),
        }
    }
}

/// Dashboard server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DashboardConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Where to persist the shared world between restarts. Disabled if unset.
    #[serde(default)]
    pub snapshot_path: Option<String>,
}

impl DashboardConfig {
    /// Override the port with `GRANARY_PORT` when it holds a valid port.
    pub fn apply_env_overrides(&mut self) {
        if let Some(port) = std::env::var("GRANARY_PORT")
            .ok()
            .and_then(|val| val.parse::<u16>().ok())
        {
            self.port = port;
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            snapshot_path: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

const fn default_starting_grain() -> i64 {
    300
}

const fn default_base_consumption() -> i64 {
    18
}

const fn default_consumption_jitter() -> i64 {
    8
}

const fn default_shortage_chance_pct() -> u32 {
    10
}

const fn default_shortage_amount() -> i64 {
    25
}

const fn default_relief_chance_pct() -> u32 {
    8
}

const fn default_relief_amount() -> i64 {
    20
}

const fn default_emergency_deadline() -> i32 {
    4
}

const fn default_smuggling_deadline() -> i32 {
    3
}

const fn default_emergency_reward() -> i64 {
    60
}

const fn default_smuggling_reward() -> i64 {
    30
}

const fn default_accepted_bonus_pct() -> u32 {
    15
}

const fn default_success_cap_pct() -> u32 {
    95
}

const fn default_price_pressure() -> i64 {
    5
}

const fn default_critical_streak_ticks() -> u32 {
    4
}

const fn default_critical_streak_penalty() -> i64 {
    10
}

const fn default_failure_penalty() -> i64 {
    15
}

const fn default_fulfillment_relief() -> i64 {
    10
}

const fn default_investigate_relief() -> i64 {
    5
}

#[allow(clippy::unnecessary_wraps)]
const fn default_event_capacity() -> Option<usize> {
    Some(200)
}

fn default_host() -> String {
    "127.0.0.1".to_owned()
}

const fn default_port() -> u16 {
    8080
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_city_model() {
        let config = SimulationConfig::default();
        assert_eq!(config.world.starting_grain, 300);
        assert_eq!(config.world.starting_unrest, 0);
        assert_eq!(config.economy.base_consumption, 18);
        assert_eq!(config.economy.shortage_chance_pct, 10);
        assert_eq!(config.contracts.emergency_deadline, 4);
        assert_eq!(config.contracts.smuggling_deadline, 3);
        assert_eq!(config.contracts.success_pct.critical, 25);
        assert_eq!(config.unrest.critical_streak_ticks, 4);
        assert_eq!(config.events.capacity, Some(200));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_success_block_keeps_other_tiers() {
        let config = SimulationConfig::parse("contracts:\n  success_pct:\n    stable: 90\n");
        assert!(config.is_ok(), "parse failed: {config:?}");
        let chances = config.ok().unwrap_or_default().contracts.success_pct;
        assert_eq!(
            chances,
            TierChances {
                stable: 90,
                ..TierChances::default()
            }
        );
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
world:
  seed: 99
  starting_grain: 120
  starting_unrest: 20

economy:
  base_consumption: 10
  consumption_jitter: 0
  shortage_chance_pct: 0
  shortage_amount: 25
  relief_chance_pct: 0
  relief_amount: 20

contracts:
  emergency_deadline: 5
  smuggling_deadline: 2
  emergency_reward: 80
  smuggling_reward: 40
  success_pct:
    stable: 90
    tight: 80
    scarce: 70
    critical: 60
  accepted_bonus_pct: 10
  success_cap_pct: 99

unrest:
  price_pressure: 4
  critical_streak_ticks: 3
  critical_streak_penalty: 12
  failure_penalty: 20
  fulfillment_relief: 8
  investigate_relief: 6

events:
  capacity: ~

dashboard:
  host: "0.0.0.0"
  port: 9191
  snapshot_path: "/tmp/granary.json"
"#;

        let config = SimulationConfig::parse(yaml);
        assert!(config.is_ok(), "parse failed: {config:?}");
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.world.seed, 99);
        assert_eq!(config.world.starting_grain, 120);
        assert_eq!(config.economy.consumption_jitter, 0);
        assert_eq!(config.contracts.success_pct.scarce, 70);
        assert_eq!(config.unrest.critical_streak_ticks, 3);
        assert_eq!(config.events.capacity, None);
        assert_eq!(
            config.dashboard.snapshot_path.as_deref(),
            Some("/tmp/granary.json")
        );
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = SimulationConfig::parse("world:\n  seed: 7\n");
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.world.seed, 7);
        assert_eq!(config.world.starting_grain, 300);
        assert_eq!(config.contracts.emergency_reward, 60);
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(SimulationConfig::parse("").is_ok());
    }

    #[test]
    fn rejects_out_of_range_percentages() {
        let result = SimulationConfig::parse("economy:\n  shortage_chance_pct: 140\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn rejects_out_of_range_starting_unrest() {
        let result = SimulationConfig::parse("world:\n  starting_unrest: 101\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn without_shocks_zeroes_both_chances() {
        let economy = EconomyConfig::default().without_shocks();
        assert_eq!(economy.shortage_chance_pct, 0);
        assert_eq!(economy.relief_chance_pct, 0);
        assert_eq!(economy.base_consumption, 18);
    }
}
