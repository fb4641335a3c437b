//! Configuration loading and typed config structures for Colony.
//!
//! The configuration lives in `colony-config.yaml` in the working
//! directory. Every field has a default, so an empty or missing file yields
//! the stock simulator: two-color rule, 15% seeding density, 75 ms / 40 ms
//! tick intervals, no run limits.
//!
//! Grid size is not configurable.

use std::path::Path;

use colony_types::RuleVariant;
use serde::Deserialize;
use tracing::warn;

use crate::clock::{ClockError, TickIntervals};

/// Environment variable that overrides `simulation.seed`.
pub const SEED_ENV: &str = "COLONY_SEED";

/// Environment variable that overrides `simulation.variant`.
pub const VARIANT_ENV: &str = "COLONY_VARIANT";

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

    /// The values parsed but cannot be used.
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

/// Top-level configuration, mirroring `colony-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ColonyConfig {
    /// Rule and seeding.
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Tick cadence.
    #[serde(default)]
    pub clock: ClockConfig,

    /// When a run ends on its own.
    #[serde(default)]
    pub bounds: BoundsConfig,

    /// Log filtering.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Terminal rendering.
    #[serde(default)]
    pub display: DisplayConfig,
}

impl ColonyConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `COLONY_SEED` and `COLONY_VARIANT` override the file when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string. No environment overrides
    /// are applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // serde_yml reads an empty document as unit, not as an empty map.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `COLONY_SEED` / `COLONY_VARIANT` from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// Unparseable values are logged and skipped.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(raw) = lookup(SEED_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(seed) => self.simulation.seed = Some(seed),
                Err(_err) => warn!(value = %raw, "Ignoring unparseable {SEED_ENV}"),
            }
        }
        if let Some(raw) = lookup(VARIANT_ENV) {
            match RuleVariant::from_name(&raw) {
                Some(variant) => self.simulation.variant = variant,
                None => warn!(value = %raw, "Ignoring unknown {VARIANT_ENV}"),
            }
        }
    }

    /// Check value ranges the type system does not capture.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a density outside `[0, 1]` or a
    /// zero tick interval.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let density = self.simulation.density;
        if !(0.0..=1.0).contains(&density) {
            return Err(ConfigError::Invalid {
                reason: format!("simulation.density must be within [0, 1], got {density}"),
            });
        }
        self.clock
            .intervals()
            .map_err(|err| ConfigError::Invalid {
                reason: err.to_string(),
            })?;
        if self.display.render_every == 0 {
            return Err(ConfigError::Invalid {
                reason: "display.render_every must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}

/// Rule and seeding configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Rule variant: `monochrome` or `two_color`.
    #[serde(default)]
    pub variant: RuleVariant,

    /// Share of cells alive after a randomize.
    #[serde(default = "default_density")]
    pub density: f64,

    /// RNG seed for reproducible runs (random when absent).
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            variant: RuleVariant::default(),
            density: default_density(),
            seed: None,
        }
    }
}

/// Tick cadence configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClockConfig {
    /// Milliseconds between ticks at normal speed.
    #[serde(default = "default_normal_interval_ms")]
    pub normal_interval_ms: u64,

    /// Milliseconds between ticks at fast speed.
    #[serde(default = "default_fast_interval_ms")]
    pub fast_interval_ms: u64,

    /// Start at fast speed.
    #[serde(default)]
    pub start_fast: bool,
}

impl ClockConfig {
    /// The configured periods.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidInterval`] if either value is zero.
    pub fn intervals(&self) -> Result<TickIntervals, ClockError> {
        TickIntervals::from_millis(self.normal_interval_ms, self.fast_interval_ms)
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            normal_interval_ms: default_normal_interval_ms(),
            fast_interval_ms: default_fast_interval_ms(),
            start_fast: false,
        }
    }
}

/// Run limits. A value of 0 means unlimited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BoundsConfig {
    /// Ticks after which the run ends (0 = unlimited).
    #[serde(default)]
    pub max_ticks: u64,

    /// Wall-clock seconds after which the run ends (0 = unlimited).
    #[serde(default)]
    pub max_real_time_seconds: u64,
}

impl BoundsConfig {
    /// Whether any limit is set.
    pub const fn is_bounded(&self) -> bool {
        self.max_ticks > 0 || self.max_real_time_seconds > 0
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
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

/// Terminal rendering configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DisplayConfig {
    /// Draw a frame every N generations while running.
    #[serde(default = "default_render_every")]
    pub render_every: u64,

    /// Draw frames at all (counters are always logged).
    #[serde(default = "default_true")]
    pub show_frames: bool,

    /// Emit each frame as one JSON snapshot line instead of ASCII art.
    #[serde(default)]
    pub json_frames: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            render_every: default_render_every(),
            show_frames: default_true(),
            json_frames: false,
        }
    }
}

const fn default_density() -> f64 {
    0.15
}

const fn default_normal_interval_ms() -> u64 {
    75
}

const fn default_fast_interval_ms() -> u64 {
    40
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_render_every() -> u64 {
    1
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn default_config_matches_stock_simulator() {
        let config = ColonyConfig::default();
        assert_eq!(config.simulation.variant, RuleVariant::TwoColor);
        assert!((config.simulation.density - 0.15).abs() < f64::EPSILON);
        assert_eq!(config.simulation.seed, None);
        assert_eq!(config.clock.normal_interval_ms, 75);
        assert_eq!(config.clock.fast_interval_ms, 40);
        assert!(!config.bounds.is_bounded());
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
simulation:
  variant: monochrome
  density: 0.3
  seed: 42

clock:
  normal_interval_ms: 100
  fast_interval_ms: 20
  start_fast: true

bounds:
  max_ticks: 500
  max_real_time_seconds: 60

logging:
  level: "debug"

display:
  render_every: 5
  show_frames: false
  json_frames: true
"#;
        let config = ColonyConfig::parse(yaml).unwrap();
        assert_eq!(config.simulation.variant, RuleVariant::Monochrome);
        assert_eq!(config.simulation.seed, Some(42));
        assert!(config.clock.start_fast);
        assert_eq!(config.bounds.max_ticks, 500);
        assert!(config.bounds.is_bounded());
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.display.render_every, 5);
        assert!(!config.display.show_frames);
        assert!(config.display.json_frames);
        let intervals = config.clock.intervals().unwrap();
        assert_eq!(intervals, TickIntervals::from_millis(100, 20).unwrap());
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = ColonyConfig::parse("simulation:\n  seed: 7\n").unwrap();
        assert_eq!(config.simulation.seed, Some(7));
        assert_eq!(config.simulation.variant, RuleVariant::TwoColor);
        assert_eq!(config.clock, ClockConfig::default());
    }

    #[test]
    fn parse_empty_yaml() {
        assert_eq!(ColonyConfig::parse("").unwrap(), ColonyConfig::default());
    }

    #[test]
    fn out_of_range_values_rejected() {
        assert!(matches!(
            ColonyConfig::parse("simulation:\n  density: 1.5\n"),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            ColonyConfig::parse("clock:\n  fast_interval_ms: 0\n"),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            ColonyConfig::parse("display:\n  render_every: 0\n"),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn unknown_variant_is_a_yaml_error() {
        assert!(matches!(
            ColonyConfig::parse("simulation:\n  variant: hexagonal\n"),
            Err(ConfigError::Yaml { .. })
        ));
    }

    #[test]
    fn overrides_replace_seed_and_variant() {
        let env: BTreeMap<&str, &str> =
            BTreeMap::from([(SEED_ENV, " 99 "), (VARIANT_ENV, "classic")]);
        let mut config = ColonyConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| (*v).to_owned()));
        assert_eq!(config.simulation.seed, Some(99));
        assert_eq!(config.simulation.variant, RuleVariant::Monochrome);
    }

    #[test]
    fn bad_overrides_are_skipped() {
        let env: BTreeMap<&str, &str> =
            BTreeMap::from([(SEED_ENV, "soon"), (VARIANT_ENV, "hexagonal")]);
        let mut config = ColonyConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| (*v).to_owned()));
        assert_eq!(config, ColonyConfig::default());
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("colony-config.yaml");
        if path.exists() {
            let config = ColonyConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
