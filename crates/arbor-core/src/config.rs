//! Configuration loading and typed config structures for the harvester.
//!
//! The canonical configuration lives in `arbor-config.yaml` at the project
//! root. Every field has a default matching the host's vanilla behaviour,
//! so an empty file (or no file at all) yields a working harvester.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Environment variable overriding `storage.root`.
pub const STORAGE_ROOT_ENV: &str = "ARBOR_STORAGE_ROOT";

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
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level harvester configuration.
///
/// Mirrors the structure of `arbor-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ArborConfig {
    /// Search bounds, caps, and effects.
    #[serde(default)]
    pub harvest: HarvestConfig,

    /// Replant delay and conveyor gating.
    #[serde(default)]
    pub replant: ReplantConfig,

    /// Marker admission throttle.
    #[serde(default)]
    pub throttle: ThrottleConfig,

    /// Pending replant storage.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Demo engine settings.
    #[serde(default)]
    pub engine: EngineConfig,
}

impl ArborConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `ARBOR_STORAGE_ROOT` overrides `storage.root`.
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
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.storage.apply_env_overrides();
        Ok(config)
    }
}

/// Tree search and harvest effects.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HarvestConfig {
    /// Maximum trunk blocks collected per harvest.
    #[serde(default = "default_max_trunk")]
    pub max_trunk: usize,

    /// Maximum canopy blocks collected per harvest.
    #[serde(default = "default_max_canopy")]
    pub max_canopy: usize,

    /// Horizontal reach (X and Z) of the trunk search and base finder.
    #[serde(default = "default_horizontal_radius")]
    pub horizontal_radius: i32,

    /// Blocks below the base the trunk search may reach.
    #[serde(default = "default_vertical_below")]
    pub vertical_below: i32,

    /// Blocks above the base the trunk search may reach.
    #[serde(default = "default_vertical_above")]
    pub vertical_above: i32,

    /// Extra horizontal reach of the canopy search.
    #[serde(default = "default_canopy_radius_bonus")]
    pub canopy_radius_bonus: i32,

    /// Extra upward reach of the canopy search.
    #[serde(default = "default_canopy_above_bonus")]
    pub canopy_above_bonus: i32,

    /// How far around a marker to look for a shears marker.
    #[serde(default = "default_shears_search_expand")]
    pub shears_search_expand: f64,

    /// Volume of the harvest sound.
    #[serde(default = "default_sound_volume")]
    pub sound_volume: f32,

    /// Lowest pitch of the harvest sound.
    #[serde(default = "default_sound_pitch_base")]
    pub sound_pitch_base: f32,

    /// Width of the pitch jitter above the base.
    #[serde(default = "default_sound_pitch_spread")]
    pub sound_pitch_spread: f32,

    /// Seed for the pitch jitter generator.
    #[serde(default = "default_rng_seed")]
    pub rng_seed: u64,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            max_trunk: default_max_trunk(),
            max_canopy: default_max_canopy(),
            horizontal_radius: default_horizontal_radius(),
            vertical_below: default_vertical_below(),
            vertical_above: default_vertical_above(),
            canopy_radius_bonus: default_canopy_radius_bonus(),
            canopy_above_bonus: default_canopy_above_bonus(),
            shears_search_expand: default_shears_search_expand(),
            sound_volume: default_sound_volume(),
            sound_pitch_base: default_sound_pitch_base(),
            sound_pitch_spread: default_sound_pitch_spread(),
            rng_seed: default_rng_seed(),
        }
    }
}

/// Replant delay and conveyor gating.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReplantConfig {
    /// Whether harvests schedule replants at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Ticks an entry waits before its first readiness check.
    #[serde(default = "default_delay_ticks")]
    pub delay_ticks: u64,

    /// How many chained conveyors below the planting conveyor are checked.
    #[serde(default = "default_chain_depth")]
    pub chain_depth: u32,

    /// Upper bound on drain passes per conveyor per tick.
    #[serde(default = "default_drain_pass_cap")]
    pub drain_pass_cap: u32,
}

impl Default for ReplantConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            delay_ticks: default_delay_ticks(),
            chain_depth: default_chain_depth(),
            drain_pass_cap: default_drain_pass_cap(),
        }
    }
}

/// Marker admission throttle.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ThrottleConfig {
    /// Minimum ticks between two admissions of the same marker.
    #[serde(default = "default_interval_ticks")]
    pub interval_ticks: u64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            interval_ticks: default_interval_ticks(),
        }
    }
}

/// Pending replant storage.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one subdirectory per world.
    #[serde(default = "default_storage_root")]
    pub root: PathBuf,
}

impl StorageConfig {
    /// Apply `ARBOR_STORAGE_ROOT` if set and non-empty.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(root) = std::env::var(STORAGE_ROOT_ENV)
            && !root.is_empty()
        {
            self.root = PathBuf::from(root);
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default log filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit one JSON object per line instead of human-readable text.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Demo engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// Registry key of the demo world.
    #[serde(default = "default_world")]
    pub world: String,

    /// Real-time milliseconds per tick.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Ticks to run before stopping (0 = until interrupted).
    #[serde(default)]
    pub max_ticks: u64,

    /// Ticks between persistence passes.
    #[serde(default = "default_persist_interval_ticks")]
    pub persist_interval_ticks: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            world: default_world(),
            tick_interval_ms: default_tick_interval_ms(),
            max_ticks: 0,
            persist_interval_ticks: default_persist_interval_ticks(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_max_trunk() -> usize {
    512
}

const fn default_max_canopy() -> usize {
    2048
}

const fn default_horizontal_radius() -> i32 {
    6
}

const fn default_vertical_below() -> i32 {
    4
}

const fn default_vertical_above() -> i32 {
    32
}

const fn default_canopy_radius_bonus() -> i32 {
    2
}

const fn default_canopy_above_bonus() -> i32 {
    6
}

const fn default_shears_search_expand() -> f64 {
    2.0
}

const fn default_sound_volume() -> f32 {
    1.0
}

const fn default_sound_pitch_base() -> f32 {
    0.9
}

const fn default_sound_pitch_spread() -> f32 {
    0.2
}

const fn default_rng_seed() -> u64 {
    42
}

const fn default_delay_ticks() -> u64 {
    200
}

const fn default_chain_depth() -> u32 {
    8
}

const fn default_drain_pass_cap() -> u32 {
    8
}

const fn default_interval_ticks() -> u64 {
    20
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("arbor-data")
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_world() -> String {
    "minecraft:overworld".to_owned()
}

const fn default_tick_interval_ms() -> u64 {
    50
}

const fn default_persist_interval_ticks() -> u64 {
    100
}

const fn default_true() -> bool {
    true
}
