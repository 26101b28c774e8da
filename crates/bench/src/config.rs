//! Benchmark configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Config file read when no path is given on the command line.
pub const DEFAULT_PATH: &str = "bench.toml";

/// Upper bound on `sweep.steps`.
pub const MAX_STEPS: u32 = 10_000;

/// Values rejected by [`Config::validate`].
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("world half-size must be positive and finite, got {0}")]
    InvalidHalfSize(f64),

    #[error("search radius must be non-negative and finite, got {0}")]
    InvalidRadius(f64),

    #[error("starting resolution must be positive and finite, got {0}")]
    InvalidResolution(f64),

    #[error("resolution growth must be positive and finite, got {0}")]
    InvalidGrowth(f64),

    #[error("resolution at step {step} is not a positive finite number")]
    ResolutionOutOfRange { step: u32 },

    #[error("sweep needs at least one step")]
    NoSteps,

    #[error("sweep has {0} steps, at most {max} are allowed", max = MAX_STEPS)]
    TooManySteps(u32),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub sweep: SweepConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from `path`, writing out the defaults if it does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&contents)?)
        } else {
            info!("No {} found, creating default config", path.display());
            let default_config = Self::default();
            std::fs::write(path, toml::to_string_pretty(&default_config)?)?;
            Ok(default_config)
        }
    }

    /// Reject settings that would make the tree or the sweep meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let half_size = self.world.half_size;
        if !(half_size.is_finite() && half_size > 0.0) {
            return Err(ConfigError::InvalidHalfSize(half_size));
        }
        let radius = self.search.radius;
        if !(radius.is_finite() && radius >= 0.0) {
            return Err(ConfigError::InvalidRadius(radius));
        }
        let start = self.sweep.resolution_start;
        if !(start.is_finite() && start > 0.0) {
            return Err(ConfigError::InvalidResolution(start));
        }
        let growth = self.sweep.resolution_growth;
        if !(growth.is_finite() && growth > 0.0) {
            return Err(ConfigError::InvalidGrowth(growth));
        }
        if self.sweep.steps == 0 {
            return Err(ConfigError::NoSteps);
        }
        if self.sweep.steps > MAX_STEPS {
            return Err(ConfigError::TooManySteps(self.sweep.steps));
        }
        // Geometric growth can under- or overflow over a long sweep.
        for step in [0, self.sweep.steps - 1] {
            let resolution = self.sweep.resolution(step);
            if !(resolution.is_finite() && resolution > 0.0) {
                return Err(ConfigError::ResolutionOutOfRange { step });
            }
        }
        Ok(())
    }
}

/// The square the landmarks are scattered over.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorldConfig {
    #[serde(default)]
    pub center_x: f64,
    #[serde(default)]
    pub center_y: f64,
    /// Half side length of the world square.
    #[serde(default = "default_half_size")]
    pub half_size: f64,
    /// Number of landmarks to generate.
    #[serde(default = "default_landmarks")]
    pub landmarks: u32,
    /// Seed for landmark and vehicle positions.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            center_x: 0.0,
            center_y: 0.0,
            half_size: default_half_size(),
            landmarks: default_landmarks(),
            seed: default_seed(),
        }
    }
}

fn default_half_size() -> f64 {
    50000.0
}
fn default_landmarks() -> u32 {
    100_000
}
fn default_seed() -> u64 {
    1234
}

/// Query settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Radius we want to find landmarks within.
    #[serde(default = "default_radius")]
    pub radius: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            radius: default_radius(),
        }
    }
}

fn default_radius() -> f64 {
    1.0
}

/// Resolution sweep settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SweepConfig {
    /// Number of resolutions to try.
    #[serde(default = "default_steps")]
    pub steps: u32,
    /// Resolution of the first step.
    #[serde(default = "default_resolution_start")]
    pub resolution_start: f64,
    /// Factor applied to the resolution between steps.
    #[serde(default = "default_resolution_growth")]
    pub resolution_growth: f64,
    /// Reject landmarks outside the tree's region on insert.
    #[serde(default = "default_check_bounds")]
    pub check_bounds: bool,
}

impl SweepConfig {
    /// Resolution used at `step`.
    #[inline]
    pub fn resolution(&self, step: u32) -> f64 {
        let exponent = i32::try_from(step).unwrap_or(i32::MAX);
        self.resolution_start * self.resolution_growth.powi(exponent)
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            steps: default_steps(),
            resolution_start: default_resolution_start(),
            resolution_growth: default_resolution_growth(),
            check_bounds: default_check_bounds(),
        }
    }
}

fn default_steps() -> u32 {
    30
}
fn default_resolution_start() -> f64 {
    1e-2
}
fn default_resolution_growth() -> f64 {
    1.95
}
fn default_check_bounds() -> bool {
    true
}

/// Where the result columns are written.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_resolution_file")]
    pub resolution_file: String,
    #[serde(default = "default_time_file")]
    pub time_file: String,
    #[serde(default = "default_brute_file")]
    pub brute_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            resolution_file: default_resolution_file(),
            time_file: default_time_file(),
            brute_file: default_brute_file(),
        }
    }
}

fn default_directory() -> PathBuf {
    PathBuf::from(".")
}
fn default_resolution_file() -> String {
    "quadtree_resolution.txt".to_string()
}
fn default_time_file() -> String {
    "quadtree_time.txt".to_string()
}
fn default_brute_file() -> String {
    "quadtree_brute.txt".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_round_trip() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let config: Config = toml::from_str(&text).unwrap();
        assert_eq!(config.world.half_size, 50000.0);
        assert_eq!(config.world.seed, 1234);
        assert_eq!(config.search.radius, 1.0);
        assert_eq!(config.sweep.steps, 30);
        assert!(config.sweep.check_bounds);
        assert_eq!(config.output.time_file, "quadtree_time.txt");
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [world]
            landmarks = 10

            [sweep]
            steps = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.world.landmarks, 10);
        assert_eq!(config.world.half_size, 50000.0);
        assert_eq!(config.sweep.steps, 3);
        assert_eq!(config.sweep.resolution_growth, 1.95);
        assert_eq!(config.output.brute_file, "quadtree_brute.txt");
    }

    #[test]
    fn test_resolution_schedule() {
        let sweep = SweepConfig {
            steps: 3,
            resolution_start: 0.5,
            resolution_growth: 2.0,
            check_bounds: true,
        };
        assert_eq!(sweep.resolution(0), 0.5);
        assert_eq!(sweep.resolution(2), 2.0);
        // Huge steps saturate instead of wrapping to a negative exponent.
        assert!(sweep.resolution(u32::MAX).is_infinite());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.sweep.resolution_start = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidResolution(0.0)));

        let mut config = Config::default();
        config.world.half_size = -1.0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidHalfSize(-1.0)));

        let mut config = Config::default();
        config.sweep.steps = 0;
        assert_eq!(config.validate(), Err(ConfigError::NoSteps));

        let mut config = Config::default();
        config.sweep.steps = u32::MAX;
        assert_eq!(config.validate(), Err(ConfigError::TooManySteps(u32::MAX)));

        let mut config = Config::default();
        config.sweep.steps = MAX_STEPS;
        assert_eq!(config.validate(), Ok(()));

        let mut config = Config::default();
        config.sweep.resolution_start = 1e-300;
        config.sweep.resolution_growth = 1e-10;
        assert_eq!(
            config.validate(),
            Err(ConfigError::ResolutionOutOfRange { step: 29 })
        );
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bench.toml");

        let created = Config::load(&path).unwrap();
        assert!(path.exists());
        assert_eq!(created.world.landmarks, 100_000);

        std::fs::write(&path, "[search]\nradius = 2.5\n").unwrap();
        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.search.radius, 2.5);
        assert_eq!(loaded.world.landmarks, 100_000);
    }
}
