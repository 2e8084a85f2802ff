use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::engine::MAX_QUANTIZE_COLORS;
use crate::services::DEFAULT_TOLERANCE;
use crate::types::{ProcessParams, Scenario};
use crate::{Error, Result};

/// Main configuration for pixelbench
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base directory for pixelbench data (~/.pixelbench by default)
    pub home_dir: PathBuf,

    /// Where history and size samples are kept
    pub storage: StorageConfig,

    /// History and size-correlation bounds
    pub history: HistoryConfig,

    /// Output equivalence checking
    pub verification: VerificationConfig,

    /// Optional delays between trials and phases
    pub pacing: PacingConfig,

    /// Trial counts per scenario
    pub policies: RunPolicies,

    /// Default routine parameters
    pub params: ProcessParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Session-scoped history store
    pub session_dir: PathBuf,
    /// Durable store for image-size correlation samples
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    pub max_runs: usize,
    pub max_size_samples: usize,
    /// Relative megapixel distance under which two size samples merge
    pub size_merge_threshold: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationConfig {
    pub tolerance: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacingConfig {
    pub inter_trial_ms: u64,
    pub inter_phase_ms: u64,
}

/// Trial count selected by image size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunPolicy {
    /// Images up to this size use `small_trials`
    pub small_max_mp: f64,
    /// Images up to this size use `medium_trials`
    pub medium_max_mp: f64,
    pub small_trials: usize,
    pub medium_trials: usize,
    pub large_trials: usize,
}

impl RunPolicy {
    pub const fn new(small_trials: usize, medium_trials: usize, large_trials: usize) -> Self {
        Self {
            small_max_mp: 1.0,
            medium_max_mp: 4.0,
            small_trials,
            medium_trials,
            large_trials,
        }
    }

    pub fn trials_for(&self, megapixels: f64) -> usize {
        if megapixels <= self.small_max_mp {
            self.small_trials
        } else if megapixels <= self.medium_max_mp {
            self.medium_trials
        } else {
            self.large_trials
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunPolicies {
    pub invert: RunPolicy,
    pub edge_detect: RunPolicy,
    pub quantize: RunPolicy,
}

impl RunPolicies {
    pub fn for_scenario(&self, scenario: Scenario) -> &RunPolicy {
        match scenario {
            Scenario::Invert => &self.invert,
            Scenario::EdgeDetect => &self.edge_detect,
            Scenario::Quantize => &self.quantize,
        }
    }
}

impl Default for RunPolicies {
    fn default() -> Self {
        Self {
            invert: RunPolicy::new(30, 20, 10),
            edge_detect: RunPolicy::new(20, 10, 5),
            quantize: RunPolicy::new(10, 5, 3),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let home = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".pixelbench");
        Self::from_home_dir(home)
    }
}

impl Config {
    /// Create config from a home directory path
    pub fn from_home_dir(home: PathBuf) -> Self {
        Self {
            home_dir: home.clone(),
            storage: StorageConfig {
                session_dir: session_dir_for(&home),
                data_dir: home.join("data"),
            },
            history: HistoryConfig {
                max_runs: 10,
                max_size_samples: 100,
                size_merge_threshold: 0.05,
            },
            verification: VerificationConfig {
                tolerance: DEFAULT_TOLERANCE,
            },
            pacing: PacingConfig {
                inter_trial_ms: 0,
                inter_phase_ms: 0,
            },
            policies: RunPolicies::default(),
            params: ProcessParams::default(),
        }
    }

    /// Keep every store under one directory (used by tests and sandboxed runs)
    pub fn isolated(root: &Path) -> Self {
        let mut config = Self::from_home_dir(root.to_path_buf());
        config.storage.session_dir = root.join("session");
        config
    }

    /// Load config from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Create the home directory, then the store directories.
    ///
    /// Only the home directory is required. The stores create their
    /// directories again on first write and fall back to memory when they
    /// cannot, so failures there are logged and skipped.
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.home_dir)?;
        for dir in [&self.storage.session_dir, &self.storage.data_dir] {
            if let Err(e) = std::fs::create_dir_all(dir) {
                warn!("Cannot create {}: {}; results will not persist", dir.display(), e);
            }
        }
        Ok(())
    }

    /// Reject settings the services cannot honour
    pub fn validate(&self) -> Result<()> {
        if self.history.max_runs == 0 {
            return Err(Error::Config("history.max_runs must be at least 1".into()));
        }
        if self.history.max_size_samples == 0 {
            return Err(Error::Config(
                "history.max_size_samples must be at least 1".into(),
            ));
        }
        if !(0.0..1.0).contains(&self.history.size_merge_threshold) {
            return Err(Error::Config(
                "history.size_merge_threshold must be in [0, 1)".into(),
            ));
        }
        if !(1..=MAX_QUANTIZE_COLORS).contains(&self.params.quantize_colors) {
            return Err(Error::Config(format!(
                "params.quantize_colors must be between 1 and {}",
                MAX_QUANTIZE_COLORS
            )));
        }
        for scenario in Scenario::all() {
            let policy = self.policies.for_scenario(scenario);
            if policy.small_max_mp > policy.medium_max_mp {
                return Err(Error::Config(format!(
                    "{} policy: small_max_mp exceeds medium_max_mp",
                    scenario
                )));
            }
        }
        Ok(())
    }
}

/// Per-home session directory under the system temp dir.
///
/// The temp dir is wiped on reboot, so history lives for a login session.
/// Hashing the home keeps separate homes and users from sharing one.
fn session_dir_for(home: &Path) -> PathBuf {
    let mut hasher = Sha256::new();
    hasher.update(home.to_string_lossy().as_bytes());
    let hash = hasher.finalize();
    std::env::temp_dir().join(format!("pixelbench-session-{}", hex::encode(&hash[..6])))
}
