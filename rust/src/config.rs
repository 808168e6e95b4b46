//! Run configuration: defaults, environment overrides, TOML loading and
//! fail-fast validation.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::activity::{reference_project, Activity};
use crate::error::{Result, SimulationError};

pub const DEFAULT_TOTAL_TRIALS: u64 = 2_000_000;
pub const DEFAULT_DEADLINE: f64 = 30.0;

/// Target number of chunks each worker handles when no chunk size is given.
pub const CHUNKS_PER_WORKER: u64 = 4;

/// Environment variable overriding the default worker count.
pub const WORKERS_ENV: &str = "PERT_NUM_WORKERS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub total_trials: u64,
    pub pool_size: usize,
    pub chunk_size: u64,
    pub deadline: f64,
    pub budget: Option<f64>,
    /// Base seed; drawn from the wall clock at run time when absent.
    pub seed: Option<u64>,
    pub activities: Vec<Activity>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let pool_size = default_pool_size();
        Self {
            total_trials: DEFAULT_TOTAL_TRIALS,
            pool_size,
            chunk_size: default_chunk_size(DEFAULT_TOTAL_TRIALS, pool_size),
            deadline: DEFAULT_DEADLINE,
            budget: None,
            seed: None,
            activities: reference_project(),
        }
    }
}

impl SimulationConfig {
    /// Reads a TOML file. Missing keys take their defaults.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| SimulationError::io(path, e))?;
        Self::from_toml_str(&text)
    }

    /// Parses TOML. Without an explicit `chunk_size` the chunk size is
    /// derived from the file's trial count and pool size.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let table: toml::Table = toml::from_str(text)?;
        let derive_chunk = !table.contains_key("chunk_size");
        let mut config: Self = toml::Value::Table(table).try_into()?;
        if derive_chunk {
            config.chunk_size = default_chunk_size(config.total_trials, config.pool_size);
        }
        Ok(config)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Rejects anything that would make a run meaningless before any work is
    /// dispatched.
    pub fn validate(&self) -> Result<()> {
        if self.total_trials == 0 {
            return Err(SimulationError::invalid_config("total_trials must be positive"));
        }
        if self.chunk_size == 0 {
            return Err(SimulationError::invalid_config("chunk_size must be positive"));
        }
        if self.pool_size == 0 {
            return Err(SimulationError::invalid_config("pool_size must be positive"));
        }
        if !(self.deadline.is_finite() && self.deadline > 0.0) {
            return Err(SimulationError::invalid_config(format!(
                "deadline must be a positive number, got {}",
                self.deadline
            )));
        }
        if let Some(budget) = self.budget {
            if !(budget.is_finite() && budget > 0.0) {
                return Err(SimulationError::invalid_config(format!(
                    "budget must be a positive number, got {budget}"
                )));
            }
        }
        for (i, act) in self.activities.iter().enumerate() {
            act.validate(i)?;
        }
        Ok(())
    }
}

/// `PERT_NUM_WORKERS` if set and positive, else the available parallelism.
pub fn default_pool_size() -> usize {
    std::env::var(WORKERS_ENV)
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
}

/// Chunk size giving roughly [`CHUNKS_PER_WORKER`] chunks per worker.
pub fn default_chunk_size(total_trials: u64, pool_size: usize) -> u64 {
    let target_chunks = (pool_size.max(1) as u64).saturating_mul(CHUNKS_PER_WORKER);
    total_trials.div_ceil(target_chunks).max(1)
}
