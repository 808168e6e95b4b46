//! Error types for configuration, chunk execution and report I/O.

use std::path::PathBuf;

/// Everything that can abort a simulation run.
///
/// Degenerate three-point estimates are not represented here: the fitter
/// resolves them to a symmetric shape and never fails.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid activity #{index}: {reason}")]
    InvalidActivity { index: usize, reason: String },

    #[error("Chunk {index} (seed {seed}) failed: {reason}")]
    ChunkFailed {
        index: usize,
        seed: u64,
        reason: String,
    },

    #[error("Worker pool error: {0}")]
    WorkerPool(String),

    #[error("Trial count mismatch: requested {expected}, aggregated {actual}")]
    TrialCountMismatch { expected: u64, actual: u64 },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl SimulationError {
    pub(crate) fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SimulationError>;
