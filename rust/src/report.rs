//! Aggregate run results and the structured run summary.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::error::{Result, SimulationError};

/// Final statistic of a run. `n` always equals the requested trial count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub successes: u64,
    pub n: u64,
    pub probability: f64,
    pub elapsed_time_ms: f64,
}

impl AggregateResult {
    pub fn new(successes: u64, n: u64, elapsed_time_ms: f64) -> Self {
        let probability = if n == 0 { 0.0 } else { successes as f64 / n as f64 };
        Self {
            successes,
            n,
            probability,
            elapsed_time_ms,
        }
    }
}

impl fmt::Display for AggregateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Trials: {}", self.n)?;
        writeln!(f, "Successes: {}", self.successes)?;
        writeln!(f, "Probability: {:.4}%", self.probability * 100.0)?;
        write!(f, "Elapsed: {:.3}ms", self.elapsed_time_ms)
    }
}

/// Configuration and result of one run. `config.seed` holds the base seed
/// actually used, so replaying the config reproduces `result.successes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub config: SimulationConfig,
    pub result: AggregateResult,
}

impl RunSummary {
    pub fn base_seed(&self) -> Option<u64> {
        self.config.seed
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the pretty-printed summary, creating parent directories.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| SimulationError::io(parent, e))?;
        }
        std::fs::write(path, self.to_json()?).map_err(|e| SimulationError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probability_is_ratio() {
        let res = AggregateResult::new(250, 1000, 12.5);
        assert_eq!(res.probability, 0.25);
        assert!(res.to_string().contains("Probability: 25.0000%"));
    }

    #[test]
    fn writes_summary_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results").join("summary.json");
        let summary = RunSummary {
            config: SimulationConfig::default().with_seed(7),
            result: AggregateResult::new(3, 4, 1.0),
        };
        summary.write_json(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["result"]["successes"], 3);
        assert_eq!(value["result"]["probability"], 0.75);
        assert_eq!(value["config"]["seed"], 7);

        let back: RunSummary = serde_json::from_str(&text).unwrap();
        assert_eq!(back, summary);
    }
}
