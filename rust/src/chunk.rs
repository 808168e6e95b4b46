//! A single batch of trials with its own seed.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::activity::Activity;
use crate::error::{Result, SimulationError};
use crate::fitter::fit_all;
use crate::sampler::SampleTable;
use crate::topology::{ParallelThenSerial, Topology};

/// `n` trials to be run from `seed`; `index` is the position in the run's plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub index: usize,
    pub seed: u64,
    pub n: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkResult {
    pub successes: u64,
    pub n: u64,
}

impl ChunkResult {
    pub fn merge(self, other: ChunkResult) -> ChunkResult {
        ChunkResult {
            successes: self.successes + other.successes,
            n: self.n + other.n,
        }
    }
}

/// Runs one chunk over the two-parallel-then-serial project.
pub fn run_chunk(
    chunk: Chunk,
    activities: &[Activity],
    deadline: f64,
    budget: Option<f64>,
) -> Result<ChunkResult> {
    run_chunk_with(chunk, activities, deadline, budget, &ParallelThenSerial)
}

/// Fits every activity, draws the whole chunk from one `StdRng` seeded with
/// `chunk.seed` and counts the successful trials.
pub fn run_chunk_with<T: Topology + ?Sized>(
    chunk: Chunk,
    activities: &[Activity],
    deadline: f64,
    budget: Option<f64>,
    topology: &T,
) -> Result<ChunkResult> {
    let n = usize::try_from(chunk.n).map_err(|_| SimulationError::ChunkFailed {
        index: chunk.index,
        seed: chunk.seed,
        reason: format!("{} trials do not fit in memory on this platform", chunk.n),
    })?;

    let fitted = fit_all(activities);
    let mut rng = StdRng::seed_from_u64(chunk.seed);
    let batch = SampleTable::draw(&fitted, n, &mut rng)
        .and_then(|table| table.into_batch(activities, topology))
        .map_err(|e| SimulationError::ChunkFailed {
            index: chunk.index,
            seed: chunk.seed,
            reason: e.to_string(),
        })?;

    Ok(ChunkResult {
        successes: batch.count_successes(deadline, budget),
        n: chunk.n,
    })
}
