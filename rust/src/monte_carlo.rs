//! Work distribution: chunk planning, a fixed-size worker pool and the
//! wait-for-all aggregation of chunk results.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use tracing::{debug, info, warn};

use crate::activity::Activity;
use crate::chunk::{run_chunk, Chunk, ChunkResult};
use crate::config::SimulationConfig;
use crate::error::{Result, SimulationError};
use crate::report::{AggregateResult, RunSummary};

/// Offset between the seeds of consecutive chunks.
pub const SEED_STRIDE: u64 = 7919;

/// Seconds since the UNIX epoch, masked to 32 bits.
pub fn wall_clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
        & 0xFFFF_FFFF
}

/// Splits `total` trials into `ceil(total / chunk_size)` chunks. Every chunk
/// holds `chunk_size` trials except possibly the last; chunk `i` is seeded
/// with `base_seed + i * SEED_STRIDE`.
pub fn plan_chunks(total: u64, chunk_size: u64, base_seed: u64) -> Vec<Chunk> {
    if chunk_size == 0 {
        return Vec::new();
    }
    let count = total.div_ceil(chunk_size);
    let mut remaining = total;
    (0..count)
        .map(|i| {
            let n = remaining.min(chunk_size);
            remaining -= n;
            Chunk {
                index: i as usize,
                seed: base_seed.wrapping_add(i.wrapping_mul(SEED_STRIDE)),
                n,
            }
        })
        .collect()
}

/// A validated configuration with its resolved base seed and chunk plan.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub config: SimulationConfig,
    pub base_seed: u64,
    pub chunks: Vec<Chunk>,
}

impl RunPlan {
    /// Validates `config` and plans its chunks. A missing seed is taken from
    /// the wall clock and written back into the stored config.
    pub fn new(config: &SimulationConfig) -> Result<Self> {
        config.validate()?;
        let base_seed = config.seed.unwrap_or_else(wall_clock_seed);
        let chunks = plan_chunks(config.total_trials, config.chunk_size, base_seed);
        Ok(Self {
            config: config.clone().with_seed(base_seed),
            base_seed,
            chunks,
        })
    }

    pub fn into_summary(self, result: AggregateResult) -> RunSummary {
        RunSummary {
            config: self.config,
            result,
        }
    }
}

/// Sums chunk outcomes in whatever order they arrive and remembers the first
/// failure.
#[derive(Debug, Default)]
pub struct Aggregator {
    total: ChunkResult,
    failure: Option<SimulationError>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, chunk: Chunk, outcome: Result<ChunkResult>) {
        match outcome {
            Ok(res) => {
                debug!(
                    chunk = chunk.index,
                    seed = chunk.seed,
                    successes = res.successes,
                    n = res.n,
                    "chunk complete"
                );
                self.total = self.total.merge(res);
            }
            Err(err) => {
                warn!(chunk = chunk.index, seed = chunk.seed, error = %err, "chunk failed");
                self.failure.get_or_insert(err);
            }
        }
    }

    /// Records a failure that is not tied to a single chunk.
    pub fn record_failure(&mut self, err: SimulationError) {
        warn!(error = %err, "worker failed");
        self.failure.get_or_insert(err);
    }

    /// Fails on any recorded failure, or when the aggregated trial count
    /// differs from `expected`.
    pub fn finish(self, expected: u64, elapsed_time_ms: f64) -> Result<AggregateResult> {
        if let Some(err) = self.failure {
            return Err(err);
        }
        if self.total.n != expected {
            return Err(SimulationError::TrialCountMismatch {
                expected,
                actual: self.total.n,
            });
        }
        Ok(AggregateResult::new(self.total.successes, self.total.n, elapsed_time_ms))
    }
}

/// Runs one chunk, converting a panic into that chunk's failure.
pub fn execute_chunk(
    chunk: Chunk,
    activities: &[Activity],
    deadline: f64,
    budget: Option<f64>,
) -> Result<ChunkResult> {
    panic::catch_unwind(AssertUnwindSafe(|| run_chunk(chunk, activities, deadline, budget)))
        .unwrap_or_else(|payload| {
            Err(SimulationError::ChunkFailed {
                index: chunk.index,
                seed: chunk.seed,
                reason: panic_message(payload.as_ref()),
            })
        })
}

pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("worker panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("worker panicked: {s}")
    } else {
        "worker panicked".to_string()
    }
}

/// Runs the whole simulation on a pool of exactly `pool_size` OS threads fed
/// from a shared chunk queue, then waits for every chunk before aggregating.
pub fn run_parallel(config: &SimulationConfig) -> Result<RunSummary> {
    let plan = RunPlan::new(config)?;
    let cfg = &plan.config;
    info!(
        total_trials = cfg.total_trials,
        chunks = plan.chunks.len(),
        chunk_size = cfg.chunk_size,
        pool_size = cfg.pool_size,
        base_seed = plan.base_seed,
        "starting parallel run"
    );

    let (job_tx, job_rx) = crossbeam_channel::unbounded::<Chunk>();
    for chunk in &plan.chunks {
        job_tx
            .send(*chunk)
            .map_err(|_| SimulationError::WorkerPool("chunk queue closed".to_string()))?;
    }
    drop(job_tx);

    let activities: Arc<[Activity]> = Arc::from(cfg.activities.as_slice());
    let (deadline, budget) = (cfg.deadline, cfg.budget);
    let (result_tx, result_rx) = crossbeam_channel::unbounded::<(Chunk, Result<ChunkResult>)>();

    let start = Instant::now();
    let mut aggregator = Aggregator::new();
    let mut handles = Vec::with_capacity(cfg.pool_size);

    for worker_id in 0..cfg.pool_size {
        let job_rx = job_rx.clone();
        let result_tx = result_tx.clone();
        let activities = Arc::clone(&activities);

        let spawned = thread::Builder::new()
            .name(format!("pert-worker-{worker_id}"))
            .spawn(move || {
                for chunk in job_rx.iter() {
                    let outcome = execute_chunk(chunk, &activities, deadline, budget);
                    if result_tx.send((chunk, outcome)).is_err() {
                        break;
                    }
                }
            });

        match spawned {
            Ok(handle) => handles.push(handle),
            Err(e) => {
                aggregator.record_failure(SimulationError::WorkerPool(format!(
                    "failed to spawn worker {worker_id}: {e}"
                )));
                break;
            }
        }
    }
    drop(result_tx);
    drop(job_rx);

    for (chunk, outcome) in result_rx.iter() {
        aggregator.record(chunk, outcome);
    }

    for handle in handles {
        if let Err(payload) = handle.join() {
            aggregator.record_failure(SimulationError::WorkerPool(panic_message(payload.as_ref())));
        }
    }

    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    let result = aggregator.finish(cfg.total_trials, elapsed_ms)?;
    info!(
        successes = result.successes,
        n = result.n,
        probability = result.probability,
        elapsed_ms = result.elapsed_time_ms,
        "parallel run complete"
    );
    Ok(plan.into_summary(result))
}

/// Runs the same chunk plan inline on the calling thread. Produces the same
/// successes as [`run_parallel`] for the same seed.
pub fn run_sequential(config: &SimulationConfig) -> Result<RunSummary> {
    let plan = RunPlan::new(config)?;
    let cfg = &plan.config;
    info!(
        total_trials = cfg.total_trials,
        chunks = plan.chunks.len(),
        base_seed = plan.base_seed,
        "starting sequential run"
    );

    let start = Instant::now();
    let mut aggregator = Aggregator::new();
    for chunk in &plan.chunks {
        let outcome = execute_chunk(*chunk, &cfg.activities, cfg.deadline, cfg.budget);
        aggregator.record(*chunk, outcome);
    }
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    let result = aggregator.finish(cfg.total_trials, elapsed_ms)?;
    info!(
        successes = result.successes,
        probability = result.probability,
        elapsed_ms = result.elapsed_time_ms,
        "sequential run complete"
    );
    Ok(plan.into_summary(result))
}
