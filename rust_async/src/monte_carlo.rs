//! Chunk dispatch on the tokio blocking pool.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task;
use tracing::info;

use pert_montecarlo::monte_carlo::{execute_chunk, panic_message, Aggregator, RunPlan};
use pert_montecarlo::{Activity, Result, RunSummary, SimulationConfig, SimulationError};

/// Runs every chunk with `spawn_blocking`, at most `pool_size` at a time, and
/// waits for all of them before aggregating.
pub async fn run_parallel_async(config: &SimulationConfig) -> Result<RunSummary> {
    let plan = RunPlan::new(config)?;
    let cfg = &plan.config;
    info!(
        total_trials = cfg.total_trials,
        chunks = plan.chunks.len(),
        chunk_size = cfg.chunk_size,
        pool_size = cfg.pool_size,
        base_seed = plan.base_seed,
        "starting async run"
    );

    let activities: Arc<[Activity]> = Arc::from(cfg.activities.as_slice());
    let permits = Arc::new(Semaphore::new(cfg.pool_size));
    let (deadline, budget) = (cfg.deadline, cfg.budget);

    let start = Instant::now();
    let mut handles = Vec::with_capacity(plan.chunks.len());

    for &chunk in &plan.chunks {
        let activities = Arc::clone(&activities);
        let permits = Arc::clone(&permits);

        let handle = task::spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => return Err(SimulationError::WorkerPool(e.to_string())),
            };
            let joined =
                task::spawn_blocking(move || execute_chunk(chunk, &activities, deadline, budget))
                    .await;
            match joined {
                Ok(outcome) => outcome,
                Err(e) => Err(SimulationError::ChunkFailed {
                    index: chunk.index,
                    seed: chunk.seed,
                    reason: if e.is_panic() {
                        panic_message(e.into_panic().as_ref())
                    } else {
                        e.to_string()
                    },
                }),
            }
        });

        handles.push((chunk, handle));
    }

    let mut aggregator = Aggregator::new();
    for (chunk, handle) in handles {
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(e) => Err(SimulationError::ChunkFailed {
                index: chunk.index,
                seed: chunk.seed,
                reason: e.to_string(),
            }),
        };
        aggregator.record(chunk, outcome);
    }

    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    let result = aggregator.finish(cfg.total_trials, elapsed_ms)?;
    info!(
        successes = result.successes,
        n = result.n,
        probability = result.probability,
        elapsed_ms = result.elapsed_time_ms,
        "async run complete"
    );
    Ok(plan.into_summary(result))
}
