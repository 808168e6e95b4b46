use pert_montecarlo::{reference_project, run_parallel, SimulationConfig, SimulationError};
use pert_montecarlo_async::run_parallel_async;

fn config(total_trials: u64, chunk_size: u64, pool_size: usize) -> SimulationConfig {
    SimulationConfig {
        total_trials,
        pool_size,
        chunk_size,
        deadline: 30.0,
        budget: None,
        seed: Some(7_654_321),
        activities: reference_project(),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn matches_threaded_distributor() {
    let cfg = config(120_000, 15_000, 3);
    let async_run = run_parallel_async(&cfg).await.unwrap();
    let threaded = tokio::task::spawn_blocking(move || run_parallel(&cfg))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(async_run.result.n, 120_000);
    assert_eq!(async_run.result.successes, threaded.result.successes);
    assert_eq!(async_run.config.seed, Some(7_654_321));
}

#[tokio::test]
async fn reproducible_across_runs() {
    let cfg = config(30_000, 7_000, 2);
    let first = run_parallel_async(&cfg).await.unwrap();
    let second = run_parallel_async(&cfg).await.unwrap();
    assert_eq!(first.result.successes, second.result.successes);
    assert_eq!(first.result.n, 30_000);
}

#[tokio::test]
async fn single_worker_many_chunks() {
    let summary = run_parallel_async(&config(10_000, 1_000, 1)).await.unwrap();
    assert_eq!(summary.result.n, 10_000);
    assert!((0.0..=1.0).contains(&summary.result.probability));
}

#[tokio::test]
async fn rejects_invalid_configuration() {
    let err = run_parallel_async(&config(1_000, 100, 0)).await.unwrap_err();
    assert!(matches!(err, SimulationError::InvalidConfig(_)));

    let cfg = SimulationConfig {
        budget: Some(f64::INFINITY),
        ..config(1_000, 100, 1)
    };
    assert!(run_parallel_async(&cfg).await.is_err());
}
