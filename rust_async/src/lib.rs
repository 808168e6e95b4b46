//! Async work distributor for the PERT Monte Carlo engine.
//!
//! Uses the same chunk plan, seeds and aggregation as the threaded
//! distributor, so both report identical success counts for a given seed.

pub mod monte_carlo;

pub use monte_carlo::run_parallel_async;
