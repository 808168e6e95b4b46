//! Monte Carlo estimation of the probability that a PERT-estimated project
//! finishes by a deadline, optionally within a budget.
//!
//! Each activity's three-point estimate is fitted to a Beta shape
//! ([`fitter`]), trials are drawn in seeded chunks ([`sampler`], [`chunk`]) and
//! the chunks are spread over a worker pool whose partial counts are summed
//! into one [`AggregateResult`] ([`monte_carlo`]).

pub mod activity;
pub mod chunk;
pub mod cli;
pub mod config;
pub mod error;
pub mod fitter;
pub mod logging;
pub mod monte_carlo;
pub mod report;
pub mod sampler;
pub mod topology;

pub use activity::{reference_project, Activity};
pub use chunk::{run_chunk, Chunk, ChunkResult};
pub use config::SimulationConfig;
pub use error::{Result, SimulationError};
pub use fitter::{alpha_beta_from_pert, FittedDistribution};
pub use monte_carlo::{plan_chunks, run_parallel, run_sequential, RunPlan, SEED_STRIDE};
pub use report::{AggregateResult, RunSummary};
pub use topology::{ParallelThenSerial, Topology};
