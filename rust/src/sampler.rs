//! Vectorized Beta-PERT trial sampling.
//!
//! Each activity gets a row of `n` draws from its fitted Beta shape, rescaled
//! to `[a, b]`. Rows are drawn in activity order from one RNG, so a seed fully
//! determines the batch.

use std::collections::TryReserveError;

use rand::Rng;
use rand_distr::{Beta, BetaError, Distribution};

use crate::activity::Activity;
use crate::fitter::FittedDistribution;
use crate::topology::Topology;

#[derive(Debug, thiserror::Error)]
pub enum SampleError {
    #[error("invalid Beta shape: {0}")]
    Shape(#[from] BetaError),

    #[error("cannot allocate sample buffer: {0}")]
    Alloc(#[from] TryReserveError),
}

/// Empty vector with room for exactly `n` values, or an error if the
/// allocator refuses.
pub fn try_buffer(n: usize) -> Result<Vec<f64>, SampleError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(n)?;
    Ok(buf)
}

/// `n` zeros, allocated fallibly.
pub fn try_zeros(n: usize) -> Result<Vec<f64>, SampleError> {
    let mut buf = try_buffer(n)?;
    buf.resize(n, 0.0);
    Ok(buf)
}

/// Duration samples indexed by (activity, trial).
#[derive(Debug, Clone, PartialEq)]
pub struct SampleTable {
    rows: Vec<Vec<f64>>,
    trials: usize,
}

impl SampleTable {
    #[cfg(test)]
    pub(crate) fn empty(trials: usize) -> Self {
        Self {
            rows: Vec::new(),
            trials,
        }
    }

    #[cfg(test)]
    pub(crate) fn from_rows(rows: Vec<Vec<f64>>) -> Self {
        let trials = rows.first().map_or(0, Vec::len);
        assert!(rows.iter().all(|r| r.len() == trials));
        Self { rows, trials }
    }

    /// Draws `n` trials for every activity. Every buffer is reserved up
    /// front, so running out of memory comes back as [`SampleError::Alloc`].
    pub fn draw<R: Rng + ?Sized>(
        fitted: &[FittedDistribution],
        n: usize,
        rng: &mut R,
    ) -> Result<Self, SampleError> {
        let mut rows = Vec::new();
        rows.try_reserve_exact(fitted.len())?;
        for dist in fitted {
            let beta = Beta::new(dist.alpha, dist.beta)?;
            let mut row = try_buffer(n)?;
            row.extend((0..n).map(|_| dist.rescale(beta.sample(&mut *rng))));
            rows.push(row);
        }
        Ok(Self { rows, trials: n })
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn trials(&self) -> usize {
        self.trials
    }

    /// Per-trial sum over all rows starting at `from`.
    pub fn column_sums(&self, from: usize) -> Result<Vec<f64>, SampleError> {
        let mut sums = try_zeros(self.trials)?;
        for row in self.rows.iter().skip(from) {
            for (s, d) in sums.iter_mut().zip(row) {
                *s += d;
            }
        }
        Ok(sums)
    }

    pub fn project_durations<T: Topology + ?Sized>(
        &self,
        topology: &T,
    ) -> Result<Vec<f64>, SampleError> {
        topology.project_durations(self)
    }

    /// Per-trial `sum(duration_i * cost_rate_i)`.
    pub fn project_costs(&self, activities: &[Activity]) -> Result<Vec<f64>, SampleError> {
        let mut costs = try_zeros(self.trials)?;
        for (row, act) in self.rows.iter().zip(activities) {
            for (c, d) in costs.iter_mut().zip(row) {
                *c += d * act.cost_rate;
            }
        }
        Ok(costs)
    }

    /// Reduces the table to a [`TrialBatch`].
    pub fn into_batch<T: Topology + ?Sized>(
        self,
        activities: &[Activity],
        topology: &T,
    ) -> Result<TrialBatch, SampleError> {
        Ok(TrialBatch {
            durations: self.project_durations(topology)?,
            costs: self.project_costs(activities)?,
        })
    }
}

/// Project duration and cost for every trial in a chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialBatch {
    pub durations: Vec<f64>,
    pub costs: Vec<f64>,
}

impl TrialBatch {
    /// Counts trials with `duration <= deadline`, and additionally
    /// `cost <= budget` when a budget is given.
    pub fn count_successes(&self, deadline: f64, budget: Option<f64>) -> u64 {
        let hits = match budget {
            None => self.durations.iter().filter(|&&d| d <= deadline).count(),
            Some(limit) => self
                .durations
                .iter()
                .zip(&self.costs)
                .filter(|&(&d, &c)| d <= deadline && c <= limit)
                .count(),
        };
        hits as u64
    }
}
