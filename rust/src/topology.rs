//! Reduction of per-activity durations to a project duration.

use crate::sampler::{try_buffer, SampleError, SampleTable};

/// Strategy that turns an (activity × trial) sample table into one project
/// duration per trial.
pub trait Topology: Send + Sync {
    fn project_durations(&self, samples: &SampleTable) -> Result<Vec<f64>, SampleError>;
}

/// Activities 0 and 1 run in parallel, every later activity runs serially
/// after that pair. With fewer than two activities everything is serial.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParallelThenSerial;

impl Topology for ParallelThenSerial {
    fn project_durations(&self, samples: &SampleTable) -> Result<Vec<f64>, SampleError> {
        let rows = samples.rows();
        if rows.len() < 2 {
            return samples.column_sums(0);
        }

        let mut totals = try_buffer(samples.trials())?;
        totals.extend(rows[0].iter().zip(&rows[1]).map(|(x, y)| x.max(*y)));
        for row in &rows[2..] {
            for (total, d) in totals.iter_mut().zip(row) {
                *total += d;
            }
        }
        Ok(totals)
    }
}
