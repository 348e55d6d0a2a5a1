use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum StatsError {
    #[error("Cannot summarize an empty sample set")]
    EmptySampleSet,
}

/// Latency statistics for one scenario run, in nanoseconds.
///
/// Only `mean`, `p90` and `p99` are part of the printed report; `min` and `max` are kept for
/// logging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub p90: f64,
    pub p99: f64,
    pub min: f64,
    pub max: f64,
}

/// Summarize a non-empty sample sequence. The input is left untouched.
pub fn summarize(samples: &[f64]) -> Result<Summary, StatsError> {
    if samples.is_empty() {
        return Err(StatsError::EmptySampleSet);
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);

    Ok(Summary {
        count: sorted.len(),
        mean: statistical::mean(samples),
        p90: percentile(&sorted, 90.).ok_or(StatsError::EmptySampleSet)?,
        p99: percentile(&sorted, 99.).ok_or(StatsError::EmptySampleSet)?,
        min: sorted[0],
        max: sorted[sorted.len() - 1],
    })
}

/// Percentile of an already sorted slice, interpolating linearly between the two closest
/// ranks. `None` if the slice is empty.
pub fn percentile(sorted: &[f64], pct: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let rank = (pct / 100.).clamp(0., 1.) * last as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}
