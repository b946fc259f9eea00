//! Order-statistic summaries.
//!
//! Each site's samples reduce to a median, and each mode's per-site medians
//! reduce to a median with the 25th/75th percentiles. Empty inputs produce
//! `None` values, never a fabricated zero.

use crate::data::types::{CacheState, Mode, SiteSamples};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Percentile of an ascending-sorted slice with linear interpolation.
///
/// `p` is in `[0, 100]`. Returns `None` for an empty slice.
#[must_use]
pub fn percentile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Some((sorted[hi] - sorted[lo]).mul_add(frac, sorted[lo]))
}

/// Percentile of an unsorted slice.
#[must_use]
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    percentile_sorted(&sorted, p)
}

/// Median (mean of the two middle values for even lengths).
#[must_use]
pub fn median(values: &[f64]) -> Option<f64> {
    percentile(values, 50.0)
}

/// Median and count of one sample list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleSummary {
    /// `None` when there are no samples
    pub median: Option<f64>,
    pub count: usize,
}

/// Summarize one site's samples for one cache state.
#[must_use]
pub fn summarize_site(samples: &[f64]) -> SampleSummary {
    SampleSummary {
        median: median(samples),
        count: samples.len(),
    }
}

/// Per-site medians and sample counts for both cache states.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SiteSummary {
    pub cold_median: Option<f64>,
    pub warm_median: Option<f64>,
    pub cold_n: usize,
    pub warm_n: usize,
}

impl SiteSummary {
    /// Summarize both cache states of one site.
    #[must_use]
    pub fn from_samples(samples: &SiteSamples) -> Self {
        let cold = summarize_site(&samples.cold);
        let warm = summarize_site(&samples.warm);
        Self {
            cold_median: cold.median,
            warm_median: warm.median,
            cold_n: cold.count,
            warm_n: warm.count,
        }
    }

    #[must_use]
    pub fn median(&self, state: CacheState) -> Option<f64> {
        match state {
            CacheState::Cold => self.cold_median,
            CacheState::Warm => self.warm_median,
        }
    }

    #[must_use]
    pub fn count(&self, state: CacheState) -> usize {
        match state {
            CacheState::Cold => self.cold_n,
            CacheState::Warm => self.warm_n,
        }
    }
}

/// 25th, 50th and 75th percentile of a set of values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quartiles {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
}

/// Distribution of per-site medians for one mode and cache state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModeSummary {
    pub median: Option<f64>,
    pub q1: Option<f64>,
    pub q3: Option<f64>,
    pub n_sites: usize,
}

impl ModeSummary {
    /// The summary of zero contributing sites.
    pub const EMPTY: Self = Self {
        median: None,
        q1: None,
        q3: None,
        n_sites: 0,
    };

    /// All three percentiles, if the summary has data.
    #[must_use]
    pub fn quartiles(&self) -> Option<Quartiles> {
        Some(Quartiles {
            q1: self.q1?,
            median: self.median?,
            q3: self.q3?,
        })
    }

    #[must_use]
    pub fn has_data(&self) -> bool {
        self.n_sites > 0
    }
}

/// Summarize a mode's per-site medians (sites without data already removed).
#[must_use]
pub fn summarize_mode(site_medians: &[f64]) -> ModeSummary {
    let mut sorted = site_medians.to_vec();
    sorted.sort_by(f64::total_cmp);
    match (
        percentile_sorted(&sorted, 25.0),
        percentile_sorted(&sorted, 50.0),
        percentile_sorted(&sorted, 75.0),
    ) {
        (Some(q1), Some(median), Some(q3)) => ModeSummary {
            median: Some(median),
            q1: Some(q1),
            q3: Some(q3),
            n_sites: sorted.len(),
        },
        _ => ModeSummary::EMPTY,
    }
}

/// Lower and upper error-bar lengths (`median - q1`, `q3 - median`).
///
/// Returns `Ok(None)` when the summary has no data.
///
/// # Errors
///
/// Returns [`Error::InvariantViolation`] if `q1 <= median <= q3` does not
/// hold, which only happens if the summary was built from corrupt input.
pub fn asymmetric_spread(
    mode: &Mode,
    state: CacheState,
    summary: &ModeSummary,
) -> Result<Option<(f64, f64)>> {
    let Some(q) = summary.quartiles() else {
        return Ok(None);
    };
    if q.q1 > q.median || q.median > q.q3 || q.q1.is_nan() || q.q3.is_nan() {
        return Err(Error::InvariantViolation {
            mode: mode.to_string(),
            state: state.to_string(),
            q1: q.q1,
            median: q.median,
            q3: q.q3,
        });
    }
    Ok(Some((q.median - q.q1, q.q3 - q.median)))
}
