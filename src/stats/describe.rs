//! Descriptive statistics over raw latency samples.
//!
//! Unlike the per-site median pipeline these pool every sample of a mode,
//! which is what the quick comparison tables report.

use crate::data::grouping::Grouping;
use crate::data::types::{CacheState, Mode};
use crate::stats::summary::percentile_sorted;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Count, mean, median, spread and range of a sample set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Descriptive {
    pub n: usize,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation; `None` below two samples
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
}

/// Describe a sample set. Returns `None` if it is empty.
#[must_use]
pub fn describe(samples: &[f64]) -> Option<Descriptive> {
    if samples.is_empty() {
        return None;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let std = (n > 1).then(|| {
        let ss: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (n - 1) as f64).sqrt()
    });

    Some(Descriptive {
        n,
        mean,
        median: percentile_sorted(&sorted, 50.0)?,
        std,
        min: sorted[0],
        max: sorted[n - 1],
    })
}

/// Arithmetic mean, `None` for an empty set.
#[must_use]
pub fn mean(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        None
    } else {
        Some(samples.iter().sum::<f64>() / samples.len() as f64)
    }
}

/// Pooled cold/warm statistics of one mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeDescription {
    pub mode: Mode,
    /// Over cold samples with latency > 0
    pub cold: Option<Descriptive>,
    /// Over all warm samples
    pub warm: Option<Descriptive>,
    /// Relative reduction of the median from cold to warm, in percent
    pub improvement_pct: Option<f64>,
}

/// Describe every mode in the grouping.
#[must_use]
pub fn describe_modes(grouping: &Grouping) -> Vec<ModeDescription> {
    grouping
        .modes()
        .map(|mode| {
            let cold: Vec<f64> = grouping
                .mode_samples(mode, CacheState::Cold)
                .filter(|v| *v > 0.0)
                .collect();
            let warm: Vec<f64> = grouping.mode_samples(mode, CacheState::Warm).collect();
            let cold = describe(&cold);
            let warm = describe(&warm);
            let improvement_pct = match (cold, warm) {
                (Some(c), Some(w)) if c.median > 0.0 => {
                    Some((c.median - w.median) / c.median * 100.0)
                }
                _ => None,
            };
            ModeDescription {
                mode: mode.clone(),
                cold,
                warm,
                improvement_pct,
            }
        })
        .collect()
}

/// Median cold latency of encrypted against unencrypted transports.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EncryptionOverhead {
    pub unencrypted_median: f64,
    pub encrypted_median: f64,
    pub overhead_ms: f64,
    pub overhead_pct: f64,
}

/// Compare encrypted and unencrypted modes over cold samples > 0.
///
/// Returns `None` unless both classes have samples.
#[must_use]
pub fn encryption_overhead(grouping: &Grouping) -> Option<EncryptionOverhead> {
    let mut encrypted = Vec::new();
    let mut unencrypted = Vec::new();
    for mode in grouping.modes() {
        let target = match mode.is_encrypted() {
            Some(true) => &mut encrypted,
            Some(false) => &mut unencrypted,
            None => continue,
        };
        target.extend(
            grouping
                .mode_samples(mode, CacheState::Cold)
                .filter(|v| *v > 0.0),
        );
    }

    let enc = describe(&encrypted)?.median;
    let unenc = describe(&unencrypted)?.median;
    let overhead_pct = if unenc > 0.0 {
        (enc / unenc - 1.0) * 100.0
    } else {
        f64::NAN
    };
    Some(EncryptionOverhead {
        unencrypted_median: unenc,
        encrypted_median: enc,
        overhead_ms: enc - unenc,
        overhead_pct,
    })
}

/// Mean latency of popular against unpopular sites for one mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierComparison {
    pub mode: Mode,
    pub popular_mean: Option<f64>,
    pub popular_n: usize,
    pub unpopular_mean: Option<f64>,
    pub unpopular_n: usize,
}

/// Compare site popularity tiers per mode over every sample > 0.
///
/// A site counts as popular if it appears in `popular`, otherwise as
/// unpopular if it appears in `unpopular`; other sites are ignored.
#[must_use]
pub fn compare_tiers(
    grouping: &Grouping,
    popular: &[String],
    unpopular: &[String],
) -> Vec<TierComparison> {
    let popular: HashSet<&str> = popular.iter().map(String::as_str).collect();
    let unpopular: HashSet<&str> = unpopular.iter().map(String::as_str).collect();

    grouping
        .iter()
        .map(|(mode, sites)| {
            let mut pop = Vec::new();
            let mut unpop = Vec::new();
            for (site, samples) in sites {
                let target = if popular.contains(site.as_str()) {
                    &mut pop
                } else if unpopular.contains(site.as_str()) {
                    &mut unpop
                } else {
                    continue;
                };
                target.extend(
                    samples
                        .cold
                        .iter()
                        .chain(&samples.warm)
                        .copied()
                        .filter(|v| *v > 0.0),
                );
            }
            TierComparison {
                mode: mode.clone(),
                popular_mean: mean(&pop),
                popular_n: pop.len(),
                unpopular_mean: mean(&unpop),
                unpopular_n: unpop.len(),
            }
        })
        .collect()
}
