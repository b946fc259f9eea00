//! Page-load timing statistics.

use crate::data::classify::classify;
use crate::data::grouping::Grouping;
use crate::data::parse::parse_web_file;
use crate::data::types::{CacheState, Mode, PageLoadRow};
use crate::error::{SkipReason, SkippedFile};
use crate::stats::describe::mean;
use crate::stats::summary::median;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Successful page-load rows grouped by mode and cache state.
#[derive(Debug, Clone, Default)]
pub struct PageLoads {
    groups: BTreeMap<(Mode, CacheState), Vec<PageLoadRow>>,
    pub files_used: usize,
    pub skipped: Vec<SkippedFile>,
}

impl PageLoads {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the successful rows of one file.
    pub fn accumulate(&mut self, mode: &Mode, kind: CacheState, rows: Vec<PageLoadRow>) {
        self.groups
            .entry((mode.clone(), kind))
            .or_default()
            .extend(rows.into_iter().filter(PageLoadRow::is_ok));
    }

    /// Classify, parse and accumulate one file, recording skips.
    pub fn ingest_file(&mut self, path: &Path) {
        let Some((mode, kind)) = classify(path) else {
            self.skipped
                .push(SkippedFile::new(path, SkipReason::UnrecognizedName));
            return;
        };
        match parse_web_file(path) {
            Ok(rows) => {
                self.accumulate(&mode, kind, rows);
                self.files_used += 1;
            }
            Err(reason) => self.skipped.push(SkippedFile::new(path, reason)),
        }
    }

    /// Ingest a batch of files.
    #[must_use]
    pub fn from_files<P: AsRef<Path>>(files: &[P]) -> Self {
        let mut loads = Self::new();
        for file in files {
            loads.ingest_file(file.as_ref());
        }
        loads
    }

    /// Summaries per (mode, cache state), modes in lexicographic order.
    #[must_use]
    pub fn summaries(&self) -> Vec<PageLoadSummary> {
        self.groups
            .iter()
            .map(|((mode, state), rows)| PageLoadSummary::from_rows(mode, *state, rows))
            .collect()
    }

    /// Mean `load_ms` (> 0) per mode, cold and warm together.
    #[must_use]
    pub fn load_means(&self) -> BTreeMap<Mode, f64> {
        let mut pooled: BTreeMap<&Mode, Vec<f64>> = BTreeMap::new();
        for ((mode, _), rows) in &self.groups {
            pooled
                .entry(mode)
                .or_default()
                .extend(positive(rows.iter().map(|r| r.load_ms)));
        }
        pooled
            .into_iter()
            .filter_map(|(mode, values)| Some((mode.clone(), mean(&values)?)))
            .collect()
    }
}

fn positive(values: impl Iterator<Item = Option<f64>>) -> impl Iterator<Item = f64> {
    values.flatten().filter(|v| *v > 0.0)
}

/// Page-load statistics of one mode and cache state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLoadSummary {
    pub mode: Mode,
    pub cache_state: CacheState,
    /// Successful rows, including ones with missing timings
    pub samples: usize,
    pub load_mean: Option<f64>,
    pub load_median: Option<f64>,
    pub ttfb_median: Option<f64>,
    pub dom_median: Option<f64>,
}

impl PageLoadSummary {
    #[must_use]
    pub fn from_rows(mode: &Mode, cache_state: CacheState, rows: &[PageLoadRow]) -> Self {
        let load: Vec<f64> = positive(rows.iter().map(|r| r.load_ms)).collect();
        let ttfb: Vec<f64> = rows.iter().filter_map(|r| r.ttfb_ms).collect();
        let dom: Vec<f64> = rows.iter().filter_map(|r| r.dom_ms).collect();
        Self {
            mode: mode.clone(),
            cache_state,
            samples: rows.len(),
            load_mean: mean(&load),
            load_median: median(&load),
            ttfb_median: median(&ttfb),
            dom_median: median(&dom),
        }
    }
}

/// DNS lookup cost against page-load cost for one mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub mode: Mode,
    pub dns_mean: Option<f64>,
    pub page_load_mean: Option<f64>,
}

/// Pair mean DNS latency (samples > 0) with mean page load for every mode
/// seen on either side.
#[must_use]
pub fn balance(dns: &Grouping, loads: &PageLoads) -> Vec<Balance> {
    let load_means = loads.load_means();
    let mut modes: Vec<Mode> = dns.modes().cloned().collect();
    modes.extend(load_means.keys().cloned());
    modes.sort();
    modes.dedup();

    modes
        .into_iter()
        .map(|mode| {
            let dns_samples: Vec<f64> = CacheState::ALL
                .iter()
                .flat_map(|state| dns.mode_samples(&mode, *state))
                .filter(|v| *v > 0.0)
                .collect();
            Balance {
                dns_mean: mean(&dns_samples),
                page_load_mean: load_means.get(&mode).copied(),
                mode,
            }
        })
        .collect()
}
