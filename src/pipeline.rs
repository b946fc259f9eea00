//! Batch pipelines.
//!
//! Each pipeline is one straight pass: discover files, ingest them, reduce
//! to summaries. Nothing here writes output; see [`crate::output`].

use crate::config::{PipelineConfig, SiteList};
use crate::data::grouping::{ingest_files, Grouping};
use crate::data::{discover, CacheState, Mode};
use crate::error::{Error, Result, SkippedFile};
use crate::stats::{
    asymmetric_spread, balance, compare_tiers, describe_modes, encryption_overhead,
    order_sites, summarize_mode, Balance, EncryptionOverhead, ModeDescription, ModeSummary,
    PageLoadSummary, PageLoads, SiteSummary, TierComparison,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One per-site row in presentation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteRecord {
    pub site: String,
    pub cold_median: Option<f64>,
    pub warm_median: Option<f64>,
    pub cold_n: usize,
    pub warm_n: usize,
}

impl SiteRecord {
    fn new(site: String, summary: &SiteSummary) -> Self {
        Self {
            site,
            cold_median: summary.cold_median,
            warm_median: summary.warm_median,
            cold_n: summary.cold_n,
            warm_n: summary.warm_n,
        }
    }
}

/// One row of the per-mode summary table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeStateRecord {
    pub mode: Mode,
    pub cache_state: CacheState,
    pub median: Option<f64>,
    pub q1: Option<f64>,
    pub q3: Option<f64>,
    pub n_sites: usize,
}

/// Aggregated view of one mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeReport {
    pub mode: Mode,
    pub cold: ModeSummary,
    pub warm: ModeSummary,
    /// Per-site summaries in presentation order
    pub sites: Vec<SiteRecord>,
}

impl ModeReport {
    #[must_use]
    pub fn summary(&self, state: CacheState) -> &ModeSummary {
        match state {
            CacheState::Cold => &self.cold,
            CacheState::Warm => &self.warm,
        }
    }

    #[must_use]
    pub fn has_data(&self) -> bool {
        self.cold.has_data() || self.warm.has_data()
    }
}

/// Result of the per-site / per-mode latency aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatencyReport {
    pub generated_at: DateTime<Utc>,
    pub files_used: usize,
    pub skipped: Vec<SkippedFile>,
    pub modes: Vec<ModeReport>,
}

impl LatencyReport {
    /// Flatten into `{mode, cache_state, median, q1, q3, n_sites}` rows.
    #[must_use]
    pub fn mode_state_records(&self) -> Vec<ModeStateRecord> {
        self.modes
            .iter()
            .flat_map(|m| {
                CacheState::ALL.iter().map(move |state| {
                    let s = m.summary(*state);
                    ModeStateRecord {
                        mode: m.mode.clone(),
                        cache_state: *state,
                        median: s.median,
                        q1: s.q1,
                        q3: s.q3,
                        n_sites: s.n_sites,
                    }
                })
            })
            .collect()
    }

    /// Modes with at least one contributing site in either state.
    pub fn modes_with_data(&self) -> impl Iterator<Item = &ModeReport> {
        self.modes.iter().filter(|m| m.has_data())
    }
}

/// Reduce a grouping to per-mode reports.
///
/// # Errors
///
/// Returns [`Error::InvariantViolation`] if a mode summary comes out with
/// its percentiles out of order.
pub fn analyze(
    grouping: &Grouping,
    popular: &[String],
    unpopular: &[String],
    popular_n: usize,
    unpopular_n: usize,
) -> Result<Vec<ModeReport>> {
    let mut reports = Vec::new();

    for (mode, sites) in grouping.iter() {
        let site_stats: BTreeMap<String, SiteSummary> = sites
            .iter()
            .map(|(site, samples)| (site.clone(), SiteSummary::from_samples(samples)))
            .collect();

        let summarize = |state: CacheState| -> Result<ModeSummary> {
            let medians: Vec<f64> = site_stats.values().filter_map(|s| s.median(state)).collect();
            let summary = summarize_mode(&medians);
            asymmetric_spread(mode, state, &summary)?;
            Ok(summary)
        };
        let cold = summarize(CacheState::Cold)?;
        let warm = summarize(CacheState::Warm)?;

        let sites = order_sites(&site_stats, popular, unpopular, popular_n, unpopular_n)
            .into_iter()
            .map(|site| {
                let summary = site_stats[&site];
                SiteRecord::new(site, &summary)
            })
            .collect();

        tracing::debug!(
            "{}: cold n_sites={} warm n_sites={}",
            mode,
            cold.n_sites,
            warm.n_sites
        );
        reports.push(ModeReport {
            mode: mode.clone(),
            cold,
            warm,
            sites,
        });
    }

    Ok(reports)
}

fn load_site_lists(config: &PipelineConfig) -> Result<(SiteList, SiteList)> {
    Ok((
        SiteList::load(&config.popular_sites, None)?,
        SiteList::load(&config.unpopular_sites, None)?,
    ))
}

fn ingest_dns(config: &PipelineConfig) -> Result<(Grouping, usize, Vec<SkippedFile>)> {
    let files = discover(&config.input_dirs, &config.dns_pattern)?;
    let ingested = ingest_files(&files);
    Ok((ingested.grouping, ingested.files_used, ingested.skipped))
}

/// Run the latency aggregation described by `config`.
///
/// # Errors
///
/// Fails if no input file matches, if a site list cannot be read, or if an
/// aggregation invariant is violated.
pub fn run_latency(config: &PipelineConfig) -> Result<LatencyReport> {
    let (grouping, files_used, skipped) = ingest_dns(config)?;
    let (popular, unpopular) = load_site_lists(config)?;

    let modes = analyze(
        &grouping,
        &popular.sites,
        &unpopular.sites,
        config.popular_n,
        config.unpopular_n,
    )?;
    tracing::info!("Summarized {} mode(s)", modes.len());

    Ok(LatencyReport {
        generated_at: Utc::now(),
        files_used,
        skipped,
        modes,
    })
}

/// Pooled descriptive statistics, encryption overhead and popularity tiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescribeReport {
    pub generated_at: DateTime<Utc>,
    pub modes: Vec<ModeDescription>,
    pub encryption: Option<EncryptionOverhead>,
    pub tiers: Vec<TierComparison>,
    /// Pooled cold/warm samples per mode, for distribution charts
    #[serde(skip)]
    pub distributions: Vec<(Mode, Vec<f64>, Vec<f64>)>,
    pub skipped: Vec<SkippedFile>,
}

/// Run the pooled-sample statistics.
///
/// # Errors
///
/// Fails if no input file matches or a site list cannot be read.
pub fn run_describe(config: &PipelineConfig) -> Result<DescribeReport> {
    let (grouping, _, skipped) = ingest_dns(config)?;
    let (popular, unpopular) = load_site_lists(config)?;

    let distributions = grouping
        .modes()
        .map(|mode| {
            (
                mode.clone(),
                grouping.mode_samples(mode, CacheState::Cold).collect(),
                grouping.mode_samples(mode, CacheState::Warm).collect(),
            )
        })
        .collect();

    Ok(DescribeReport {
        generated_at: Utc::now(),
        modes: describe_modes(&grouping),
        encryption: encryption_overhead(&grouping),
        tiers: compare_tiers(&grouping, &popular.sites, &unpopular.sites),
        distributions,
        skipped,
    })
}

/// Page-load summaries and the DNS/page-load balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebReport {
    pub generated_at: DateTime<Utc>,
    pub summaries: Vec<PageLoadSummary>,
    pub balance: Vec<Balance>,
    pub skipped: Vec<SkippedFile>,
}

/// Run the page-load statistics.
///
/// DNS logs are optional here: without them the balance only carries the
/// page-load side.
///
/// # Errors
///
/// Fails if no page-load file matches.
pub fn run_web(config: &PipelineConfig) -> Result<WebReport> {
    let files = discover(&config.input_dirs, &config.web_pattern)?;
    let loads = PageLoads::from_files(&files);
    let mut skipped = loads.skipped.clone();

    let dns = match ingest_dns(config) {
        Ok((grouping, _, dns_skipped)) => {
            skipped.extend(dns_skipped);
            grouping
        }
        Err(Error::NoInputFilesFound { pattern, .. }) => {
            tracing::info!("No DNS logs matching {pattern}, page-load only");
            Grouping::new()
        }
        Err(e) => return Err(e),
    };

    Ok(WebReport {
        generated_at: Utc::now(),
        summaries: loads.summaries(),
        balance: balance(&dns, &loads),
        skipped,
    })
}
