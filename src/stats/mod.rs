//! Statistics module.
//!
//! This module reduces grouped samples to summaries:
//! - Per-site medians and per-mode quartiles of those medians
//! - Deterministic site ordering for presentation
//! - Pooled descriptive statistics, tier and encryption comparisons
//! - Page-load timing summaries

pub mod describe;
pub mod order;
pub mod summary;
pub mod web;

pub use describe::{
    compare_tiers, describe, describe_modes, encryption_overhead, Descriptive, EncryptionOverhead,
    ModeDescription, TierComparison,
};
pub use order::order_sites;
pub use summary::{
    asymmetric_spread, median, percentile, summarize_mode, summarize_site, ModeSummary,
    Quartiles, SampleSummary, SiteSummary,
};
pub use web::{balance, Balance, PageLoadSummary, PageLoads};
