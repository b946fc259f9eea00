//! dnsstat - Statistics over DNS lookup and page-load measurement logs.
//!
//! This crate provides both a library API and a CLI tool for:
//! - Grouping DNS lookup samples by resolution mode, site and cache state
//! - Per-site medians and per-mode quartiles of those medians
//! - Deterministic popular-then-unpopular site ordering
//! - Pooled descriptive statistics, encryption overhead and page-load timing
//! - Summary tables and SVG charts
//!
//! # Library Usage
//!
//! ```ignore
//! use dnsstat::{pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::default();
//! let report = pipeline::run_latency(&config)?;
//! for mode in &report.modes {
//!     println!("{}: {:?}", mode.mode, mode.cold.median);
//! }
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Per-site and per-mode summary (default)
//! dnsstat summary
//! dnsstat summary --dir logs --popular-n 5 --per-site
//!
//! # Raw-sample statistics
//! dnsstat describe --format json
//!
//! # Page-load statistics
//! dnsstat web --no-charts
//! ```
//!
//! # Input
//!
//! Log files are named `<mode>_<dns|web>_<cold|warm>[_...].csv`. The mode
//! is the leading name token (`local_cache` for `local_cache_...` files).
//! Files may carry a named header, a positional header or no header at all.

pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod stats;

// Re-export commonly used types
pub use cli::{Cli, Commands, OutputFormat};
pub use config::{ConfigLoader, PipelineConfig, SiteList};
pub use data::{CacheState, Grouping, Mode, SampleRow};
pub use error::{Error, Result, SkipReason, SkippedFile};
pub use pipeline::{DescribeReport, LatencyReport, ModeReport, SiteRecord, WebReport};
