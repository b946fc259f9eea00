//! Measurement data module.
//!
//! This module turns measurement CSV files into typed rows and groups the
//! DNS latency samples by mode, site and cache state:
//! - File discovery and name classification
//! - Typed CSV parsing (headered and legacy layouts)
//! - Sample grouping with the cold/warm split

pub mod classify;
pub mod discover;
pub mod grouping;
pub mod parse;
pub mod types;

pub use classify::classify;
pub use discover::discover;
pub use grouping::{ingest_files, Grouping, Ingested};
pub use parse::{parse_dns_file, parse_web_file};
pub use types::*;
