//! Error types module.
//!
//! This module defines the error types used throughout the dnsstat crate.
//! It uses `thiserror` for structured error handling and provides
//! a custom `Result` type alias for convenience.
//!
//! Conditions that only exclude a single file or value from aggregation
//! are not errors; see [`SkippedFile`] and the `Option` fields on parsed rows.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// A specialized `Result` type for dnsstat operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for dnsstat.
///
/// Only `NoInputFilesFound` and `InvariantViolation` are produced by the
/// aggregation itself; the rest come from the surrounding I/O.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (reading inputs, writing tables and charts)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader or writer error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON parsing error (configuration files, JSON output)
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid file discovery pattern
    #[error("Invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// Configuration error (invalid config, bad override)
    #[error("Config error: {0}")]
    Config(String),

    /// Parse error (malformed summary table, bad value)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Chart rendering failure
    #[error("Chart error: {0}")]
    Chart(String),

    /// No file in any configured directory matched the pattern.
    #[error("No files matching '{pattern}' found under {}", display_dirs(.dirs))]
    NoInputFilesFound {
        /// Pattern that was searched for
        pattern: String,
        /// Directories that were scanned
        dirs: Vec<PathBuf>,
    },

    /// Percentile ordering broken after aggregation (q1 <= median <= q3).
    #[error("Invariant violated for {mode}/{state}: q1={q1} median={median} q3={q3}")]
    InvariantViolation {
        mode: String,
        state: String,
        q1: f64,
        median: f64,
        q3: f64,
    },
}

impl Error {
    /// Create a new configuration error with a message.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new parse error with a message.
    #[must_use]
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a new chart error with a message.
    #[must_use]
    pub fn chart(msg: impl Into<String>) -> Self {
        Self::Chart(msg.into())
    }
}

impl From<color_eyre::Report> for Error {
    fn from(e: color_eyre::Report) -> Self {
        Self::Config(e.to_string())
    }
}

fn display_dirs(dirs: &[PathBuf]) -> String {
    dirs.iter()
        .map(|d| d.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Why an input file was left out of the aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum SkipReason {
    /// File vanished between discovery and reading
    Missing,
    /// File could not be read or decoded as CSV
    Unreadable(String),
    /// File name carries no recognizable mode or cache state
    UnrecognizedName,
    /// One or more required columns are absent
    MissingColumns(Vec<String>),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => write!(f, "file not found"),
            Self::Unreadable(msg) => write!(f, "unreadable: {msg}"),
            Self::UnrecognizedName => write!(f, "unrecognized file name"),
            Self::MissingColumns(cols) => write!(f, "missing columns: {}", cols.join(", ")),
        }
    }
}

/// An input file excluded from aggregation, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: SkipReason,
}

impl SkippedFile {
    /// Record a skipped file and log it.
    pub fn new(path: impl Into<PathBuf>, reason: SkipReason) -> Self {
        let path = path.into();
        tracing::warn!("Skipping {}: {}", path.display(), reason);
        Self { path, reason }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_input_message_lists_dirs() {
        let err = Error::NoInputFilesFound {
            pattern: "*_dns_*.csv".into(),
            dirs: vec![PathBuf::from("a"), PathBuf::from("b/c")],
        };
        assert_eq!(
            err.to_string(),
            "No files matching '*_dns_*.csv' found under a, b/c"
        );
    }

    #[test]
    fn test_skip_reason_display() {
        let reason = SkipReason::MissingColumns(vec!["site".into(), "trial".into()]);
        assert_eq!(reason.to_string(), "missing columns: site, trial");
        assert_eq!(SkipReason::UnrecognizedName.to_string(), "unrecognized file name");
    }
}
