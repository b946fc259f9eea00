//! Measurement types and data structures.
//!
//! This module provides the core types used to represent parsed measurement
//! rows and the nested mode -> site -> cache-state sample grouping.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// DNS resolution method under test.
///
/// Modes are open-ended: whatever leading token a file name carries becomes
/// the mode. The well-known ones get a display label and an encryption class.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mode(String);

impl Mode {
    /// Create a mode from its raw identifier (e.g. `dot`, `local_cache`).
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Raw identifier as derived from the file name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human-readable label for charts and tables.
    #[must_use]
    pub fn label(&self) -> String {
        match self.0.as_str() {
            "public" | "public_udp" => "Public UDP".to_string(),
            "isp" | "isp_udp" => "ISP UDP".to_string(),
            "dot" => "DoT".to_string(),
            "doh" => "DoH".to_string(),
            "local_cache" => "Local cache".to_string(),
            other => other.to_string(),
        }
    }

    /// Whether the mode carries queries over an encrypted transport.
    ///
    /// Returns `None` for modes outside the public/ISP/DoT/DoH families.
    #[must_use]
    pub fn is_encrypted(&self) -> Option<bool> {
        match self.0.as_str() {
            "dot" | "doh" => Some(true),
            "public" | "public_udp" | "isp" | "isp_udp" => Some(false),
            _ => None,
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.0)
    }
}

/// Cache state of a lookup, also used as the "kind" facet of a file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheState {
    /// First lookup, unaffected by caching
    Cold,
    /// Repeat lookup that may hit a resolver or OS cache
    Warm,
}

impl CacheState {
    /// Both states, cold first.
    pub const ALL: [Self; 2] = [Self::Cold, Self::Warm];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cold => "cold",
            Self::Warm => "warm",
        }
    }
}

impl std::fmt::Display for CacheState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for CacheState {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cold" => Ok(Self::Cold),
            "warm" => Ok(Self::Warm),
            _ => Err(format!("Unknown cache state: {s}")),
        }
    }
}

/// One DNS lookup measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRow {
    pub site: String,
    /// Ordinal within the repeated lookups for this site; `None` if unparseable
    pub trial: Option<u32>,
    /// Lookup latency; `None` if missing or not a finite number
    pub latency_ms: Option<f64>,
    /// `None` when the file has no status column
    pub status: Option<String>,
}

impl SampleRow {
    /// Whether the row reported success (or carries no status at all).
    #[must_use]
    pub fn is_ok(&self) -> bool {
        status_ok(self.status.as_deref())
    }

    /// Latency of a successful row, if it has one.
    #[must_use]
    pub fn valid_latency(&self) -> Option<f64> {
        if self.is_ok() {
            self.latency_ms
        } else {
            None
        }
    }
}

/// One page-load measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLoadRow {
    pub site: String,
    pub ttfb_ms: Option<f64>,
    pub dom_ms: Option<f64>,
    pub load_ms: Option<f64>,
    pub status: Option<String>,
}

impl PageLoadRow {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        status_ok(self.status.as_deref())
    }
}

fn status_ok(status: Option<&str>) -> bool {
    status.map_or(true, |s| s.trim().eq_ignore_ascii_case("ok"))
}

/// Raw latency samples of one site under one mode, split by cache state.
///
/// Both lists are kept sorted ascending.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteSamples {
    pub cold: Vec<f64>,
    pub warm: Vec<f64>,
}

impl SiteSamples {
    /// Samples for the given cache state.
    #[must_use]
    pub fn get(&self, state: CacheState) -> &[f64] {
        match state {
            CacheState::Cold => &self.cold,
            CacheState::Warm => &self.warm,
        }
    }

    pub(crate) fn extend(&mut self, state: CacheState, values: impl IntoIterator<Item = f64>) {
        let list = match state {
            CacheState::Cold => &mut self.cold,
            CacheState::Warm => &mut self.warm,
        };
        list.extend(values);
        list.sort_by(f64::total_cmp);
    }
}

/// Per-site samples of one mode, keyed by site identifier.
pub type SiteMap = BTreeMap<String, SiteSamples>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_labels() {
        assert_eq!(Mode::new("dot").label(), "DoT");
        assert_eq!(Mode::new("local_cache").label(), "Local cache");
        assert_eq!(Mode::new("carrier").label(), "carrier");
    }

    #[test]
    fn test_mode_encryption_class() {
        assert_eq!(Mode::new("doh").is_encrypted(), Some(true));
        assert_eq!(Mode::new("public").is_encrypted(), Some(false));
        assert_eq!(Mode::new("local_cache").is_encrypted(), None);
    }

    #[test]
    fn test_cache_state_parse() {
        assert_eq!("Cold".parse::<CacheState>(), Ok(CacheState::Cold));
        assert_eq!(" warm ".parse::<CacheState>(), Ok(CacheState::Warm));
        assert!("hot".parse::<CacheState>().is_err());
    }

    #[test]
    fn test_status_filter() {
        let mut row = SampleRow {
            site: "a.com".into(),
            trial: Some(1),
            latency_ms: Some(12.0),
            status: Some("OK".into()),
        };
        assert_eq!(row.valid_latency(), Some(12.0));

        row.status = Some("timeout".into());
        assert_eq!(row.valid_latency(), None);

        row.status = None;
        assert!(row.is_ok());
    }

    #[test]
    fn test_site_samples_stay_sorted() {
        let mut samples = SiteSamples::default();
        samples.extend(CacheState::Warm, [5.0, 1.0]);
        samples.extend(CacheState::Warm, [3.0]);
        assert_eq!(samples.get(CacheState::Warm), &[1.0, 3.0, 5.0]);
        assert!(samples.get(CacheState::Cold).is_empty());
    }
}
