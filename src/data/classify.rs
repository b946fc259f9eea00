//! File name classification.
//!
//! Measurement files are named `<mode>_<metric>_<kind>[_suffix].csv`, e.g.
//! `dot_dns_cold.csv` or `local_cache_dns_warm_unpopular.csv`. The mode is the
//! leading token, except that `local_cache` spans two tokens.

use crate::data::types::{CacheState, Mode};
use std::path::Path;

/// Derive the mode from a file name.
///
/// Returns `None` when the name has fewer than three `_`-separated tokens.
#[must_use]
pub fn mode_from_filename(path: &Path) -> Option<Mode> {
    let base = path.file_name()?.to_str()?;
    let parts: Vec<&str> = base.split('_').collect();
    if parts.len() < 3 {
        return None;
    }
    if parts[0] == "local" && parts.len() >= 4 && parts[1] == "cache" {
        return Some(Mode::new("local_cache"));
    }
    if parts[0].is_empty() {
        return None;
    }
    Some(Mode::new(parts[0]))
}

/// Derive the cache-state kind from a file name (`_cold` wins over `_warm`).
#[must_use]
pub fn kind_from_filename(path: &Path) -> Option<CacheState> {
    let base = path.file_name()?.to_str()?.to_lowercase();
    if base.contains("_cold") {
        Some(CacheState::Cold)
    } else if base.contains("_warm") {
        Some(CacheState::Warm)
    } else {
        None
    }
}

/// Classify a file into `(mode, kind)`, or `None` if either facet is missing.
#[must_use]
pub fn classify(path: &Path) -> Option<(Mode, CacheState)> {
    Some((mode_from_filename(path)?, kind_from_filename(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_str(name: &str) -> Option<(String, CacheState)> {
        classify(Path::new(name)).map(|(m, k)| (m.as_str().to_string(), k))
    }

    #[test]
    fn test_leading_token_mode() {
        assert_eq!(
            classify_str("data/raw/dot_dns_cold.csv"),
            Some(("dot".into(), CacheState::Cold))
        );
        assert_eq!(
            classify_str("public_udp_dns_warm.csv"),
            Some(("public".into(), CacheState::Warm))
        );
    }

    #[test]
    fn test_local_cache_two_tokens() {
        assert_eq!(
            classify_str("local_cache_dns_cold.csv"),
            Some(("local_cache".into(), CacheState::Cold))
        );
        // Too short for the two-token rule, falls back to the leading token.
        assert_eq!(
            classify_str("local_cache_cold.csv"),
            Some(("local".into(), CacheState::Cold))
        );
    }

    #[test]
    fn test_kind_is_case_insensitive() {
        assert_eq!(
            kind_from_filename(Path::new("doh_dns_WARM_unpopular.csv")),
            Some(CacheState::Warm)
        );
    }

    #[test]
    fn test_unrecognized_names() {
        assert_eq!(classify_str("dns.csv"), None);
        assert_eq!(classify_str("dot_dns.csv"), None);
        assert_eq!(classify_str("dot_dns_all.csv"), None);
    }
}
