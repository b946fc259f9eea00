//! Accumulation of samples into the mode -> site -> cache-state grouping.

use crate::data::classify::classify;
use crate::data::parse::parse_dns_file;
use crate::data::types::{CacheState, Mode, SampleRow, SiteMap, SiteSamples};
use crate::error::{SkipReason, SkippedFile};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Latency samples of every mode and site seen in the input.
///
/// The content depends only on the set of valid rows fed in, never on the
/// order in which files were accumulated.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Grouping {
    modes: BTreeMap<Mode, SiteMap>,
}

impl Grouping {
    /// Create an empty grouping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the valid rows of one file.
    ///
    /// For a cold-kind file the first trial of each site is a cold lookup and
    /// every other trial is warm. For a warm-kind file every row is warm.
    /// Rows with a non-`ok` status or without a latency are ignored.
    pub fn accumulate(&mut self, mode: &Mode, kind: CacheState, rows: &[SampleRow]) {
        let mut batch: BTreeMap<&str, SiteSamples> = BTreeMap::new();

        for row in rows {
            let Some(latency) = row.valid_latency() else {
                continue;
            };
            let state = match kind {
                CacheState::Cold if row.trial == Some(1) => CacheState::Cold,
                _ => CacheState::Warm,
            };
            let entry = batch.entry(row.site.as_str()).or_default();
            match state {
                CacheState::Cold => entry.cold.push(latency),
                CacheState::Warm => entry.warm.push(latency),
            }
        }

        let sites = self.modes.entry(mode.clone()).or_default();
        for (site, samples) in batch {
            let entry = sites.entry(site.to_string()).or_default();
            entry.extend(CacheState::Cold, samples.cold);
            entry.extend(CacheState::Warm, samples.warm);
        }
    }

    /// Merge another grouping into this one.
    pub fn merge(&mut self, other: Self) {
        for (mode, sites) in other.modes {
            let target = self.modes.entry(mode).or_default();
            for (site, samples) in sites {
                let entry = target.entry(site).or_default();
                entry.extend(CacheState::Cold, samples.cold);
                entry.extend(CacheState::Warm, samples.warm);
            }
        }
    }

    /// Classify, parse and accumulate one file.
    ///
    /// # Errors
    ///
    /// Returns the [`SkippedFile`] record if the file cannot contribute.
    pub fn ingest_file(&mut self, path: &Path) -> Result<usize, SkippedFile> {
        let Some((mode, kind)) = classify(path) else {
            return Err(SkippedFile::new(path, SkipReason::UnrecognizedName));
        };
        let rows = parse_dns_file(path).map_err(|reason| SkippedFile::new(path, reason))?;
        tracing::debug!(
            "{} -> mode={} kind={} rows={}",
            path.display(),
            mode,
            kind,
            rows.len()
        );
        self.accumulate(&mode, kind, &rows);
        Ok(rows.len())
    }

    /// Modes present, in lexicographic order.
    pub fn modes(&self) -> impl Iterator<Item = &Mode> {
        self.modes.keys()
    }

    /// Per-site samples of one mode.
    #[must_use]
    pub fn sites(&self, mode: &Mode) -> Option<&SiteMap> {
        self.modes.get(mode)
    }

    /// Iterate over `(mode, sites)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&Mode, &SiteMap)> {
        self.modes.iter()
    }

    /// All samples of one mode and cache state, across sites.
    pub fn mode_samples(&self, mode: &Mode, state: CacheState) -> impl Iterator<Item = f64> + '_ {
        self.modes
            .get(mode)
            .into_iter()
            .flat_map(move |sites| sites.values().flat_map(move |s| s.get(state).iter().copied()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }
}

/// Outcome of ingesting a batch of files.
#[derive(Debug, Clone, Default)]
pub struct Ingested {
    pub grouping: Grouping,
    pub files_used: usize,
    pub skipped: Vec<SkippedFile>,
}

/// Ingest every file, skipping the ones that cannot contribute.
#[must_use]
pub fn ingest_files<P: AsRef<Path>>(files: &[P]) -> Ingested {
    let mut out = Ingested::default();
    for file in files {
        match out.grouping.ingest_file(file.as_ref()) {
            Ok(_) => out.files_used += 1,
            Err(skipped) => out.skipped.push(skipped),
        }
    }
    tracing::info!(
        "Ingested {} file(s), skipped {}",
        out.files_used,
        out.skipped.len()
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn row(site: &str, trial: u32, ms: f64) -> SampleRow {
        SampleRow {
            site: site.into(),
            trial: Some(trial),
            latency_ms: Some(ms),
            status: Some("ok".into()),
        }
    }

    #[test]
    fn test_cold_file_split_by_trial() {
        let mode = Mode::new("dot");
        let mut grouping = Grouping::new();
        grouping.accumulate(
            &mode,
            CacheState::Cold,
            &[row("x", 1, 10.0), row("x", 2, 3.0), row("x", 3, 2.0)],
        );

        let x = &grouping.sites(&mode).unwrap()["x"];
        assert_eq!(x.cold, vec![10.0]);
        assert_eq!(x.warm, vec![2.0, 3.0]);
    }

    #[test]
    fn test_warm_file_ignores_trial() {
        let mode = Mode::new("doh");
        let mut grouping = Grouping::new();
        grouping.accumulate(&mode, CacheState::Warm, &[row("y", 1, 4.0), row("y", 2, 6.0)]);

        let y = &grouping.sites(&mode).unwrap()["y"];
        assert!(y.cold.is_empty());
        assert_eq!(y.warm, vec![4.0, 6.0]);
    }

    #[test]
    fn test_invalid_rows_dropped() {
        let mode = Mode::new("dot");
        let mut failed = row("x", 1, 10.0);
        failed.status = Some("SERVFAIL".into());
        let mut missing = row("x", 2, 0.0);
        missing.latency_ms = None;
        let mut untried = row("x", 1, 8.0);
        untried.trial = None;

        let mut grouping = Grouping::new();
        grouping.accumulate(&mode, CacheState::Cold, &[failed, missing, untried]);

        let x = &grouping.sites(&mode).unwrap()["x"];
        assert!(x.cold.is_empty());
        assert_eq!(x.warm, vec![8.0]);
    }

    #[test]
    fn test_accumulate_order_independent() {
        let mode = Mode::new("public");
        let a = [row("s1", 1, 50.0), row("s1", 2, 5.0), row("s2", 1, 30.0)];
        let b = [row("s1", 1, 6.0), row("s2", 3, 9.0)];

        let mut ab = Grouping::new();
        ab.accumulate(&mode, CacheState::Cold, &a);
        ab.accumulate(&mode, CacheState::Warm, &b);

        let mut ba = Grouping::new();
        ba.accumulate(&mode, CacheState::Warm, &b);
        ba.accumulate(&mode, CacheState::Cold, &a);

        assert_eq!(ab, ba);
    }

    #[test]
    fn test_merge_matches_single_pass() {
        let mode = Mode::new("dot");
        let mut single = Grouping::new();
        single.accumulate(&mode, CacheState::Cold, &[row("a", 1, 1.0), row("a", 2, 2.0)]);

        let mut left = Grouping::new();
        left.accumulate(&mode, CacheState::Cold, &[row("a", 2, 2.0)]);
        let mut right = Grouping::new();
        right.accumulate(&mode, CacheState::Cold, &[row("a", 1, 1.0)]);
        left.merge(right);

        assert_eq!(single, left);
    }

    #[test]
    fn test_ingest_files_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let cold = dir.path().join("modeA_dns_cold.csv");
        let warm = dir.path().join("modeA_dns_warm.csv");
        let junk = dir.path().join("notes.csv");
        fs::write(&cold, "site,trial,ms,status\ns1,1,50,ok\ns1,2,5,ok\n").unwrap();
        fs::write(&warm, "site,trial,ms,status\ns1,1,6,ok\n").unwrap();
        fs::write(&junk, "whatever\n").unwrap();

        let out = ingest_files(&[cold, warm, junk]);
        assert_eq!(out.files_used, 2);
        assert_eq!(out.skipped.len(), 1);
        assert_eq!(out.skipped[0].reason, SkipReason::UnrecognizedName);

        let s1 = &out.grouping.sites(&Mode::new("modeA")).unwrap()["s1"];
        assert_eq!(s1.cold, vec![50.0]);
        assert_eq!(s1.warm, vec![5.0, 6.0]);
    }

    #[test]
    fn test_header_without_site_skips_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("dot_dns_cold.csv");
        fs::write(&file, "host,trial,ms,status\na.com,1,50,ok\n").unwrap();

        let out = ingest_files(&[file]);
        assert_eq!(out.files_used, 0);
        assert_eq!(out.skipped.len(), 1);
        assert_eq!(out.skipped[0].reason, SkipReason::MissingColumns(vec!["site".into()]));
        assert!(out.grouping.is_empty());
    }

    #[test]
    fn test_missing_columns_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("dot_dns_cold.csv");
        fs::write(&bad, "site,ms\na,1\n").unwrap();

        let mut grouping = Grouping::new();
        let skipped = grouping.ingest_file(&bad).unwrap_err();
        assert_eq!(skipped.reason, SkipReason::MissingColumns(vec!["trial".into()]));
        assert!(grouping.is_empty());
    }
}
