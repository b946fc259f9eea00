//! Summary tables written next to the charts.
//!
//! Values are rounded to one decimal place before writing, and absent values
//! are written as empty fields, so reading a table back yields exactly the
//! rounded values.

use crate::error::{Error, Result};
use crate::pipeline::{ModeStateRecord, SiteRecord};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// File name of the per-mode summary table.
pub const MODE_SUMMARY_FILE: &str = "mode_summary.csv";

/// Round to one decimal place.
#[must_use]
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round_opt(value: Option<f64>) -> Option<f64> {
    value.map(round1)
}

impl ModeStateRecord {
    /// Copy with every value rounded for output.
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self {
            median: round_opt(self.median),
            q1: round_opt(self.q1),
            q3: round_opt(self.q3),
            ..self.clone()
        }
    }
}

impl SiteRecord {
    /// Copy with both medians rounded for output.
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self {
            cold_median: round_opt(self.cold_median),
            warm_median: round_opt(self.warm_median),
            ..self.clone()
        }
    }
}

fn write_rows<T: Serialize>(path: &Path, rows: impl IntoIterator<Item = T>) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    tracing::debug!("Wrote {}", path.display());
    Ok(())
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;
    let mut rows = Vec::new();
    for (idx, row) in reader.deserialize().enumerate() {
        let row = row.map_err(|e| {
            Error::parse(format!("{} row {}: {e}", path.display(), idx + 1))
        })?;
        rows.push(row);
    }
    Ok(rows)
}

/// Write `mode,cache_state,median,q1,q3,n_sites` rows, overwriting `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_mode_summary(path: &Path, records: &[ModeStateRecord]) -> Result<()> {
    write_rows(path, records.iter().map(ModeStateRecord::rounded))
}

/// Read a table written by [`write_mode_summary`].
///
/// # Errors
///
/// Returns an error if the file cannot be read or a row is malformed.
pub fn read_mode_summary(path: &Path) -> Result<Vec<ModeStateRecord>> {
    read_rows(path)
}

/// Write `site,cold_median,warm_median,cold_n,warm_n` rows in the given order.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_per_site(path: &Path, records: &[SiteRecord]) -> Result<()> {
    write_rows(path, records.iter().map(SiteRecord::rounded))
}

/// Read a table written by [`write_per_site`].
///
/// # Errors
///
/// Returns an error if the file cannot be read or a row is malformed.
pub fn read_per_site(path: &Path) -> Result<Vec<SiteRecord>> {
    read_rows(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{CacheState, Mode};

    fn record(mode: &str, state: CacheState, median: Option<f64>, n: usize) -> ModeStateRecord {
        ModeStateRecord {
            mode: Mode::new(mode),
            cache_state: state,
            median,
            q1: median.map(|m| m - 1.234),
            q3: median.map(|m| m + 2.06),
            n_sites: n,
        }
    }

    #[test]
    fn test_round1() {
        assert_eq!(round1(12.34), 12.3);
        assert_eq!(round1(12.36), 12.4);
        assert_eq!(round1(-0.04), -0.0);
    }

    #[test]
    fn test_mode_summary_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MODE_SUMMARY_FILE);
        let records = vec![
            record("dot", CacheState::Cold, Some(41.4567), 12),
            record("dot", CacheState::Warm, Some(1.05), 12),
            record("local_cache", CacheState::Cold, None, 0),
        ];

        write_mode_summary(&path, &records).unwrap();
        let back = read_mode_summary(&path).unwrap();

        let expected: Vec<ModeStateRecord> = records.iter().map(ModeStateRecord::rounded).collect();
        assert_eq!(back, expected);
        assert_eq!(back[0].median, Some(41.5));
        assert_eq!(back[2].median, None);
        assert_eq!(back[2].n_sites, 0);
    }

    #[test]
    fn test_mode_summary_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MODE_SUMMARY_FILE);
        write_mode_summary(&path, &[record("doh", CacheState::Warm, None, 0)]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("mode,cache_state,median,q1,q3,n_sites"));
        assert_eq!(lines.next(), Some("doh,warm,,,,0"));
    }

    #[test]
    fn test_malformed_summary_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MODE_SUMMARY_FILE);
        std::fs::write(
            &path,
            "mode,cache_state,median,q1,q3,n_sites\ndot,cold,1.0,0.5,2.0,3\ndot,lukewarm,,,,0\n",
        )
        .unwrap();

        let err = read_mode_summary(&path).unwrap_err();
        assert!(matches!(err, Error::Parse(ref msg) if msg.contains("row 2")));
    }

    #[test]
    fn test_per_site_round_trip_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dot_per_site.csv");
        let records = vec![
            SiteRecord {
                site: "z.com".into(),
                cold_median: Some(33.333),
                warm_median: None,
                cold_n: 1,
                warm_n: 0,
            },
            SiteRecord {
                site: "a.com".into(),
                cold_median: None,
                warm_median: Some(2.25),
                cold_n: 0,
                warm_n: 4,
            },
        ];

        write_per_site(&path, &records).unwrap();
        let back = read_per_site(&path).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back[0].site, "z.com");
        assert_eq!(back[0].cold_median, Some(33.3));
        assert_eq!(back[1].warm_median, Some(2.3));
        assert_eq!(back[1].cold_median, None);
    }
}
