//! Measurement CSV parsing.
//!
//! Two on-disk layouts exist. Newer files carry a header row and columns are
//! found by name (case-insensitive, surrounding whitespace ignored). Older
//! files have no header, or a header whose first cell is a timestamp label,
//! and columns are taken by position from the legacy layout.

use crate::data::types::{PageLoadRow, SampleRow};
use crate::error::SkipReason;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::HashMap;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// A logical column and the header names it may appear under.
#[derive(Debug)]
struct Column {
    key: &'static str,
    aliases: &'static [&'static str],
    required: bool,
}

/// Column layout of one measurement file family.
#[derive(Debug)]
pub struct Schema {
    columns: &'static [Column],
    /// Column keys by position in the headerless legacy layout
    legacy: &'static [&'static str],
}

/// DNS lookup logs: `timestamp, mode, site, trial, ms, status`.
pub static DNS_SCHEMA: Schema = Schema {
    columns: &[
        Column { key: "site", aliases: &["site"], required: true },
        Column { key: "latency_ms", aliases: &["latency_ms", "ms"], required: true },
        Column { key: "trial", aliases: &["trial"], required: true },
        Column { key: "status", aliases: &["status"], required: false },
    ],
    legacy: &["timestamp", "mode", "site", "trial", "latency_ms", "status"],
};

/// Page-load logs: `ts, mode, site, ttfb_ms, dom_ms, load_ms, status`.
pub static WEB_SCHEMA: Schema = Schema {
    columns: &[
        Column { key: "site", aliases: &["site"], required: true },
        Column { key: "load_ms", aliases: &["load_ms"], required: true },
        Column { key: "ttfb_ms", aliases: &["ttfb_ms"], required: false },
        Column { key: "dom_ms", aliases: &["dom_ms"], required: false },
        Column { key: "status", aliases: &["status"], required: false },
    ],
    legacy: &["timestamp", "mode", "site", "ttfb_ms", "dom_ms", "load_ms", "status"],
};

/// Records of one file with their logical column positions resolved.
#[derive(Debug)]
pub struct Table {
    index: HashMap<&'static str, usize>,
    records: Vec<StringRecord>,
}

impl Table {
    /// Read a table from any reader.
    ///
    /// # Errors
    ///
    /// Returns [`SkipReason::MissingColumns`] if a named header lacks a
    /// required column, or [`SkipReason::Unreadable`] if the header row
    /// cannot be decoded.
    pub fn from_reader<R: Read>(reader: R, schema: &Schema) -> Result<Self, SkipReason> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let mut records = rdr.records();
        let first = match records.next() {
            Some(Ok(record)) => record,
            Some(Err(e)) => return Err(SkipReason::Unreadable(e.to_string())),
            None => {
                return Ok(Self {
                    index: legacy_index(schema),
                    records: Vec::new(),
                })
            }
        };

        let header: Vec<String> = first.iter().map(|c| c.trim().to_lowercase()).collect();
        let mut rows = Vec::new();
        let index = if header.iter().any(|c| c == "site") {
            named_index(schema, &header)?
        } else if is_positional_header(&header) {
            legacy_index(schema)
        } else if names_known_column(schema, &header) {
            // A named header without a site column.
            named_index(schema, &header)?
        } else {
            rows.push(first);
            legacy_index(schema)
        };

        for record in records {
            match record {
                Ok(record) => rows.push(record),
                Err(e) => tracing::debug!("Dropping undecodable record: {e}"),
            }
        }

        Ok(Self {
            index,
            records: rows,
        })
    }

    /// Open and read a table from disk.
    ///
    /// # Errors
    ///
    /// Same as [`Table::from_reader`], plus [`SkipReason::Missing`] /
    /// [`SkipReason::Unreadable`] if the file cannot be opened.
    pub fn from_path(path: &Path, schema: &Schema) -> Result<Self, SkipReason> {
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => SkipReason::Missing,
            _ => SkipReason::Unreadable(e.to_string()),
        })?;
        Self::from_reader(file, schema)
    }

    /// Number of data records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether the file carries the given logical column.
    #[must_use]
    pub fn has_column(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    fn text<'r>(&self, record: &'r StringRecord, key: &str) -> Option<&'r str> {
        let idx = *self.index.get(key)?;
        record.get(idx).map(str::trim).filter(|s| !s.is_empty())
    }

    fn number(&self, record: &StringRecord, key: &str) -> Option<f64> {
        self.text(record, key)?
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
    }

    fn trial(&self, record: &StringRecord, key: &str) -> Option<u32> {
        let raw = self.text(record, key)?;
        raw.parse::<u32>().ok().or_else(|| {
            raw.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && *v >= 0.0 && v.fract() == 0.0 && *v <= f64::from(u32::MAX))
                .map(|v| v as u32)
        })
    }

    fn status(&self, record: &StringRecord) -> Option<String> {
        if self.has_column("status") {
            Some(self.text(record, "status").unwrap_or_default().to_string())
        } else {
            None
        }
    }

    /// Convert to DNS sample rows. Records without a site are dropped.
    #[must_use]
    pub fn sample_rows(&self) -> Vec<SampleRow> {
        self.records
            .iter()
            .filter_map(|record| {
                let site = self.text(record, "site")?.to_string();
                Some(SampleRow {
                    site,
                    trial: self.trial(record, "trial"),
                    latency_ms: self.number(record, "latency_ms"),
                    status: self.status(record),
                })
            })
            .collect()
    }

    /// Convert to page-load rows. Records without a site are dropped.
    #[must_use]
    pub fn page_load_rows(&self) -> Vec<PageLoadRow> {
        self.records
            .iter()
            .filter_map(|record| {
                let site = self.text(record, "site")?.to_string();
                Some(PageLoadRow {
                    site,
                    ttfb_ms: self.number(record, "ttfb_ms"),
                    dom_ms: self.number(record, "dom_ms"),
                    load_ms: self.number(record, "load_ms"),
                    status: self.status(record),
                })
            })
            .collect()
    }
}

fn legacy_index(schema: &Schema) -> HashMap<&'static str, usize> {
    schema
        .legacy
        .iter()
        .enumerate()
        .map(|(idx, key)| (*key, idx))
        .collect()
}

fn named_index(
    schema: &Schema,
    header: &[String],
) -> Result<HashMap<&'static str, usize>, SkipReason> {
    let mut index = HashMap::new();
    let mut missing = Vec::new();

    for column in schema.columns {
        let pos = column
            .aliases
            .iter()
            .find_map(|alias| header.iter().position(|h| h == alias));
        match pos {
            Some(pos) => {
                index.insert(column.key, pos);
            }
            None if column.required => missing.push(column.key.to_string()),
            None => {}
        }
    }

    if missing.is_empty() {
        Ok(index)
    } else {
        Err(SkipReason::MissingColumns(missing))
    }
}

fn is_positional_header(header: &[String]) -> bool {
    header.first().is_some_and(|first| {
        first.starts_with("iso") || first.starts_with("timestamp") || first.starts_with("ts")
    })
}

fn names_known_column(schema: &Schema, header: &[String]) -> bool {
    schema
        .columns
        .iter()
        .flat_map(|c| c.aliases)
        .any(|alias| header.iter().any(|h| h == alias))
}

/// Parse a DNS lookup log into sample rows.
///
/// # Errors
///
/// Returns the reason the file has to be skipped.
pub fn parse_dns_file(path: &Path) -> Result<Vec<SampleRow>, SkipReason> {
    let table = Table::from_path(path, &DNS_SCHEMA)?;
    tracing::debug!("{}: {} record(s)", path.display(), table.len());
    Ok(table.sample_rows())
}

/// Parse a page-load log into page-load rows.
///
/// # Errors
///
/// Returns the reason the file has to be skipped.
pub fn parse_web_file(path: &Path) -> Result<Vec<PageLoadRow>, SkipReason> {
    let table = Table::from_path(path, &WEB_SCHEMA)?;
    tracing::debug!("{}: {} record(s)", path.display(), table.len());
    Ok(table.page_load_rows())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dns(text: &str) -> Result<Vec<SampleRow>, SkipReason> {
        Table::from_reader(text.as_bytes(), &DNS_SCHEMA).map(|t| t.sample_rows())
    }

    #[test]
    fn test_named_header_with_whitespace_and_case() {
        let rows = dns(" Site , Trial , MS , Status \na.com,1,12.5,ok\na.com,2,3,OK\n").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].site, "a.com");
        assert_eq!(rows[0].trial, Some(1));
        assert_eq!(rows[0].latency_ms, Some(12.5));
        assert!(rows[1].is_ok());
    }

    #[test]
    fn test_latency_ms_alias() {
        let rows = dns("site,trial,latency_ms\nb.org,1,7\n").unwrap();
        assert_eq!(rows[0].latency_ms, Some(7.0));
        // No status column: every row counts as valid.
        assert_eq!(rows[0].status, None);
        assert!(rows[0].is_ok());
    }

    #[test]
    fn test_missing_required_columns() {
        let err = dns("site,status\na.com,ok\n").unwrap_err();
        assert_eq!(
            err,
            SkipReason::MissingColumns(vec!["latency_ms".into(), "trial".into()])
        );
    }

    #[test]
    fn test_headerless_legacy_layout() {
        let text = "2024-11-02T10:00:00Z,dot,a.com,1,40.2,ok\n\
                    2024-11-02T10:00:01Z,dot,a.com,2,NA,ok\n";
        let rows = dns(text).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].latency_ms, Some(40.2));
        assert_eq!(rows[1].latency_ms, None);
        assert_eq!(rows[1].trial, Some(2));
    }

    #[test]
    fn test_positional_header_is_not_data() {
        let rows = dns("iso,mode,host,n,ms,status\nx,dot,a.com,1,9,ok\n").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].site, "a.com");
        assert_eq!(rows[0].latency_ms, Some(9.0));
    }

    #[test]
    fn test_unparseable_values_are_missing() {
        let rows = dns("site,trial,ms,status\na.com,x,inf,ok\n,1,3,ok\n").unwrap();
        // The row without a site is dropped entirely.
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].trial, None);
        assert_eq!(rows[0].latency_ms, None);
    }

    #[test]
    fn test_short_row_has_failed_status() {
        let rows = dns("site,trial,ms,status\na.com,1,5\n").unwrap();
        assert_eq!(rows[0].status.as_deref(), Some(""));
        assert!(!rows[0].is_ok());
    }

    #[test]
    fn test_float_trial() {
        let rows = dns("site,trial,ms\na.com,2.0,5\n").unwrap();
        assert_eq!(rows[0].trial, Some(2));
    }

    #[test]
    fn test_empty_file_has_no_rows() {
        assert!(dns("").unwrap().is_empty());
    }

    #[test]
    fn test_header_without_site_is_skipped() {
        let err = dns("host,trial,ms,status\na.com,1,50,ok\n").unwrap_err();
        assert_eq!(err, SkipReason::MissingColumns(vec!["site".into()]));

        let err = dns("time,mode,domain,trial,ms,status\nt,dot,a.com,1,50,ok\n").unwrap_err();
        assert_eq!(err, SkipReason::MissingColumns(vec!["site".into()]));
    }

    #[test]
    fn test_ts_prefixed_positional_header() {
        let text = "ts_utc,mode,host,ttfb,dom,load,result\nt,dot,a.com,10,20,30,ok\n";
        let table = Table::from_reader(text.as_bytes(), &WEB_SCHEMA).unwrap();
        let rows = table.page_load_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].site, "a.com");
        assert_eq!(rows[0].load_ms, Some(30.0));
    }

    #[test]
    fn test_web_rows() {
        let text = "ts,mode,site,ttfb_ms,dom_ms,load_ms,status\n\
                    t,dot,a.com,120,480,900,ok\n\
                    t,dot,b.com,NA,NA,NA,error\n";
        let table = Table::from_reader(text.as_bytes(), &WEB_SCHEMA).unwrap();
        let rows = table.page_load_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].load_ms, Some(900.0));
        assert_eq!(rows[0].ttfb_ms, Some(120.0));
        assert_eq!(rows[1].load_ms, None);
        assert!(!rows[1].is_ok());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = parse_dns_file(&dir.path().join("gone_dns_cold.csv")).unwrap_err();
        assert_eq!(err, SkipReason::Missing);
    }
}
