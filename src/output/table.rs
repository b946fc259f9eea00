//! Console output of reports in table, JSON, CSV and TSV form.

use crate::cli::OutputFormat;
use crate::data::{CacheState, Mode};
use crate::error::Result;
use crate::output::files::round1;
use crate::pipeline::{DescribeReport, LatencyReport, WebReport};
use crate::stats::Descriptive;
use serde::Serialize;
use std::fmt::Write as _;
use std::io;

const NA: &str = "N/A";

fn ms(value: Option<f64>) -> String {
    value.map_or_else(|| NA.to_string(), |v| format!("{v:.1}"))
}

fn pct(value: Option<f64>) -> String {
    value.map_or_else(|| NA.to_string(), |v| format!("{v:.1}%"))
}

fn delimiter(format: OutputFormat) -> u8 {
    if format == OutputFormat::Tsv {
        b'\t'
    } else {
        b','
    }
}

/// Serialize flat rows as delimited text.
///
/// # Errors
///
/// Returns an error if a row cannot be serialized or written.
pub fn write_delimited<W, T, I>(out: W, format: OutputFormat, rows: I) -> Result<()>
where
    W: io::Write,
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter(format))
        .from_writer(out);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

#[derive(Debug, Serialize)]
struct SiteRow<'a> {
    mode: &'a Mode,
    site: &'a str,
    cold_median: Option<f64>,
    warm_median: Option<f64>,
    cold_n: usize,
    warm_n: usize,
}

fn site_rows(report: &LatencyReport) -> impl Iterator<Item = SiteRow<'_>> {
    report.modes.iter().flat_map(|m| {
        m.sites.iter().map(move |s| SiteRow {
            mode: &m.mode,
            site: &s.site,
            cold_median: s.cold_median.map(round1),
            warm_median: s.warm_median.map(round1),
            cold_n: s.cold_n,
            warm_n: s.warm_n,
        })
    })
}

/// Render the per-mode summary, optionally followed by per-site rows.
#[must_use]
pub fn latency_table(report: &LatencyReport, per_site: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<14} {:<6} {:>10} {:>10} {:>10} {:>8}",
        "Mode", "State", "Median", "Q1", "Q3", "Sites"
    );
    let _ = writeln!(out, "{}", "-".repeat(63));
    for r in report.mode_state_records() {
        let _ = writeln!(
            out,
            "{:<14} {:<6} {:>10} {:>10} {:>10} {:>8}",
            r.mode.as_str(),
            r.cache_state,
            ms(r.median),
            ms(r.q1),
            ms(r.q3),
            r.n_sites
        );
    }

    if per_site {
        for mode in &report.modes {
            let _ = writeln!(out, "\n=== {} ({} sites) ===", mode.mode.label(), mode.sites.len());
            let _ = writeln!(
                out,
                "{:<4} {:<32} {:>10} {:>6} {:>10} {:>6}",
                "#", "Site", "Cold", "n", "Warm", "n"
            );
            for (idx, s) in mode.sites.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "{:<4} {:<32} {:>10} {:>6} {:>10} {:>6}",
                    idx + 1,
                    s.site,
                    ms(s.cold_median),
                    s.cold_n,
                    ms(s.warm_median),
                    s.warm_n
                );
            }
        }
    }
    out
}

/// Print a latency report in the requested format.
///
/// # Errors
///
/// Returns an error if serialization or writing to stdout fails.
pub fn print_latency(report: &LatencyReport, format: OutputFormat, per_site: bool) -> Result<()> {
    match format {
        OutputFormat::Table => {
            print!("{}", latency_table(report, per_site));
            println!("\n=== Summary ===");
            println!("Files used: {}", report.files_used);
            println!("Files skipped: {}", report.skipped.len());
            println!("Modes: {}", report.modes.len());
            Ok(())
        }
        OutputFormat::Json => print_json(report),
        OutputFormat::Csv | OutputFormat::Tsv if per_site => {
            write_delimited(io::stdout().lock(), format, site_rows(report))
        }
        OutputFormat::Csv | OutputFormat::Tsv => write_delimited(
            io::stdout().lock(),
            format,
            report.mode_state_records().iter().map(|r| r.rounded()),
        ),
    }
}

#[derive(Debug, Serialize)]
struct DescriptiveRow<'a> {
    mode: &'a Mode,
    cache_state: CacheState,
    n: usize,
    mean: f64,
    median: f64,
    std: Option<f64>,
    min: f64,
    max: f64,
}

impl<'a> DescriptiveRow<'a> {
    fn new(mode: &'a Mode, cache_state: CacheState, d: &Descriptive) -> Self {
        Self {
            mode,
            cache_state,
            n: d.n,
            mean: round1(d.mean),
            median: round1(d.median),
            std: d.std.map(round1),
            min: round1(d.min),
            max: round1(d.max),
        }
    }
}

fn descriptive_rows(report: &DescribeReport) -> impl Iterator<Item = DescriptiveRow<'_>> {
    report.modes.iter().flat_map(|m| {
        [(CacheState::Cold, m.cold), (CacheState::Warm, m.warm)]
            .into_iter()
            .filter_map(move |(state, d)| Some(DescriptiveRow::new(&m.mode, state, &d?)))
    })
}

/// Render pooled statistics, encryption overhead and tier comparison.
#[must_use]
pub fn describe_table(report: &DescribeReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<14} {:<6} {:>7} {:>9} {:>9} {:>9} {:>9} {:>9}",
        "Mode", "State", "n", "Mean", "Median", "Std", "Min", "Max"
    );
    let _ = writeln!(out, "{}", "-".repeat(80));
    for row in descriptive_rows(report) {
        let _ = writeln!(
            out,
            "{:<14} {:<6} {:>7} {:>9.1} {:>9.1} {:>9} {:>9.1} {:>9.1}",
            row.mode.as_str(),
            row.cache_state,
            row.n,
            row.mean,
            row.median,
            ms(row.std),
            row.min,
            row.max
        );
    }

    let _ = writeln!(out, "\n=== Cache improvement (median) ===");
    for m in &report.modes {
        let _ = writeln!(out, "{:<14} {:>9}", m.mode.label(), pct(m.improvement_pct));
    }

    let _ = writeln!(out, "\n=== Encryption overhead (cold) ===");
    match &report.encryption {
        Some(e) => {
            let _ = writeln!(out, "Unencrypted median: {:.1} ms", e.unencrypted_median);
            let _ = writeln!(out, "Encrypted median:   {:.1} ms", e.encrypted_median);
            let _ = writeln!(
                out,
                "Overhead:           {:.1} ms ({:.1}%)",
                e.overhead_ms, e.overhead_pct
            );
        }
        None => {
            let _ = writeln!(out, "{NA}");
        }
    }

    let _ = writeln!(out, "\n=== Popular vs unpopular (mean) ===");
    let _ = writeln!(
        out,
        "{:<14} {:>10} {:>6} {:>10} {:>6}",
        "Mode", "Popular", "n", "Unpopular", "n"
    );
    for t in &report.tiers {
        let _ = writeln!(
            out,
            "{:<14} {:>10} {:>6} {:>10} {:>6}",
            t.mode.label(),
            ms(t.popular_mean),
            t.popular_n,
            ms(t.unpopular_mean),
            t.unpopular_n
        );
    }
    out
}

/// Print a describe report in the requested format.
///
/// # Errors
///
/// Returns an error if serialization or writing to stdout fails.
pub fn print_describe(report: &DescribeReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            print!("{}", describe_table(report));
            Ok(())
        }
        OutputFormat::Json => print_json(report),
        OutputFormat::Csv | OutputFormat::Tsv => {
            write_delimited(io::stdout().lock(), format, descriptive_rows(report))
        }
    }
}

/// Render page-load summaries and the DNS/page-load balance.
#[must_use]
pub fn web_table(report: &WebReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<14} {:<6} {:>8} {:>10} {:>10} {:>10} {:>10}",
        "Mode", "State", "Samples", "Load mean", "Load med", "TTFB med", "DOM med"
    );
    let _ = writeln!(out, "{}", "-".repeat(74));
    for s in &report.summaries {
        let _ = writeln!(
            out,
            "{:<14} {:<6} {:>8} {:>10} {:>10} {:>10} {:>10}",
            s.mode.as_str(),
            s.cache_state,
            s.samples,
            ms(s.load_mean),
            ms(s.load_median),
            ms(s.ttfb_median),
            ms(s.dom_median)
        );
    }

    let _ = writeln!(out, "\n=== DNS lookup vs page load (mean) ===");
    let _ = writeln!(out, "{:<14} {:>10} {:>12}", "Mode", "DNS", "Page load");
    for b in &report.balance {
        let _ = writeln!(
            out,
            "{:<14} {:>10} {:>12}",
            b.mode.label(),
            ms(b.dns_mean),
            ms(b.page_load_mean)
        );
    }
    out
}

/// Print a page-load report in the requested format.
///
/// # Errors
///
/// Returns an error if serialization or writing to stdout fails.
pub fn print_web(report: &WebReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            print!("{}", web_table(report));
            Ok(())
        }
        OutputFormat::Json => print_json(report),
        OutputFormat::Csv | OutputFormat::Tsv => {
            write_delimited(io::stdout().lock(), format, &report.summaries)
        }
    }
}
