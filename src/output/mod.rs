//! Output module.
//!
//! Everything a run leaves behind:
//! - Summary tables under the output directory
//! - SVG charts
//! - Console tables in the selected format

pub mod chart;
pub mod files;
pub mod table;

pub use files::{read_mode_summary, read_per_site, write_mode_summary, write_per_site, MODE_SUMMARY_FILE};
pub use table::{print_describe, print_latency, print_web};

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::pipeline::{DescribeReport, LatencyReport, WebReport};
use std::path::{Path, PathBuf};

/// Overview chart of every mode.
pub const OVERVIEW_CHART: &str = "modes_dns_cold_warm.svg";
/// Raw-sample distributions per mode.
pub const BOXPLOT_CHART: &str = "boxplot_dns_cold_vs_warm.svg";
/// Popular against unpopular sites per mode.
pub const TIER_CHART: &str = "dns_popular_vs_unpopular.svg";
/// Page load, cold against warm.
pub const PAGE_LOAD_CHART: &str = "page_load_cold_vs_warm.svg";
/// DNS lookup against page load.
pub const BALANCE_CHART: &str = "dns_vs_page_load.svg";

/// `<mode>_per_site.csv`
#[must_use]
pub fn per_site_file(mode: &str) -> String {
    format!("{mode}_per_site.csv")
}

/// `<mode>_per_site_ordered.svg`
#[must_use]
pub fn per_site_chart_file(mode: &str) -> String {
    format!("{mode}_per_site_ordered.svg")
}

fn prepare(out_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(out_dir)?;
    Ok(())
}

/// Write the summary tables and, if enabled, the charts of a latency run.
///
/// Returns the written paths in write order.
///
/// # Errors
///
/// Returns an error if the output directory or any file cannot be written.
pub fn write_latency_outputs(report: &LatencyReport, config: &PipelineConfig) -> Result<Vec<PathBuf>> {
    let out = &config.out_dir;
    prepare(out)?;
    let mut written = Vec::new();

    let path = out.join(MODE_SUMMARY_FILE);
    write_mode_summary(&path, &report.mode_state_records())?;
    written.push(path);

    for mode in report.modes.iter().filter(|m| !m.sites.is_empty()) {
        let path = out.join(per_site_file(mode.mode.as_str()));
        write_per_site(&path, &mode.sites)?;
        written.push(path);
    }

    if config.charts {
        if report.modes_with_data().next().is_some() {
            let path = out.join(OVERVIEW_CHART);
            chart::latency_overview(report)?.render(&path)?;
            written.push(path);
        } else {
            tracing::warn!("No mode has data, skipping overview chart");
        }

        for mode in report.modes.iter().filter(|m| !m.sites.is_empty()) {
            let path = out.join(per_site_chart_file(mode.mode.as_str()));
            chart::per_site(mode, config.popular_n, config.unpopular_n).render(&path)?;
            written.push(path);
        }
    }

    tracing::info!("Wrote {} file(s) to {}", written.len(), out.display());
    Ok(written)
}

/// Write the distribution and tier charts of a describe run.
///
/// # Errors
///
/// Returns an error if the output directory or a chart cannot be written.
pub fn write_describe_outputs(report: &DescribeReport, config: &PipelineConfig) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    if !config.charts {
        return Ok(written);
    }
    let out = &config.out_dir;
    prepare(out)?;

    if report.distributions.is_empty() {
        tracing::warn!("No samples, skipping distribution chart");
    } else {
        let path = out.join(BOXPLOT_CHART);
        chart::BoxplotChart {
            title: "DNS Lookup Time: Cold vs Warm per Mode".to_string(),
            y_desc: "DNS lookup time (ms)".to_string(),
            groups: report
                .distributions
                .iter()
                .map(|(mode, cold, warm)| (mode.label(), cold.clone(), warm.clone()))
                .collect(),
        }
        .render(&path)?;
        written.push(path);
    }

    if report.tiers.iter().any(|t| t.popular_mean.is_some() || t.unpopular_mean.is_some()) {
        let path = out.join(TIER_CHART);
        chart::tiers(&report.tiers).render(&path)?;
        written.push(path);
    }

    tracing::info!("Wrote {} chart(s) to {}", written.len(), out.display());
    Ok(written)
}

/// Write the page-load charts of a web run.
///
/// # Errors
///
/// Returns an error if the output directory or a chart cannot be written.
pub fn write_web_outputs(report: &WebReport, config: &PipelineConfig) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    if !config.charts {
        return Ok(written);
    }
    let out = &config.out_dir;
    prepare(out)?;

    if !report.summaries.is_empty() {
        let path = out.join(PAGE_LOAD_CHART);
        chart::page_load(&report.summaries).render(&path)?;
        written.push(path);
    }
    if !report.balance.is_empty() {
        let path = out.join(BALANCE_CHART);
        chart::balance(&report.balance).render(&path)?;
        written.push(path);
    }

    tracing::info!("Wrote {} chart(s) to {}", written.len(), out.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::run_latency;
    use std::fs;

    fn config_for(dir: &Path, charts: bool) -> PipelineConfig {
        PipelineConfig {
            input_dirs: vec![dir.to_path_buf()],
            popular_sites: dir.join("sites.txt"),
            unpopular_sites: dir.join("unpopular_sites.txt"),
            out_dir: dir.join("out"),
            charts,
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn test_latency_outputs_without_charts() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("dot_dns_cold.csv"),
            "site,trial,ms,status\na.com,1,41.44,ok\nb.com,1,20,ok\n",
        )
        .unwrap();
        let config = config_for(dir.path(), false);
        let report = run_latency(&config).unwrap();

        let written = write_latency_outputs(&report, &config).unwrap();
        assert_eq!(
            written,
            vec![
                config.out_dir.join(MODE_SUMMARY_FILE),
                config.out_dir.join("dot_per_site.csv"),
            ]
        );

        let summary = read_mode_summary(&written[0]).unwrap();
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].n_sites, 2);
        assert_eq!(summary[1].median, None);

        let sites = read_per_site(&written[1]).unwrap();
        assert_eq!(sites[0].site, "a.com");
        assert_eq!(sites[0].cold_median, Some(41.4));
    }

    #[test]
    fn test_latency_outputs_with_charts() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("doh_dns_cold.csv"),
            "site,trial,ms,status\na.com,1,30,ok\na.com,2,3,ok\n",
        )
        .unwrap();
        let config = config_for(dir.path(), true);
        let report = run_latency(&config).unwrap();

        let written = write_latency_outputs(&report, &config).unwrap();
        assert!(written.contains(&config.out_dir.join(OVERVIEW_CHART)));
        assert!(written.contains(&config.out_dir.join("doh_per_site_ordered.svg")));
        assert!(written.iter().all(|p| p.is_file()));
    }

    #[test]
    fn test_file_names() {
        assert_eq!(per_site_file("local_cache"), "local_cache_per_site.csv");
        assert_eq!(per_site_chart_file("dot"), "dot_per_site_ordered.svg");
    }
}
