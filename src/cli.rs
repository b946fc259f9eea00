//! Command-line interface (CLI) argument parsing module.
//!
//! This module provides CLI argument parsing using `clap`.
//! It supports multiple commands: the per-site latency summary, pooled
//! descriptive statistics, page-load statistics and shell completions.

use crate::config::PipelineConfig;
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// CLI argument parser using clap derive macro.
///
/// # Example
///
/// ```ignore
/// let cli = Cli::parse();
/// match cli.command {
///     Some(Commands::Summary { input, .. }) => { /* ... */ }
///     Some(Commands::Web { input, .. }) => { /* ... */ }
///     None => { /* summary with defaults */ }
/// }
/// ```
#[derive(Parser, Debug)]
#[command(
    name = "dnsstat",
    version,
    about = "DNS lookup latency statistics",
    long_about = "Aggregate DNS lookup and page-load measurement logs into per-site and per-mode statistics, summary tables and charts",
    infer_subcommands = true
)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (only errors)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "table")]
    pub format: OutputFormat,

    /// Pipeline config file (JSON)
    #[arg(long, global = true, env = "DNSSTAT_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Output format for CLI commands.
///
/// This enum represents different output formats that can be used
/// when displaying reports on the console.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format (default, human-readable)
    #[default]
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
    /// TSV format (tab-separated)
    Tsv,
}

impl OutputFormat {
    /// Get all available output format names.
    #[must_use]
    pub fn names() -> &'static [&'static str] {
        &["table", "json", "csv", "tsv"]
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "tsv" => Ok(Self::Tsv),
            _ => Err(format!(
                "Unknown format: {}. Valid options are: {:?}",
                s,
                Self::names()
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
            Self::Tsv => write!(f, "tsv"),
        }
    }
}

/// Input and output locations shared by the pipeline commands.
///
/// Every flag left unset keeps the value from the config file.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct InputArgs {
    /// Directory scanned for measurement logs (repeatable)
    #[arg(short, long = "dir", value_name = "DIR")]
    pub dirs: Vec<PathBuf>,

    /// Popular site list, one site per line
    #[arg(long, value_name = "FILE")]
    pub popular: Option<PathBuf>,

    /// Unpopular site list, one site per line
    #[arg(long, value_name = "FILE")]
    pub unpopular: Option<PathBuf>,

    /// Output directory for tables and charts
    #[arg(short, long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Do not render charts
    #[arg(long)]
    pub no_charts: bool,
}

impl InputArgs {
    /// Override `config` with every flag that was given.
    pub fn apply(&self, config: &mut PipelineConfig) {
        if !self.dirs.is_empty() {
            config.input_dirs.clone_from(&self.dirs);
        }
        if let Some(path) = &self.popular {
            config.popular_sites.clone_from(path);
        }
        if let Some(path) = &self.unpopular {
            config.unpopular_sites.clone_from(path);
        }
        if let Some(path) = &self.out {
            config.out_dir.clone_from(path);
        }
        if self.no_charts {
            config.charts = false;
        }
    }
}

/// Available commands for the dnsstat CLI.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Per-site and per-mode latency summary
    ///
    /// Group DNS lookup samples by mode, site and cache state, reduce them
    /// to per-site medians and per-mode quartiles, and write the summary
    /// tables and charts.
    #[command(alias = "s")]
    Summary {
        #[command(flatten)]
        input: InputArgs,

        /// Glob pattern of DNS lookup logs
        #[arg(short, long)]
        pattern: Option<String>,

        /// Number of popular sites leading the per-site order
        #[arg(long)]
        popular_n: Option<usize>,

        /// Number of unpopular sites following them
        #[arg(long)]
        unpopular_n: Option<usize>,

        /// Also print the ordered per-site tables
        #[arg(long)]
        per_site: bool,
    },

    /// Pooled descriptive statistics
    ///
    /// Describe the raw cold and warm samples of every mode, compare
    /// encrypted with unencrypted transports and popular with unpopular
    /// sites.
    #[command(alias = "d")]
    Describe {
        #[command(flatten)]
        input: InputArgs,

        /// Glob pattern of DNS lookup logs
        #[arg(short, long)]
        pattern: Option<String>,
    },

    /// Page-load statistics
    ///
    /// Summarize page-load timings per mode and cache state and set them
    /// against the DNS lookup time of the same mode.
    #[command(alias = "w")]
    Web {
        #[command(flatten)]
        input: InputArgs,

        /// Glob pattern of page-load logs
        #[arg(short, long)]
        pattern: Option<String>,

        /// Glob pattern of DNS lookup logs
        #[arg(long)]
        dns_pattern: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

impl Commands {
    /// Apply this command's overrides to a loaded config.
    pub fn apply(&self, config: &mut PipelineConfig) {
        match self {
            Self::Summary {
                input,
                pattern,
                popular_n,
                unpopular_n,
                per_site: _,
            } => {
                input.apply(config);
                if let Some(p) = pattern {
                    config.dns_pattern.clone_from(p);
                }
                if let Some(n) = popular_n {
                    config.popular_n = *n;
                }
                if let Some(n) = unpopular_n {
                    config.unpopular_n = *n;
                }
            }
            Self::Describe { input, pattern } => {
                input.apply(config);
                if let Some(p) = pattern {
                    config.dns_pattern.clone_from(p);
                }
            }
            Self::Web {
                input,
                pattern,
                dns_pattern,
            } => {
                input.apply(config);
                if let Some(p) = pattern {
                    config.web_pattern.clone_from(p);
                }
                if let Some(p) = dns_pattern {
                    config.dns_pattern.clone_from(p);
                }
            }
            Self::Completions { .. } => {}
        }
    }
}

/// Parse CLI arguments and return verbose flag.
///
/// # Returns
///
/// Returns a tuple of `(Cli, verbose)` where `verbose` indicates
/// whether verbose logging was enabled.
#[must_use]
pub fn parse_verbose() -> (Cli, bool) {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    (cli, verbose)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("table".parse::<OutputFormat>(), Ok(OutputFormat::Table));
        assert_eq!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("csv".parse::<OutputFormat>(), Ok(OutputFormat::Csv));
        assert_eq!("tsv".parse::<OutputFormat>(), Ok(OutputFormat::Tsv));
        assert!("invalid".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_output_format_display() {
        assert_eq!(OutputFormat::Table.to_string(), "table");
        assert_eq!(OutputFormat::Json.to_string(), "json");
        assert_eq!(OutputFormat::Csv.to_string(), "csv");
        assert_eq!(OutputFormat::Tsv.to_string(), "tsv");
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Table);
    }

    #[test]
    fn test_summary_overrides() {
        let cli = Cli::try_parse_from([
            "dnsstat",
            "s",
            "--dir",
            "a",
            "--dir",
            "b",
            "--popular-n",
            "3",
            "--no-charts",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);

        let mut config = PipelineConfig::default();
        cli.command.unwrap().apply(&mut config);
        assert_eq!(config.input_dirs, vec![PathBuf::from("a"), PathBuf::from("b")]);
        assert_eq!(config.popular_n, 3);
        assert_eq!(config.unpopular_n, 10);
        assert!(!config.charts);
        assert_eq!(config.out_dir, PathBuf::from("new_fig"));
    }

    #[test]
    fn test_dir_flag_fixes_empty_config_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dnsstat.json");
        std::fs::write(&path, r#"{"input_dirs": []}"#).unwrap();

        let mut config = crate::config::ConfigLoader::load_from_file(&path).unwrap();
        assert!(config.validate().is_err());

        let cli = Cli::try_parse_from(["dnsstat", "summary", "--dir", "logs"]).unwrap();
        cli.command.unwrap().apply(&mut config);
        assert!(config.validate().is_ok());
        assert_eq!(config.input_dirs, vec![PathBuf::from("logs")]);
    }

    #[test]
    fn test_web_pattern_targets_web_logs() {
        let cli = Cli::try_parse_from(["dnsstat", "web", "-p", "*_page_*.csv"]).unwrap();
        let mut config = PipelineConfig::default();
        cli.command.unwrap().apply(&mut config);
        assert_eq!(config.web_pattern, "*_page_*.csv");
        assert_eq!(config.dns_pattern, "*_dns_*.csv");
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["dnsstat", "-v", "-q", "summary"]).is_err());
    }
}
