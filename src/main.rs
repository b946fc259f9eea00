//! dnsstat - DNS lookup latency statistics
//!
//! Binary entry point for the dnsstat CLI application.

#![warn(clippy::all, warnings)]
#![warn(clippy::pedantic, clippy::nursery)]

use clap::CommandFactory;
use dnsstat::cli::{Cli, Commands, OutputFormat};
use dnsstat::config::{ConfigLoader, PipelineConfig};
use dnsstat::error::Result;
use dnsstat::{output, pipeline};
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Set up logging based on verbosity level.
///
/// # Arguments
///
/// * `verbose` - Enable debug-level logging
/// * `quiet` - Enable error-level only logging
fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"))
    } else if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().without_time().with_writer(std::io::stderr))
        .init();
}

fn print_written(paths: &[PathBuf], format: OutputFormat) {
    if format != OutputFormat::Table || paths.is_empty() {
        return;
    }
    println!("\n=== Written ===");
    for path in paths {
        println!("{}", path.display());
    }
}

/// Run the per-site latency summary and write its outputs.
fn run_summary(config: &PipelineConfig, format: OutputFormat, per_site: bool) -> Result<()> {
    let report = pipeline::run_latency(config)?;
    output::print_latency(&report, format, per_site)?;
    let written = output::write_latency_outputs(&report, config)?;
    print_written(&written, format);
    Ok(())
}

/// Run the pooled descriptive statistics.
fn run_describe(config: &PipelineConfig, format: OutputFormat) -> Result<()> {
    let report = pipeline::run_describe(config)?;
    output::print_describe(&report, format)?;
    let written = output::write_describe_outputs(&report, config)?;
    print_written(&written, format);
    Ok(())
}

/// Run the page-load statistics.
fn run_web(config: &PipelineConfig, format: OutputFormat) -> Result<()> {
    let report = pipeline::run_web(config)?;
    output::print_web(&report, format)?;
    let written = output::write_web_outputs(&report, config)?;
    print_written(&written, format);
    Ok(())
}

/// Main entry point for the dnsstat CLI application.
fn main() -> Result<()> {
    color_eyre::install()?;

    let (cli, verbose) = dnsstat::cli::parse_verbose();
    setup_logging(verbose, cli.quiet);

    tracing::debug!("dnsstat starting...");

    if let Some(Commands::Completions { shell }) = &cli.command {
        let mut command = Cli::command();
        let name = command.get_name().to_string();
        clap_complete::generate(*shell, &mut command, name, &mut std::io::stdout());
        return Ok(());
    }

    let mut config = ConfigLoader::load(cli.config.as_deref())?;
    if let Some(command) = &cli.command {
        command.apply(&mut config);
    }
    config.validate()?;

    match cli.command {
        Some(Commands::Summary { per_site, .. }) => run_summary(&config, cli.format, per_site)?,
        Some(Commands::Describe { .. }) => run_describe(&config, cli.format)?,
        Some(Commands::Web { .. }) => run_web(&config, cli.format)?,
        Some(Commands::Completions { .. }) => {}
        None => run_summary(&config, cli.format, false)?,
    }

    Ok(())
}
