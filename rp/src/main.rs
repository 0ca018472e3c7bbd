use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::info;

use readmeprogress::cli::Cli;
use readmeprogress::config::Config;
use readmeprogress::pipeline::{self, Outcome};

fn setup_logging(verbose: bool) -> Result<()> {
    // stdout carries the status line only, diagnostics go to stderr
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let config = cli.apply(Config::load(cli.config.as_ref()).context("Failed to load configuration")?);
    info!(
        "readmeprogress starting: readme={}, report={}, coverage={:?}",
        config.readme.display(),
        config.report.display(),
        config.coverage
    );

    let report = pipeline::run(&config, cli.check)?;
    let status = report.status_line();

    match report.outcome {
        Outcome::Updated => println!("{} {}", "✓".green(), status),
        Outcome::Unchanged => println!("{}", status),
        Outcome::OutOfDate => {
            println!("{} {}", "✗".red(), status);
            return Err(eyre::eyre!("{} is out of date, run rp to refresh it", config.readme.display()));
        }
    }

    Ok(())
}
