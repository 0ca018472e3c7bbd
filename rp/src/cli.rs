//! CLI argument parsing for readmeprogress

use clap::Parser;
use std::path::PathBuf;

use crate::config::{Config, CoverageMode};

#[derive(Parser, Debug)]
#[command(name = "rp")]
#[command(author, version, about = "Refresh a README's progress bar and coverage table", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// README file to update
    #[arg(long)]
    pub readme: Option<PathBuf>,

    /// JaCoCo XML coverage report
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Coverage categories to render
    #[arg(long, value_enum)]
    pub coverage: Option<CoverageMode>,

    /// Insert a progress bar under the progress header if none exists
    #[arg(long)]
    pub bootstrap: bool,

    /// Don't write; fail if the README is out of date
    #[arg(long)]
    pub check: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Apply command-line overrides on top of loaded configuration
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(readme) = &self.readme {
            config.readme = readme.clone();
        }
        if let Some(report) = &self.report {
            config.report = report.clone();
        }
        if let Some(coverage) = self.coverage {
            config.coverage = coverage;
        }
        if self.bootstrap {
            config.bootstrap_bar = true;
        }
        config
    }
}
