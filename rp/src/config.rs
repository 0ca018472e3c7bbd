//! Configuration types and loading

use clap::ValueEnum;
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Project-local config file name
pub const LOCAL_CONFIG: &str = ".readmeprogress.yml";

/// Which coverage categories end up in the README table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CoverageMode {
    /// Instruction coverage only
    Instruction,
    /// Instruction, branch, line, complexity, method and class coverage
    #[default]
    Full,
    /// Skip the coverage report entirely
    None,
}

/// Main configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// README file to update in place
    pub readme: PathBuf,

    /// JaCoCo XML coverage report
    pub report: PathBuf,

    /// Coverage categories to render
    pub coverage: CoverageMode,

    /// Header text that opens the progress section
    #[serde(rename = "progress-header")]
    pub progress_header: String,

    /// Insert a progress bar under the header when none exists yet
    #[serde(rename = "bootstrap-bar")]
    pub bootstrap_bar: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            readme: PathBuf::from("README.md"),
            report: PathBuf::from("target/site/jacoco/jacoco.xml"),
            coverage: CoverageMode::default(),
            progress_header: "## Progress".to_string(),
            bootstrap_bar: false,
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // An explicit path must load
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .readmeprogress.yml
        let local_config = PathBuf::from(LOCAL_CONFIG);
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/readmeprogress/readmeprogress.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("readmeprogress").join("readmeprogress.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}
