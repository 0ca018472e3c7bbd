//! Coverage extraction from JaCoCo XML reports
//!
//! Only the report-level `<counter>` elements (direct children of the root)
//! are read; package, class and method counters nested deeper are ignored.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::CoverageMode;

/// Errors that make a coverage report unusable
#[derive(Debug, Error)]
pub enum CoverageError {
    #[error("Failed to read coverage report {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed coverage report: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Coverage report has no {0} counter")]
    MissingCounter(CoverageCategory),

    #[error("{category} counter is missing the '{attribute}' attribute")]
    MissingAttribute {
        category: CoverageCategory,
        attribute: &'static str,
    },

    #[error("{category} counter has invalid '{attribute}' value: {value}")]
    InvalidAttribute {
        category: CoverageCategory,
        attribute: &'static str,
        value: String,
    },
}

/// A JaCoCo counter type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoverageCategory {
    Instruction,
    Branch,
    Line,
    Complexity,
    Method,
    Class,
}

impl CoverageCategory {
    /// Every category, in table order
    pub const ALL: [CoverageCategory; 6] = [
        CoverageCategory::Instruction,
        CoverageCategory::Branch,
        CoverageCategory::Line,
        CoverageCategory::Complexity,
        CoverageCategory::Method,
        CoverageCategory::Class,
    ];

    /// The `type` attribute value used in the report
    pub fn report_type(&self) -> &'static str {
        match self {
            CoverageCategory::Instruction => "INSTRUCTION",
            CoverageCategory::Branch => "BRANCH",
            CoverageCategory::Line => "LINE",
            CoverageCategory::Complexity => "COMPLEXITY",
            CoverageCategory::Method => "METHOD",
            CoverageCategory::Class => "CLASS",
        }
    }

    /// Row label in the README table
    pub fn label(&self) -> &'static str {
        match self {
            CoverageCategory::Instruction => "Instruction",
            CoverageCategory::Branch => "Branch",
            CoverageCategory::Line => "Line",
            CoverageCategory::Complexity => "Complexity",
            CoverageCategory::Method => "Method",
            CoverageCategory::Class => "Class",
        }
    }
}

impl fmt::Display for CoverageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.report_type())
    }
}

impl CoverageMode {
    /// Categories rendered in this mode
    pub fn categories(&self) -> &'static [CoverageCategory] {
        match self {
            CoverageMode::Instruction => &[CoverageCategory::Instruction],
            CoverageMode::Full => &CoverageCategory::ALL,
            CoverageMode::None => &[],
        }
    }
}

/// Missed/covered counts for one category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoveragePair {
    pub missed: u64,
    pub covered: u64,
}

impl CoveragePair {
    pub fn new(missed: u64, covered: u64) -> Self {
        Self { missed, covered }
    }

    /// Covered share as a percentage; 0.0 when the category is empty
    pub fn percent(&self) -> f64 {
        // summed as f64: two u64 counts can overflow u64
        let total = self.missed as f64 + self.covered as f64;
        if total == 0.0 {
            return 0.0;
        }
        self.covered as f64 / total * 100.0
    }
}

/// Coverage counts for the categories of one mode, in table order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoverageSummary {
    rows: Vec<(CoverageCategory, CoveragePair)>,
}

impl CoverageSummary {
    /// All categories of `mode` at zero
    pub fn zeroed(mode: CoverageMode) -> Self {
        Self {
            rows: mode
                .categories()
                .iter()
                .map(|category| (*category, CoveragePair::default()))
                .collect(),
        }
    }

    pub fn rows(&self) -> &[(CoverageCategory, CoveragePair)] {
        &self.rows
    }

    pub fn get(&self, category: CoverageCategory) -> Option<CoveragePair> {
        self.rows.iter().find(|(c, _)| *c == category).map(|(_, pair)| *pair)
    }

    /// Instruction coverage, the figure quoted in the status line
    pub fn headline(&self) -> Option<f64> {
        self.get(CoverageCategory::Instruction).map(|pair| pair.percent())
    }

    /// Markdown table, one row per category, each line newline-terminated
    pub fn render_table(&self) -> String {
        let mut table = String::from("| Metric | Coverage | Covered | Missed |\n");
        table.push_str("|--------|----------|---------|--------|\n");
        for (category, pair) in &self.rows {
            table.push_str(&format!(
                "| {} | {:.1}% | {} | {} |\n",
                category.label(),
                pair.percent(),
                pair.covered,
                pair.missed
            ));
        }
        table
    }
}

/// Read and parse the report at `path`
pub fn extract(path: &Path, mode: CoverageMode) -> Result<CoverageSummary, CoverageError> {
    let xml = fs::read_to_string(path).map_err(|source| CoverageError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_report(&xml, mode)
}

/// Parse report XML into a summary for `mode`
///
/// In instruction mode a missing INSTRUCTION counter is an error; in full
/// mode absent categories count as zero, which is how JaCoCo reports code
/// with e.g. no branches.
pub fn parse_report(xml: &str, mode: CoverageMode) -> Result<CoverageSummary, CoverageError> {
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };
    let doc = roxmltree::Document::parse_with_options(xml, options)?;
    let root = doc.root_element();

    let mut rows = Vec::with_capacity(mode.categories().len());
    for category in mode.categories() {
        let counter = root
            .children()
            .filter(|node| node.is_element() && node.has_tag_name("counter"))
            .find(|node| node.attribute("type") == Some(category.report_type()));

        let pair = match counter {
            Some(node) => CoveragePair::new(
                read_count(&node, *category, "missed")?,
                read_count(&node, *category, "covered")?,
            ),
            None if mode == CoverageMode::Instruction => return Err(CoverageError::MissingCounter(*category)),
            None => {
                debug!(%category, "parse_report: counter absent, counting as zero");
                CoveragePair::default()
            }
        };
        rows.push((*category, pair));
    }

    Ok(CoverageSummary { rows })
}

fn read_count(node: &roxmltree::Node, category: CoverageCategory, attribute: &'static str) -> Result<u64, CoverageError> {
    let value = node
        .attribute(attribute)
        .ok_or(CoverageError::MissingAttribute { category, attribute })?;
    value.trim().parse().map_err(|_| CoverageError::InvalidAttribute {
        category,
        attribute,
        value: value.to_string(),
    })
}

/// Result of trying to load coverage for a run
#[derive(Debug, Clone, PartialEq)]
pub enum CoverageStatus {
    /// Coverage mode is `none`
    Disabled,
    /// The report parsed
    Found(CoverageSummary),
    /// The report was missing or unusable; `fallback` is what still gets rendered
    NotFound { fallback: Option<CoverageSummary> },
}

impl CoverageStatus {
    /// Load coverage, degrading to [`CoverageStatus::NotFound`] on any report error
    pub fn load(path: &Path, mode: CoverageMode) -> Self {
        if mode == CoverageMode::None {
            debug!("CoverageStatus::load: coverage disabled");
            return CoverageStatus::Disabled;
        }

        match extract(path, mode) {
            Ok(summary) => {
                info!(report = %path.display(), "Loaded coverage report");
                CoverageStatus::Found(summary)
            }
            Err(e) => {
                warn!("Coverage report unavailable: {}", e);
                CoverageStatus::NotFound {
                    fallback: match mode {
                        CoverageMode::Full => Some(CoverageSummary::zeroed(mode)),
                        _ => None,
                    },
                }
            }
        }
    }

    /// Table to patch into the README, if any
    pub fn table(&self) -> Option<&CoverageSummary> {
        match self {
            CoverageStatus::Disabled => None,
            CoverageStatus::Found(summary) => Some(summary),
            CoverageStatus::NotFound { fallback } => fallback.as_ref(),
        }
    }
}

impl fmt::Display for CoverageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoverageStatus::Disabled => f.write_str("coverage disabled"),
            CoverageStatus::Found(summary) => match summary.headline() {
                Some(percent) => write!(f, "coverage {:.1}%", percent),
                None => f.write_str("coverage n/a"),
            },
            CoverageStatus::NotFound { .. } => f.write_str("coverage not found"),
        }
    }
}
