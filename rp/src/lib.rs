//! ReadmeProgress - keeps a README's progress bar and coverage table current
//!
//! One pass over the README: count checklist items, render a block-glyph
//! progress bar, pull coverage counters out of a JaCoCo XML report, and patch
//! both into the document. The file is only rewritten when the text changes,
//! so running it repeatedly on the same inputs is a no-op.
//!
//! # Pipeline
//!
//! ```text
//! README.md ──► progress ──► bar ──┐
//!                                  ├──► patch ──► write (if changed)
//! jacoco.xml ──► coverage ─────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use readmeprogress::{Config, pipeline};
//!
//! let config = Config::load(None)?;
//! let report = pipeline::run(&config, false)?;
//! println!("{}", report.status_line());
//! ```

pub mod bar;
pub mod cli;
pub mod config;
pub mod coverage;
pub mod document;
pub mod patch;
pub mod pipeline;
pub mod progress;

pub use bar::{BAR_LENGTH, render_bar, render_progress};
pub use config::{Config, CoverageMode};
pub use coverage::{CoverageCategory, CoverageError, CoveragePair, CoverageStatus, CoverageSummary};
pub use document::{COVERAGE_END, COVERAGE_START, Document, Segment};
pub use patch::{CoveragePatch, ProgressPatch};
pub use pipeline::{Outcome, Report, Update};
pub use progress::{ChecklistStats, calculate_progress};
