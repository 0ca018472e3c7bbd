//! Progress bar and coverage table patches
//!
//! Both patches act on a parsed [`Document`] and are idempotent: applying
//! them again with the same data leaves the rendered text unchanged.

use tracing::{debug, warn};

use crate::bar::render_progress;
use crate::coverage::CoverageSummary;
use crate::document::{COVERAGE_END, COVERAGE_START, Document, Segment};

/// What the progress patch did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressPatch {
    /// An existing bar was re-rendered
    Refreshed,
    /// No bar existed; one was inserted under the progress header
    Inserted,
    /// No bar existed and none was inserted
    AnchorNotFound,
}

/// Where the coverage block ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoveragePatch {
    /// Placed after the progress line; `removed` old blocks were dropped
    AfterProgress { removed: usize },
    /// No progress anchor, appended at the end
    Appended { removed: usize },
}

/// Replace the first progress bar with one rendered for `percent`
///
/// When the document has no bar and `bootstrap_header` names a header line
/// that exists, a bar line is inserted right after that header.
pub fn apply_progress(doc: &mut Document, percent: u8, bootstrap_header: Option<&str>) -> ProgressPatch {
    let rendered = render_progress(percent);

    if let Some(index) = doc.progress_bar_index() {
        if let Segment::ProgressBar { bar, .. } = &mut doc.segments_mut()[index] {
            debug!(old = %bar, new = %rendered, "apply_progress: refreshing bar");
            *bar = rendered;
        }
        return ProgressPatch::Refreshed;
    }

    let header_index = bootstrap_header.and_then(|header| doc.header_index(header));
    match header_index {
        Some(index) => {
            let eol = line_ending_at(doc, index);
            let segments = doc.segments_mut();
            segments[index].ensure_newline(eol);
            segments.insert(
                index + 1,
                Segment::ProgressBar {
                    prefix: String::new(),
                    bar: rendered,
                    suffix: eol.to_string(),
                },
            );
            debug!(index, "apply_progress: inserted bar under header");
            ProgressPatch::Inserted
        }
        None => {
            warn!("No progress bar found in document; progress left unchanged");
            ProgressPatch::AnchorNotFound
        }
    }
}

/// Build the sentinel-delimited block for `summary`, lines ending in `eol`
pub fn coverage_block(summary: &CoverageSummary, eol: &str) -> Segment {
    let mut lines = vec![format!("{COVERAGE_START}{eol}"), eol.to_string()];
    lines.extend(summary.render_table().lines().map(|line| format!("{line}{eol}")));
    lines.push(eol.to_string());
    lines.push(format!("{COVERAGE_END}{eol}"));
    Segment::CoverageBlock(lines)
}

// Inserted lines follow the line they are attached to
fn line_ending_at(doc: &Document, index: usize) -> &'static str {
    doc.segments()[index].line_ending().unwrap_or_else(|| doc.line_ending())
}

/// Drop every existing coverage block and insert a fresh one
///
/// The block goes after the line holding the first percentage under `header`,
/// or at the end of the document when there is no such line.
pub fn apply_coverage(doc: &mut Document, summary: &CoverageSummary, header: &str) -> CoveragePatch {
    let before = doc.segments().len();
    doc.segments_mut().retain(|segment| !segment.is_coverage_block());
    let removed = before - doc.segments().len();

    match doc.progress_anchor(header) {
        Some(index) => {
            let eol = line_ending_at(doc, index);
            let segments = doc.segments_mut();
            segments[index].ensure_newline(eol);
            segments.insert(index + 1, coverage_block(summary, eol));
            debug!(index, removed, "apply_coverage: placed after progress");
            CoveragePatch::AfterProgress { removed }
        }
        None => {
            let eol = doc.line_ending();
            let segments = doc.segments_mut();
            if let Some(last) = segments.last_mut() {
                last.ensure_newline(eol);
            }
            segments.push(coverage_block(summary, eol));
            debug!(removed, "apply_coverage: no progress anchor, appended");
            CoveragePatch::Appended { removed }
        }
    }
}
