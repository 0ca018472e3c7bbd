//! Line-oriented README model
//!
//! The document is split into newline-terminated lines and each line is
//! classified once: the first line carrying a progress bar, lines enclosed by
//! the coverage sentinels, and everything else. Rendering concatenates the
//! segments, so `Document::parse(s).render() == s` for every input.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

use crate::progress::ChecklistStats;

/// Opening sentinel of the generated coverage block
pub const COVERAGE_START: &str = "<!-- COVERAGE:START -->";

/// Closing sentinel of the generated coverage block
pub const COVERAGE_END: &str = "<!-- COVERAGE:END -->";

static PROGRESS_BAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:🟩|⬜)+ \d+%").expect("progress bar pattern is valid"));

static PERCENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+%").expect("percent pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Any line not otherwise classified
    Text(String),
    /// The line holding the progress bar, split around the `<bar> <n>%` match
    ProgressBar { prefix: String, bar: String, suffix: String },
    /// Sentinel-delimited block, sentinel lines included
    CoverageBlock(Vec<String>),
}

impl Segment {
    /// Full text of a single-line segment; `None` for coverage blocks
    pub fn line(&self) -> Option<String> {
        match self {
            Segment::Text(line) => Some(line.clone()),
            Segment::ProgressBar { prefix, bar, suffix } => Some(format!("{prefix}{bar}{suffix}")),
            Segment::CoverageBlock(_) => None,
        }
    }

    pub fn is_coverage_block(&self) -> bool {
        matches!(self, Segment::CoverageBlock(_))
    }

    /// `"\r\n"` or `"\n"`, whichever ends this line; `None` if unterminated
    pub fn line_ending(&self) -> Option<&'static str> {
        let line = self.line()?;
        if line.ends_with("\r\n") {
            Some("\r\n")
        } else if line.ends_with('\n') {
            Some("\n")
        } else {
            None
        }
    }

    /// Terminate the segment with `eol` if it lacks a newline
    pub fn ensure_newline(&mut self, eol: &str) {
        let tail = match self {
            Segment::Text(line) => line,
            Segment::ProgressBar { suffix, .. } => suffix,
            Segment::CoverageBlock(lines) => match lines.last_mut() {
                Some(last) => last,
                None => return,
            },
        };
        if !tail.ends_with('\n') {
            tail.push_str(eol);
        }
    }

    fn render_into(&self, out: &mut String) {
        match self {
            Segment::Text(line) => out.push_str(line),
            Segment::ProgressBar { prefix, bar, suffix } => {
                out.push_str(prefix);
                out.push_str(bar);
                out.push_str(suffix);
            }
            Segment::CoverageBlock(lines) => lines.iter().for_each(|line| out.push_str(line)),
        }
    }
}

/// A README as an ordered list of segments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    segments: Vec<Segment>,
}

impl Document {
    pub fn parse(content: &str) -> Self {
        let lines: Vec<&str> = content.split_inclusive('\n').collect();
        let in_block = block_mask(&lines);
        let mut segments = Vec::with_capacity(lines.len());
        let mut bar_seen = false;
        let mut i = 0;

        while i < lines.len() {
            if in_block[i] {
                let end = in_block[i..].iter().position(|masked| !masked).map_or(lines.len(), |n| i + n);
                segments.push(Segment::CoverageBlock(lines[i..end].iter().map(|l| l.to_string()).collect()));
                i = end;
                continue;
            }

            let line = lines[i];
            match PROGRESS_BAR.find(line) {
                Some(m) if !bar_seen => {
                    bar_seen = true;
                    segments.push(Segment::ProgressBar {
                        prefix: line[..m.start()].to_string(),
                        bar: m.as_str().to_string(),
                        suffix: line[m.end()..].to_string(),
                    });
                }
                _ => segments.push(Segment::Text(line.to_string())),
            }
            i += 1;
        }

        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segments_mut(&mut self) -> &mut Vec<Segment> {
        &mut self.segments
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.segments.iter().for_each(|segment| segment.render_into(&mut out));
        out
    }

    pub fn progress_bar_index(&self) -> Option<usize> {
        self.segments
            .iter()
            .position(|segment| matches!(segment, Segment::ProgressBar { .. }))
    }

    /// Checklist counts outside generated coverage blocks
    pub fn checklist_stats(&self) -> ChecklistStats {
        let text: String = self.segments.iter().filter_map(Segment::line).collect();
        ChecklistStats::scan(&text)
    }

    /// Line ending of the first terminated line, `"\n"` by default
    pub fn line_ending(&self) -> &'static str {
        self.segments.iter().find_map(Segment::line_ending).unwrap_or("\n")
    }

    pub fn coverage_block_count(&self) -> usize {
        self.segments.iter().filter(|segment| segment.is_coverage_block()).count()
    }

    /// Index of the first line containing `header`
    pub fn header_index(&self, header: &str) -> Option<usize> {
        self.segments
            .iter()
            .position(|segment| segment.line().is_some_and(|line| line.contains(header)))
    }

    /// Index of the line holding the first `<n>%` at or after `header`
    ///
    /// On the header line itself only text after the header counts.
    pub fn progress_anchor(&self, header: &str) -> Option<usize> {
        let start = self.header_index(header)?;

        self.segments[start..]
            .iter()
            .enumerate()
            .find_map(|(offset, segment)| {
                let line = segment.line()?;
                let haystack = if offset == 0 {
                    let at = line.find(header)? + header.len();
                    line[at..].to_string()
                } else {
                    line
                };
                PERCENT.is_match(&haystack).then_some(start + offset)
            })
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn is_sentinel(line: &str, sentinel: &str) -> bool {
    line.trim() == sentinel
}

// Sentinels nest like brackets: an end closes the most recent open start.
// Unmatched ends come before every unmatched start, so the leftovers can
// never pair up once the matched blocks are gone.
fn block_mask(lines: &[&str]) -> Vec<bool> {
    let mut in_block = vec![false; lines.len()];
    let mut open = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        if is_sentinel(line, COVERAGE_START) {
            open.push(i);
        } else if is_sentinel(line, COVERAGE_END)
            && let Some(start) = open.pop()
        {
            in_block[start..=i].fill(true);
        }
    }
    in_block
}
