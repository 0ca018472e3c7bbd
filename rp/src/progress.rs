//! Checklist progress calculation
//!
//! A checklist item is any `- [?]` marker with exactly one character between
//! the brackets. An item is checked when that character is `x` or `X`.

use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;
use tracing::debug;

static CHECKLIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"- \[.\]").expect("checklist item pattern is valid"));

static CHECKED_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"- \[x\]")
        .case_insensitive(true)
        .build()
        .expect("checked item pattern is valid")
});

/// Checklist marker counts for a document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChecklistStats {
    /// Number of checklist markers of any kind
    pub total: usize,
    /// Number of markers ticked with `x`/`X`
    pub checked: usize,
}

impl ChecklistStats {
    /// Count checklist markers in `content`
    pub fn scan(content: &str) -> Self {
        let stats = Self {
            total: CHECKLIST_ITEM.find_iter(content).count(),
            checked: CHECKED_ITEM.find_iter(content).count(),
        };
        debug!(total = stats.total, checked = stats.checked, "ChecklistStats::scan");
        stats
    }

    /// Completion percentage, floored; 0 when there are no items
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        // every checked marker is also a checklist marker, so this never exceeds 100
        (self.checked * 100 / self.total) as u8
    }
}

/// Completion percentage of the checklist items in `content`
pub fn calculate_progress(content: &str) -> u8 {
    ChecklistStats::scan(content).percent()
}
