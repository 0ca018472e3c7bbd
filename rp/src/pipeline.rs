//! End-to-end README refresh: read, compute, patch, write if changed

use std::fs;
use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use tracing::{debug, info};

use crate::config::Config;
use crate::coverage::CoverageStatus;
use crate::document::Document;
use crate::patch::{CoveragePatch, ProgressPatch, apply_coverage, apply_progress};
use crate::progress::ChecklistStats;

/// Result of patching a document in memory
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    /// The patched document text
    pub content: String,
    /// Checklist counts of the original text, generated blocks excluded
    pub checklist: ChecklistStats,
    /// Completion percentage written into the bar
    pub progress: u8,
    pub progress_patch: ProgressPatch,
    /// `None` when no table was rendered
    pub coverage_patch: Option<CoveragePatch>,
}

/// Terminal outcome of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The README was rewritten
    Updated,
    /// The README already matched
    Unchanged,
    /// Check mode: the README would have changed
    OutOfDate,
}

/// Everything needed to report a run
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub readme: PathBuf,
    pub outcome: Outcome,
    pub progress: u8,
    pub progress_patch: ProgressPatch,
    pub coverage: CoverageStatus,
}

impl Report {
    /// Human-readable one-line summary, without styling
    pub fn status_line(&self) -> String {
        let readme = self.readme.display();
        match self.outcome {
            Outcome::Updated => format!("Updated {}: progress {}%, {}", readme, self.progress, self.coverage),
            Outcome::Unchanged => format!("No changes needed (progress {}%, {})", self.progress, self.coverage),
            Outcome::OutOfDate => format!(
                "{} is out of date: progress {}%, {}",
                readme, self.progress, self.coverage
            ),
        }
    }
}

/// Patch `content` with fresh progress and coverage
pub fn update_document(content: &str, coverage: &CoverageStatus, config: &Config) -> Update {
    let mut doc = Document::parse(content);
    let checklist = doc.checklist_stats();
    let progress = checklist.percent();

    let bootstrap = config.bootstrap_bar.then_some(config.progress_header.as_str());
    let progress_patch = apply_progress(&mut doc, progress, bootstrap);
    let coverage_patch = coverage
        .table()
        .map(|summary| apply_coverage(&mut doc, summary, &config.progress_header));

    debug!(?progress_patch, ?coverage_patch, "update_document: patched");
    Update {
        content: doc.render(),
        checklist,
        progress,
        progress_patch,
        coverage_patch,
    }
}

/// Write `updated` to `path` only if it differs from `original`
///
/// Returns whether a write happened.
pub fn write_if_changed(path: &Path, original: &str, updated: &str) -> Result<bool> {
    if original == updated {
        debug!(path = %path.display(), "write_if_changed: identical, skipping write");
        return Ok(false);
    }
    fs::write(path, updated).context(format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), "Wrote updated README");
    Ok(true)
}

/// Run the whole refresh for `config`; with `check` set nothing is written
pub fn run(config: &Config, check: bool) -> Result<Report> {
    let content =
        fs::read_to_string(&config.readme).context(format!("Failed to read {}", config.readme.display()))?;

    let coverage = CoverageStatus::load(&config.report, config.coverage);
    let update = update_document(&content, &coverage, config);
    info!(
        total = update.checklist.total,
        checked = update.checklist.checked,
        progress = update.progress,
        "Computed checklist progress"
    );

    let outcome = if check {
        if content == update.content {
            Outcome::Unchanged
        } else {
            Outcome::OutOfDate
        }
    } else if write_if_changed(&config.readme, &content, &update.content)? {
        Outcome::Updated
    } else {
        Outcome::Unchanged
    };

    Ok(Report {
        readme: config.readme.clone(),
        outcome,
        progress: update.progress,
        progress_patch: update.progress_patch,
        coverage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoverageMode;
    use crate::document::COVERAGE_START;
    use proptest::prelude::*;
    use tempfile::TempDir;

    const REPORT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<report name="erp">
  <counter type="INSTRUCTION" missed="10" covered="90"/>
  <counter type="BRANCH" missed="5" covered="15"/>
  <counter type="LINE" missed="0" covered="0"/>
</report>
"#;

    const README: &str = "# ERP\n\
        \n\
        ## Progress\n\
        ⬜⬜⬜⬜⬜⬜⬜⬜⬜⬜ 0%\n\
        \n\
        - [x] Clients\n\
        - [ ] Orders\n\
        - [X] Stock\n";

    fn setup(readme: &str, report: Option<&str>) -> (TempDir, Config) {
        let temp = TempDir::new().unwrap();
        let readme_path = temp.path().join("README.md");
        let report_path = temp.path().join("jacoco.xml");
        fs::write(&readme_path, readme).unwrap();
        if let Some(xml) = report {
            fs::write(&report_path, xml).unwrap();
        }
        let config = Config {
            readme: readme_path,
            report: report_path,
            ..Config::default()
        };
        (temp, config)
    }

    #[test]
    fn test_update_document_example() {
        let coverage = CoverageStatus::Disabled;
        let update = update_document(README, &coverage, &Config::default());
        assert_eq!(update.checklist, ChecklistStats { total: 3, checked: 2 });
        assert_eq!(update.progress, 66);
        assert_eq!(update.progress_patch, ProgressPatch::Refreshed);
        assert_eq!(update.coverage_patch, None);
        assert!(update.content.contains("🟩🟩🟩🟩🟩🟩⬜⬜⬜⬜ 66%\n"));
    }

    #[test]
    fn test_stale_block_items_do_not_count() {
        let content = format!("{README}<!-- COVERAGE:START -->\n- [ ] stale\n<!-- COVERAGE:END -->\n");
        let update = update_document(&content, &CoverageStatus::Disabled, &Config::default());
        assert_eq!(update.checklist.total, 3);
        assert_eq!(update.progress, 66);
    }

    #[test]
    fn test_run_updates_then_is_idempotent() {
        let (_temp, config) = setup(README, Some(REPORT_XML));

        let first = run(&config, false).unwrap();
        assert_eq!(first.outcome, Outcome::Updated);
        assert_eq!(first.status_line(), format!("Updated {}: progress 66%, coverage 90.0%", config.readme.display()));

        let written = fs::read_to_string(&config.readme).unwrap();
        assert!(written.contains("| Instruction | 90.0% | 90 | 10 |"));
        assert!(written.contains("| Branch | 75.0% | 15 | 5 |"));
        assert!(written.contains("| Line | 0.0% | 0 | 0 |"));
        assert!(written.contains("| Class | 0.0% | 0 | 0 |"));

        let second = run(&config, false).unwrap();
        assert_eq!(second.outcome, Outcome::Unchanged);
        assert_eq!(second.status_line(), "No changes needed (progress 66%, coverage 90.0%)");
        assert_eq!(fs::read_to_string(&config.readme).unwrap(), written);
    }

    #[test]
    fn test_missing_report_still_updates_progress() {
        let (_temp, mut config) = setup(README, None);
        config.coverage = CoverageMode::Instruction;

        let report = run(&config, false).unwrap();
        assert_eq!(report.outcome, Outcome::Updated);
        assert!(report.status_line().ends_with("coverage not found"));

        let written = fs::read_to_string(&config.readme).unwrap();
        assert!(written.contains("66%"));
        assert!(!written.contains(COVERAGE_START));
    }

    #[test]
    fn test_missing_report_full_mode_renders_zeroes() {
        let (_temp, config) = setup(README, None);
        run(&config, false).unwrap();

        let written = fs::read_to_string(&config.readme).unwrap();
        assert!(written.contains("| Instruction | 0.0% | 0 | 0 |"));
        assert_eq!(written.matches("| 0.0% |").count(), 6);
    }

    #[test]
    fn test_fresh_report_replaces_old_block() {
        let (_temp, config) = setup(README, Some(REPORT_XML));
        run(&config, false).unwrap();

        let newer = REPORT_XML.replace(r#"missed="10" covered="90""#, r#"missed="50" covered="50""#);
        fs::write(&config.report, newer).unwrap();
        let report = run(&config, false).unwrap();
        assert_eq!(report.outcome, Outcome::Updated);

        let written = fs::read_to_string(&config.readme).unwrap();
        assert_eq!(written.matches(COVERAGE_START).count(), 1);
        assert!(written.contains("| Instruction | 50.0% | 50 | 50 |"));
        assert!(!written.contains("90.0%"));
    }

    #[test]
    fn test_check_mode_never_writes() {
        let (_temp, config) = setup(README, Some(REPORT_XML));

        let report = run(&config, true).unwrap();
        assert_eq!(report.outcome, Outcome::OutOfDate);
        assert_eq!(fs::read_to_string(&config.readme).unwrap(), README);

        run(&config, false).unwrap();
        assert_eq!(run(&config, true).unwrap().outcome, Outcome::Unchanged);
    }

    #[test]
    fn test_missing_readme_is_an_error() {
        let temp = TempDir::new().unwrap();
        let config = Config {
            readme: temp.path().join("README.md"),
            ..Config::default()
        };
        assert!(run(&config, false).is_err());
    }

    #[test]
    fn test_write_if_changed() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("README.md");

        assert!(!write_if_changed(&path, "same", "same").unwrap());
        assert!(!path.exists());

        assert!(write_if_changed(&path, "old", "new").unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    fn line() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("- [x] done\n".to_string()),
            Just("- [X] done\n".to_string()),
            Just("- [ ] todo\n".to_string()),
            Just("## Progress\n".to_string()),
            Just("🟩⬜ 10%\n".to_string()),
            Just("<!-- COVERAGE:START -->\n".to_string()),
            Just("<!-- COVERAGE:END -->\n".to_string()),
            Just("\n".to_string()),
            "[a-z ]{0,12}\n",
        ]
    }

    proptest! {
        #[test]
        fn prop_second_pass_is_noop(lines in prop::collection::vec(line(), 0..24), mode in prop_oneof![
            Just(CoverageMode::Instruction),
            Just(CoverageMode::Full),
            Just(CoverageMode::None),
        ]) {
            let content: String = lines.concat();
            let config = Config { coverage: mode, ..Config::default() };
            let summary = crate::coverage::parse_report(REPORT_XML, mode).unwrap();
            let coverage = match mode {
                CoverageMode::None => CoverageStatus::Disabled,
                _ => CoverageStatus::Found(summary),
            };

            let first = update_document(&content, &coverage, &config);
            let second = update_document(&first.content, &coverage, &config);
            prop_assert_eq!(second.content, first.content);
        }
    }
}
