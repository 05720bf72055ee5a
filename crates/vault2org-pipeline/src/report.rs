//! Run totals

use std::fmt;
use std::path::PathBuf;

/// A note that did not make it into the output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteFailure {
    /// Source path relative to the vault root
    pub path: PathBuf,
    /// Short failure category, e.g. `missing-timestamp`
    pub kind: &'static str,
    pub message: String,
}

impl NoteFailure {
    pub fn new(path: impl Into<PathBuf>, kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for NoteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.path.display(), self.kind, self.message)
    }
}

/// Totals for one conversion run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Notes found by discovery, excluded ones not counted
    pub notes_discovered: usize,
    pub notes_written: usize,
    pub assets_discovered: usize,
    /// Assets copied by this run; ones already in the output are not counted
    pub assets_copied: usize,
    /// Files left out by the exclusion rules
    pub excluded: usize,
    /// Links that fell back to a placeholder
    pub link_incidents: usize,
    /// Notes that could not be loaded during discovery
    pub skipped: Vec<NoteFailure>,
    /// Notes that loaded but failed to render or write
    pub failed: Vec<NoteFailure>,
}

impl RunReport {
    /// True when every discovered note was written
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.failed.is_empty()
    }

    /// Skipped and failed notes together, sorted by path
    pub fn problems(&self) -> Vec<&NoteFailure> {
        let mut problems: Vec<&NoteFailure> = self.skipped.iter().chain(&self.failed).collect();
        problems.sort_by(|a, b| a.path.cmp(&b.path));
        problems
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} notes written, {} failed, {} skipped, {} assets copied, {} unresolved links",
            self.notes_written,
            self.notes_discovered,
            self.failed.len(),
            self.skipped.len(),
            self.assets_copied,
            self.link_incidents
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_line() {
        let report = RunReport {
            notes_discovered: 5,
            notes_written: 3,
            assets_copied: 2,
            link_incidents: 4,
            failed: vec![NoteFailure::new("b.md", "ambiguous-stem", "x")],
            skipped: vec![NoteFailure::new("a.md", "load", "y")],
            ..RunReport::default()
        };
        assert_eq!(
            report.to_string(),
            "3 of 5 notes written, 1 failed, 1 skipped, 2 assets copied, 4 unresolved links"
        );
        assert!(!report.is_clean());
        let paths: Vec<_> = report.problems().iter().map(|p| p.path.clone()).collect();
        assert_eq!(paths, vec![PathBuf::from("a.md"), PathBuf::from("b.md")]);
    }

    #[test]
    fn test_failure_display() {
        let failure = NoteFailure::new("n/x.md", "missing-timestamp", "no created");
        assert_eq!(failure.to_string(), "n/x.md [missing-timestamp]: no created");
    }
}
