//! Per-note error types
//!
//! Every variant here is scoped to one note: the pipeline logs it, skips that
//! note, and carries on with the rest of the vault.

use std::path::{Path, PathBuf};
use thiserror::Error;
use vault2org_parser::{ConvertError, ParserError};

/// Errors that stop a single note from being converted
#[derive(Debug, Error)]
pub enum NoteError {
    /// The note could not be read or its frontmatter is malformed
    #[error("failed to load {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: ParserError,
    },

    /// `created` is absent or not a recognizable timestamp
    #[error("{} has no usable 'created' timestamp", path.display())]
    MissingTimestamp { path: PathBuf },

    /// A link names a stem shared by several notes
    #[error("ambiguous link target '{stem}' matches {} notes: {}", .matches.len(), display_paths(.matches))]
    AmbiguousStem { stem: String, matches: Vec<PathBuf> },

    /// The body converter failed
    #[error("failed to convert {}: {source}", path.display())]
    Convert {
        path: PathBuf,
        #[source]
        source: ConvertError,
    },
}

/// Result type for per-note operations
pub type NoteResult<T> = Result<T, NoteError>;

impl NoteError {
    /// Short machine-friendly kind, used in logs and run summaries
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Load { .. } => "load",
            Self::MissingTimestamp { .. } => "missing-timestamp",
            Self::AmbiguousStem { .. } => "ambiguous-stem",
            Self::Convert { .. } => "convert",
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| Path::display(p).to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ambiguous_stem_lists_matches() {
        let err = NoteError::AmbiguousStem {
            stem: "index".to_string(),
            matches: vec![PathBuf::from("a/index.md"), PathBuf::from("b/index.md")],
        };
        assert_eq!(
            err.to_string(),
            "ambiguous link target 'index' matches 2 notes: a/index.md, b/index.md"
        );
        assert_eq!(err.kind(), "ambiguous-stem");
    }

    #[test]
    fn test_missing_timestamp_names_file() {
        let err = NoteError::MissingTimestamp {
            path: PathBuf::from("journal/today.md"),
        };
        assert!(err.to_string().contains("journal/today.md"));
    }
}
