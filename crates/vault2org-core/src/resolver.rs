//! Link resolution
//!
//! Decides what a single `[[file:...]]` link becomes. Checks run in a fixed
//! order and the first hit wins:
//!
//! 1. a note whose stem matches the last path segment of the target
//! 2. an asset at the target's vault-relative path (copied to the output)
//! 3. an italic placeholder, reported back as a [`LinkIncident`]

use crate::error::NoteResult;
use crate::index::VaultIndex;
use crate::link::LinkReference;
use crate::note::Note;
use crate::output::{CopyOutcome, OutputTree};
use std::fmt;
use std::path::PathBuf;

/// Content extensions stripped from a target when no stem matches it as is
pub const DEFAULT_CONTENT_EXTENSIONS: &[&str] = &["md"];

/// What a link was resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionKind {
    Note { identifier: String },
    Asset { path: PathBuf, outcome: CopyOutcome },
    Placeholder { reason: PlaceholderReason },
}

/// A resolved link and its replacement text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Org text that replaces the original link
    pub text: String,
    pub kind: ResolutionKind,
}

impl Resolution {
    /// Incident to report, if the link fell through to a placeholder
    pub fn incident(&self, reference: &LinkReference) -> Option<LinkIncident> {
        match &self.kind {
            ResolutionKind::Placeholder { reason } => Some(LinkIncident {
                target: reference.target.clone(),
                reason: reason.clone(),
            }),
            _ => None,
        }
    }
}

/// Why a link became a placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceholderReason {
    /// Neither a note nor an asset matched
    NotFound,
    /// An asset matched but could not be copied
    CopyFailed(String),
}

/// A link that could not be resolved, for the caller to log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkIncident {
    pub target: String,
    pub reason: PlaceholderReason,
}

impl fmt::Display for LinkIncident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            PlaceholderReason::NotFound => write!(f, "unresolved link '{}'", self.target),
            PlaceholderReason::CopyFailed(err) => {
                write!(f, "could not copy asset '{}': {err}", self.target)
            }
        }
    }
}

/// Resolves links against a frozen index
#[derive(Debug, Clone)]
pub struct LinkResolver<'a> {
    index: &'a VaultIndex,
    output: &'a OutputTree,
    content_extensions: Vec<String>,
}

impl<'a> LinkResolver<'a> {
    pub fn new(index: &'a VaultIndex, output: &'a OutputTree) -> Self {
        Self {
            index,
            output,
            content_extensions: DEFAULT_CONTENT_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }

    /// Extensions that may trail a note target, like `Other.md`
    pub fn with_content_extensions(mut self, extensions: &[String]) -> Self {
        self.content_extensions = extensions.iter().map(|e| e.to_ascii_lowercase()).collect();
        self
    }

    /// Resolve one link
    ///
    /// Only an ambiguous stem is an error; everything else resolves to some
    /// replacement text.
    pub fn resolve(&self, reference: &LinkReference) -> NoteResult<Resolution> {
        if let Some(note) = self.find_note(&reference.target)? {
            let text = match &reference.display_text {
                Some(display) => format!("[[id:{}][{display}]]", note.identifier()),
                None => format!("[[id:{}][{}]]", note.identifier(), note.title()),
            };
            return Ok(Resolution {
                text,
                kind: ResolutionKind::Note {
                    identifier: note.identifier().to_string(),
                },
            });
        }

        if let Some(asset) = self.index.lookup_asset(&reference.target) {
            match self.output.ensure_asset(asset) {
                Ok(outcome) => {
                    return Ok(Resolution {
                        text: format!("[[{}]]", asset.link_path()),
                        kind: ResolutionKind::Asset {
                            path: asset.relative_path().to_path_buf(),
                            outcome,
                        },
                    });
                }
                Err(err) => {
                    return Ok(placeholder(
                        reference,
                        PlaceholderReason::CopyFailed(err.to_string()),
                    ));
                }
            }
        }

        Ok(placeholder(reference, PlaceholderReason::NotFound))
    }

    fn find_note(&self, target: &str) -> NoteResult<Option<&'a Note>> {
        let segment = target.rsplit('/').next().unwrap_or(target);
        if let Some(note) = self.index.lookup_by_stem(segment)? {
            return Ok(Some(note));
        }

        let stripped = self.strip_decorations(segment);
        if stripped.is_empty() || stripped == segment {
            return Ok(None);
        }
        self.index.lookup_by_stem(stripped)
    }

    /// Drop a `#heading` fragment and a trailing content extension
    fn strip_decorations<'s>(&self, segment: &'s str) -> &'s str {
        let without_fragment = segment.split_once('#').map_or(segment, |(stem, _)| stem);
        match without_fragment.rsplit_once('.') {
            Some((stem, ext))
                if self
                    .content_extensions
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext)) =>
            {
                stem
            }
            _ => without_fragment,
        }
    }
}

fn placeholder(reference: &LinkReference, reason: PlaceholderReason) -> Resolution {
    let shown = reference
        .display_text
        .as_deref()
        .unwrap_or(&reference.target);
    Resolution {
        text: format!("/{shown}/"),
        kind: ResolutionKind::Placeholder { reason },
    }
}
