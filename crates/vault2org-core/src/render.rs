//! Note rendering
//!
//! Turns one [`Note`] into the full text of its Org-roam file: property
//! drawer, title and filetags, then the converted body with every file link
//! rewritten by the [`LinkResolver`].

use crate::error::{NoteError, NoteResult};
use crate::index::VaultIndex;
use crate::link::{apply_replacements, scan_links};
use crate::note::Note;
use crate::output::{CopyOutcome, OutputTree};
use crate::resolver::{LinkIncident, LinkResolver, ResolutionKind};
use std::path::PathBuf;
use vault2org_parser::Converter;

/// A note ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedNote {
    /// Source path relative to the vault root
    pub relative_path: PathBuf,

    /// `YYYYMMDDHHMMSS-{identifier}.org`
    pub output_filename: String,

    /// Complete file contents
    pub text: String,

    /// Links that became placeholders
    pub incidents: Vec<LinkIncident>,

    /// Assets this note copied into the output
    pub assets_copied: usize,
}

/// Renders notes against a frozen index
pub struct NoteRenderer<'a> {
    resolver: LinkResolver<'a>,
    converter: &'a dyn Converter,
}

impl<'a> NoteRenderer<'a> {
    pub fn new(
        index: &'a VaultIndex,
        output: &'a OutputTree,
        converter: &'a dyn Converter,
    ) -> Self {
        Self {
            resolver: LinkResolver::new(index, output),
            converter,
        }
    }

    pub fn with_content_extensions(mut self, extensions: &[String]) -> Self {
        self.resolver = self.resolver.with_content_extensions(extensions);
        self
    }

    /// Render one note
    ///
    /// Fails without side effects on the note's own output when the note has
    /// no timestamp, its body cannot be converted, or it links to an
    /// ambiguous stem. Assets copied before an ambiguity is found stay copied.
    pub fn render(&self, note: &Note) -> NoteResult<RenderedNote> {
        let output_filename = note.output_filename()?;

        let body = note
            .org_body(self.converter)
            .map_err(|source| NoteError::Convert {
                path: note.relative_path().to_path_buf(),
                source,
            })?;

        let document = format!("{}\n{body}", header(note));

        let mut incidents = Vec::new();
        let mut assets_copied = 0;
        let mut replacements = Vec::new();
        for link in scan_links(&document) {
            let resolution = self.resolver.resolve(&link.reference)?;
            if let Some(incident) = resolution.incident(&link.reference) {
                incidents.push(incident);
            }
            if let ResolutionKind::Asset {
                outcome: CopyOutcome::Copied,
                ..
            } = resolution.kind
            {
                assets_copied += 1;
            }
            replacements.push((link.span, resolution.text));
        }

        Ok(RenderedNote {
            relative_path: note.relative_path().to_path_buf(),
            output_filename,
            text: apply_replacements(&document, &replacements),
            incidents,
            assets_copied,
        })
    }
}

/// Property drawer plus `#+title` and, below the vault root, `#+filetags`
pub fn header(note: &Note) -> String {
    let mut header = format!(
        ":PROPERTIES:\n:ID: {}\n:END:\n#+title: {}\n",
        note.identifier(),
        note.title()
    );
    if let Some(section) = note.section() {
        header.push_str(&format!("#+filetags: :{section}:\n"));
    }
    header
}
