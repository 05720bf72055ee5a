//! Notes and assets discovered in a vault

use crate::error::{NoteError, NoteResult};
use crate::identity::{normalize_stem, output_filename};
use chrono::NaiveDateTime;
use once_cell::sync::OnceCell;
use std::path::{Component, Path, PathBuf};
use vault2org_parser::{ConvertError, Converter, Frontmatter, ParsedSource};

/// A convertible note
///
/// Holds everything needed to render the note and to resolve links that point
/// at it. The converted body is computed at most once, on first use.
#[derive(Debug, Clone)]
pub struct Note {
    relative_path: PathBuf,
    source_path: PathBuf,
    stem: String,
    identifier: String,
    section: Option<String>,
    frontmatter: Frontmatter,
    body: String,
    converted: OnceCell<String>,
}

impl Note {
    /// Build a note from already-parsed source
    ///
    /// `relative_path` is relative to the vault root and decides the stem and
    /// section of the note.
    pub fn new(
        relative_path: impl Into<PathBuf>,
        source_path: impl Into<PathBuf>,
        source: ParsedSource,
    ) -> Self {
        let relative_path = relative_path.into();
        let stem = relative_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let identifier = normalize_stem(&stem);
        let section = section_of(&relative_path);

        Self {
            relative_path,
            source_path: source_path.into(),
            stem,
            identifier,
            section,
            frontmatter: source.frontmatter,
            body: source.body,
            converted: OnceCell::new(),
        }
    }

    /// Read `vault_root/relative_path` from disk
    pub fn load(vault_root: &Path, relative_path: &Path) -> NoteResult<Self> {
        let source_path = vault_root.join(relative_path);
        let source = ParsedSource::read(&source_path).map_err(|source| NoteError::Load {
            path: relative_path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(relative_path, source_path, source))
    }

    pub fn relative_path(&self) -> &Path {
        &self.relative_path
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Filename without its extension, exactly as on disk
    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// Normalized stem, used as the Org-roam ID
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Top-level directory the note lives under, `None` at the vault root
    pub fn section(&self) -> Option<&str> {
        self.section.as_deref()
    }

    pub fn frontmatter(&self) -> &Frontmatter {
        &self.frontmatter
    }

    /// Markdown body with the frontmatter removed
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Frontmatter title, falling back to the stem
    pub fn title(&self) -> String {
        self.frontmatter
            .title()
            .unwrap_or_else(|| self.stem.clone())
    }

    pub fn created(&self) -> Option<NaiveDateTime> {
        self.frontmatter.created()
    }

    /// Output filename, which requires a creation timestamp
    pub fn output_filename(&self) -> NoteResult<String> {
        let created = self.created().ok_or_else(|| NoteError::MissingTimestamp {
            path: self.relative_path.clone(),
        })?;
        Ok(output_filename(created, &self.identifier))
    }

    /// Org text of the body, converting on first call
    pub fn org_body(&self, converter: &dyn Converter) -> Result<&str, ConvertError> {
        self.converted
            .get_or_try_init(|| converter.convert(&self.body))
            .map(String::as_str)
    }

    /// Whether the body has been converted already
    pub fn is_converted(&self) -> bool {
        self.converted.get().is_some()
    }
}

/// A non-note file that links may point at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    relative_path: PathBuf,
    source_path: PathBuf,
}

impl Asset {
    pub fn new(relative_path: impl Into<PathBuf>, source_path: impl Into<PathBuf>) -> Self {
        Self {
            relative_path: relative_path.into(),
            source_path: source_path.into(),
        }
    }

    pub fn relative_path(&self) -> &Path {
        &self.relative_path
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Relative path with `/` separators, as written in an Org link
    pub fn link_path(&self) -> String {
        link_path(&self.relative_path)
    }
}

/// Join the normal components of a path with `/`
pub(crate) fn link_path(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn section_of(relative_path: &Path) -> Option<String> {
    let mut components = relative_path.components().filter_map(|c| match c {
        Component::Normal(part) => Some(part),
        _ => None,
    });
    let first = components.next()?;
    // A single component is the file itself
    components
        .next()
        .map(|_| first.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn note(relative: &str, content: &str) -> Note {
        Note::new(relative, relative, ParsedSource::parse(content).unwrap())
    }

    struct CountingConverter(AtomicUsize);

    impl Converter for CountingConverter {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn convert(&self, markdown: &str) -> Result<String, ConvertError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(markdown.to_uppercase())
        }
    }

    #[test]
    fn test_identity_from_path() {
        let note = note("Projects/Weekly Review.md", "body");
        assert_eq!(note.stem(), "Weekly Review");
        assert_eq!(note.identifier(), "weekly_review");
        assert_eq!(note.section(), Some("Projects"));
    }

    #[test]
    fn test_root_note_has_no_section() {
        let note = note("Inbox.md", "body");
        assert_eq!(note.section(), None);
    }

    #[test]
    fn test_nested_note_uses_top_level_section() {
        let note = note("Areas/Health/Sleep.md", "body");
        assert_eq!(note.section(), Some("Areas"));
    }

    #[test]
    fn test_title_prefers_frontmatter() {
        let titled = note("a/b.md", "---\ntitle: Proper Title\n---\nbody");
        assert_eq!(titled.title(), "Proper Title");

        let untitled = note("a/Plain Stem.md", "body");
        assert_eq!(untitled.title(), "Plain Stem");
    }

    #[test]
    fn test_output_filename_requires_created() {
        let dated = note("a/My Note.md", "---\ncreated: 2023-05-01 08:30:00\n---\n");
        assert_eq!(
            dated.output_filename().unwrap(),
            "20230501083000-my_note.org"
        );

        let undated = note("a/My Note.md", "no frontmatter");
        assert!(matches!(
            undated.output_filename(),
            Err(NoteError::MissingTimestamp { .. })
        ));
    }

    #[test]
    fn test_org_body_converts_once() {
        let converter = CountingConverter(AtomicUsize::new(0));
        let note = note("n.md", "hello");
        assert!(!note.is_converted());

        assert_eq!(note.org_body(&converter).unwrap(), "HELLO");
        assert_eq!(note.org_body(&converter).unwrap(), "HELLO");
        assert_eq!(converter.0.load(Ordering::SeqCst), 1);
        assert!(note.is_converted());
    }

    #[test]
    fn test_asset_link_path_uses_forward_slashes() {
        let asset = Asset::new(Path::new("img").join("cat.png"), "/vault/img/cat.png");
        assert_eq!(asset.link_path(), "img/cat.png");
    }
}
