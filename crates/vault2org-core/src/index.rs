//! Vault index
//!
//! Built once by a single thread, then frozen. After [`VaultIndexBuilder::build`]
//! the index is never mutated, which is what lets every render worker borrow
//! it without any synchronization.

use crate::error::{NoteError, NoteResult};
use crate::note::{Asset, Note};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// Mutable accumulator used during discovery
#[derive(Debug, Default)]
pub struct VaultIndexBuilder {
    notes: HashMap<PathBuf, Note>,
    assets: HashMap<PathBuf, Asset>,
}

impl VaultIndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a note; a note already at the same relative path is replaced
    pub fn add_note(&mut self, note: Note) -> &mut Self {
        let key = note.relative_path().to_path_buf();
        if self.notes.contains_key(&key) {
            warn!(path = %key.display(), "note registered twice, keeping the latest");
        }
        self.notes.insert(key, note);
        self
    }

    pub fn add_asset(&mut self, asset: Asset) -> &mut Self {
        self.assets.insert(asset.relative_path().to_path_buf(), asset);
        self
    }

    pub fn note_count(&self) -> usize {
        self.notes.len()
    }

    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    /// Freeze into an immutable index
    pub fn build(self) -> VaultIndex {
        let mut by_stem: HashMap<String, Vec<PathBuf>> =
            HashMap::with_capacity(self.notes.len());
        for (path, note) in &self.notes {
            by_stem
                .entry(note.stem().to_string())
                .or_default()
                .push(path.clone());
        }
        for paths in by_stem.values_mut() {
            if paths.len() > 1 {
                paths.sort();
            }
        }

        debug!(
            notes = self.notes.len(),
            assets = self.assets.len(),
            "vault index built"
        );

        VaultIndex {
            notes: self.notes,
            assets: self.assets,
            by_stem,
        }
    }
}

/// Immutable lookup tables for a whole vault
#[derive(Debug)]
pub struct VaultIndex {
    notes: HashMap<PathBuf, Note>,
    assets: HashMap<PathBuf, Asset>,
    by_stem: HashMap<String, Vec<PathBuf>>,
}

impl VaultIndex {
    /// Build an index in one step
    pub fn from_parts(
        notes: impl IntoIterator<Item = Note>,
        assets: impl IntoIterator<Item = Asset>,
    ) -> Self {
        let mut builder = VaultIndexBuilder::new();
        for note in notes {
            builder.add_note(note);
        }
        for asset in assets {
            builder.add_asset(asset);
        }
        builder.build()
    }

    /// Find the note whose filename stem is exactly `stem`
    ///
    /// More than one match is an error rather than an arbitrary pick.
    pub fn lookup_by_stem(&self, stem: &str) -> NoteResult<Option<&Note>> {
        match self.by_stem.get(stem).map(Vec::as_slice) {
            None | Some([]) => Ok(None),
            Some([path]) => Ok(self.notes.get(path)),
            Some(paths) => Err(NoteError::AmbiguousStem {
                stem: stem.to_string(),
                matches: paths.to_vec(),
            }),
        }
    }

    /// Find an asset by its path relative to the vault root
    ///
    /// Accepts `/` or `\` separators and ignores `.` segments. Targets that
    /// climb out with `..` or are absolute never match.
    pub fn lookup_asset(&self, target: &str) -> Option<&Asset> {
        let key = normalize_relative(target)?;
        self.assets.get(&key)
    }

    pub fn note(&self, relative_path: &Path) -> Option<&Note> {
        self.notes.get(relative_path)
    }

    /// All notes, in no particular order
    pub fn notes(&self) -> impl Iterator<Item = &Note> {
        self.notes.values()
    }

    /// All notes sorted by relative path
    pub fn notes_sorted(&self) -> Vec<&Note> {
        let mut notes: Vec<&Note> = self.notes.values().collect();
        notes.sort_by(|a, b| a.relative_path().cmp(b.relative_path()));
        notes
    }

    pub fn assets(&self) -> impl Iterator<Item = &Asset> {
        self.assets.values()
    }

    pub fn note_count(&self) -> usize {
        self.notes.len()
    }

    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }
}

fn normalize_relative(target: &str) -> Option<PathBuf> {
    let target = target.replace('\\', "/");
    let mut normalized = PathBuf::new();
    for component in Path::new(&target).components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    (!normalized.as_os_str().is_empty()).then_some(normalized)
}
