//! Vault discovery
//!
//! Walks the vault and sorts every file into notes, assets, excluded notes or
//! ignored files. Nothing is read here beyond directory entries.

use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use vault2org_config::DiscoveryConfig;
use walkdir::{DirEntry, WalkDir};

/// What a vault file is, judged by its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Note,
    Asset,
}

/// Result of walking a vault; all paths are relative to the vault root
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    pub notes: Vec<PathBuf>,
    pub assets: Vec<PathBuf>,
    /// Files that matched an extension but an exclusion rule as well
    pub excluded: Vec<PathBuf>,
}

/// Scanner for discovering notes and assets in a vault directory
#[derive(Debug, Clone)]
pub struct VaultScanner {
    root: PathBuf,
    rules: DiscoveryConfig,
}

impl VaultScanner {
    pub fn new(root: impl Into<PathBuf>, rules: DiscoveryConfig) -> Self {
        Self {
            root: root.into(),
            rules,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the vault in sorted order without following symlinks
    ///
    /// Unreadable entries are logged and skipped.
    pub fn scan(&self) -> Discovery {
        let mut discovery = Discovery::default();

        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(error = %err, "skipping unreadable vault entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            self.record(&entry, relative, &mut discovery);
        }

        debug!(
            notes = discovery.notes.len(),
            assets = discovery.assets.len(),
            excluded = discovery.excluded.len(),
            "vault scanned"
        );
        discovery
    }

    fn record(&self, entry: &DirEntry, relative: &Path, discovery: &mut Discovery) {
        let Some(kind) = self.classify(entry.path()) else {
            return;
        };

        let subject_to_rules = match kind {
            FileKind::Note => true,
            FileKind::Asset => self.rules.exclude_assets,
        };
        if subject_to_rules && self.is_excluded(relative) {
            debug!(path = %relative.display(), "excluded");
            discovery.excluded.push(relative.to_path_buf());
            return;
        }

        match kind {
            FileKind::Note => discovery.notes.push(relative.to_path_buf()),
            FileKind::Asset => discovery.assets.push(relative.to_path_buf()),
        }
    }

    /// Classify a path by its extension, ignoring case
    pub fn classify(&self, path: &Path) -> Option<FileKind> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        if self.rules.content_extensions.contains(&ext) {
            Some(FileKind::Note)
        } else if self.rules.asset_extensions.contains(&ext) {
            Some(FileKind::Asset)
        } else {
            None
        }
    }

    /// Whether a vault-relative path falls under an exclusion rule
    ///
    /// Excluded when the immediate parent directory or the file stem starts
    /// with the marker, or when any component is the configuration directory.
    pub fn is_excluded(&self, relative: &Path) -> bool {
        let marker = self.rules.exclude_marker;

        let parent_marked = relative
            .parent()
            .and_then(Path::file_name)
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(marker));

        let stem_marked = relative
            .file_stem()
            .and_then(|stem| stem.to_str())
            .is_some_and(|stem| stem.starts_with(marker));

        let config_dir = self.rules.config_dir.as_str();
        let in_config_dir = relative
            .components()
            .any(|component| matches!(component, Component::Normal(part) if part == config_dir));

        parent_marked || stem_marked || in_config_dir
    }
}
