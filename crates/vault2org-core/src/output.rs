//! Output directory
//!
//! Notes are written flat into the output root. Assets keep their vault
//! relative path and are copied at most once per run, even when several
//! workers hit the same asset at the same moment.

use crate::note::Asset;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::trace;

/// What happened when an asset was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    /// This call copied the file
    Copied,
    /// The file was already there (earlier run or another worker)
    AlreadyPresent,
}

/// The directory a run writes into
#[derive(Debug, Clone)]
pub struct OutputTree {
    root: PathBuf,
}

impl OutputTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root directory if needed
    pub fn prepare(&self) -> io::Result<()> {
        fs::create_dir_all(&self.root)
    }

    /// Path a note with this filename is written to
    pub fn note_path(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }

    /// Write a rendered note, replacing any earlier version
    pub fn write_note(&self, filename: &str, contents: &str) -> io::Result<PathBuf> {
        let path = self.note_path(filename);
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Destination of an asset inside the output tree
    pub fn asset_path(&self, asset: &Asset) -> PathBuf {
        self.root.join(asset.relative_path())
    }

    /// Copy an asset unless it is already present
    ///
    /// The bytes go to a temporary file beside the destination, which is then
    /// linked into place without overwriting. Losing that race to another
    /// worker counts as [`CopyOutcome::AlreadyPresent`], so a destination is
    /// never observed half-written and never written twice.
    pub fn ensure_asset(&self, asset: &Asset) -> io::Result<CopyOutcome> {
        let destination = self.asset_path(asset);
        if destination.is_file() {
            return Ok(CopyOutcome::AlreadyPresent);
        }

        let parent = destination.parent().unwrap_or(&self.root);
        fs::create_dir_all(parent)?;

        let mut staged = NamedTempFile::new_in(parent)?;
        let mut source = File::open(asset.source_path())?;
        io::copy(&mut source, staged.as_file_mut())?;

        match staged.persist_noclobber(&destination) {
            Ok(_) => {
                trace!(path = %destination.display(), "asset copied");
                Ok(CopyOutcome::Copied)
            }
            Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => {
                Ok(CopyOutcome::AlreadyPresent)
            }
            Err(err) => Err(err.error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn vault_with_asset(dir: &TempDir, relative: &str, bytes: &[u8]) -> Asset {
        let source = dir.path().join("vault").join(relative);
        fs::create_dir_all(source.parent().unwrap()).unwrap();
        fs::write(&source, bytes).unwrap();
        Asset::new(relative, source)
    }

    #[test]
    fn test_ensure_asset_copies_then_reports_present() {
        let dir = TempDir::new().unwrap();
        let asset = vault_with_asset(&dir, "img/deep/cat.png", b"\x89PNG data");
        let output = OutputTree::new(dir.path().join("out"));

        assert_eq!(output.ensure_asset(&asset).unwrap(), CopyOutcome::Copied);
        assert_eq!(
            output.ensure_asset(&asset).unwrap(),
            CopyOutcome::AlreadyPresent
        );
        assert_eq!(
            fs::read(dir.path().join("out/img/deep/cat.png")).unwrap(),
            b"\x89PNG data"
        );
    }

    #[test]
    fn test_existing_destination_is_not_overwritten() {
        let dir = TempDir::new().unwrap();
        let asset = vault_with_asset(&dir, "cat.png", b"new");
        let output = OutputTree::new(dir.path().join("out"));
        fs::create_dir_all(output.root()).unwrap();
        fs::write(output.asset_path(&asset), b"old").unwrap();

        assert_eq!(
            output.ensure_asset(&asset).unwrap(),
            CopyOutcome::AlreadyPresent
        );
        assert_eq!(fs::read(output.asset_path(&asset)).unwrap(), b"old");
    }

    #[test]
    fn test_missing_source_is_error() {
        let dir = TempDir::new().unwrap();
        let asset = Asset::new("gone.png", dir.path().join("gone.png"));
        let output = OutputTree::new(dir.path().join("out"));

        assert!(output.ensure_asset(&asset).is_err());
        assert!(!output.asset_path(&asset).exists());
    }

    #[test]
    fn test_concurrent_requests_copy_once() {
        let dir = TempDir::new().unwrap();
        let asset = Arc::new(vault_with_asset(&dir, "img/shared.png", b"shared"));
        let output = Arc::new(OutputTree::new(dir.path().join("out")));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let asset = Arc::clone(&asset);
                let output = Arc::clone(&output);
                std::thread::spawn(move || output.ensure_asset(&asset).unwrap())
            })
            .collect();
        let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let copied = outcomes
            .iter()
            .filter(|o| **o == CopyOutcome::Copied)
            .count();
        assert_eq!(copied, 1);
        assert_eq!(fs::read(output.asset_path(&asset)).unwrap(), b"shared");

        let leftovers = fs::read_dir(dir.path().join("out/img")).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_write_note() {
        let dir = TempDir::new().unwrap();
        let output = OutputTree::new(dir.path());
        let path = output.write_note("20240101000000-x.org", "text").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "text");
    }
}
