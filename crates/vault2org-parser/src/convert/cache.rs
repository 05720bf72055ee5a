//! On-disk conversion cache
//!
//! Entries are keyed by a BLAKE3 hash of the converter name and the Markdown
//! input, so a changed note or a different converter never hits a stale entry.
//! The cache only saves work; a failed read or write falls back to converting.

use super::Converter;
use crate::error::ConvertError;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Wraps a converter with a directory of cached outputs
pub struct CachedConverter<C> {
    inner: C,
    dir: PathBuf,
}

impl<C: Converter> CachedConverter<C> {
    pub fn new(inner: C, dir: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            dir: dir.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, markdown: &str) -> PathBuf {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.inner.name().as_bytes());
        hasher.update(&[0]);
        hasher.update(markdown.as_bytes());
        self.dir.join(format!("{}.org", hasher.finalize().to_hex()))
    }

    fn store(&self, path: &Path, org: &str) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let mut file = tempfile::NamedTempFile::new_in(&self.dir)?;
        file.write_all(org.as_bytes())?;
        file.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl<C: Converter> Converter for CachedConverter<C> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn convert(&self, markdown: &str) -> Result<String, ConvertError> {
        let path = self.entry_path(markdown);

        if let Ok(cached) = fs::read_to_string(&path) {
            trace!(entry = %path.display(), "conversion cache hit");
            return Ok(cached);
        }

        let org = self.inner.convert(markdown)?;
        if let Err(e) = self.store(&path, &org) {
            debug!(entry = %path.display(), error = %e, "could not write conversion cache entry");
        }
        Ok(org)
    }
}
