use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete configuration for a conversion run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Which files in the vault are notes, assets, or ignored
    pub discovery: DiscoveryConfig,

    /// How note bodies are converted
    pub conversion: ConversionConfig,

    /// Worker threads for rendering (defaults to available parallelism)
    pub jobs: Option<usize>,
}

impl Config {
    /// Number of render workers to use
    pub fn effective_jobs(&self) -> usize {
        self.jobs.unwrap_or_else(num_cpus::get).max(1)
    }

    /// Check values that deserialize fine but cannot work
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jobs == Some(0) {
            return Err(ConfigError::invalid("jobs", "must be at least 1"));
        }
        self.discovery.validate()
    }

    /// Lowercase extensions and drop leading dots so lookups are uniform
    pub fn normalize(mut self) -> Self {
        self.discovery.content_extensions = normalize_extensions(self.discovery.content_extensions);
        self.discovery.asset_extensions = normalize_extensions(self.discovery.asset_extensions);
        self
    }
}

/// Vault discovery rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiscoveryConfig {
    /// Extensions of convertible notes
    pub content_extensions: Vec<String>,

    /// Extensions of binary files that links may point at
    pub asset_extensions: Vec<String>,

    /// Notes whose name or parent directory starts with this are skipped
    pub exclude_marker: char,

    /// Notes under a directory with this name are skipped
    pub config_dir: String,

    /// Apply the exclusion rules to assets as well
    pub exclude_assets: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            content_extensions: vec!["md".to_string()],
            asset_extensions: vec!["jpg".to_string(), "png".to_string()],
            exclude_marker: '_',
            config_dir: "config".to_string(),
            exclude_assets: false,
        }
    }
}

impl DiscoveryConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.content_extensions.is_empty() {
            return Err(ConfigError::invalid(
                "discovery.content_extensions",
                "at least one extension is required",
            ));
        }

        let overlap = self
            .content_extensions
            .iter()
            .find(|ext| self.asset_extensions.contains(ext));
        if let Some(ext) = overlap {
            return Err(ConfigError::invalid(
                "discovery.asset_extensions",
                format!("'{ext}' is already a content extension"),
            ));
        }

        if self.config_dir.contains(['/', '\\']) {
            return Err(ConfigError::invalid(
                "discovery.config_dir",
                "must be a single directory name",
            ));
        }

        Ok(())
    }
}

/// Body converter selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConverterKind {
    /// Built-in pulldown-cmark converter
    #[default]
    Builtin,
    /// External pandoc executable
    Pandoc,
}

impl std::str::FromStr for ConverterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "builtin" => Ok(Self::Builtin),
            "pandoc" => Ok(Self::Pandoc),
            other => Err(format!("unknown converter '{other}' (expected builtin or pandoc)")),
        }
    }
}

/// Body conversion settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConversionConfig {
    pub converter: ConverterKind,

    /// Pandoc executable, looked up on `PATH` when not absolute
    pub pandoc_path: PathBuf,

    /// Extra arguments appended to the pandoc command line
    pub pandoc_args: Vec<String>,

    /// Directory for cached conversion output; caching is off when unset
    pub cache_dir: Option<PathBuf>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            converter: ConverterKind::Builtin,
            pandoc_path: PathBuf::from("pandoc"),
            pandoc_args: Vec::new(),
            cache_dir: None,
        }
    }
}

fn normalize_extensions(extensions: Vec<String>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(extensions.len());
    for ext in extensions {
        let ext = ext.trim().trim_start_matches('.').to_ascii_lowercase();
        if !ext.is_empty() && !normalized.contains(&ext) {
            normalized.push(ext);
        }
    }
    normalized
}
