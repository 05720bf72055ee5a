//! Vault Conversion Pipeline
//!
//! Orchestrates a whole-vault conversion on top of `vault2org-core`.
//!
//! ## Phases
//!
//! 1. **Discover**: walk the vault, classify notes and assets, apply the
//!    exclusion rules
//! 2. **Index**: read every note, parse its frontmatter, freeze the
//!    [`VaultIndex`](vault2org_core::VaultIndex)
//! 3. **Render**: convert and link-resolve every note on a rayon pool, write
//!    the `.org` files and copy the assets they reference
//!
//! Phases 1 and 2 run on the calling thread and finish before phase 3 starts.
//! A failing note is recorded in the [`RunReport`] and never stops its
//! siblings.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vault2org_pipeline::VaultPipeline;
//!
//! let pipeline = VaultPipeline::new(Arc::new(MarkdownConverter::new()), config);
//! let report = pipeline.run(Path::new("vault"), Path::new("roam"))?;
//! println!("{} notes written", report.notes_written);
//! ```

pub mod discovery;
pub mod error;
pub mod pipeline;
pub mod report;

pub use discovery::{Discovery, FileKind, VaultScanner};
pub use error::PipelineError;
pub use pipeline::{NoopObserver, ProgressObserver, VaultPipeline};
pub use report::{NoteFailure, RunReport};
