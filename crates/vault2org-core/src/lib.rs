//! vault2org core
//!
//! Note identity, the vault index and link resolution. This crate decides
//! what every link in a converted note points at:
//!
//! ```text
//! Note ──▶ NoteRenderer ──▶ scan [[file:...]] links ──▶ LinkResolver
//!                                                        ├─▶ VaultIndex (stem → note)
//!                                                        ├─▶ VaultIndex (path → asset) ──▶ OutputTree copy
//!                                                        └─▶ placeholder
//! ```
//!
//! The index is assembled with a [`VaultIndexBuilder`] and then frozen into a
//! [`VaultIndex`]; rendering only ever borrows the frozen index, so any number
//! of notes can be rendered at once without locking.

pub mod error;
pub mod identity;
pub mod index;
pub mod link;
pub mod note;
pub mod output;
pub mod render;
pub mod resolver;

pub use error::{NoteError, NoteResult};
pub use identity::{normalize_stem, output_filename};
pub use index::{VaultIndex, VaultIndexBuilder};
pub use link::{apply_replacements, scan_links, LinkMatch, LinkReference};
pub use note::{Asset, Note};
pub use output::{CopyOutcome, OutputTree};
pub use render::{NoteRenderer, RenderedNote};
pub use resolver::{LinkIncident, LinkResolver, PlaceholderReason, Resolution, ResolutionKind};
