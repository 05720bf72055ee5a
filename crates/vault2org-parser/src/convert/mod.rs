//! Markdown → Org body conversion
//!
//! The rest of the workspace treats conversion as a black box behind the
//! [`Converter`] trait. Implementations must be pure with respect to their
//! input: the same Markdown always yields the same Org text.

mod cache;
mod markdown;
mod pandoc;

pub use cache::CachedConverter;
pub use markdown::MarkdownConverter;
pub use pandoc::PandocConverter;

use crate::error::ConvertError;

/// Turns a Markdown note body into Org text
pub trait Converter: Send + Sync {
    /// Short stable name, used in logs and as part of cache keys
    fn name(&self) -> &'static str;

    /// Convert a Markdown body (frontmatter already stripped)
    fn convert(&self, markdown: &str) -> Result<String, ConvertError>;
}

impl<C: Converter + ?Sized> Converter for Box<C> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn convert(&self, markdown: &str) -> Result<String, ConvertError> {
        (**self).convert(markdown)
    }
}

impl<C: Converter + ?Sized> Converter for std::sync::Arc<C> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn convert(&self, markdown: &str) -> Result<String, ConvertError> {
        (**self).convert(markdown)
    }
}
