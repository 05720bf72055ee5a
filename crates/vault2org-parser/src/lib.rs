//! vault2org Markdown parser
//!
//! Leaf crate of the workspace. It knows how to read a note file into
//! frontmatter plus body, how to parse frontmatter timestamps, and how to turn
//! a Markdown body into Org text:
//! - YAML frontmatter delimited by `---` lines
//! - `created` timestamps in the handful of layouts Obsidian users write
//! - the [`Converter`] seam with a built-in pulldown-cmark converter, a pandoc
//!   subprocess converter and an on-disk cache wrapper

pub mod convert;
pub mod error;
pub mod frontmatter;
pub mod timestamp;

pub use convert::{CachedConverter, Converter, MarkdownConverter, PandocConverter};
pub use error::{ConvertError, ParserError, ParserResult};
pub use frontmatter::{extract_frontmatter, Frontmatter, ParsedSource};
pub use timestamp::parse_timestamp;
