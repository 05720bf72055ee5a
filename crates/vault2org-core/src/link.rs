//! Org file-link scanning
//!
//! The converters turn every vault link into an Org `[[file:TARGET]]` or
//! `[[file:TARGET][TEXT]]` link. This module finds those links and splices in
//! replacements. Replacement happens in one left-to-right pass over the
//! original text, so text that has already been substituted is never scanned
//! again.

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

static FILE_LINK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[file:([^\]]+?)\](?:\[([^\]]+?)\])?\]").expect("Invalid file link regex")
});

/// A link found in converted text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkReference {
    /// Link target as written
    pub target: String,

    /// Optional display text
    pub display_text: Option<String>,
}

impl LinkReference {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            display_text: None,
        }
    }

    pub fn with_display(mut self, display_text: impl Into<String>) -> Self {
        self.display_text = Some(display_text.into());
        self
    }
}

/// A link and the byte span it occupies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkMatch {
    pub span: Range<usize>,
    pub reference: LinkReference,
}

/// Find every file link in `text`, in order of appearance
pub fn scan_links(text: &str) -> Vec<LinkMatch> {
    FILE_LINK_REGEX
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let target = caps.get(1)?.as_str().to_string();
            let display_text = caps.get(2).map(|m| m.as_str().to_string());
            Some(LinkMatch {
                span: whole.range(),
                reference: LinkReference {
                    target,
                    display_text,
                },
            })
        })
        .collect()
}

/// Rebuild `text` with each span swapped for its replacement
///
/// Spans must be sorted and non-overlapping, as [`scan_links`] produces them.
pub fn apply_replacements(text: &str, replacements: &[(Range<usize>, String)]) -> String {
    let extra: usize = replacements.iter().map(|(_, r)| r.len()).sum();
    let mut out = String::with_capacity(text.len() + extra);
    let mut cursor = 0;
    for (span, replacement) in replacements {
        out.push_str(&text[cursor..span.start]);
        out.push_str(replacement);
        cursor = span.end;
    }
    out.push_str(&text[cursor..]);
    out
}
