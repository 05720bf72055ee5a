//! YAML frontmatter extraction
//!
//! A note may open with a `---` line, a YAML mapping, and a closing `---`
//! line. Everything after the closing delimiter is the Markdown body. Notes
//! without that prologue have empty frontmatter and the whole file as body.

use crate::error::{ParserError, ParserResult};
use crate::timestamp::parse_timestamp;
use chrono::NaiveDateTime;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// Key/value metadata from a note's prologue
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter {
    properties: BTreeMap<String, Value>,
}

impl Frontmatter {
    /// Parse the raw YAML between the delimiters
    pub fn parse(yaml: &str) -> ParserResult<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let value: Value = serde_yaml::from_str(yaml)
            .map_err(|e| ParserError::frontmatter(e.to_string()))?;

        match value {
            Value::Null => Ok(Self::default()),
            Value::Mapping(mapping) => Ok(Self::from_mapping(mapping)),
            other => Err(ParserError::frontmatter(format!(
                "expected a mapping, found {}",
                kind_of(&other)
            ))),
        }
    }

    fn from_mapping(mapping: Mapping) -> Self {
        let properties = mapping
            .into_iter()
            .filter_map(|(key, value)| scalar_to_string(&key).map(|key| (key, value)))
            .collect();
        Self { properties }
    }

    /// All properties, sorted by key
    pub fn properties(&self) -> &BTreeMap<String, Value> {
        &self.properties
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// A property rendered as a single line of text
    pub fn get_text(&self, key: &str) -> Option<String> {
        self.get(key).and_then(scalar_to_string)
    }

    /// The `title` property, if it is present and non-empty
    pub fn title(&self) -> Option<String> {
        self.get_text("title").filter(|t| !t.trim().is_empty())
    }

    /// The `created` property parsed as a timestamp
    ///
    /// Returns `None` both when the key is missing and when its value is not a
    /// recognizable timestamp.
    pub fn created(&self) -> Option<NaiveDateTime> {
        match self.get("created")? {
            Value::String(raw) => parse_timestamp(raw),
            Value::Tagged(tagged) => match &tagged.value {
                Value::String(raw) => parse_timestamp(raw),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

/// A note file split into frontmatter and body
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSource {
    pub frontmatter: Frontmatter,
    pub body: String,
}

impl ParsedSource {
    /// Split note text into frontmatter and body
    pub fn parse(content: &str) -> ParserResult<Self> {
        let (frontmatter, body) = extract_frontmatter(content)?;
        Ok(Self {
            frontmatter,
            body: body.to_string(),
        })
    }

    /// Read and split a note file
    pub fn read(path: &Path) -> ParserResult<Self> {
        let bytes = std::fs::read(path)?;
        let content = String::from_utf8(bytes).map_err(|_| ParserError::EncodingError)?;
        Self::parse(content.strip_prefix('\u{feff}').unwrap_or(&content))
    }
}

/// Extract YAML frontmatter from content
///
/// The opening delimiter must be the very first line. The closing delimiter
/// is the next fence line (or `...`); if there is none the content is treated
/// as having no frontmatter at all. A fence is three or more dashes, optionally
/// followed by spaces or tabs.
pub fn extract_frontmatter(content: &str) -> ParserResult<(Frontmatter, &str)> {
    let Some(rest) = strip_delimiter_line(content) else {
        return Ok((Frontmatter::default(), content));
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if is_fence(line) || trim_line(line) == "..." {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Ok((Frontmatter::parse(yaml)?, body));
        }
        offset += line.len();
    }

    Ok((Frontmatter::default(), content))
}

fn strip_delimiter_line(content: &str) -> Option<&str> {
    let end = content.find('\n')?;
    is_fence(&content[..end]).then(|| &content[end + 1..])
}

fn is_fence(line: &str) -> bool {
    let line = trim_line(line);
    line.len() >= 3 && line.bytes().all(|b| b == b'-')
}

fn trim_line(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r', ' ', '\t'])
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_frontmatter_and_body() {
        let content = "---\ntitle: My Note\ncreated: 2024-01-02 10:11:12\n---\n# Heading\n\nBody text\n";
        let (fm, body) = extract_frontmatter(content).unwrap();

        assert_eq!(fm.title().as_deref(), Some("My Note"));
        assert_eq!(
            fm.created().unwrap().format("%Y%m%d%H%M%S").to_string(),
            "20240102101112"
        );
        assert_eq!(body, "# Heading\n\nBody text\n");
    }

    #[test]
    fn test_windows_line_endings() {
        let content = "---\r\ntitle: Windows\r\n---\r\nBody\r\n";
        let (fm, body) = extract_frontmatter(content).unwrap();
        assert_eq!(fm.title().as_deref(), Some("Windows"));
        assert_eq!(body, "Body\r\n");
    }

    #[test]
    fn test_fence_with_trailing_whitespace() {
        let (fm, body) = extract_frontmatter("--- \ncreated: 2024-01-01\n---\t\nbody").unwrap();
        assert!(fm.created().is_some());
        assert_eq!(body, "body");
    }

    #[test]
    fn test_fence_with_longer_dash_run() {
        let (fm, body) = extract_frontmatter("----\ntitle: Long\n-----\nbody\n").unwrap();
        assert_eq!(fm.title().as_deref(), Some("Long"));
        assert_eq!(body, "body\n");
    }

    #[test]
    fn test_two_dashes_are_not_a_fence() {
        let content = "--\ntitle: Nope\n--\nbody\n";
        let (fm, body) = extract_frontmatter(content).unwrap();
        assert!(fm.is_empty());
        assert_eq!(body, content);
    }

    #[test]
    fn test_no_frontmatter() {
        let content = "# Just a note\n";
        let (fm, body) = extract_frontmatter(content).unwrap();
        assert!(fm.is_empty());
        assert_eq!(body, content);
    }

    #[test]
    fn test_unterminated_frontmatter_is_body() {
        let content = "---\ntitle: never closed\n";
        let (fm, body) = extract_frontmatter(content).unwrap();
        assert!(fm.is_empty());
        assert_eq!(body, content);
    }

    #[test]
    fn test_closing_delimiter_at_end_of_file() {
        let (fm, body) = extract_frontmatter("---\ntitle: Short\n---").unwrap();
        assert_eq!(fm.title().as_deref(), Some("Short"));
        assert_eq!(body, "");
    }

    #[test]
    fn test_empty_frontmatter() {
        let (fm, body) = extract_frontmatter("---\n---\nBody").unwrap();
        assert!(fm.is_empty());
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_non_mapping_frontmatter_is_error() {
        let err = extract_frontmatter("---\n- a\n- b\n---\nBody").unwrap_err();
        assert!(matches!(err, ParserError::FrontmatterError(_)));
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        let err = extract_frontmatter("---\ntitle: [unclosed\n---\nBody").unwrap_err();
        assert!(matches!(err, ParserError::FrontmatterError(_)));
    }

    #[test]
    fn test_numeric_title_is_text() {
        let (fm, _) = extract_frontmatter("---\ntitle: 1984\n---\n").unwrap();
        assert_eq!(fm.title().as_deref(), Some("1984"));
    }

    #[test]
    fn test_blank_title_is_absent() {
        let (fm, _) = extract_frontmatter("---\ntitle: \"  \"\n---\n").unwrap();
        assert_eq!(fm.title(), None);
    }

    #[test]
    fn test_created_must_be_a_timestamp() {
        let (fm, _) = extract_frontmatter("---\ncreated: 20240102\n---\n").unwrap();
        assert_eq!(fm.created(), None);

        let (fm, _) = extract_frontmatter("---\ncreated: someday\n---\n").unwrap();
        assert_eq!(fm.created(), None);
    }

    #[test]
    fn test_read_strips_byte_order_mark() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("bom.md");
        std::fs::write(&path, "\u{feff}---\ntitle: Bom\n---\nBody").unwrap();

        let parsed = ParsedSource::read(&path).unwrap();
        assert_eq!(parsed.frontmatter.title().as_deref(), Some("Bom"));
        assert_eq!(parsed.body, "Body");
    }

    #[test]
    fn test_read_rejects_invalid_utf8() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("binary.md");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();

        let err = ParsedSource::read(&path).unwrap_err();
        assert!(matches!(err, ParserError::EncodingError));
    }
}
