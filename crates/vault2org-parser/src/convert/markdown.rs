//! Built-in Markdown → Org converter
//!
//! Walks pulldown-cmark events and writes the Org equivalent. Obsidian
//! wikilinks, Markdown links to local files and images all come out as
//! `[[file:TARGET]]` / `[[file:TARGET][TEXT]]` so the link resolver can
//! rewrite them afterwards.

use super::Converter;
use crate::error::ConvertError;
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, LinkType, Options, Parser, Tag, TagEnd};

/// Converter backed by pulldown-cmark
#[derive(Debug, Clone)]
pub struct MarkdownConverter {
    options: Options,
}

impl MarkdownConverter {
    pub fn new() -> Self {
        Self {
            options: Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_FOOTNOTES
                | Options::ENABLE_WIKILINKS,
        }
    }

    /// Convert a Markdown body to Org text
    pub fn to_org(&self, markdown: &str) -> String {
        let mut writer = OrgWriter::default();
        for event in Parser::new_ext(markdown, self.options) {
            writer.event(event);
        }
        writer.finish()
    }
}

impl Default for MarkdownConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl Converter for MarkdownConverter {
    fn name(&self) -> &'static str {
        "builtin"
    }

    fn convert(&self, markdown: &str) -> Result<String, ConvertError> {
        Ok(self.to_org(markdown))
    }
}

#[derive(Debug, Clone, Copy)]
enum FrameKind {
    Link,
    Image,
}

#[derive(Debug)]
struct LinkFrame {
    kind: FrameKind,
    link_type: LinkType,
    dest: String,
}

#[derive(Debug, Default)]
struct TableState {
    rows: Vec<Vec<String>>,
    header_rows: usize,
    current: Vec<String>,
}

#[derive(Debug, Default)]
struct OrgWriter {
    doc: String,
    /// Nested capture buffers for link text, table cells and code blocks
    captures: Vec<String>,
    /// Next number for each open list (`None` for bullet lists)
    lists: Vec<Option<u64>>,
    links: Vec<LinkFrame>,
    table: Option<TableState>,
    code_end: Option<&'static str>,
}

impl OrgWriter {
    fn out(&mut self) -> &mut String {
        match self.captures.last_mut() {
            Some(buffer) => buffer,
            None => &mut self.doc,
        }
    }

    fn push(&mut self, text: &str) {
        self.out().push_str(text);
    }

    fn ensure_newline(&mut self) {
        let out = self.out();
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
    }

    fn ensure_blank_line(&mut self) {
        let out = self.out();
        if out.is_empty() {
            return;
        }
        let trimmed = out.trim_end_matches('\n').len();
        out.truncate(trimmed);
        out.push_str("\n\n");
    }

    fn close_block(&mut self, marker: &str) {
        let out = self.out();
        let trimmed = out.trim_end_matches('\n').len();
        out.truncate(trimmed);
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(marker);
        self.ensure_blank_line();
    }

    fn list_indent(&self) -> String {
        "  ".repeat(self.lists.len())
    }

    fn line_break(&mut self) {
        let indent = self.list_indent();
        self.push("\n");
        self.push(&indent);
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.push(&text),
            Event::Code(code) => {
                let delimiter = if code.contains('~') { "=" } else { "~" };
                self.push(&format!("{delimiter}{code}{delimiter}"));
            }
            Event::Html(html) => self.push(&html),
            Event::InlineHtml(html) => self.push(&format!("@@html:{html}@@")),
            Event::FootnoteReference(label) => self.push(&format!("[fn:{label}]")),
            Event::SoftBreak => self.line_break(),
            Event::HardBreak => {
                self.push("\\\\");
                self.line_break();
            }
            Event::Rule => {
                self.ensure_newline();
                self.push("-----");
                self.ensure_blank_line();
            }
            Event::TaskListMarker(checked) => self.push(if checked { "[X] " } else { "[ ] " }),
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                let at_line_start = self.out().ends_with('\n');
                if at_line_start && !self.lists.is_empty() {
                    let indent = self.list_indent();
                    self.push(&indent);
                }
            }
            Tag::Heading { level, .. } => {
                self.ensure_newline();
                let stars = "*".repeat(heading_level_to_usize(level));
                self.push(&format!("{stars} "));
            }
            Tag::BlockQuote(_) => {
                self.ensure_newline();
                self.push("#+begin_quote\n");
            }
            Tag::CodeBlock(kind) => {
                self.ensure_newline();
                let language = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(str::to_string)
                        .filter(|lang| !lang.is_empty()),
                    CodeBlockKind::Indented => None,
                };
                match language {
                    Some(lang) => {
                        self.push(&format!("#+begin_src {lang}\n"));
                        self.code_end = Some("#+end_src");
                    }
                    None => {
                        self.push("#+begin_example\n");
                        self.code_end = Some("#+end_example");
                    }
                }
                self.captures.push(String::new());
            }
            Tag::HtmlBlock => {
                self.ensure_newline();
                self.push("#+begin_export html\n");
            }
            Tag::List(first) => {
                self.ensure_newline();
                self.lists.push(first);
            }
            Tag::Item => {
                self.ensure_newline();
                let depth = self.lists.len().saturating_sub(1);
                let marker = match self.lists.last_mut() {
                    Some(Some(next)) => {
                        let marker = format!("{next}. ");
                        *next += 1;
                        marker
                    }
                    _ => "- ".to_string(),
                };
                self.push(&"  ".repeat(depth));
                self.push(&marker);
            }
            Tag::FootnoteDefinition(label) => {
                self.ensure_newline();
                self.push(&format!("[fn:{label}] "));
            }
            Tag::Table(_) => {
                self.ensure_newline();
                self.table = Some(TableState::default());
            }
            Tag::TableHead | Tag::TableRow => {
                if let Some(table) = self.table.as_mut() {
                    table.current.clear();
                }
            }
            Tag::TableCell => self.captures.push(String::new()),
            Tag::Emphasis => self.push("/"),
            Tag::Strong => self.push("*"),
            Tag::Strikethrough => self.push("+"),
            Tag::Link {
                link_type,
                dest_url,
                ..
            } => self.open_link(FrameKind::Link, link_type, &dest_url),
            Tag::Image {
                link_type,
                dest_url,
                ..
            } => self.open_link(FrameKind::Image, link_type, &dest_url),
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                if self.lists.is_empty() {
                    self.ensure_blank_line();
                } else {
                    self.ensure_newline();
                }
            }
            TagEnd::Heading(_) => self.ensure_blank_line(),
            TagEnd::BlockQuote(_) => self.close_block("#+end_quote"),
            TagEnd::CodeBlock => {
                let code = self.captures.pop().unwrap_or_default();
                let escaped = escape_code(&code);
                self.push(&escaped);
                let marker = self.code_end.take().unwrap_or("#+end_src");
                self.close_block(marker);
            }
            TagEnd::HtmlBlock => self.close_block("#+end_export"),
            TagEnd::List(_) => {
                self.lists.pop();
                if self.lists.is_empty() {
                    self.ensure_blank_line();
                } else {
                    self.ensure_newline();
                }
            }
            TagEnd::Item => self.ensure_newline(),
            TagEnd::FootnoteDefinition => self.ensure_blank_line(),
            TagEnd::TableCell => {
                let cell = self.captures.pop().unwrap_or_default();
                if let Some(table) = self.table.as_mut() {
                    table.current.push(cell.trim().replace('|', "\\vert{}"));
                }
            }
            TagEnd::TableHead => {
                if let Some(table) = self.table.as_mut() {
                    let row = std::mem::take(&mut table.current);
                    if !row.is_empty() {
                        table.rows.push(row);
                    }
                    table.header_rows = table.rows.len();
                }
            }
            TagEnd::TableRow => {
                if let Some(table) = self.table.as_mut() {
                    let row = std::mem::take(&mut table.current);
                    table.rows.push(row);
                }
            }
            TagEnd::Table => {
                if let Some(table) = self.table.take() {
                    let rendered = render_table(&table);
                    self.push(&rendered);
                    self.ensure_blank_line();
                }
            }
            TagEnd::Emphasis => self.push("/"),
            TagEnd::Strong => self.push("*"),
            TagEnd::Strikethrough => self.push("+"),
            TagEnd::Link | TagEnd::Image => self.close_link(),
            _ => {}
        }
    }

    fn open_link(&mut self, kind: FrameKind, link_type: LinkType, dest: &str) {
        self.links.push(LinkFrame {
            kind,
            link_type,
            dest: dest.to_string(),
        });
        self.captures.push(String::new());
    }

    fn close_link(&mut self) {
        let text = self.captures.pop().unwrap_or_default();
        if let Some(frame) = self.links.pop() {
            let rendered = render_link(&frame, text.trim());
            self.push(&rendered);
        }
    }

    fn finish(self) -> String {
        let body = self.doc.trim_end();
        if body.is_empty() {
            String::new()
        } else {
            format!("{body}\n")
        }
    }
}

fn render_link(frame: &LinkFrame, text: &str) -> String {
    let dest = frame.dest.as_str();
    let text = org_description(text);
    let text = text.as_str();

    if let FrameKind::Image = frame.kind {
        return if is_url(dest) {
            format!("[[{dest}]]")
        } else {
            format!("[[file:{}]]", local_target(frame.link_type, dest))
        };
    }

    match frame.link_type {
        LinkType::WikiLink { has_pothole } => {
            if has_pothole && !text.is_empty() {
                format!("[[file:{dest}][{text}]]")
            } else {
                format!("[[file:{dest}]]")
            }
        }
        LinkType::Email => format!("[[mailto:{dest}][{}]]", non_empty(text, dest)),
        LinkType::Autolink => format!("[[{dest}]]"),
        _ if dest.starts_with('#') => non_empty(text, dest).to_string(),
        _ if is_url(dest) => {
            if text.is_empty() || text == dest {
                format!("[[{dest}]]")
            } else {
                format!("[[{dest}][{text}]]")
            }
        }
        _ => {
            let target = local_target(frame.link_type, dest);
            if text.is_empty() {
                format!("[[file:{target}]]")
            } else {
                format!("[[file:{target}][{text}]]")
            }
        }
    }
}

/// Markdown link targets are URL-encoded, wikilink targets are not
fn local_target(link_type: LinkType, dest: &str) -> String {
    if let LinkType::WikiLink { .. } = link_type {
        return dest.to_string();
    }
    urlencoding::decode(dest)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| dest.to_string())
}

/// Brackets would end the Org link early, so they become braces
fn org_description(text: &str) -> String {
    text.replace('[', "{").replace(']', "}")
}

fn is_url(dest: &str) -> bool {
    dest.contains("://") || dest.starts_with("mailto:")
}

fn non_empty<'a>(text: &'a str, fallback: &'a str) -> &'a str {
    if text.is_empty() {
        fallback
    } else {
        text
    }
}

/// Org treats lines starting with `*` or `#+` inside blocks as structure
fn escape_code(code: &str) -> String {
    code.split_inclusive('\n')
        .map(|line| {
            if line.starts_with('*') || line.trim_start().starts_with("#+") {
                format!(",{line}")
            } else {
                line.to_string()
            }
        })
        .collect()
}

fn render_table(table: &TableState) -> String {
    let columns = table.rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut out = String::new();

    for (index, row) in table.rows.iter().enumerate() {
        out.push('|');
        for column in 0..columns {
            let cell = row.get(column).map(String::as_str).unwrap_or("");
            out.push_str(&format!(" {cell} |"));
        }
        out.push('\n');

        if table.header_rows > 0 && index + 1 == table.header_rows && columns > 0 {
            let rule = vec!["---"; columns].join("+");
            out.push_str(&format!("|{rule}|\n"));
        }
    }

    out
}

/// Convert pulldown-cmark HeadingLevel to a star count
fn heading_level_to_usize(level: HeadingLevel) -> usize {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn org(markdown: &str) -> String {
        MarkdownConverter::new().to_org(markdown)
    }

    #[test]
    fn test_headings_and_inline_markup() {
        assert_eq!(
            org("# Title\n\nSome *em* and **strong** text."),
            "* Title\n\nSome /em/ and *strong* text.\n"
        );
        assert_eq!(org("### Deep"), "*** Deep\n");
    }

    #[test]
    fn test_inline_code_and_strikethrough() {
        assert_eq!(org("Use `cargo` not ~~make~~"), "Use ~cargo~ not +make+\n");
    }

    #[test]
    fn test_wikilinks_become_file_links() {
        assert_eq!(
            org("See [[Other Note]] and [[Target|Alias]]."),
            "See [[file:Other Note]] and [[file:Target][Alias]].\n"
        );
    }

    #[test]
    fn test_wikilink_embed_becomes_file_link() {
        assert_eq!(org("![[pic.png]]"), "[[file:pic.png]]\n");
    }

    #[test]
    fn test_brackets_in_link_text_become_braces() {
        assert_eq!(
            org("[a [b] c](Note.md) and [x [y]](https://example.com)"),
            "[[file:Note.md][a {b} c]] and [[https://example.com][x {y}]]\n"
        );
    }

    #[test]
    fn test_markdown_links() {
        assert_eq!(
            org("[Doc](My%20Doc.md) and [site](https://example.com)"),
            "[[file:My Doc.md][Doc]] and [[https://example.com][site]]\n"
        );
    }

    #[test]
    fn test_image_link() {
        assert_eq!(org("![alt](images/pic.png)"), "[[file:images/pic.png]]\n");
        assert_eq!(
            org("![remote](https://example.com/a.png)"),
            "[[https://example.com/a.png]]\n"
        );
    }

    #[test]
    fn test_fenced_code_block() {
        assert_eq!(
            org("```rust\nfn main() {}\n```\n"),
            "#+begin_src rust\nfn main() {}\n#+end_src\n"
        );
    }

    #[test]
    fn test_code_block_without_language_is_example() {
        assert_eq!(
            org("```\n* not a heading\n```\n"),
            "#+begin_example\n,* not a heading\n#+end_example\n"
        );
    }

    #[test]
    fn test_nested_bullet_list() {
        assert_eq!(org("- one\n- two\n  - nested\n"), "- one\n- two\n  - nested\n");
    }

    #[test]
    fn test_ordered_list() {
        assert_eq!(org("1. a\n2. b\n"), "1. a\n2. b\n");
    }

    #[test]
    fn test_task_list() {
        assert_eq!(
            org("- [ ] todo\n- [x] done\n"),
            "- [ ] todo\n- [X] done\n"
        );
    }

    #[test]
    fn test_table() {
        assert_eq!(
            org("| a | b |\n|---|---|\n| 1 | 2 |\n"),
            "| a | b |\n|---+---|\n| 1 | 2 |\n"
        );
    }

    #[test]
    fn test_block_quote() {
        assert_eq!(org("> quoted\n"), "#+begin_quote\nquoted\n#+end_quote\n");
    }

    #[test]
    fn test_empty_body() {
        assert_eq!(org(""), "");
        assert_eq!(org("\n\n"), "");
    }

    #[test]
    fn test_converter_trait() {
        let converter = MarkdownConverter::default();
        assert_eq!(converter.name(), "builtin");
        assert_eq!(converter.convert("plain").unwrap(), "plain\n");
    }
}
