//! HTML formatter for the document tree.
//!
//! Walks a [`Node`] tree depth-first in document order and emits HTML. The
//! document itself has no wrapper element: the output is the concatenation of
//! its children's markup.

use std::borrow::Cow;
use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;

use crate::aside::Aside;
use crate::heading_id::HeadingIdGenerator;
use crate::node::{Checkbox, Node, TableCell};
use crate::options::RenderOptions;
use crate::state::{TableState, escape_html};
use crate::util::capitalize_words;

/// Bare object keys (`class: "x"`), quoted to make relaxed attribute text valid JSON.
static BARE_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([{,]\s*)([A-Za-z_$][A-Za-z0-9_$]*)(\s*:)").unwrap());

/// Extract the `class` field from inline attribute text such as `class: "warning"`.
///
/// The text is wrapped in braces and parsed as JSON, retrying with bare keys
/// quoted. Anything unparsable yields `None`.
fn parse_attribute_class(raw: &str) -> Option<String> {
    let wrapped = format!("{{{raw}}}");
    let parsed = serde_json::from_str::<serde_json::Value>(&wrapped)
        .or_else(|_| serde_json::from_str::<serde_json::Value>(&quote_bare_keys(&wrapped)))
        .ok()?;
    parsed.get("class")?.as_str().map(ToOwned::to_owned)
}

/// Quote bare keys outside of string literals.
fn quote_bare_keys(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut rest = text;
    while let Some(start) = rest.find('"') {
        let (outside, tail) = rest.split_at(start);
        out.push_str(&BARE_KEY_RE.replace_all(outside, r#"${1}"${2}"${3}"#));
        let (literal, after) = tail.split_at(string_literal_len(tail));
        out.push_str(literal);
        rest = after;
    }
    out.push_str(&BARE_KEY_RE.replace_all(rest, r#"${1}"${2}"${3}"#));
    out
}

/// Byte length of the string literal opening `text`, both quotes included.
///
/// An unterminated literal runs to the end of `text`.
fn string_literal_len(text: &str) -> usize {
    let mut escaped = false;
    for (i, c) in text.char_indices().skip(1) {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return i + 1,
            _ => {}
        }
    }
    text.len()
}

/// Formatter that prints rendered HTML for a document tree.
///
/// Owns all per-document state (output buffer, table cursor, issued heading ids),
/// so each instance renders exactly one document.
///
/// # Example
///
/// ```
/// use rocket_renderer::{HtmlFormatter, RenderOptions, parse_document, ParseOptions};
///
/// let document = parse_document("# Hello\n\nSome *text*", ParseOptions::default());
/// let html = HtmlFormatter::format(&document, RenderOptions::default());
/// assert_eq!(html, r#"<h1 id="hello">Hello</h1><p>Some <em>text</em></p>"#);
/// ```
pub struct HtmlFormatter {
    output: String,
    options: RenderOptions,
    table: TableState,
    heading_ids: HeadingIdGenerator,
}

impl HtmlFormatter {
    #[must_use]
    pub fn new(options: RenderOptions) -> Self {
        Self {
            output: String::with_capacity(4096),
            options,
            table: TableState::default(),
            heading_ids: HeadingIdGenerator::new(),
        }
    }

    /// Format HTML for the given tree with a fresh formatter.
    #[must_use]
    pub fn format(node: &Node, options: RenderOptions) -> String {
        Self::new(options).render(node)
    }

    /// Render a tree, consuming the formatter.
    #[must_use]
    pub fn render(mut self, node: &Node) -> String {
        self.visit(node);
        self.output
    }

    #[allow(clippy::too_many_lines)]
    fn visit(&mut self, node: &Node) {
        match node {
            Node::Document(children) => self.descend(children),
            Node::BlockQuote(children) => self.block_quote(node, children),
            Node::CodeBlock { language, code } => self.code_block(language.as_deref(), code),
            Node::Heading { level, .. } => self.heading(*level, &node.plain_text()),
            Node::ThematicBreak => self.output.push_str("<hr />\n"),
            Node::HtmlBlock(html) | Node::InlineHtml(html) => self.output.push_str(html),
            Node::ListItem { checkbox, children } => {
                self.output.push_str("<li>");
                if let Some(checkbox) = checkbox {
                    self.output.push_str(r#"<input type="checkbox" disabled="""#);
                    if *checkbox == Checkbox::Checked {
                        self.output.push_str(r#" checked="""#);
                    }
                    self.output.push_str(" /> ");
                }
                self.descend(children);
                self.output.push_str("</li>\n");
            }
            Node::OrderedList { start, children } => {
                if *start == 1 {
                    self.output.push_str("<ol>\n");
                } else {
                    let _ = writeln!(self.output, r#"<ol start="{start}">"#);
                }
                self.descend(children);
                self.output.push_str("</ol>\n");
            }
            Node::UnorderedList(children) => {
                self.output.push_str("<ul>\n");
                self.descend(children);
                self.output.push_str("</ul>\n");
            }
            Node::Paragraph(children) => {
                self.output.push_str("<p>");
                self.descend(children);
                self.output.push_str("</p>");
            }
            Node::Table {
                alignments,
                children,
            } => {
                self.output.push_str("<table>\n");
                self.table.start(alignments.clone());
                self.descend(children);
                self.table.end();
                self.output.push_str("</table>\n");
            }
            Node::TableHead(children) => {
                self.output.push_str("<thead>\n<tr>\n");
                self.table.start_head();
                self.descend(children);
                self.table.end_head();
                self.output.push_str("</tr>\n</thead>\n");
            }
            Node::TableBody(children) => {
                if !children.is_empty() {
                    self.output.push_str("<tbody>\n");
                    self.descend(children);
                    self.output.push_str("</tbody>\n");
                }
            }
            Node::TableRow(children) => {
                self.output.push_str("<tr>\n");
                self.table.start_row();
                self.descend(children);
                self.output.push_str("</tr>\n");
            }
            Node::TableCell(cell) => self.table_cell(cell),
            Node::InlineCode(code) => self.print_inline("code", &[], code),
            Node::Emphasis(_) => self.print_inline("em", &[], &node.plain_text()),
            Node::Strong(_) => self.print_inline("strong", &[], &node.plain_text()),
            Node::Strikethrough(_) => self.print_inline("del", &[], &node.plain_text()),
            Node::Image { source, title, .. } => {
                self.output.push_str("<img");
                if let Some(source) = source {
                    let _ = write!(self.output, r#" src="{}""#, self.encoded(source));
                }
                if let Some(title) = title {
                    let _ = write!(self.output, r#" title="{}""#, self.encoded(title));
                }
                self.output.push_str(" />");
            }
            Node::LineBreak => self.output.push_str("<br />\n"),
            Node::SoftBreak => self.output.push('\n'),
            Node::Link {
                destination,
                children,
            } => {
                self.output.push_str("<a");
                if let Some(destination) = destination {
                    let _ = write!(self.output, r#" href="{}""#, self.encoded(destination));
                }
                self.output.push('>');
                self.descend(children);
                self.output.push_str("</a>");
            }
            Node::Text(text) => {
                let encoded = self.encoded(text);
                self.output.push_str(&encoded);
            }
            Node::SymbolLink { destination } => {
                if let Some(destination) = destination {
                    self.print_inline("code", &[], destination);
                }
            }
            Node::InlineAttributes {
                attributes,
                children,
            } => self.inline_attributes(attributes, children),
        }
    }

    fn descend(&mut self, children: &[Node]) {
        for child in children {
            self.visit(child);
        }
    }

    fn block_quote(&mut self, node: &Node, children: &[Node]) {
        if self.options.parse_asides
            && let Some(aside) = Aside::from_block_quote(node)
        {
            let kind = self.encoded(aside.kind()).into_owned();
            let _ = writeln!(
                self.output,
                r#"<aside data-kind="{}">"#,
                kind.to_lowercase()
            );
            if self.options.inject_aside_titles {
                let _ = write!(self.output, "<h1>{}</h1>", capitalize_words(&kind));
            }
            for child in aside.content() {
                self.visit(child);
            }
            self.output.push_str("</aside>\n");
        } else {
            self.output.push_str("<blockquote>\n");
            self.descend(children);
            self.output.push_str("</blockquote>\n");
        }
    }

    fn code_block(&mut self, language: Option<&str>, code: &str) {
        self.output.push_str("<pre><code");
        if let Some(language) = language {
            let _ = write!(
                self.output,
                r#" class="language-{}""#,
                self.encoded(&language.to_lowercase())
            );
        }
        let _ = writeln!(self.output, ">{}</code></pre>", self.encoded(code));
    }

    fn heading(&mut self, level: u8, text: &str) {
        let mut attributes = Vec::new();
        if self.options.generate_heading_ids {
            let id = self.heading_ids.generate(&self.encoded(text));
            attributes.push(("id", id));
        }
        self.print_inline(&format!("h{level}"), &attributes, text);
    }

    fn table_cell(&mut self, cell: &TableCell) {
        let Some(alignment) = self.table.current_alignment() else {
            return;
        };
        if cell.colspan == 0 || cell.rowspan == 0 {
            return;
        }

        let element = if self.table.is_in_head() { "th" } else { "td" };
        let _ = write!(self.output, "<{element}");
        if let Some(alignment) = alignment {
            let _ = write!(self.output, r#" align="{}""#, alignment.as_str());
        }
        self.table.advance();

        if cell.rowspan > 1 {
            let _ = write!(self.output, r#" rowspan="{}""#, cell.rowspan);
        }
        if cell.colspan > 1 {
            let _ = write!(self.output, r#" colspan="{}""#, cell.colspan);
        }
        self.output.push('>');

        self.descend(&cell.children);

        let _ = writeln!(self.output, "</{element}>");
    }

    fn inline_attributes(&mut self, attributes: &str, children: &[Node]) {
        let _ = write!(
            self.output,
            r#"<span data-attributes="{}""#,
            self.encoded(attributes)
        );
        if self.options.parse_inline_attribute_class
            && let Some(class) = parse_attribute_class(attributes)
        {
            let _ = write!(self.output, r#" class="{}""#, self.encoded(&class));
        }
        self.output.push('>');
        self.descend(children);
        self.output.push_str("</span>");
    }

    /// Escape `text` when reserved-symbol escaping is enabled.
    fn encoded<'t>(&self, text: &'t str) -> Cow<'t, str> {
        if self.options.escape_html_reserved_symbols {
            escape_html(text)
        } else {
            Cow::Borrowed(text)
        }
    }

    /// Print `<tag attr="value" ...>content</tag>` with attribute values and
    /// content escaped.
    fn print_inline(&mut self, tag: &str, attributes: &[(&str, String)], content: &str) {
        let _ = write!(self.output, "<{tag}");
        for (key, value) in attributes {
            let _ = write!(
                self.output,
                r#" {}="{}""#,
                self.encoded(key),
                self.encoded(value)
            );
        }
        let _ = write!(self.output, ">{}</{tag}>", self.encoded(content));
    }
}
