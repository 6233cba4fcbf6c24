//! Markdown to document tree.
//!
//! Drives a pulldown-cmark offset iterator and folds its flat event stream into
//! a [`Node`] tree with a stack of open containers. Offsets are used to recover
//! source details the events do not carry: the backtick run of inline code and
//! the raw attribute text of `^[text](attributes)` spans.

use std::ops::Range;
use std::sync::LazyLock;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};
use regex::Regex;

use crate::node::{Alignment, Checkbox, Node, TableCell};
use crate::options::ParseOptions;
use crate::util::heading_level_to_num;

/// Inline attribute spans left as literal text by the parser.
static INLINE_ATTRIBUTES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\^\[([^\]]*)\]\(([^)]*)\)").unwrap());

/// Parse Markdown into a [`Node::Document`].
///
/// Tables, strikethrough and task lists are enabled. Syntax without a node kind
/// (footnote definitions, definition lists, super/subscript) is transparent:
/// its children are kept in place of the element.
///
/// # Example
///
/// ```
/// use rocket_renderer::{Node, ParseOptions, parse_document};
///
/// let document = parse_document("Hello *world*", ParseOptions::default());
/// assert_eq!(
///     document,
///     Node::Document(vec![Node::Paragraph(vec![
///         Node::text("Hello "),
///         Node::Emphasis(vec![Node::text("world")]),
///     ])])
/// );
/// ```
#[must_use]
pub fn parse_document(markdown: &str, options: ParseOptions) -> Node {
    let parser_options =
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let mut builder = TreeBuilder::new(markdown, options);
    for (event, range) in Parser::new_ext(markdown, parser_options).into_offset_iter() {
        builder.process_event(event, range);
    }
    builder.finish()
}

enum Frame {
    Document,
    Paragraph,
    Heading(u8),
    BlockQuote,
    CodeBlock(Option<String>),
    HtmlBlock,
    List(Option<u64>),
    Item(Option<Checkbox>),
    Table(Vec<Option<Alignment>>),
    TableHead,
    TableRow,
    TableCell,
    Emphasis,
    Strong,
    Strikethrough,
    Link {
        destination: String,
        range: Range<usize>,
        /// End offset of the last child seen, starting just after `[`.
        inner_end: usize,
    },
    Image {
        source: String,
        title: String,
    },
    Transparent,
}

struct Open {
    frame: Frame,
    children: Vec<Node>,
    /// Literal content of code and HTML blocks.
    buffer: String,
}

impl Open {
    fn new(frame: Frame) -> Self {
        Self {
            frame,
            children: Vec::new(),
            buffer: String::new(),
        }
    }
}

struct TreeBuilder<'a> {
    source: &'a str,
    options: ParseOptions,
    stack: Vec<Open>,
}

impl<'a> TreeBuilder<'a> {
    fn new(source: &'a str, options: ParseOptions) -> Self {
        Self {
            source,
            options,
            stack: vec![Open::new(Frame::Document)],
        }
    }

    fn process_event(&mut self, event: Event<'_>, range: Range<usize>) {
        let starts_link = matches!(event, Event::Start(Tag::Link { .. }));
        match event {
            Event::Start(tag) => self.start_tag(tag, range.clone()),
            Event::End(_) => self.end_tag(),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code, range.clone()),
            Event::Html(html) | Event::InlineHtml(html) => self.html(&html),
            Event::SoftBreak => self.push(Node::SoftBreak),
            Event::HardBreak => self.push(Node::LineBreak),
            Event::Rule => self.push(Node::ThematicBreak),
            Event::TaskListMarker(checked) => self.task_list_marker(checked),
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {}
        }
        if !starts_link
            && let Some(Open {
                frame: Frame::Link { inner_end, .. },
                ..
            }) = self.stack.last_mut()
        {
            *inner_end = (*inner_end).max(range.end);
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>, range: Range<usize>) {
        let frame = match tag {
            Tag::Paragraph => Frame::Paragraph,
            Tag::Heading { level, .. } => Frame::Heading(heading_level_to_num(level)),
            Tag::BlockQuote(_) => Frame::BlockQuote,
            Tag::CodeBlock(kind) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(ToOwned::to_owned),
                    CodeBlockKind::Indented => None,
                };
                Frame::CodeBlock(language)
            }
            Tag::HtmlBlock => Frame::HtmlBlock,
            Tag::List(start) => Frame::List(start),
            Tag::Item => Frame::Item(None),
            Tag::Table(alignments) => Frame::Table(
                alignments
                    .into_iter()
                    .map(|alignment| match alignment {
                        pulldown_cmark::Alignment::None => None,
                        pulldown_cmark::Alignment::Left => Some(Alignment::Left),
                        pulldown_cmark::Alignment::Center => Some(Alignment::Center),
                        pulldown_cmark::Alignment::Right => Some(Alignment::Right),
                    })
                    .collect(),
            ),
            Tag::TableHead => Frame::TableHead,
            Tag::TableRow => Frame::TableRow,
            Tag::TableCell => Frame::TableCell,
            Tag::Emphasis => Frame::Emphasis,
            Tag::Strong => Frame::Strong,
            Tag::Strikethrough => Frame::Strikethrough,
            Tag::Link { dest_url, .. } => Frame::Link {
                destination: dest_url.into_string(),
                inner_end: range.start + 1,
                range,
            },
            Tag::Image {
                dest_url, title, ..
            } => Frame::Image {
                source: dest_url.into_string(),
                title: title.into_string(),
            },
            Tag::FootnoteDefinition(_)
            | Tag::MetadataBlock(_)
            | Tag::DefinitionList
            | Tag::DefinitionListTitle
            | Tag::DefinitionListDefinition
            | Tag::Superscript
            | Tag::Subscript => Frame::Transparent,
        };
        self.stack.push(Open::new(frame));
    }

    fn end_tag(&mut self) {
        // The document frame is never closed by an event.
        if self.stack.len() <= 1 {
            return;
        }
        let Some(open) = self.stack.pop() else {
            return;
        };
        let Open {
            frame,
            children,
            buffer,
        } = open;

        let node = match frame {
            Frame::Document => Node::Document(expand_inline_attributes(children)),
            Frame::Paragraph => Node::Paragraph(expand_inline_attributes(children)),
            Frame::Heading(level) => Node::Heading {
                level,
                children: expand_inline_attributes(children),
            },
            Frame::BlockQuote => Node::BlockQuote(children),
            Frame::CodeBlock(language) => Node::CodeBlock {
                language,
                code: buffer,
            },
            Frame::HtmlBlock => Node::HtmlBlock(buffer),
            Frame::List(Some(start)) => Node::OrderedList { start, children },
            Frame::List(None) => Node::UnorderedList(children),
            Frame::Item(checkbox) => Node::ListItem {
                checkbox,
                children: wrap_inline_runs(expand_inline_attributes(children)),
            },
            Frame::Table(alignments) => {
                let mut children = children.into_iter();
                let mut sections = Vec::with_capacity(2);
                if let Some(head) = children.next() {
                    sections.push(head);
                }
                sections.push(Node::TableBody(children.collect()));
                Node::Table {
                    alignments,
                    children: sections,
                }
            }
            Frame::TableHead => Node::TableHead(children),
            Frame::TableRow => Node::TableRow(children),
            Frame::TableCell => {
                Node::TableCell(TableCell::new(expand_inline_attributes(children)))
            }
            Frame::Emphasis => Node::Emphasis(expand_inline_attributes(children)),
            Frame::Strong => Node::Strong(expand_inline_attributes(children)),
            Frame::Strikethrough => Node::Strikethrough(expand_inline_attributes(children)),
            Frame::Link {
                destination,
                range,
                inner_end,
            } => self.link(destination, &range, inner_end, children),
            Frame::Image { source, title } => Node::Image {
                source: non_empty(source),
                title: non_empty(title),
                children,
            },
            Frame::Transparent => {
                for child in children {
                    self.push(child);
                }
                return;
            }
        };
        self.push(node);
    }

    /// Close a link, turning `^[text](attributes)` into an inline attributes span.
    fn link(
        &mut self,
        destination: String,
        range: &Range<usize>,
        inner_end: usize,
        children: Vec<Node>,
    ) -> Node {
        let children = expand_inline_attributes(children);
        if self.take_caret(range.start)
            && let Some(attributes) = self
                .source
                .get(inner_end..range.end)
                .and_then(|tail| tail.strip_prefix("]("))
                .and_then(|tail| tail.strip_suffix(')'))
        {
            return Node::InlineAttributes {
                attributes: attributes.to_owned(),
                children,
            };
        }
        Node::Link {
            destination: non_empty(destination),
            children,
        }
    }

    /// Remove a `^` written directly before offset `start`, if present.
    fn take_caret(&mut self, start: usize) -> bool {
        if start == 0 || self.source.as_bytes().get(start - 1) != Some(&b'^') {
            return false;
        }
        let Some(Node::Text(text)) = self.top().children.last_mut() else {
            return false;
        };
        if text.pop() != Some('^') {
            return false;
        }
        if text.is_empty() {
            self.top().children.pop();
        }
        true
    }

    fn text(&mut self, text: &str) {
        let top = self.top();
        if matches!(top.frame, Frame::CodeBlock(_) | Frame::HtmlBlock) {
            top.buffer.push_str(text);
            return;
        }
        if let Some(Node::Text(previous)) = top.children.last_mut() {
            previous.push_str(text);
        } else {
            top.children.push(Node::text(text));
        }
    }

    fn inline_code(&mut self, code: &str, range: Range<usize>) {
        let double_backtick = self
            .source
            .get(range)
            .is_some_and(|raw| raw.starts_with("``"));
        let node = if self.options.symbol_links && double_backtick {
            Node::SymbolLink {
                destination: non_empty(code.to_owned()),
            }
        } else {
            Node::InlineCode(code.to_owned())
        };
        self.push(node);
    }

    fn html(&mut self, html: &str) {
        let top = self.top();
        if matches!(top.frame, Frame::HtmlBlock) {
            top.buffer.push_str(html);
        } else {
            top.children.push(Node::InlineHtml(html.to_owned()));
        }
    }

    fn task_list_marker(&mut self, checked: bool) {
        let checkbox = if checked {
            Checkbox::Checked
        } else {
            Checkbox::Unchecked
        };
        if let Some(Open {
            frame: Frame::Item(slot),
            ..
        }) = self
            .stack
            .iter_mut()
            .rev()
            .find(|open| matches!(open.frame, Frame::Item(_)))
        {
            *slot = Some(checkbox);
        }
    }

    fn push(&mut self, node: Node) {
        let top = self.top();
        if let (Node::Text(text), Some(Node::Text(previous))) = (&node, top.children.last_mut()) {
            previous.push_str(text);
            return;
        }
        top.children.push(node);
    }

    fn top(&mut self) -> &mut Open {
        // The document frame is pushed in `new` and never popped before `finish`.
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn finish(mut self) -> Node {
        while self.stack.len() > 1 {
            self.end_tag();
        }
        let children = self
            .stack
            .pop()
            .map(|open| open.children)
            .unwrap_or_default();
        Node::Document(expand_inline_attributes(children))
    }
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

/// Split `^[text](attributes)` written as plain text into inline attribute spans.
fn expand_inline_attributes(children: Vec<Node>) -> Vec<Node> {
    if !children
        .iter()
        .any(|node| matches!(node, Node::Text(text) if INLINE_ATTRIBUTES_RE.is_match(text)))
    {
        return children;
    }

    let mut expanded = Vec::with_capacity(children.len() + 2);
    for node in children {
        let Node::Text(text) = node else {
            expanded.push(node);
            continue;
        };
        let mut last = 0;
        for captures in INLINE_ATTRIBUTES_RE.captures_iter(&text) {
            let (Some(whole), Some(inner), Some(attributes)) =
                (captures.get(0), captures.get(1), captures.get(2))
            else {
                continue;
            };
            if whole.start() > last {
                expanded.push(Node::text(&text[last..whole.start()]));
            }
            let children = if inner.as_str().is_empty() {
                Vec::new()
            } else {
                vec![Node::text(inner.as_str())]
            };
            expanded.push(Node::InlineAttributes {
                attributes: attributes.as_str().to_owned(),
                children,
            });
            last = whole.end();
        }
        if last < text.len() {
            expanded.push(Node::text(&text[last..]));
        }
    }
    expanded
}

/// Wrap runs of inline nodes in paragraphs, as in a tight list item.
fn wrap_inline_runs(children: Vec<Node>) -> Vec<Node> {
    if !children.iter().any(Node::is_inline) {
        return children;
    }
    let mut blocks = Vec::with_capacity(children.len());
    let mut run = Vec::new();
    for child in children {
        if child.is_inline() {
            run.push(child);
        } else {
            if !run.is_empty() {
                blocks.push(Node::Paragraph(std::mem::take(&mut run)));
            }
            blocks.push(child);
        }
    }
    if !run.is_empty() {
        blocks.push(Node::Paragraph(run));
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(markdown: &str) -> Vec<Node> {
        match parse_document(markdown, ParseOptions::default()) {
            Node::Document(children) => children,
            other => panic!("expected document, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(parse(""), vec![]);
    }

    #[test]
    fn test_adjacent_text_merged() {
        assert_eq!(
            parse("a [b c"),
            vec![Node::Paragraph(vec![Node::text("a [b c")])]
        );
    }

    #[test]
    fn test_heading_levels() {
        assert_eq!(
            parse("### Title"),
            vec![Node::Heading {
                level: 3,
                children: vec![Node::text("Title")],
            }]
        );
    }

    #[test]
    fn test_fenced_code_language_is_first_word() {
        assert_eq!(
            parse("```rust ignore\nlet x = 1;\n```"),
            vec![Node::CodeBlock {
                language: Some("rust".to_owned()),
                code: "let x = 1;\n".to_owned(),
            }]
        );
    }

    #[test]
    fn test_fenced_code_without_info() {
        assert_eq!(
            parse("```\nplain\n```"),
            vec![Node::CodeBlock {
                language: None,
                code: "plain\n".to_owned(),
            }]
        );
    }

    #[test]
    fn test_ordered_list_start() {
        let nodes = parse("7. seven\n8. eight");
        let [Node::OrderedList { start, children }] = nodes.as_slice() else {
            panic!("expected ordered list, got {nodes:?}");
        };
        assert_eq!(*start, 7);
        assert_eq!(children.len(), 2);
    }

    #[test]
    fn test_tight_list_item_wrapped_in_paragraph() {
        assert_eq!(
            parse("- one"),
            vec![Node::UnorderedList(vec![Node::ListItem {
                checkbox: None,
                children: vec![Node::Paragraph(vec![Node::text("one")])],
            }])]
        );
    }

    #[test]
    fn test_nested_list_keeps_block_structure() {
        assert_eq!(
            parse("- outer\n  - inner"),
            vec![Node::UnorderedList(vec![Node::ListItem {
                checkbox: None,
                children: vec![
                    Node::Paragraph(vec![Node::text("outer")]),
                    Node::UnorderedList(vec![Node::ListItem {
                        checkbox: None,
                        children: vec![Node::Paragraph(vec![Node::text("inner")])],
                    }]),
                ],
            }])]
        );
    }

    #[test]
    fn test_task_markers() {
        let nodes = parse("- [x] done\n- [ ] open");
        let [Node::UnorderedList(items)] = nodes.as_slice() else {
            panic!("expected list, got {nodes:?}");
        };
        let checkboxes: Vec<Option<Checkbox>> = items
            .iter()
            .map(|item| match item {
                Node::ListItem { checkbox, .. } => *checkbox,
                _ => None,
            })
            .collect();
        assert_eq!(
            checkboxes,
            vec![Some(Checkbox::Checked), Some(Checkbox::Unchecked)]
        );
    }

    #[test]
    fn test_table_groups_body_rows() {
        let nodes = parse("| A | B |\n|:-:|---|\n| 1 | 2 |\n| 3 | 4 |");
        let [Node::Table {
            alignments,
            children,
        }] = nodes.as_slice()
        else {
            panic!("expected table, got {nodes:?}");
        };
        assert_eq!(alignments, &vec![Some(Alignment::Center), None]);
        assert_eq!(children.len(), 2);
        assert!(matches!(&children[0], Node::TableHead(cells) if cells.len() == 2));
        assert!(matches!(&children[1], Node::TableBody(rows) if rows.len() == 2));
    }

    #[test]
    fn test_table_without_rows_has_empty_body() {
        let nodes = parse("| A |\n|---|");
        let [Node::Table { children, .. }] = nodes.as_slice() else {
            panic!("expected table, got {nodes:?}");
        };
        assert_eq!(children[1], Node::TableBody(vec![]));
    }

    #[test]
    fn test_link_and_empty_destination() {
        assert_eq!(
            parse("[a](https://x.dev) [b]()"),
            vec![Node::Paragraph(vec![
                Node::Link {
                    destination: Some("https://x.dev".to_owned()),
                    children: vec![Node::text("a")],
                },
                Node::text(" "),
                Node::Link {
                    destination: None,
                    children: vec![Node::text("b")],
                },
            ])]
        );
    }

    #[test]
    fn test_inline_attributes_from_link_syntax() {
        assert_eq!(
            parse(r#"See ^[this](class: "hot") now"#),
            vec![Node::Paragraph(vec![
                Node::text("See "),
                Node::InlineAttributes {
                    attributes: r#"class: "hot""#.to_owned(),
                    children: vec![Node::text("this")],
                },
                Node::text(" now"),
            ])]
        );
    }

    #[test]
    fn test_inline_attributes_keep_nested_markup() {
        assert_eq!(
            parse(r#"^[*big* deal](class: "x")"#),
            vec![Node::Paragraph(vec![Node::InlineAttributes {
                attributes: r#"class: "x""#.to_owned(),
                children: vec![
                    Node::Emphasis(vec![Node::text("big")]),
                    Node::text(" deal"),
                ],
            }])]
        );
    }

    #[test]
    fn test_inline_attributes_from_literal_text() {
        assert_eq!(
            parse(r#"x ^[hi](class: "a", rank: 2) y"#),
            vec![Node::Paragraph(vec![
                Node::text("x "),
                Node::InlineAttributes {
                    attributes: r#"class: "a", rank: 2"#.to_owned(),
                    children: vec![Node::text("hi")],
                },
                Node::text(" y"),
            ])]
        );
    }

    #[test]
    fn test_caret_without_link_is_text() {
        assert_eq!(
            parse("2^10 [x](y)"),
            vec![Node::Paragraph(vec![
                Node::text("2^10 "),
                Node::Link {
                    destination: Some("y".to_owned()),
                    children: vec![Node::text("x")],
                },
            ])]
        );
    }

    #[test]
    fn test_double_backtick_code_without_symbol_links() {
        assert_eq!(
            parse("``Vec``"),
            vec![Node::Paragraph(vec![Node::InlineCode("Vec".to_owned())])]
        );
    }

    #[test]
    fn test_symbol_links_enabled() {
        let document = parse_document("``Vec`` and `x`", ParseOptions { symbol_links: true });
        assert_eq!(
            document,
            Node::Document(vec![Node::Paragraph(vec![
                Node::SymbolLink {
                    destination: Some("Vec".to_owned()),
                },
                Node::text(" and "),
                Node::InlineCode("x".to_owned()),
            ])])
        );
    }

    #[test]
    fn test_html_block_collected() {
        assert_eq!(
            parse("<section>\n<p>hi</p>\n</section>\n"),
            vec![Node::HtmlBlock("<section>\n<p>hi</p>\n</section>\n".to_owned())]
        );
    }

    #[test]
    fn test_image_keeps_alt_children() {
        assert_eq!(
            parse("![alt text](a.png)"),
            vec![Node::Paragraph(vec![Node::Image {
                source: Some("a.png".to_owned()),
                title: None,
                children: vec![Node::text("alt text")],
            }])]
        );
    }

    #[test]
    fn test_block_quote_and_breaks() {
        assert_eq!(
            parse("> a\n> b  \n> c\n\n***"),
            vec![
                Node::BlockQuote(vec![Node::Paragraph(vec![
                    Node::text("a"),
                    Node::SoftBreak,
                    Node::text("b"),
                    Node::LineBreak,
                    Node::text("c"),
                ])]),
                Node::ThematicBreak,
            ]
        );
    }
}
