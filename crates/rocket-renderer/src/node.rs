//! Document tree consumed by the formatter and the table of contents builder.
//!
//! The tree is produced once per source file by [`parse_document`](crate::parse_document)
//! (or assembled by hand) and is treated as read-only afterwards. Every node kind is
//! a variant of [`Node`], so walkers match exhaustively instead of dispatching
//! through a visitor.

/// Column alignment of a table column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
}

impl Alignment {
    /// Value used for the HTML `align` attribute.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

/// Task list checkbox state of a list item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Checkbox {
    Checked,
    Unchecked,
}

/// A single table cell with its span attributes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableCell {
    pub colspan: u32,
    pub rowspan: u32,
    pub children: Vec<Node>,
}

impl TableCell {
    /// Create a cell spanning one row and one column.
    #[must_use]
    pub fn new(children: Vec<Node>) -> Self {
        Self {
            colspan: 1,
            rowspan: 1,
            children,
        }
    }
}

/// A node of the document tree.
///
/// Container variants own their children in document order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Document(Vec<Node>),
    BlockQuote(Vec<Node>),
    CodeBlock {
        language: Option<String>,
        code: String,
    },
    Heading {
        level: u8,
        children: Vec<Node>,
    },
    ThematicBreak,
    HtmlBlock(String),
    ListItem {
        checkbox: Option<Checkbox>,
        children: Vec<Node>,
    },
    OrderedList {
        start: u64,
        children: Vec<Node>,
    },
    UnorderedList(Vec<Node>),
    Paragraph(Vec<Node>),
    Table {
        alignments: Vec<Option<Alignment>>,
        children: Vec<Node>,
    },
    /// The header row of a table; its children are cells.
    TableHead(Vec<Node>),
    /// Body rows of a table. May be empty.
    TableBody(Vec<Node>),
    TableRow(Vec<Node>),
    TableCell(TableCell),
    InlineCode(String),
    Emphasis(Vec<Node>),
    Strong(Vec<Node>),
    Image {
        source: Option<String>,
        title: Option<String>,
        children: Vec<Node>,
    },
    InlineHtml(String),
    LineBreak,
    SoftBreak,
    Link {
        destination: Option<String>,
        children: Vec<Node>,
    },
    Text(String),
    Strikethrough(Vec<Node>),
    SymbolLink {
        destination: Option<String>,
    },
    /// `^[text](attributes)` span; `attributes` is the raw text between the parentheses.
    InlineAttributes {
        attributes: String,
        children: Vec<Node>,
    },
}

impl Node {
    /// Convenience constructor for a text leaf.
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    /// Child nodes in document order. Leaves return an empty slice.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        match self {
            Self::Document(children)
            | Self::BlockQuote(children)
            | Self::Heading { children, .. }
            | Self::ListItem { children, .. }
            | Self::OrderedList { children, .. }
            | Self::UnorderedList(children)
            | Self::Paragraph(children)
            | Self::Table { children, .. }
            | Self::TableHead(children)
            | Self::TableBody(children)
            | Self::TableRow(children)
            | Self::TableCell(TableCell { children, .. })
            | Self::Emphasis(children)
            | Self::Strong(children)
            | Self::Image { children, .. }
            | Self::Link { children, .. }
            | Self::Strikethrough(children)
            | Self::InlineAttributes { children, .. } => children,
            Self::CodeBlock { .. }
            | Self::ThematicBreak
            | Self::HtmlBlock(_)
            | Self::InlineCode(_)
            | Self::InlineHtml(_)
            | Self::LineBreak
            | Self::SoftBreak
            | Self::Text(_)
            | Self::SymbolLink { .. } => &[],
        }
    }

    /// Whether this node is phrasing (inline) content.
    #[must_use]
    pub fn is_inline(&self) -> bool {
        matches!(
            self,
            Self::InlineCode(_)
                | Self::Emphasis(_)
                | Self::Strong(_)
                | Self::Image { .. }
                | Self::InlineHtml(_)
                | Self::LineBreak
                | Self::SoftBreak
                | Self::Link { .. }
                | Self::Text(_)
                | Self::Strikethrough(_)
                | Self::SymbolLink { .. }
                | Self::InlineAttributes { .. }
        )
    }

    /// Concatenated text of all descendants, with markup flattened away.
    #[must_use]
    pub fn plain_text(&self) -> String {
        let mut buffer = String::new();
        self.collect_plain_text(&mut buffer);
        buffer
    }

    fn collect_plain_text(&self, buffer: &mut String) {
        match self {
            Self::Text(text) | Self::InlineCode(text) | Self::InlineHtml(text) => {
                buffer.push_str(text);
            }
            Self::SymbolLink { destination } => {
                if let Some(destination) = destination {
                    buffer.push_str(destination);
                }
            }
            Self::CodeBlock { code, .. } => buffer.push_str(code),
            Self::SoftBreak => buffer.push(' '),
            Self::LineBreak => buffer.push('\n'),
            _ => {
                for child in self.children() {
                    child.collect_plain_text(buffer);
                }
            }
        }
    }
}
