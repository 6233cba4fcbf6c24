//! Aside detection for block quotes.
//!
//! A block quote whose first line starts with a single-word marker followed by a
//! colon (`> note: ...`, `> warning: ...`) is a callout rather than a quotation.

use crate::node::Node;

/// First text run of the first paragraph of a block quote.
fn initial_text(block_quote: &Node) -> Option<&str> {
    let Node::BlockQuote(children) = block_quote else {
        return None;
    };
    let Some(Node::Paragraph(inlines)) = children.first() else {
        return None;
    };
    match inlines.first() {
        Some(Node::Text(text)) => Some(text),
        _ => None,
    }
}

/// Conservatively decide whether a block quote should render as an aside.
///
/// Only the first text run of the first paragraph is inspected. It must contain
/// a colon, and no space may come before that colon.
///
/// # Examples
///
/// ```
/// use rocket_renderer::{Node, is_aside};
///
/// let quote = |text: &str| Node::BlockQuote(vec![Node::Paragraph(vec![Node::text(text)])]);
/// assert!(is_aside(&quote("note: text")));
/// assert!(!is_aside(&quote("This is a compound sentence: two clauses")));
/// assert!(!is_aside(&quote("nocolonhere")));
/// ```
#[must_use]
pub fn is_aside(block_quote: &Node) -> bool {
    let Some(text) = initial_text(block_quote) else {
        return false;
    };
    let Some(colon) = text.find(':') else {
        return false;
    };
    match text.find(' ') {
        Some(space) => space > colon,
        None => true,
    }
}

/// A block quote viewed as an aside: its kind label and its content with the
/// marker removed.
#[derive(Debug)]
pub struct Aside<'a> {
    kind: &'a str,
    first: Option<Node>,
    rest: &'a [Node],
}

impl<'a> Aside<'a> {
    /// Build the aside view of a block quote accepted by [`is_aside`].
    ///
    /// Returns `None` for anything [`is_aside`] rejects.
    #[must_use]
    pub fn from_block_quote(block_quote: &'a Node) -> Option<Self> {
        if !is_aside(block_quote) {
            return None;
        }
        let Node::BlockQuote(children) = block_quote else {
            return None;
        };
        let (Node::Paragraph(inlines), rest) = children.split_first()? else {
            return None;
        };
        let (Node::Text(text), remaining_inlines) = inlines.split_first()? else {
            return None;
        };

        let (kind, after) = text.split_once(':')?;
        let after = after.strip_prefix(' ').unwrap_or(after);

        let mut paragraph = Vec::with_capacity(inlines.len());
        let mut remaining_inlines = remaining_inlines.iter().peekable();
        if after.is_empty() {
            // Marker alone on its line: the content starts on the next line.
            remaining_inlines.next_if(|node| matches!(node, Node::SoftBreak));
        } else {
            paragraph.push(Node::text(after));
        }
        paragraph.extend(remaining_inlines.cloned());

        let first = (!paragraph.is_empty()).then_some(Node::Paragraph(paragraph));

        Some(Self { kind, first, rest })
    }

    /// The marker text before the colon, as written.
    #[must_use]
    pub fn kind(&self) -> &'a str {
        self.kind
    }

    /// Content nodes of the aside in document order.
    pub fn content(&self) -> impl Iterator<Item = &Node> {
        self.first.iter().chain(self.rest)
    }
}
