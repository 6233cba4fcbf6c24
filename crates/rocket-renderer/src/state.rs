//! Traversal state shared by the formatter's table handling, and HTML escaping.

use std::borrow::Cow;

use crate::node::Alignment;

/// Escape the HTML reserved symbols `&`, `"`, `'`, `<` and `>`.
///
/// Returns the input unchanged (borrowed) when it contains none of them.
///
/// # Examples
///
/// ```
/// use rocket_renderer::escape_html;
///
/// assert_eq!(escape_html("a < b"), "a &lt; b");
/// assert_eq!(escape_html("plain"), "plain");
/// ```
pub fn escape_html(input: &str) -> Cow<'_, str> {
    if !input.contains(['&', '"', '\'', '<', '>']) {
        return Cow::Borrowed(input);
    }

    let mut escaped = String::with_capacity(input.len() + 16);
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// State for the table currently being formatted.
///
/// Only meaningful between [`start`](Self::start) and [`end`](Self::end); outside
/// a table there are no alignments and every cell is rejected.
#[derive(Debug, Default)]
pub(crate) struct TableState {
    /// Column alignments of the current table, `None` outside a table.
    alignments: Option<Vec<Option<Alignment>>>,
    /// Whether we're inside the table head.
    in_head: bool,
    /// Column cursor within the current row.
    column: usize,
}

impl TableState {
    /// Enter a table with its column alignments.
    pub fn start(&mut self, alignments: Vec<Option<Alignment>>) {
        self.alignments = Some(alignments);
        self.in_head = false;
        self.column = 0;
    }

    /// Leave the table, resetting all transient fields.
    pub fn end(&mut self) {
        *self = Self::default();
    }

    pub fn start_head(&mut self) {
        self.in_head = true;
        self.column = 0;
    }

    pub fn end_head(&mut self) {
        self.in_head = false;
    }

    pub fn start_row(&mut self) {
        self.column = 0;
    }

    pub fn is_in_head(&self) -> bool {
        self.in_head
    }

    /// Alignment slot for the cursor column.
    ///
    /// The outer `None` means the cursor is outside the alignment list (the cell
    /// must be dropped); the inner `None` means the column has no alignment.
    pub fn current_alignment(&self) -> Option<Option<Alignment>> {
        self.alignments.as_ref()?.get(self.column).copied()
    }

    pub fn advance(&mut self) {
        self.column += 1;
    }
}
