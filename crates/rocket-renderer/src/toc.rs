//! Table of contents extraction.
//!
//! [`Toc::generate`] collects a flat, level-tagged list of headings;
//! [`TocTree::build`] nests that list; [`render_toc_html`] prints nested trees as
//! `<ul>` lists for templates.

use std::fmt::Write;

use crate::heading_id::HeadingIdGenerator;
use crate::node::Node;
use crate::options::TocOptions;
use crate::state::escape_html;

/// A heading as it appears in the table of contents.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TocEntry {
    /// Heading level (1-6).
    pub level: u8,
    /// Anchor id, as the formatter generates it for the same document.
    pub id: String,
    /// Plain text of the heading, unescaped.
    pub text: String,
}

impl TocEntry {
    pub fn new(level: u8, id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            level,
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Flat table of contents of one document, in document order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Toc {
    pub entries: Vec<TocEntry>,
}

impl Toc {
    /// Collect every heading of `document` with default options.
    #[must_use]
    pub fn generate(document: &Node) -> Self {
        Self::generate_with(document, TocOptions::default())
    }

    /// Collect every heading of `document`.
    ///
    /// Ids come from a heading id generator owned by this call, so they match
    /// the ids of a separate HTML render of the same document.
    #[must_use]
    pub fn generate_with(document: &Node, options: TocOptions) -> Self {
        let mut ids = HeadingIdGenerator::new();
        let mut entries = Vec::new();
        collect(document, options, &mut ids, &mut entries);
        Self { entries }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Nest the entries, see [`TocTree::build`].
    #[must_use]
    pub fn trees(&self) -> Vec<TocTree> {
        TocTree::build(&self.entries)
    }
}

fn collect(
    node: &Node,
    options: TocOptions,
    ids: &mut HeadingIdGenerator,
    entries: &mut Vec<TocEntry>,
) {
    if let Node::Heading { level, .. } = node {
        let text = node.plain_text();
        let id = if options.escape_html_reserved_symbols {
            ids.generate(&escape_html(&text))
        } else {
            ids.generate(&text)
        };
        entries.push(TocEntry {
            level: *level,
            id,
            text,
        });
        return;
    }
    for child in node.children() {
        collect(child, options, ids, entries);
    }
}

/// A node of the nested table of contents.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TocTree {
    pub id: String,
    pub text: String,
    pub children: Vec<TocTree>,
}

impl TocTree {
    fn leaf(entry: &TocEntry) -> Self {
        Self {
            id: entry.id.clone(),
            text: entry.text.clone(),
            children: Vec::new(),
        }
    }

    /// Nest a flat entry list by level.
    ///
    /// A node's children are the contiguous run of following entries that are
    /// deeper than it. Skipped levels nest directly under the previous sibling
    /// without intermediate nodes, and entries keep their order.
    ///
    /// # Example
    ///
    /// ```
    /// use rocket_renderer::{TocEntry, TocTree};
    ///
    /// let trees = TocTree::build(&[
    ///     TocEntry::new(1, "intro", "Intro"),
    ///     TocEntry::new(2, "setup", "Setup"),
    ///     TocEntry::new(1, "usage", "Usage"),
    /// ]);
    /// assert_eq!(trees.len(), 2);
    /// assert_eq!(trees[0].children[0].id, "setup");
    /// ```
    #[must_use]
    pub fn build(entries: &[TocEntry]) -> Vec<Self> {
        let mut trees = Vec::new();
        let mut index = 0;
        // A top-level entry shallower than the first one starts a new top level.
        while let Some(entry) = entries.get(index) {
            trees.extend(build_level(entries, &mut index, entry.level));
        }
        trees
    }
}

fn build_level(entries: &[TocEntry], index: &mut usize, level: u8) -> Vec<TocTree> {
    let mut siblings: Vec<TocTree> = Vec::new();
    while let Some(entry) = entries.get(*index) {
        if entry.level == level {
            siblings.push(TocTree::leaf(entry));
            *index += 1;
        } else if entry.level > level {
            let children = build_level(entries, index, entry.level);
            match siblings.last_mut() {
                Some(parent) => parent.children.extend(children),
                None => siblings.extend(children),
            }
        } else {
            break;
        }
    }
    siblings
}

/// Render nested trees as `<ul>` lists with one anchor per entry.
///
/// Ids and texts are escaped. Returns an empty string for no trees.
#[must_use]
pub fn render_toc_html(trees: &[TocTree]) -> String {
    let mut output = String::new();
    write_trees(&mut output, trees);
    output
}

fn write_trees(output: &mut String, trees: &[TocTree]) {
    if trees.is_empty() {
        return;
    }
    output.push_str("<ul>\n");
    for tree in trees {
        let _ = write!(
            output,
            r##"<li><a href="#{}">{}</a>"##,
            escape_html(&tree.id),
            escape_html(&tree.text)
        );
        write_trees(output, &tree.children);
        output.push_str("</li>\n");
    }
    output.push_str("</ul>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ParseOptions;
    use crate::parse::parse_document;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn toc(markdown: &str) -> Toc {
        Toc::generate(&parse_document(markdown, ParseOptions::default()))
    }

    fn tree(id: &str, text: &str, children: Vec<TocTree>) -> TocTree {
        TocTree {
            id: id.to_owned(),
            text: text.to_owned(),
            children,
        }
    }

    #[test]
    fn test_toc_generation() {
        let markdown = "Preface\n\n# Heading\nSome content\n\n## Sub section\nsome more content\n\n## Sub section 2\nSome more content still\n\n# Conclusion\nA conclusion";
        assert_eq!(
            toc(markdown).entries,
            vec![
                TocEntry::new(1, "heading", "Heading"),
                TocEntry::new(2, "sub-section", "Sub section"),
                TocEntry::new(2, "sub-section-2", "Sub section 2"),
                TocEntry::new(1, "conclusion", "Conclusion"),
            ]
        );
    }

    #[test]
    fn test_toc_generation_without_headings() {
        assert!(toc("Only text goes here.\nNo headings.\nNone at all...").is_empty());
        assert!(toc("").is_empty());
    }

    #[test]
    fn test_toc_ids_match_formatter() {
        let document = parse_document("# A & B\n\n## A & B", ParseOptions::default());
        let entries = Toc::generate(&document).entries;
        assert_eq!(
            entries,
            vec![
                TocEntry::new(1, "a-amp-b", "A & B"),
                TocEntry::new(2, "a-amp-b-2", "A & B"),
            ]
        );
        let html = crate::HtmlFormatter::format(&document, crate::RenderOptions::default());
        assert!(html.contains(r#"id="a-amp-b""#));
        assert!(html.contains(r#"id="a-amp-b-2""#));
    }

    #[test]
    fn test_toc_without_escaping() {
        let document = parse_document("# A & B", ParseOptions::default());
        let entries = Toc::generate_with(
            &document,
            TocOptions {
                escape_html_reserved_symbols: false,
            },
        )
        .entries;
        assert_eq!(entries, vec![TocEntry::new(1, "a--b", "A & B")]);
    }

    #[test]
    fn test_toc_finds_nested_headings() {
        let entries = toc("> ## Quoted\n\n- # Listed").entries;
        assert_eq!(
            entries,
            vec![
                TocEntry::new(2, "quoted", "Quoted"),
                TocEntry::new(1, "listed", "Listed"),
            ]
        );
    }

    #[test]
    fn test_tree_generation() {
        let entries = vec![
            TocEntry::new(1, "heading", "Heading"),
            TocEntry::new(2, "sub-section", "Sub section"),
            TocEntry::new(2, "sub-section-2", "Sub section 2"),
            TocEntry::new(3, "sub-sub-section", ""),
            TocEntry::new(1, "conclusion", "Conclusion"),
        ];
        assert_eq!(
            TocTree::build(&entries),
            vec![
                tree(
                    "heading",
                    "Heading",
                    vec![
                        tree("sub-section", "Sub section", vec![]),
                        tree(
                            "sub-section-2",
                            "Sub section 2",
                            vec![tree("sub-sub-section", "", vec![])]
                        ),
                    ]
                ),
                tree("conclusion", "Conclusion", vec![]),
            ]
        );
    }

    #[test]
    fn test_tree_empty() {
        assert_eq!(TocTree::build(&[]), vec![]);
    }

    #[test]
    fn test_tree_skipped_level_nests_directly() {
        let entries = vec![TocEntry::new(1, "a", "A"), TocEntry::new(3, "b", "B")];
        assert_eq!(
            TocTree::build(&entries),
            vec![tree("a", "A", vec![tree("b", "B", vec![])])]
        );
    }

    #[test]
    fn test_tree_second_deeper_run_appends() {
        let entries = vec![
            TocEntry::new(1, "a", "A"),
            TocEntry::new(3, "b", "B"),
            TocEntry::new(2, "c", "C"),
        ];
        assert_eq!(
            TocTree::build(&entries),
            vec![tree(
                "a",
                "A",
                vec![tree("b", "B", vec![]), tree("c", "C", vec![])]
            )]
        );
    }

    #[test]
    fn test_tree_shallower_entry_after_first_starts_new_top_level() {
        let entries = vec![TocEntry::new(2, "a", "A"), TocEntry::new(1, "b", "B")];
        assert_eq!(
            TocTree::build(&entries),
            vec![tree("a", "A", vec![]), tree("b", "B", vec![])]
        );
    }

    #[test]
    fn test_render_toc_html() {
        let trees = vec![
            tree(
                "heading",
                "Heading",
                vec![tree("sub", "Sub <section>", vec![])],
            ),
            tree("end", "End", vec![]),
        ];
        assert_eq!(
            render_toc_html(&trees),
            "<ul>\n<li><a href=\"#heading\">Heading</a><ul>\n<li><a href=\"#sub\">Sub &lt;section&gt;</a></li>\n</ul></li>\n<li><a href=\"#end\">End</a></li>\n</ul>"
        );
    }

    #[test]
    fn test_render_toc_html_empty() {
        assert_eq!(render_toc_html(&[]), "");
    }

    fn flatten(trees: &[TocTree], out: &mut Vec<String>) {
        for tree in trees {
            out.push(tree.id.clone());
            flatten(&tree.children, out);
        }
    }

    fn children_deeper(trees: &[TocTree], entries: &[TocEntry]) -> bool {
        let level = |tree: &TocTree| entries[tree.id.parse::<usize>().unwrap()].level;
        trees.iter().all(|tree| {
            tree.children.iter().all(|child| level(child) > level(tree))
                && children_deeper(&tree.children, entries)
        })
    }

    proptest! {
        #[test]
        fn prop_tree_preserves_entries_in_order(levels in proptest::collection::vec(1u8..=6, 0..40)) {
            let entries: Vec<TocEntry> = levels
                .iter()
                .enumerate()
                .map(|(index, level)| TocEntry::new(*level, format!("e{index}"), ""))
                .collect();
            let mut ids = Vec::new();
            flatten(&TocTree::build(&entries), &mut ids);
            let expected: Vec<String> = entries.iter().map(|entry| entry.id.clone()).collect();
            prop_assert_eq!(ids, expected);
        }

        #[test]
        fn prop_children_are_deeper(levels in proptest::collection::vec(1u8..=6, 1..40)) {
            let entries: Vec<TocEntry> = levels
                .iter()
                .enumerate()
                .map(|(index, level)| TocEntry::new(*level, index.to_string(), ""))
                .collect();
            prop_assert!(children_deeper(&TocTree::build(&entries), &entries));
        }
    }
}
