//! Markdown to HTML engine.
//!
//! Markdown text is parsed into a [`Node`] tree by [`parse_document`], which the
//! [`HtmlFormatter`] walks to produce HTML. The same tree feeds [`Toc::generate`]
//! for a flat table of contents that [`TocTree::build`] nests.
//!
//! Beyond CommonMark the formatter knows a few conventions:
//! - block quotes starting with `kind:` render as `<aside data-kind="kind">`;
//! - headings get stable, de-duplicated `id` attributes;
//! - `^[text](class: "name")` renders as a `<span>` carrying the attributes.
//!
//! Every operation is infallible: malformed input degrades to plain output.
//!
//! # Example
//!
//! ```
//! use rocket_renderer::{HtmlFormatter, ParseOptions, RenderOptions, Toc, parse_document};
//!
//! let document = parse_document("# Intro\n\n> note: Read this.", ParseOptions::default());
//! let html = HtmlFormatter::format(&document, RenderOptions::default());
//! assert!(html.starts_with(r#"<h1 id="intro">Intro</h1><aside data-kind="note">"#));
//!
//! let toc = Toc::generate(&document);
//! assert_eq!(toc.entries[0].id, "intro");
//! ```

mod aside;
mod converter;
mod heading_id;
mod html;
mod node;
mod options;
mod parse;
mod state;
mod toc;
mod util;

pub use aside::{Aside, is_aside};
pub use converter::{convert, convert_with};
pub use heading_id::HeadingIdGenerator;
pub use html::HtmlFormatter;
pub use node::{Alignment, Checkbox, Node, TableCell};
pub use options::{ParseOptions, RenderOptions, TocOptions};
pub use parse::parse_document;
pub use state::escape_html;
pub use toc::{Toc, TocEntry, TocTree, render_toc_html};
