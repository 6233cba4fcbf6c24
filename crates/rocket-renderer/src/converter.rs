//! One-call Markdown to HTML conversion.

use crate::html::HtmlFormatter;
use crate::options::{ParseOptions, RenderOptions};
use crate::parse::parse_document;

const DOCTYPE_PREFIX: &str = "<!doctype html>";
const DOCTYPE: &str = "<!DOCTYPE html>\n";

/// Convert Markdown to HTML with the default render options.
///
/// # Example
///
/// ```
/// assert_eq!(rocket_renderer::convert("*hi*"), "<p><em>hi</em></p>");
/// ```
#[must_use]
pub fn convert(markdown: &str) -> String {
    convert_with(markdown, RenderOptions::default())
}

/// Convert Markdown to HTML.
///
/// A source starting with `<!doctype html>` (any case) is treated as a full
/// document: the declaration is removed before parsing and a canonical
/// `<!DOCTYPE html>` line is put back in front of the output.
#[must_use]
pub fn convert_with(markdown: &str, options: RenderOptions) -> String {
    let (body, has_doctype) = match markdown.get(..DOCTYPE_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(DOCTYPE_PREFIX) => {
            (&markdown[DOCTYPE_PREFIX.len()..], true)
        }
        _ => (markdown, false),
    };

    let document = parse_document(body, ParseOptions::default());
    let html = HtmlFormatter::format(&document, options);
    if has_doctype {
        format!("{DOCTYPE}{html}")
    } else {
        html
    }
}
