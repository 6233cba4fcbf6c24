//! Formatter and table of contents options.

/// Options given to the [`HtmlFormatter`](crate::HtmlFormatter).
///
/// Every flag is independent. [`RenderOptions::default`] enables all of them.
#[allow(clippy::struct_excessive_bools)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    /// Render block quotes that begin with a single-word marker such as `note:`
    /// as `<aside data-kind="note">` instead of `<blockquote>`.
    ///
    /// Only a marker without spaces before the colon counts, so
    /// `> This is a compound sentence: two clauses` stays a block quote.
    pub parse_asides: bool,
    /// Prepend `<h1>Kind</h1>` inside every rendered aside.
    pub inject_aside_titles: bool,
    /// Parse inline attributes as JSON and copy their `class` field onto the span.
    pub parse_inline_attribute_class: bool,
    /// Replace `&`, `"`, `'`, `<` and `>` with their named entities in text.
    pub escape_html_reserved_symbols: bool,
    /// Give every heading an `id` derived from its text.
    pub generate_heading_ids: bool,
}

impl RenderOptions {
    /// All options disabled.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            parse_asides: false,
            inject_aside_titles: false,
            parse_inline_attribute_class: false,
            escape_html_reserved_symbols: false,
            generate_heading_ids: false,
        }
    }

    #[must_use]
    pub const fn with_parse_asides(mut self, enabled: bool) -> Self {
        self.parse_asides = enabled;
        self
    }

    #[must_use]
    pub const fn with_inject_aside_titles(mut self, enabled: bool) -> Self {
        self.inject_aside_titles = enabled;
        self
    }

    #[must_use]
    pub const fn with_parse_inline_attribute_class(mut self, enabled: bool) -> Self {
        self.parse_inline_attribute_class = enabled;
        self
    }

    #[must_use]
    pub const fn with_escape_html_reserved_symbols(mut self, enabled: bool) -> Self {
        self.escape_html_reserved_symbols = enabled;
        self
    }

    #[must_use]
    pub const fn with_generate_heading_ids(mut self, enabled: bool) -> Self {
        self.generate_heading_ids = enabled;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            parse_asides: true,
            inject_aside_titles: true,
            parse_inline_attribute_class: true,
            escape_html_reserved_symbols: true,
            generate_heading_ids: true,
        }
    }
}

/// Options given to the table of contents generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TocOptions {
    /// Derive heading ids from the escaped heading text, as the formatter does.
    pub escape_html_reserved_symbols: bool,
}

impl Default for TocOptions {
    fn default() -> Self {
        Self {
            escape_html_reserved_symbols: true,
        }
    }
}

/// Options for building a document tree from Markdown text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Treat inline code written with double backticks as a symbol link.
    pub symbol_links: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_enables_everything() {
        let options = RenderOptions::default();
        assert!(options.parse_asides);
        assert!(options.inject_aside_titles);
        assert!(options.parse_inline_attribute_class);
        assert!(options.escape_html_reserved_symbols);
        assert!(options.generate_heading_ids);
    }

    #[test]
    fn test_builders_toggle_single_flag() {
        let options = RenderOptions::none().with_generate_heading_ids(true);
        assert_eq!(
            options,
            RenderOptions {
                generate_heading_ids: true,
                ..RenderOptions::none()
            }
        );
        let options = RenderOptions::default().with_parse_asides(false);
        assert!(!options.parse_asides);
        assert!(options.inject_aside_titles);
    }
}
