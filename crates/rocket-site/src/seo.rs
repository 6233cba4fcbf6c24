//! SEO `<head>` tags.
//!
//! Tags are built from two maps: the page context and the site's SEO source
//! (a global `seo` data file or the `seo` config property). String values on
//! the page win over the same key in the SEO source.

use std::fmt::Write;

use rocket_meta::{Map, Value};
use rocket_renderer::escape_html;

const DEFAULT_LOCALE: &str = "en_US";
const GENERATOR: &str = "Rocket";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PageType {
    Article,
    Website,
    Profile,
}

impl PageType {
    fn parse(text: &str) -> Option<Self> {
        match text.to_ascii_lowercase().as_str() {
            "article" => Some(Self::Article),
            "website" => Some(Self::Website),
            "profile" => Some(Self::Profile),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::Website => "website",
            Self::Profile => "profile",
        }
    }
}

struct Tags<'a> {
    page: &'a Map,
    seo: &'a Map,
    out: Vec<String>,
}

impl<'a> Tags<'a> {
    /// String value for `key`, page first.
    fn value(&self, key: &str) -> Option<&'a str> {
        self.page
            .get(key)
            .and_then(Value::as_str)
            .or_else(|| self.seo.get(key).and_then(Value::as_str))
    }

    fn map(&self, key: &str) -> Option<&'a Map> {
        self.page
            .get(key)
            .and_then(Value::as_map)
            .or_else(|| self.seo.get(key).and_then(Value::as_map))
    }

    fn meta(&mut self, name: Option<&str>, property: Option<&str>, content: &str) {
        let mut tag = String::from("<meta");
        if let Some(name) = name {
            let _ = write!(tag, " name=\"{}\"", escape_html(name));
        }
        if let Some(property) = property {
            let _ = write!(tag, " property=\"{}\"", escape_html(property));
        }
        let _ = write!(tag, " content=\"{}\" />", escape_html(content));
        self.out.push(tag);
    }

    fn property(&mut self, property: &str, content: &str) {
        self.meta(None, Some(property), content);
    }

    fn page_type(&self) -> PageType {
        ["pageType", "type"]
            .iter()
            .find_map(|key| self.page.get(*key).and_then(Value::as_str))
            .and_then(PageType::parse)
            .unwrap_or_else(|| {
                if self.page.get("isPost").and_then(Value::as_bool) == Some(true) {
                    PageType::Article
                } else {
                    PageType::Website
                }
            })
    }

    fn author(&self) -> Option<String> {
        if let Some(author) = self.value("author") {
            return Some(author.to_owned());
        }
        let author = self.map("author")?;
        let name = ["firstName", "lastName"]
            .iter()
            .filter_map(|key| author.get(*key).and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join(" ");
        (!name.is_empty()).then_some(name)
    }
}

/// Render the SEO tags for `page`, one per line.
///
/// Returns an empty string when `seo` is `None`.
#[must_use]
pub fn generate(page: &Map, seo: Option<&Map>) -> String {
    let Some(seo) = seo else {
        return String::new();
    };
    let mut tags = Tags {
        page,
        seo,
        out: Vec::new(),
    };

    if let Some(title) = tags.value("title") {
        tags.out.push(format!("<title>{}</title>", escape_html(title)));
        tags.property("og:title", title);
    }

    if let Some(description) = tags.value("description") {
        tags.property("og:description", description);
        tags.meta(Some("description"), None, description);
    }

    let locale = tags.value("locale").unwrap_or(DEFAULT_LOCALE);
    tags.property("og:locale", locale);

    if let Some(site_url) = tags.value("siteURL") {
        let output_path = page.get("outputPath").and_then(Value::as_str).unwrap_or("");
        let url = format!("{}{output_path}", site_url.strip_suffix('/').unwrap_or(site_url));
        tags.out.push(format!(
            "<link rel=\"canonical\" href=\"{}\" />",
            escape_html(&url)
        ));
        tags.property("og:url", &url);
    }

    if let Some(site_name) = seo.get("title").and_then(Value::as_str) {
        tags.property("og:site_name", site_name);
    }

    let page_type = tags.page_type();
    tags.property("og:type", page_type.as_str());
    tags.meta(Some("generator"), None, GENERATOR);

    if let Some(page_tags) = page.get("tags").and_then(Value::as_list) {
        for tag in page_tags.iter().filter_map(Value::as_str) {
            tags.property("article:tag", tag);
        }
    }

    if page_type == PageType::Article
        && let Some(date) = page.get("date").and_then(Value::as_date)
    {
        let published = date.format("%Y-%m-%dT%H:%M:%S%:z").to_string();
        tags.property("article:published_time", &published);
    }

    if let Some(author) = tags.author() {
        tags.meta(Some("author"), None, &author);
    }

    if page_type == PageType::Profile
        && let Some(profile) = tags.map("author")
    {
        for (key, property) in [
            ("firstName", "profile:first_name"),
            ("lastName", "profile:last_name"),
            ("username", "profile:username"),
        ] {
            if let Some(value) = profile.get(key).and_then(Value::as_str) {
                tags.property(property, value);
            }
        }
    }

    tags.out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rocket_meta::parse_date;

    fn map(pairs: &[(&str, Value)]) -> Map {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), value.clone()))
            .collect()
    }

    #[test]
    fn test_no_seo_source() {
        let page = map(&[("title", Value::from("Hi"))]);
        assert_eq!(generate(&page, None), "");
    }

    #[test]
    fn test_website_tags() {
        let seo = map(&[
            ("title", Value::from("My Site")),
            ("description", Value::from("A site")),
            ("siteURL", Value::from("https://example.com/")),
        ]);
        let page = map(&[
            ("outputPath", Value::from("/index.html")),
            ("isPost", Value::Boolean(false)),
        ]);

        assert_eq!(
            generate(&page, Some(&seo)),
            "<title>My Site</title>\n\
             <meta property=\"og:title\" content=\"My Site\" />\n\
             <meta property=\"og:description\" content=\"A site\" />\n\
             <meta name=\"description\" content=\"A site\" />\n\
             <meta property=\"og:locale\" content=\"en_US\" />\n\
             <link rel=\"canonical\" href=\"https://example.com/index.html\" />\n\
             <meta property=\"og:url\" content=\"https://example.com/index.html\" />\n\
             <meta property=\"og:site_name\" content=\"My Site\" />\n\
             <meta property=\"og:type\" content=\"website\" />\n\
             <meta name=\"generator\" content=\"Rocket\" />"
        );
    }

    #[test]
    fn test_article_tags() {
        let seo = map(&[("title", Value::from("Blog"))]);
        let page = map(&[
            ("title", Value::from("Post & more")),
            ("isPost", Value::Boolean(true)),
            ("tags", Value::List(vec![Value::from("rust"), Value::from("web")])),
            ("date", Value::Date(parse_date("2024-02-03 04:05:06").unwrap())),
            ("author", Value::from("Sam")),
        ]);

        let output = generate(&page, Some(&seo));
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "<title>Post &amp; more</title>");
        assert!(lines.contains(&"<meta property=\"og:site_name\" content=\"Blog\" />"));
        assert!(lines.contains(&"<meta property=\"og:type\" content=\"article\" />"));
        assert!(lines.contains(&"<meta property=\"article:tag\" content=\"rust\" />"));
        assert!(lines.contains(&"<meta property=\"article:tag\" content=\"web\" />"));
        assert!(lines.contains(
            &"<meta property=\"article:published_time\" content=\"2024-02-03T04:05:06+00:00\" />"
        ));
        assert_eq!(lines.last(), Some(&"<meta name=\"author\" content=\"Sam\" />"));
    }

    #[test]
    fn test_profile_tags() {
        let author = map(&[
            ("firstName", Value::from("Ada")),
            ("lastName", Value::from("Lovelace")),
            ("username", Value::from("ada")),
        ]);
        let seo = map(&[("author", Value::Map(author))]);
        let page = map(&[("type", Value::from("Profile"))]);

        let output = generate(&page, Some(&seo));
        assert!(output.contains("<meta property=\"og:type\" content=\"profile\" />"));
        assert!(output.contains("<meta name=\"author\" content=\"Ada Lovelace\" />"));
        assert!(output.ends_with(
            "<meta property=\"profile:first_name\" content=\"Ada\" />\n\
             <meta property=\"profile:last_name\" content=\"Lovelace\" />\n\
             <meta property=\"profile:username\" content=\"ada\" />"
        ));
    }

    #[test]
    fn test_page_values_override_seo() {
        let seo = map(&[
            ("description", Value::from("site")),
            ("locale", Value::from("en_GB")),
        ]);
        let page = map(&[("description", Value::from("page"))]);

        let output = generate(&page, Some(&seo));
        assert!(output.contains("<meta name=\"description\" content=\"page\" />"));
        assert!(output.contains("<meta property=\"og:locale\" content=\"en_GB\" />"));
        assert!(!output.contains("og:site_name"));
    }

    #[test]
    fn test_unknown_type_falls_back() {
        let page = map(&[("type", Value::from("gallery")), ("isPost", Value::Boolean(true))]);
        let output = generate(&page, Some(&Map::new()));
        assert!(output.contains("content=\"article\""));
    }
}
