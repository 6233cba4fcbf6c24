//! Page and global template contexts.

use std::cmp::Reverse;
use std::fs;
use std::path::{Path, PathBuf};

use rocket_config::Config;
use rocket_meta::{FrontMatter, Map, Value, parse_data};
use rocket_renderer::{ParseOptions, Toc, parse_document};

use crate::error::SiteError;
use crate::paths::{PageKind, PageRef, SitePaths, output_path, site_url_path};

/// A loaded page: its source text and assembled context.
#[derive(Clone, Debug, PartialEq)]
pub struct Page {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub kind: PageKind,
    pub is_post: bool,
    /// Full source, front matter included.
    pub source: String,
    pub context: Map,
}

impl Page {
    /// Read the page at `page.path` and assemble its context.
    pub fn load(config: &Config, page: &PageRef) -> Result<Self, SiteError> {
        let source =
            fs::read_to_string(&page.path).map_err(|e| SiteError::io(&page.path, e))?;
        Self::from_source(config, page, source)
    }

    /// Assemble a page from already-read source.
    ///
    /// Context precedence, lowest first: configured defaults for the path,
    /// front matter, then the computed keys.
    pub fn from_source(config: &Config, page: &PageRef, source: String) -> Result<Self, SiteError> {
        let (front_matter, body) =
            FrontMatter::split(&source).map_err(|source| SiteError::Meta {
                path: page.path.clone(),
                source,
            })?;

        let mut context = config.defaults_for(&page.path).cloned().unwrap_or_default();
        context.extend(front_matter.into_values());

        let output = output_path(config, &page.path);
        insert_path(&mut context, "inputPath", &page.path);
        insert_path(&mut context, "absoluteOutputPath", &output);
        context.insert(
            "outputPath".to_owned(),
            Value::String(site_url_path(config, &output)),
        );
        if let Some(name) = page.path.file_name() {
            context.insert(
                "filename".to_owned(),
                Value::String(name.to_string_lossy().into_owned()),
            );
        }
        if let Some(stem) = page.path.file_stem() {
            context.insert(
                "filenameWithoutExtension".to_owned(),
                Value::String(stem.to_string_lossy().into_owned()),
            );
        }
        context.insert("isPost".to_owned(), Value::Boolean(page.is_post));
        if page.kind == PageKind::Markdown {
            context.insert("tableOfContents".to_owned(), table_of_contents(body));
        }

        Ok(Self {
            input_path: page.path.clone(),
            output_path: output,
            kind: page.kind,
            is_post: page.is_post,
            source,
            context,
        })
    }

    /// Page body with the front matter removed.
    #[must_use]
    pub fn body(&self) -> &str {
        rocket_meta::strip_front_matter(&self.source)
    }
}

fn insert_path(context: &mut Map, key: &str, path: &Path) {
    context.insert(key.to_owned(), Value::String(path.display().to_string()));
}

fn table_of_contents(body: &str) -> Value {
    let document = parse_document(body, ParseOptions::default());
    let entries = Toc::generate(&document)
        .entries
        .into_iter()
        .map(|entry| {
            let mut map = Map::new();
            map.insert("level".to_owned(), Value::Integer(i64::from(entry.level)));
            map.insert("id".to_owned(), Value::String(entry.id));
            map.insert("text".to_owned(), Value::String(entry.text));
            Value::Map(map)
        })
        .collect();
    Value::List(entries)
}

/// Build the context shared by every page: each data file's map under its
/// file stem, plus `posts` sorted newest first.
///
/// # Errors
///
/// Returns an error when a data file cannot be read or decoded, or when a
/// post has no `date` or a `date` that is not a date.
pub fn global_context(paths: &SitePaths, pages: &[Page]) -> Result<Map, SiteError> {
    let mut context = Map::new();

    for path in &paths.data_files {
        let Some(stem) = path.file_stem() else {
            continue;
        };
        let content = fs::read_to_string(path).map_err(|e| SiteError::io(path, e))?;
        let data = parse_data(path, &content).map_err(|source| SiteError::Meta {
            path: path.clone(),
            source,
        })?;
        let key = stem.to_string_lossy().into_owned();
        if context.insert(key, Value::Map(data)).is_some() {
            tracing::warn!(path = %path.display(), "Data file replaces another with the same name");
        }
    }

    context.insert("posts".to_owned(), Value::List(sorted_posts(pages)?));
    Ok(context)
}

fn sorted_posts(pages: &[Page]) -> Result<Vec<Value>, SiteError> {
    let mut posts = Vec::new();
    for page in pages.iter().filter(|page| page.is_post) {
        let date = match page.context.get("date") {
            None => {
                return Err(SiteError::MissingFrontMatter {
                    key: "date",
                    path: page.input_path.clone(),
                });
            }
            Some(Value::Date(date)) => *date,
            Some(other) => {
                return Err(SiteError::InvalidFrontMatterType {
                    key: "date",
                    expected: "date",
                    found: other.type_name(),
                    path: page.input_path.clone(),
                });
            }
        };
        posts.push((date, &page.context));
    }
    posts.sort_by_key(|(date, _)| Reverse(*date));
    Ok(posts
        .into_iter()
        .map(|(_, context)| Value::Map(context.clone()))
        .collect())
}
