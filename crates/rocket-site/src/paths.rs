//! Source discovery and output path mapping.
//!
//! The scanner walks the site root once and sorts every file it finds into
//! pages (`.md`, `.html`) and data files (`.json`, `.toml`, `.yaml`, `.yml`).
//! Hidden entries, the output, templates and includes directories, asset
//! directories and ignored paths are never visited.

use std::fs;
use std::path::{Component, Path, PathBuf};

use rocket_config::{CONFIG_FILE_STEM, Config};
use rocket_meta::DataFormat;

/// How a page body is turned into HTML.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageKind {
    /// Rendered as a template, then converted from Markdown.
    Markdown,
    /// Rendered as a template only.
    Html,
}

impl PageKind {
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "md" | "markdown" => Some(Self::Markdown),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }
}

/// A page source found by the scanner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageRef {
    pub path: PathBuf,
    pub kind: PageKind,
    /// Whether the page lives under the posts directory.
    pub is_post: bool,
}

/// Everything the scanner found, sorted by path.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SitePaths {
    pub pages: Vec<PageRef>,
    pub data_files: Vec<PathBuf>,
}

impl SitePaths {
    pub fn posts(&self) -> impl Iterator<Item = &PageRef> {
        self.pages.iter().filter(|page| page.is_post)
    }
}

/// Walks the site root and classifies files.
pub struct Scanner<'a> {
    config: &'a Config,
    excluded: Vec<&'a Path>,
}

impl<'a> Scanner<'a> {
    pub fn new(config: &'a Config) -> Self {
        let mut excluded = vec![
            config.output_path.as_path(),
            config.templates_path.as_path(),
            config.includes_path.as_path(),
        ];
        excluded.extend(config.assets_paths.iter().map(PathBuf::as_path));
        excluded.extend(config.ignored_paths.iter().map(PathBuf::as_path));
        Self { config, excluded }
    }

    /// Scan the site root. A missing root yields nothing.
    pub fn scan(&self) -> SitePaths {
        let mut paths = SitePaths::default();
        self.scan_directory(&self.config.root, &mut paths);
        paths.pages.sort_by(|a, b| a.path.cmp(&b.path));
        paths.data_files.sort();
        paths
    }

    fn scan_directory(&self, dir_path: &Path, paths: &mut SitePaths) {
        let Ok(entries) = fs::read_dir(dir_path) else {
            return;
        };

        for entry in entries.filter_map(Result::ok) {
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }
            let path = entry.path();
            if self.is_excluded(&path) {
                continue;
            }

            if entry.file_type().is_ok_and(|t| t.is_dir()) {
                self.scan_directory(&path, paths);
            } else if let Some(kind) = PageKind::from_path(&path) {
                let is_post = path.starts_with(&self.config.posts_path);
                paths.pages.push(PageRef {
                    path,
                    kind,
                    is_post,
                });
            } else if DataFormat::from_path(&path).is_some()
                && !path.starts_with(&self.config.posts_path)
                && !self.is_config_file(&path)
            {
                paths.data_files.push(path);
            }
        }
    }

    fn is_excluded(&self, path: &Path) -> bool {
        self.excluded.iter().any(|excluded| path.starts_with(excluded))
    }

    fn is_config_file(&self, path: &Path) -> bool {
        if self.config.config_path.as_deref() == Some(path) {
            return true;
        }
        path.parent() == Some(self.config.root.as_path())
            && path.file_stem().is_some_and(|stem| stem == CONFIG_FILE_STEM)
    }
}

/// Where the page at `input` is written: its site-relative path under the
/// output directory, with the extension replaced by `.html`.
#[must_use]
pub fn output_path(config: &Config, input: &Path) -> PathBuf {
    let relative = match input.strip_prefix(&config.root) {
        Ok(relative) => relative,
        Err(_) => input.file_name().map_or(input, Path::new),
    };
    config.output_path.join(relative).with_extension("html")
}

/// URL path of an output file relative to the output directory, with a
/// leading `/` (e.g. `/posts/hello.html`).
#[must_use]
pub fn site_url_path(config: &Config, output: &Path) -> String {
    let relative = output.strip_prefix(&config.output_path).unwrap_or(output);
    let mut url = String::new();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            url.push('/');
            url.push_str(&part.to_string_lossy());
        }
    }
    if url.is_empty() {
        url.push('/');
    }
    url
}
