//! The build pipeline: scan, assemble contexts, copy assets, render pages.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use rocket_config::Config;
use rocket_meta::{Map, Value};

use crate::context::{Page, global_context};
use crate::error::SiteError;
use crate::paths::{PageKind, Scanner};
use crate::templates::Templates;

/// Block filled by a page body when its layout names none.
pub const DEFAULT_LAYOUT_BLOCK: &str = "content";

/// Counts reported after a successful build.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub pages_written: usize,
    pub assets_copied: usize,
    pub assets_skipped: usize,
}

/// Builds a site into its output directory.
pub struct SiteBuilder {
    config: Config,
}

impl SiteBuilder {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the whole build.
    ///
    /// Pages are loaded and rendered in parallel. Any failing page fails the
    /// build.
    pub fn build(&self) -> Result<BuildReport, SiteError> {
        let paths = Scanner::new(&self.config).scan();
        tracing::debug!(
            pages = paths.pages.len(),
            data_files = paths.data_files.len(),
            "Scanned site"
        );

        let pages = paths
            .pages
            .par_iter()
            .map(|page| Page::load(&self.config, page))
            .collect::<Result<Vec<_>, _>>()?;

        let mut globals = global_context(&paths, &pages)?;
        if !globals.contains_key("seo")
            && let Some(seo) = self.config.user_property("seo")
        {
            globals.insert("seo".to_owned(), seo.clone());
        }

        let mut report = BuildReport::default();
        for asset in &self.config.assets_paths {
            self.copy_assets(asset, &mut report)?;
        }

        let templates = Templates::new(&self.config);
        pages.par_iter().try_for_each(|page| {
            let html = render_page(&templates, &globals, page)?;
            write_page(page, &html)
        })?;
        report.pages_written = pages.len();

        tracing::info!(
            pages = report.pages_written,
            assets_copied = report.assets_copied,
            assets_skipped = report.assets_skipped,
            output = %self.config.output_path.display(),
            "Site built"
        );
        Ok(report)
    }

    /// Copy a file or directory tree of assets into the output directory.
    fn copy_assets(&self, source: &Path, report: &mut BuildReport) -> Result<(), SiteError> {
        let metadata = match fs::metadata(source) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %source.display(), "Assets path not found, skipping");
                return Ok(());
            }
            Err(e) => return Err(SiteError::io(source, e)),
        };

        if metadata.is_dir() {
            let entries = fs::read_dir(source).map_err(|e| SiteError::io(source, e))?;
            for entry in entries {
                let entry = entry.map_err(|e| SiteError::io(source, e))?;
                self.copy_assets(&entry.path(), report)?;
            }
            return Ok(());
        }

        let destination = self.asset_destination(source);
        if is_up_to_date(source, &destination) {
            report.assets_skipped += 1;
            return Ok(());
        }
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(|e| SiteError::io(parent, e))?;
        }
        fs::copy(source, &destination).map_err(|e| SiteError::io(&destination, e))?;
        tracing::debug!(path = %destination.display(), "Copied asset");
        report.assets_copied += 1;
        Ok(())
    }

    fn asset_destination(&self, source: &Path) -> PathBuf {
        let relative = match source.strip_prefix(&self.config.root) {
            Ok(relative) => relative,
            Err(_) => source.file_name().map_or(source, Path::new),
        };
        self.config.output_path.join(relative)
    }
}

/// Whether `destination` exists and is newer than `source`.
fn is_up_to_date(source: &Path, destination: &Path) -> bool {
    let modified = |path: &Path| fs::metadata(path).and_then(|m| m.modified()).ok();
    match (modified(source), modified(destination)) {
        (Some(source), Some(destination)) => destination > source,
        _ => false,
    }
}

/// Render one page to its final HTML.
fn render_page(templates: &Templates, globals: &Map, page: &Page) -> Result<String, SiteError> {
    let template_error = |source| SiteError::Template {
        path: page.input_path.clone(),
        source,
    };

    let mut context = globals.clone();
    context.insert("page".to_owned(), Value::Map(page.context.clone()));

    let body = templates
        .render_str(page.body(), &minijinja::Value::from_serialize(&context))
        .map_err(template_error)?;
    let content = match page.kind {
        PageKind::Markdown => rocket_renderer::convert(&body),
        PageKind::Html => body,
    };

    let Some(layout) = page.context.get("layout").and_then(Value::as_str) else {
        return Ok(content);
    };
    let block = page
        .context
        .get("layoutBlockName")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_LAYOUT_BLOCK);
    let wrapper = layout_wrapper(layout, block);

    context.insert("content".to_owned(), Value::String(content));
    templates
        .render_str(&wrapper, &minijinja::Value::from_serialize(&context))
        .map_err(template_error)
}

/// A template extending `layout` that places `content` in `block`.
fn layout_wrapper(layout: &str, block: &str) -> String {
    let layout = if Path::new(layout).extension().is_some() {
        layout.to_owned()
    } else {
        format!("{layout}.html")
    };
    format!("{{% extends {layout:?} %}}{{% block {block} %}}{{{{ content }}}}{{% endblock %}}")
}

fn write_page(page: &Page, html: &str) -> Result<(), SiteError> {
    if let Some(parent) = page.output_path.parent() {
        fs::create_dir_all(parent).map_err(|e| SiteError::io(parent, e))?;
    }
    fs::write(&page.output_path, html).map_err(|e| SiteError::io(&page.output_path, e))?;
    tracing::info!(path = %page.input_path.display(), "Processed page");
    Ok(())
}
