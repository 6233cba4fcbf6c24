//! Template environment shared by every page of a build.
//!
//! Templates are looked up in the templates directory, then the includes
//! directory. Besides minijinja's builtins the environment provides:
//!
//! - `site_url` filter: prefixes a path with the configured base URL
//! - `append` / `prepend` filters: string concatenation
//! - `date(format)` filter: strftime formatting of date values
//! - `table_of_contents()`: nested `<ul>` for the current page's headings
//! - `seo_tags()`: SEO `<head>` tags from the `page` and `seo` variables

use std::fmt::Write;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use minijinja::value::Rest;
use minijinja::{AutoEscape, Environment, Error, ErrorKind, State, Value};
use rocket_config::Config;
use rocket_meta::parse_date;
use rocket_renderer::{Toc, TocEntry, render_toc_html};

use crate::seo;

/// Default format of the `date` filter.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A configured minijinja environment, shared by reference across threads.
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    /// Build the environment for `config`.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_auto_escape_callback(|_| AutoEscape::None);

        let search_dirs = vec![config.templates_path.clone(), config.includes_path.clone()];
        env.set_loader(move |name| load_template(&search_dirs, name));

        let base_url = config.base_url.clone();
        env.add_filter("site_url", move |value: Value| site_url(&base_url, &value));
        env.add_filter("append", append);
        env.add_filter("prepend", prepend);
        env.add_filter("date", date);

        env.add_function("table_of_contents", table_of_contents);
        env.add_function("seo_tags", seo_tags);

        Self { env }
    }

    /// Render `source` as an anonymous template.
    pub fn render_str(&self, source: &str, context: &Value) -> Result<String, Error> {
        self.env.render_str(source, context)
    }
}

fn load_template(search_dirs: &[PathBuf], name: &str) -> Result<Option<String>, Error> {
    let relative = Path::new(name);
    if relative
        .components()
        .any(|component| !matches!(component, Component::Normal(_)))
    {
        return Ok(None);
    }

    for dir in search_dirs {
        let path = dir.join(relative);
        match fs::read_to_string(&path) {
            Ok(source) => return Ok(Some(source)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(Error::new(
                    ErrorKind::InvalidOperation,
                    format!("could not read template {}", path.display()),
                )
                .with_source(e));
            }
        }
    }
    Ok(None)
}

fn site_url(base_url: &str, value: &Value) -> Value {
    match value.as_str() {
        Some(path) => Value::from(format!("{base_url}/{}", path.trim_start_matches('/'))),
        None => value.clone(),
    }
}

fn append(value: Value, suffixes: Rest<Value>) -> Value {
    let Some(text) = value.as_str() else {
        return value;
    };
    let mut out = text.to_owned();
    for suffix in suffixes.iter().filter_map(Value::as_str) {
        out.push_str(suffix);
    }
    Value::from(out)
}

fn prepend(value: Value, prefixes: Rest<Value>) -> Value {
    let Some(text) = value.as_str() else {
        return value;
    };
    let mut out: String = prefixes.iter().filter_map(Value::as_str).collect();
    out.push_str(text);
    Value::from(out)
}

fn date(value: Value, format: Option<String>) -> Result<Value, Error> {
    let Some(date) = value.as_str().and_then(parse_date) else {
        return Ok(value);
    };
    let format = format.as_deref().unwrap_or(DEFAULT_DATE_FORMAT);
    let mut out = String::new();
    write!(out, "{}", date.format(format)).map_err(|_| {
        Error::new(
            ErrorKind::InvalidOperation,
            format!("invalid date format {format:?}"),
        )
    })?;
    Ok(Value::from(out))
}

/// Look up `name` in the render context as plain data.
fn lookup_json(state: &State, name: &str) -> Result<Option<serde_json::Value>, Error> {
    let Some(value) = state.lookup(name) else {
        return Ok(None);
    };
    if value.is_undefined() || value.is_none() {
        return Ok(None);
    }
    serde_json::to_value(&value).map(Some).map_err(|e| {
        Error::new(
            ErrorKind::InvalidOperation,
            format!("could not read {name} from context"),
        )
        .with_source(e)
    })
}

fn table_of_contents(state: &State) -> Result<Value, Error> {
    let Some(page) = lookup_json(state, "page")? else {
        return Ok(Value::from(""));
    };
    let Some(entries) = page.get("tableOfContents") else {
        return Ok(Value::from(""));
    };
    let entries: Vec<TocEntry> = serde_json::from_value(entries.clone()).map_err(|e| {
        Error::new(ErrorKind::InvalidOperation, "malformed tableOfContents").with_source(e)
    })?;
    let toc = Toc { entries };
    Ok(Value::from_safe_string(render_toc_html(&toc.trees())))
}

/// SEO tags from the `page` and `seo` maps of the render context.
fn seo_tags(state: &State) -> Result<Value, Error> {
    let page = lookup_json(state, "page")?
        .and_then(rocket_meta::Value::from_json)
        .and_then(|page| match page {
            rocket_meta::Value::Map(map) => Some(map),
            _ => None,
        })
        .unwrap_or_default();
    let source = match lookup_json(state, "seo")?.and_then(rocket_meta::Value::from_json) {
        Some(rocket_meta::Value::Map(map)) => Some(map),
        _ => None,
    };
    Ok(Value::from_safe_string(seo::generate(&page, source.as_ref())))
}
