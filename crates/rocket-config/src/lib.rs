//! Configuration management for Rocket.
//!
//! A site is configured by `rocket.toml`, `rocket.json`, `rocket.yaml` or
//! `rocket.yml`, discovered in the current directory or its parents. The
//! directory holding the file is the site root; every configured path is
//! resolved against it.
//!
//! Keys use camelCase:
//!
//! | key | default |
//! |---|---|
//! | `postsPath` | `posts` |
//! | `templatesPath` | `templates` |
//! | `includesPath` | `includes` |
//! | `outputPath` | `dist` |
//! | `assetsPaths` | `["assets"]` |
//! | `ignoredPaths` | `[]` |
//! | `baseURL` | `""` |
//! | `defaults` | `[]` |
//!
//! Any other key is kept in [`Config::user_properties`] for templates.
//!
//! ## Environment Variable Expansion
//!
//! `baseURL` supports `${VAR}` (errors if unset) and `${VAR:-default}`.
//!
//! CLI settings can be applied during load via [`CliSettings`].

mod expand;

use std::path::{Path, PathBuf};

use rocket_meta::{DataFormat, Map, MetaError, Value};

/// CLI settings that override configuration file values.
///
/// Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override output directory.
    pub output_dir: Option<PathBuf>,
    /// Override base URL.
    pub base_url: Option<String>,
}

/// File stem shared by all configuration file names.
pub const CONFIG_FILE_STEM: &str = "rocket";

/// Configuration filenames to search for, in order of preference.
const CONFIG_FILENAMES: [&str; 4] = ["rocket.toml", "rocket.json", "rocket.yaml", "rocket.yml"];

/// Default front matter for pages under a directory.
#[derive(Clone, Debug, PartialEq)]
pub struct Defaults {
    /// Directory the defaults apply to (resolved).
    pub path: PathBuf,
    /// Front matter values applied before the page's own.
    pub values: Map,
}

/// Site configuration with resolved paths.
#[derive(Debug, PartialEq)]
pub struct Config {
    /// Site root: the directory containing the config file.
    pub root: PathBuf,
    /// Directory holding posts.
    pub posts_path: PathBuf,
    /// Directory searched first for templates.
    pub templates_path: PathBuf,
    /// Directory searched after the templates directory.
    pub includes_path: PathBuf,
    /// Directory the site is written to.
    pub output_path: PathBuf,
    /// Files or directories copied verbatim into the output.
    pub assets_paths: Vec<PathBuf>,
    /// Files or directories excluded from processing.
    pub ignored_paths: Vec<PathBuf>,
    /// Base URL without trailing slash.
    pub base_url: String,
    /// Per-directory default front matter, first match wins.
    pub defaults: Vec<Defaults>,
    /// Every key that is not a known setting.
    pub user_properties: Map,
    /// Path to the config file (set after loading).
    pub config_path: Option<PathBuf>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The file could not be decoded.
    #[error("Configuration parse error: {0}")]
    Parse(#[from] MetaError),
    /// The file extension is not a supported format.
    #[error("Found a configuration file in {0:?} format, which is not supported")]
    UnsupportedFormat(String),
    /// A known key holds a value of the wrong type.
    #[error("Configuration key {key} must be {expected}, found {found}")]
    InvalidType {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field (e.g., "`baseURL`").
        field: String,
        /// Error message (e.g., "${`SITE_URL`}: environment variable not found").
        message: String,
    },
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise searches
    /// the current directory and its parents, falling back to defaults rooted
    /// at the current directory.
    ///
    /// CLI settings are applied after loading and path resolution.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// the result is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = std::env::current_dir()
            .ok()
            .and_then(|cwd| discover_config(&cwd))
        {
            Self::load_from_file(&discovered)?
        } else {
            tracing::debug!("No configuration file found, using defaults");
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }
        config.validate()?;

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(output_dir) = &settings.output_dir {
            self.output_path = self.root.join(output_dir);
        }
        if let Some(base_url) = &settings.base_url {
            self.base_url = trim_base_url(base_url.clone());
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    #[must_use]
    pub fn default_with_base(base: &Path) -> Self {
        Self {
            root: base.to_path_buf(),
            posts_path: base.join("posts"),
            templates_path: base.join("templates"),
            includes_path: base.join("includes"),
            output_path: base.join("dist"),
            assets_paths: vec![base.join("assets")],
            ignored_paths: Vec::new(),
            base_url: String::new(),
            defaults: Vec::new(),
            user_properties: Map::new(),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let format = DataFormat::from_path(path).ok_or_else(|| {
            ConfigError::UnsupportedFormat(
                path.extension()
                    .map(|extension| extension.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            )
        })?;
        let content = std::fs::read_to_string(path)?;
        let map = if content.trim().is_empty() {
            Map::new()
        } else {
            format.parse(&content)?
        };

        let root = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut config = Self::from_map(map, root)?;
        config.config_path = Some(path.to_path_buf());

        tracing::info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Build a configuration from decoded key/value pairs rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns an error when a known key has the wrong type or `baseURL`
    /// references an unset environment variable.
    pub fn from_map(mut map: Map, root: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default_with_base(root);

        if let Some(path) = take_string(&mut map, "postsPath")? {
            config.posts_path = root.join(path);
        }
        if let Some(path) = take_string(&mut map, "templatesPath")? {
            config.templates_path = root.join(path);
        }
        if let Some(path) = take_string(&mut map, "includesPath")? {
            config.includes_path = root.join(path);
        }
        if let Some(path) = take_string(&mut map, "outputPath")? {
            config.output_path = root.join(path);
        }
        if let Some(paths) = take_string_list(&mut map, "assetsPaths")? {
            config.assets_paths = paths.iter().map(|path| root.join(path)).collect();
        }
        if let Some(paths) = take_string_list(&mut map, "ignoredPaths")? {
            config.ignored_paths = paths.iter().map(|path| root.join(path)).collect();
        }
        if let Some(base_url) = take_string(&mut map, "baseURL")? {
            config.base_url = trim_base_url(expand::expand_env(&base_url, "baseURL")?);
        }
        if let Some(defaults) = map.remove("defaults") {
            config.defaults = parse_defaults(defaults, root)?;
        }

        config.user_properties = map;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the output directory is the site root.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output_path == self.root {
            return Err(ConfigError::Validation(
                "outputPath cannot be the site root".to_owned(),
            ));
        }
        Ok(())
    }

    /// Default front matter for the page at `path`.
    ///
    /// Returns the values of the first [`Defaults`] entry whose directory
    /// contains the page.
    #[must_use]
    pub fn defaults_for(&self, path: &Path) -> Option<&Map> {
        self.defaults
            .iter()
            .find(|defaults| path.starts_with(&defaults.path))
            .map(|defaults| &defaults.values)
    }

    /// A user property by key, e.g. `seo`.
    #[must_use]
    pub fn user_property(&self, key: &str) -> Option<&Value> {
        self.user_properties.get(key)
    }
}

/// Search for a config file in `start` and its parents.
#[must_use]
pub fn discover_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        for filename in CONFIG_FILENAMES {
            let candidate = current.join(filename);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        if !current.pop() {
            return None;
        }
    }
}

fn trim_base_url(mut base_url: String) -> String {
    if base_url.ends_with('/') {
        base_url.pop();
    }
    base_url
}

fn invalid_type(key: &str, expected: &'static str, found: &Value) -> ConfigError {
    ConfigError::InvalidType {
        key: key.to_owned(),
        expected,
        found: found.type_name(),
    }
}

fn take_string(map: &mut Map, key: &str) -> Result<Option<String>, ConfigError> {
    match map.remove(key) {
        None => Ok(None),
        Some(Value::String(value)) => Ok(Some(value)),
        Some(other) => Err(invalid_type(key, "a string", &other)),
    }
}

fn take_string_list(map: &mut Map, key: &str) -> Result<Option<Vec<String>>, ConfigError> {
    let Some(value) = map.remove(key) else {
        return Ok(None);
    };
    let Value::List(values) = value else {
        return Err(invalid_type(key, "a list of strings", &value));
    };
    values
        .into_iter()
        .map(|value| match value {
            Value::String(text) => Ok(text),
            other => Err(invalid_type(key, "a list of strings", &other)),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

fn parse_defaults(value: Value, root: &Path) -> Result<Vec<Defaults>, ConfigError> {
    const EXPECTED: &str = "a list of {path, values} maps";
    let Value::List(entries) = value else {
        return Err(invalid_type("defaults", EXPECTED, &value));
    };
    entries
        .into_iter()
        .map(|entry| {
            let Value::Map(mut entry) = entry else {
                return Err(invalid_type("defaults", EXPECTED, &entry));
            };
            let path = take_string(&mut entry, "path")
                .map_err(|_| ConfigError::Validation("defaults.path must be a string".to_owned()))?
                .ok_or_else(|| ConfigError::Validation("defaults entry requires path".to_owned()))?;
            let values = match entry.remove("values") {
                Some(Value::Map(values)) => values,
                None => Map::new(),
                Some(other) => return Err(invalid_type("defaults.values", "a map", &other)),
            };
            Ok(Defaults {
                path: root.join(path),
                values,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse_toml(content: &str, root: &Path) -> Result<Config, ConfigError> {
        Config::from_map(DataFormat::Toml.parse(content)?, root)
    }

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/site"));
        assert_eq!(config.posts_path, PathBuf::from("/site/posts"));
        assert_eq!(config.templates_path, PathBuf::from("/site/templates"));
        assert_eq!(config.includes_path, PathBuf::from("/site/includes"));
        assert_eq!(config.output_path, PathBuf::from("/site/dist"));
        assert_eq!(config.assets_paths, vec![PathBuf::from("/site/assets")]);
        assert!(config.ignored_paths.is_empty());
        assert_eq!(config.base_url, "");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = parse_toml("", Path::new("/site")).unwrap();
        assert_eq!(config, Config::default_with_base(Path::new("/site")));
    }

    #[test]
    fn test_parse_all_keys() {
        let config = parse_toml(
            r#"
postsPath = "blog"
templatesPath = "layouts"
includesPath = "partials"
outputPath = "public"
assetsPaths = ["static", "favicon.ico"]
ignoredPaths = ["drafts"]
baseURL = "https://example.com/"
"#,
            Path::new("/site"),
        )
        .unwrap();
        assert_eq!(config.posts_path, PathBuf::from("/site/blog"));
        assert_eq!(config.templates_path, PathBuf::from("/site/layouts"));
        assert_eq!(config.includes_path, PathBuf::from("/site/partials"));
        assert_eq!(config.output_path, PathBuf::from("/site/public"));
        assert_eq!(
            config.assets_paths,
            vec![
                PathBuf::from("/site/static"),
                PathBuf::from("/site/favicon.ico")
            ]
        );
        assert_eq!(config.ignored_paths, vec![PathBuf::from("/site/drafts")]);
        assert_eq!(config.base_url, "https://example.com");
        assert!(config.user_properties.is_empty());
    }

    #[test]
    fn test_only_one_trailing_slash_removed() {
        let config = parse_toml(r#"baseURL = "https://x.dev//""#, Path::new("/s")).unwrap();
        assert_eq!(config.base_url, "https://x.dev/");
    }

    #[test]
    fn test_unknown_keys_become_user_properties() {
        let config = parse_toml(
            r#"
[seo]
title = "My Site"
siteURL = "https://example.com"
"#,
            Path::new("/site"),
        )
        .unwrap();
        let seo = config.user_property("seo").unwrap();
        assert_eq!(seo.get("title"), Some(&Value::from("My Site")));
    }

    #[test]
    fn test_wrong_type_for_known_key() {
        let err = parse_toml("postsPath = 3", Path::new("/site")).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidType {
                expected: "a string",
                found: "number",
                ..
            }
        ));
        assert!(err.to_string().contains("postsPath"));

        let err = parse_toml("assetsPaths = [\"a\", 1]", Path::new("/site")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidType { .. }));
    }

    #[test]
    fn test_defaults_first_match_wins() {
        let config = parse_toml(
            r#"
[[defaults]]
path = "posts"
values = { layout = "post" }

[[defaults]]
path = ""
values = { layout = "page" }
"#,
            Path::new("/site"),
        )
        .unwrap();
        assert_eq!(
            config
                .defaults_for(Path::new("/site/posts/hello.md"))
                .and_then(|values| values.get("layout")),
            Some(&Value::from("post"))
        );
        assert_eq!(
            config
                .defaults_for(Path::new("/site/about.md"))
                .and_then(|values| values.get("layout")),
            Some(&Value::from("page"))
        );
        assert!(config.defaults_for(Path::new("/elsewhere/x.md")).is_none());
    }

    #[test]
    fn test_defaults_match_whole_components() {
        let config = parse_toml(
            "[[defaults]]\npath = \"posts\"\nvalues = { layout = \"post\" }\n",
            Path::new("/site"),
        )
        .unwrap();
        assert!(config.defaults_for(Path::new("/site/posts-old/a.md")).is_none());
    }

    #[test]
    fn test_defaults_require_path() {
        let err = parse_toml("[[defaults]]\nvalues = {}\n", Path::new("/site")).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_expand_env_vars_base_url() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("ROCKET_TEST_BASE_URL", "https://env.example.com/");
        }
        let config = parse_toml(r#"baseURL = "${ROCKET_TEST_BASE_URL}""#, Path::new("/s")).unwrap();
        assert_eq!(config.base_url, "https://env.example.com");
        unsafe {
            std::env::remove_var("ROCKET_TEST_BASE_URL");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MISSING_VAR_ROCKET_TEST");
        }
        let err = parse_toml(r#"baseURL = "${MISSING_VAR_ROCKET_TEST}""#, Path::new("/s")).unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("MISSING_VAR_ROCKET_TEST"));
    }

    #[test]
    fn test_validate_output_is_root() {
        let err = parse_toml(r#"outputPath = ".""#, Path::new("/site"))
            .unwrap()
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("outputPath"));
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default_with_base(Path::new("/site"));
        config.apply_cli_settings(&CliSettings {
            output_dir: Some(PathBuf::from("out")),
            base_url: Some("https://cli.dev/".to_owned()),
        });
        assert_eq!(config.output_path, PathBuf::from("/site/out"));
        assert_eq!(config.base_url, "https://cli.dev");
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default_with_base(Path::new("/site"));
        config.apply_cli_settings(&CliSettings::default());
        assert_eq!(config, Config::default_with_base(Path::new("/site")));
    }

    #[test]
    fn test_load_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rocket.yaml");
        std::fs::write(&path, "outputPath: site\nauthor: Sam\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.root, dir.path());
        assert_eq!(config.output_path, dir.path().join("site"));
        assert_eq!(config.config_path, Some(path));
        assert_eq!(config.user_property("author"), Some(&Value::from("Sam")));
    }

    #[test]
    fn test_load_json_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rocket.json");
        std::fs::write(&path, r#"{"postsPath": "articles"}"#).unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.posts_path, dir.path().join("articles"));
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let err = Config::load(Some(Path::new("/nonexistent/rocket.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_unsupported_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rocket.ini");
        std::fs::write(&path, "a=b").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(ref ext) if ext == "ini"));
    }

    #[test]
    fn test_load_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rocket.toml");
        std::fs::write(&path, "postsPath = ").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(MetaError::Toml(_))));
    }

    #[test]
    fn test_load_applies_cli_settings_after_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rocket.toml");
        std::fs::write(&path, "outputPath = \"public\"\nbaseURL = \"https://a.dev\"\n").unwrap();

        let settings = CliSettings {
            output_dir: Some(PathBuf::from("preview")),
            base_url: None,
        };
        let config = Config::load(Some(&path), Some(&settings)).unwrap();
        assert_eq!(config.output_path, dir.path().join("preview"));
        assert_eq!(config.base_url, "https://a.dev");
    }

    #[test]
    fn test_discover_config_in_ancestor() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join("rocket.yml"), "").unwrap();

        assert_eq!(discover_config(&nested), Some(dir.path().join("rocket.yml")));
    }

    #[test]
    fn test_discover_prefers_toml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("rocket.json"), "{}").unwrap();
        std::fs::write(dir.path().join("rocket.toml"), "").unwrap();

        assert_eq!(
            discover_config(dir.path()),
            Some(dir.path().join("rocket.toml"))
        );
    }
}
