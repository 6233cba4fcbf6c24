use std::path::PathBuf;

use rocket_meta::MetaError;

/// Error returned while assembling or writing the site.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// I/O error on a specific file.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Front matter or data file could not be decoded.
    #[error("Invalid metadata in {}: {source}", path.display())]
    Meta {
        path: PathBuf,
        #[source]
        source: MetaError,
    },
    /// Template failed to load or render.
    #[error("Template error in {}: {source:#}", path.display())]
    Template {
        path: PathBuf,
        #[source]
        source: minijinja::Error,
    },
    /// A required front matter key is absent.
    #[error("Missing front matter key {key:?} in {}", path.display())]
    MissingFrontMatter { key: &'static str, path: PathBuf },
    /// A front matter key holds a value of the wrong type.
    #[error("Front matter key {key:?} in {} must be a {expected}, found {found}", path.display())]
    InvalidFrontMatterType {
        key: &'static str,
        expected: &'static str,
        found: &'static str,
        path: PathBuf,
    },
}

impl SiteError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
