//! Structured data files (`.toml`, `.json`, `.yaml`, `.yml`).

use std::path::Path;

use crate::error::MetaError;
use crate::value::{Map, Value, map_from_toml};

/// Format of a data file, derived from its extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataFormat {
    Toml,
    Json,
    Yaml,
}

impl DataFormat {
    /// Format for `path`'s extension (case-insensitive), if it is a data file.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }

    /// Decode `content`, which must have a map at the top level.
    pub fn parse(self, content: &str) -> Result<Map, MetaError> {
        let value = match self {
            Self::Toml => return Ok(map_from_toml(toml::from_str(content)?)),
            Self::Json => Value::from_json(serde_json::from_str(content)?),
            Self::Yaml => Value::from_yaml(serde_yaml::from_str(content)?),
        };
        match value {
            Some(Value::Map(map)) => Ok(map),
            None => Err(MetaError::NotAMap("null")),
            Some(other) => Err(MetaError::NotAMap(other.type_name())),
        }
    }
}

/// Decode a data file, choosing the format from the path's extension.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use rocket_meta::{Value, parse_data};
///
/// let map = parse_data(Path::new("site.json"), r#"{"name": "Rocket"}"#).unwrap();
/// assert_eq!(map["name"], Value::from("Rocket"));
/// ```
pub fn parse_data(path: &Path, content: &str) -> Result<Map, MetaError> {
    let format = DataFormat::from_path(path).ok_or_else(|| {
        MetaError::UnsupportedFormat(
            path.extension()
                .map(|extension| extension.to_string_lossy().into_owned())
                .unwrap_or_default(),
        )
    })?;
    format.parse(content)
}
