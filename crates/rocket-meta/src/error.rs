/// Error returned when metadata cannot be decoded.
#[derive(Debug, thiserror::Error)]
pub enum MetaError {
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// The document parsed, but its top level is not a key/value map.
    #[error("Expected a map at the top level, found {0}")]
    NotAMap(&'static str),
    /// File extension without a known data format.
    #[error("Unsupported data format: {0:?}")]
    UnsupportedFormat(String),
}
