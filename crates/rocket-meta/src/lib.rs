//! Metadata values for Rocket sites.
//!
//! Pages carry front matter (`+++` TOML or `---` YAML) and sites carry data
//! files (TOML, JSON or YAML). Both decode into the closed [`Value`] type so the
//! rest of the generator never sees format-specific values.

mod data;
mod error;
mod frontmatter;
mod value;

pub use data::{DataFormat, parse_data};
pub use error::MetaError;
pub use frontmatter::{FrontMatter, strip_front_matter};
pub use value::{Map, Value, parse_date};
