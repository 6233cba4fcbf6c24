//! Front matter blocks at the top of pages.
//!
//! ```text
//! +++
//! title = "Hello"
//! +++
//! Body text
//! ```
//!
//! A block fenced by `+++` lines is TOML; one fenced by `---` lines is YAML.
//! Fences must be whole lines and the opening fence must be the first line.

use crate::error::MetaError;
use crate::value::{Map, Value, map_from_toml};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Fence {
    Toml,
    Yaml,
}

impl Fence {
    fn marker(self) -> &'static str {
        match self {
            Self::Toml => "+++",
            Self::Yaml => "---",
        }
    }
}

/// A located front matter block: its fence, raw content and the page body.
struct Block<'a> {
    fence: Fence,
    content: &'a str,
    body: &'a str,
}

fn locate(text: &str) -> Option<Block<'_>> {
    let (first, mut rest) = split_line(text)?;
    let fence = [Fence::Toml, Fence::Yaml]
        .into_iter()
        .find(|fence| first == fence.marker())?;

    let content_start = text.len() - rest.len();
    loop {
        let line_start = text.len() - rest.len();
        let (line, remainder) = split_line(rest)?;
        if line == fence.marker() {
            return Some(Block {
                fence,
                content: &text[content_start..line_start],
                body: remainder,
            });
        }
        rest = remainder;
    }
}

/// Split off the first line, without its terminator. `None` at end of input.
fn split_line(text: &str) -> Option<(&str, &str)> {
    if text.is_empty() {
        return None;
    }
    let (line, rest) = match text.find('\n') {
        Some(index) => (&text[..index], &text[index + 1..]),
        None => (text, ""),
    };
    Some((line.strip_suffix('\r').unwrap_or(line), rest))
}

/// Decoded front matter of a page.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrontMatter {
    values: Map,
}

impl FrontMatter {
    /// Decode the front matter of `text`. Pages without a block yield an empty map.
    ///
    /// # Examples
    ///
    /// ```
    /// use rocket_meta::{FrontMatter, Value};
    ///
    /// let front_matter = FrontMatter::parse("+++\nlayout = \"post\"\n+++\n# Hi").unwrap();
    /// assert_eq!(front_matter.get("layout"), Some(&Value::from("post")));
    /// ```
    pub fn parse(text: &str) -> Result<Self, MetaError> {
        Self::split(text).map(|(front_matter, _)| front_matter)
    }

    /// Decode the front matter and return it along with the body after it.
    pub fn split(text: &str) -> Result<(Self, &str), MetaError> {
        let Some(block) = locate(text) else {
            return Ok((Self::default(), text));
        };
        let values = match block.fence {
            Fence::Toml => map_from_toml(toml::from_str(block.content)?),
            Fence::Yaml => {
                let yaml: serde_yaml::Value = serde_yaml::from_str(block.content)?;
                match Value::from_yaml(yaml) {
                    None => Map::new(),
                    Some(Value::Map(map)) => map,
                    Some(other) => return Err(MetaError::NotAMap(other.type_name())),
                }
            }
        };
        Ok((Self { values }, block.body))
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn values(&self) -> &Map {
        &self.values
    }

    #[must_use]
    pub fn into_values(self) -> Map {
        self.values
    }
}

/// The page body with any front matter block removed.
///
/// The block is removed even when its content would not decode.
#[must_use]
pub fn strip_front_matter(text: &str) -> &str {
    locate(text).map_or(text, |block| block.body)
}
