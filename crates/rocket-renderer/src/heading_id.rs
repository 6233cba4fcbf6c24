//! Heading anchor ids.

use std::collections::HashSet;

/// Maximum number of increments tried before a colliding id is accepted as is.
const MAX_DEDUP_ATTEMPTS: usize = 10;

/// Generates URL-safe, de-duplicated heading ids.
///
/// Remembers every id it has returned, so one instance must be used for exactly
/// one document render and then dropped.
///
/// # Examples
///
/// ```
/// use rocket_renderer::HeadingIdGenerator;
///
/// let mut ids = HeadingIdGenerator::new();
/// assert_eq!(ids.generate("Getting Started"), "getting-started");
/// assert_eq!(ids.generate("Getting Started"), "getting-started-2");
/// ```
#[derive(Debug, Default)]
pub struct HeadingIdGenerator {
    issued: HashSet<String>,
}

impl HeadingIdGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce the id for a heading with the given text.
    ///
    /// Keeps ASCII letters, digits and whitespace, trims, turns each space into
    /// `-` and lowercases. A repeated id is bumped by incrementing a trailing
    /// digit or appending `-2`, up to ten times.
    pub fn generate(&mut self, text: &str) -> String {
        let filtered: String = text
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || c.is_ascii_whitespace())
            .collect();
        let mut id = filtered.trim().replace(' ', "-").to_ascii_lowercase();

        let mut attempts = 0;
        while self.issued.contains(&id) && attempts < MAX_DEDUP_ATTEMPTS {
            id = increment(&id);
            attempts += 1;
        }

        self.issued.insert(id.clone());
        id
    }
}

fn increment(id: &str) -> String {
    let Some(last) = id.chars().last() else {
        return String::new();
    };

    match last.to_digit(10) {
        Some(digit) => format!("{}{}", &id[..id.len() - last.len_utf8()], digit + 1),
        None => format!("{id}-2"),
    }
}
