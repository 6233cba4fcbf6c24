//! Shared utility functions for markdown rendering.

use pulldown_cmark::HeadingLevel;

/// Convert heading level enum to number (1-6).
#[must_use]
pub(crate) fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Uppercase the first letter of every word and lowercase the rest.
///
/// A word starts after any character that is not alphanumeric.
pub(crate) fn capitalize_words(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut word_start = true;
    for c in input.chars() {
        if c.is_alphanumeric() {
            if word_start {
                output.extend(c.to_uppercase());
            } else {
                output.extend(c.to_lowercase());
            }
            word_start = false;
        } else {
            output.push(c);
            word_start = true;
        }
    }
    output
}
