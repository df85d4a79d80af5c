//! Identifier transforms shared by templates, file naming and reports.
//!
//! A human name such as `"Control blocks"` is split into words on any
//! character that is not a letter or digit, lower-cased, then reassembled
//! following a language convention. Letter case never starts a word, so the
//! result is the same whatever the case of the input. The transforms are pure
//! and do not depend on the process locale.
//!
//! ```rust
//! use scenario_publisher::identifier::{camelize, camelize_lower, underscore};
//!
//! assert_eq!(underscore("start publisher"), "start_publisher");
//! assert_eq!(camelize("Control blocks"), "ControlBlocks");
//! assert_eq!(camelize_lower("Control blocks"), "controlBlocks");
//! ```

use itertools::Itertools;

/// Split `name` into lower-cased words on runs of non-alphanumerics.
fn words(name: &str) -> Vec<String> {
    name.split(|ch: char| !ch.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn capitalise(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Lower-case words joined with underscores: `start_publisher`.
#[must_use]
pub fn underscore(name: &str) -> String {
    words(name).join("_")
}

/// Capitalised words joined together: `StartPublisher`.
#[must_use]
pub fn camelize(name: &str) -> String {
    words(name).iter().map(|word| capitalise(word)).join("")
}

/// Like [`camelize`] with a lower-case first word: `startPublisher`.
#[must_use]
pub fn camelize_lower(name: &str) -> String {
    let words = words(name);
    let mut iter = words.iter();
    iter.next().map_or_else(String::new, |first| {
        std::iter::once(first.clone())
            .chain(iter.map(|word| capitalise(word)))
            .join("")
    })
}
