//! Ordered text passes that reduce a country label to a comparable form.

use unicode_normalization::UnicodeNormalization;

/// A single normalization step.
pub type Pass = fn(&str) -> String;

/// Passes applied by [`normalize`], in order.
pub const PASSES: &[(&str, Pass)] = &[
    ("lowercase", lowercase),
    ("strip_diacritics", strip_diacritics),
    ("strip_apostrophes", strip_apostrophes),
    ("letters_only", letters_only),
    ("collapse_whitespace", collapse_whitespace),
];

/// Run every pass in [`PASSES`] over `input`.
pub fn normalize(input: &str) -> String {
    PASSES
        .iter()
        .fold(input.to_string(), |acc, (_, pass)| pass(&acc))
}

fn lowercase(s: &str) -> String {
    s.to_lowercase()
}

/// Decompose (NFD) and drop the combining diacritical marks block.
fn strip_diacritics(s: &str) -> String {
    s.nfd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .collect()
}

/// Apostrophes join rather than split: "d'Ivoire" becomes "divoire".
fn strip_apostrophes(s: &str) -> String {
    s.chars().filter(|c| *c != '\'' && *c != '\u{2019}').collect()
}

fn letters_only(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
