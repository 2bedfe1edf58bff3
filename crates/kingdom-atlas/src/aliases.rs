//! Known non-canonical country spellings and their canonical forms.
//!
//! Keys and values are already in [`normalize`](crate::normalize::normalize)
//! form. No value appears as a key, so alias resolution is a single hop.

use std::collections::HashMap;
use std::sync::OnceLock;

/// `(alias, canonical)` pairs.
pub const ALIASES: &[(&str, &str)] = &[
    ("usa", "united states of america"),
    ("us", "united states of america"),
    ("ivory coast", "cote divoire"),
    ("dominican republic caribbean", "dominican republic"),
    ("brazil south america", "brazil"),
    ("benin west africa", "benin"),
    ("burundi east africa", "burundi"),
    ("cambodia asia", "cambodia"),
    ("cameroon central africa", "cameroon"),
    (
        "central african republic central africa",
        "central african republic",
    ),
    ("chad central africa", "chad"),
    ("columbia south america", "colombia"),
    ("cuba caribbean", "cuba"),
    (
        "democratic republic of the congo central africa",
        "democratic republic of the congo",
    ),
    ("egypt africa", "egypt"),
    ("germany europe", "germany"),
    ("ghana west africa", "ghana"),
    ("greece", "greece"),
    ("guatemala central america", "guatemala"),
    ("haiti caribbean", "haiti"),
    ("honduras central america", "honduras"),
    ("india southeast asia", "india"),
    ("indonesia asia", "indonesia"),
    ("israel middle east", "israel"),
    ("kenya east africa", "kenya"),
    ("liberia west africa", "liberia"),
    ("malawi east africa", "malawi"),
    ("mexico north america", "mexico"),
    ("nepal south asia", "nepal"),
    ("netherlands europe", "netherlands"),
    ("nicaragua central america", "nicaragua"),
    ("nigeria west africa", "nigeria"),
    ("peru south america", "peru"),
    ("philippines asia", "philippines"),
    ("romania europe", "romania"),
    ("senegal west africa", "senegal"),
    ("sierra leone west africa", "sierra leone"),
    ("the gambia west africa", "gambia"),
    ("togo west africa", "togo"),
    ("trinidad tobago caribbean", "trinidad and tobago"),
    ("turkey middle east", "turkey"),
    ("uganda east africa", "uganda"),
    ("zambia east africa", "zambia"),
    // Abbreviated labels used by the 110m world atlas.
    ("dem rep congo", "democratic republic of the congo"),
    ("central african rep", "central african republic"),
    ("dominican rep", "dominican republic"),
    ("eq guinea", "equatorial guinea"),
    ("s sudan", "south sudan"),
    ("bosnia and herz", "bosnia and herzegovina"),
    ("solomon is", "solomon islands"),
    ("falkland is", "falkland islands"),
    ("w sahara", "western sahara"),
    ("n cyprus", "northern cyprus"),
];

fn table() -> &'static HashMap<&'static str, &'static str> {
    static TABLE: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    TABLE.get_or_init(|| ALIASES.iter().copied().collect())
}

/// Canonical form for an already-normalized name, if it is a known alias.
pub fn lookup(normalized: &str) -> Option<&'static str> {
    table().get(normalized).copied()
}
