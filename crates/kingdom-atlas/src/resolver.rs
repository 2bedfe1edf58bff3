//! Canonicalization and fuzzy country matching.

use crate::aliases;
use crate::highlight::Highlight;
use crate::normalize::normalize;

/// Normalize, then resolve through the alias table.
pub fn canonicalize(name: &str) -> String {
    let normalized = normalize(name);
    match aliases::lookup(&normalized) {
        Some(canonical) => canonical.to_string(),
        None => normalized,
    }
}

/// Compare two canonical forms: equal, or either contains the other.
///
/// Containment lets "Congo" meet "Democratic Republic of the Congo", and
/// also lets "Niger" meet "Nigeria". The second is a known false positive.
fn canonical_match(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a == b || a.contains(b) || b.contains(a)
}

/// Whether two differently formatted names denote the same country.
pub fn countries_match(a: &str, b: &str) -> bool {
    canonical_match(&canonicalize(a), &canonicalize(b))
}

/// Canonicalized match targets for one render pass.
///
/// Built once per pass so each region only canonicalizes its own label.
#[derive(Debug, Clone, Default)]
pub struct CountryMatcher {
    local: Option<String>,
    others: Vec<String>,
}

impl CountryMatcher {
    pub fn new<'a, I>(local: Option<&str>, others: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let local = local.map(canonicalize).filter(|c| !c.is_empty());
        let mut others: Vec<String> = others
            .into_iter()
            .map(canonicalize)
            .filter(|c| !c.is_empty())
            .collect();
        others.sort();
        others.dedup();
        Self { local, others }
    }

    /// Self first, then others, else default.
    pub fn highlight(&self, region: &str) -> Highlight {
        let region = canonicalize(region);
        if let Some(local) = &self.local {
            if canonical_match(&region, local) {
                return Highlight::SelfSelected;
            }
        }
        if self.others.iter().any(|other| canonical_match(&region, other)) {
            return Highlight::Other;
        }
        Highlight::Default
    }

    pub fn local(&self) -> Option<&str> {
        self.local.as_deref()
    }

    pub fn others(&self) -> &[String] {
        &self.others
    }
}
