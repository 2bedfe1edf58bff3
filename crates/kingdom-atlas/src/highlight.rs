//! Region fill selection.

use kingdom_common::Color;

use crate::resolver::CountryMatcher;

/// How a map region is painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Highlight {
    /// The locally selected country.
    SelfSelected,
    /// A country another live client is viewing.
    Other,
    Default,
}

impl Highlight {
    pub fn fill(&self) -> Color {
        match self {
            Highlight::SelfSelected => Color::rgb(0xb1, 0x1a, 0x1a),
            Highlight::Other => Color::rgb(0x1f, 0x5f, 0xbf),
            Highlight::Default => Color::rgb(0xcf, 0xcf, 0xcf),
        }
    }

    pub fn opacity(&self) -> f32 {
        match self {
            Highlight::SelfSelected => 0.9,
            Highlight::Other => 0.8,
            Highlight::Default => 0.35,
        }
    }

    /// Fill with opacity applied.
    pub fn paint(&self) -> Color {
        self.fill().with_opacity(self.opacity())
    }

    pub fn is_highlighted(&self) -> bool {
        !matches!(self, Highlight::Default)
    }
}

/// One-shot form of [`CountryMatcher::highlight`].
pub fn resolve_highlight<'a, I>(region: &str, local: Option<&str>, others: I) -> Highlight
where
    I: IntoIterator<Item = &'a str>,
{
    CountryMatcher::new(local, others).highlight(region)
}
