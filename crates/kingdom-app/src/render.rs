//! Frame composition and terminal output.

use std::io::{self, Write};
use std::path::PathBuf;

use kingdom_atlas::{CountryMatcher, Highlight};
use kingdom_common::Color;
use kingdom_config::RecordsConfig;
use kingdom_presence::PresenceView;

use crate::records::{resolve_image, PromptRecord};

/// Map backdrop the region fills are composited over.
const BACKDROP: Color = Color::WHITE;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Text overlay for the current record.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub partner: String,
    pub country: String,
    pub image: PathBuf,
    pub scripture: String,
    pub fading: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionFill {
    pub name: &'static str,
    pub highlight: Highlight,
    /// Fill after opacity is applied over the map backdrop.
    pub color: Color,
}

/// Everything needed to draw one screen.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// `None` while records are still loading.
    pub overlay: Option<Overlay>,
    pub regions: Vec<RegionFill>,
    /// Countries other clients are viewing.
    pub others: Vec<String>,
}

impl Frame {
    pub fn highlighted(&self) -> impl Iterator<Item = &RegionFill> {
        self.regions.iter().filter(|r| r.highlight.is_highlighted())
    }
}

/// Build a frame from the owned presenter state.
///
/// Only the image lookup touches the filesystem.
pub fn compose_frame(
    record: Option<&PromptRecord>,
    fading: bool,
    others: &PresenceView,
    regions: &[&'static str],
    assets: &RecordsConfig,
) -> Frame {
    let matcher = CountryMatcher::new(record.map(|r| r.country.as_str()), others.countries());

    let regions = regions
        .iter()
        .map(|&name| {
            let highlight = matcher.highlight(name);
            RegionFill {
                name,
                highlight,
                color: highlight.paint().over(BACKDROP),
            }
        })
        .collect();

    let overlay = record.map(|r| Overlay {
        partner: r.partner.clone(),
        country: r.country.clone(),
        image: resolve_image(&assets.asset_dir, &r.image, &assets.fallback_image),
        scripture: r.scripture.clone(),
        fading,
    });

    let mut others: Vec<String> = others.countries().map(str::to_string).collect();
    others.sort();
    others.dedup();

    Frame {
        overlay,
        regions,
        others,
    }
}

/// Draws frames as ANSI text.
pub struct TerminalRenderer<W: Write> {
    out: W,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn render(&mut self, frame: &Frame) -> io::Result<()> {
        let out = &mut self.out;
        write!(out, "\x1b[2J\x1b[H")?;
        writeln!(out, "{BOLD}One Kingdom{RESET}  Share Jesus. Speak Jesus. Show Jesus.")?;
        writeln!(out)?;

        let Some(overlay) = &frame.overlay else {
            writeln!(out, "Loading prayer data...")?;
            return out.flush();
        };

        for region in frame.highlighted() {
            let label = match region.highlight {
                Highlight::SelfSelected => "praying here",
                _ => "someone else is praying here",
            };
            writeln!(
                out,
                "{}    {RESET} {}  {DIM}{label}{RESET}",
                region.color.ansi_bg(),
                region.name
            )?;
        }
        let quiet = frame.regions.len() - frame.highlighted().count();
        let gray = Highlight::Default.paint().over(BACKDROP);
        writeln!(out, "{}    {RESET} {quiet} other regions", gray.ansi_bg())?;
        writeln!(out)?;

        let style = if overlay.fading { DIM } else { BOLD };
        writeln!(out, "{style}{}{RESET}", overlay.partner)?;
        writeln!(out, "{style}{}{RESET}", overlay.country)?;
        writeln!(out, "{DIM}{}{RESET}", overlay.image.display())?;
        writeln!(out)?;
        writeln!(out, "{}", overlay.scripture)?;
        writeln!(out)?;

        if !frame.others.is_empty() {
            writeln!(out, "Also praying now: {}", frame.others.join(", "))?;
        }
        writeln!(out, "[n/Enter] Pray & Next   [r] Start Over   [q] Quit")?;
        out.flush()
    }
}
