//! Prayer-partner records: loading, shuffling, and image lookup.

use std::path::{Path, PathBuf};

use kingdom_common::RecordError;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Characters that cannot appear in a generated image file name.
const UNSAFE_NAME_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// One partner to pray for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRecord {
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub partner: String,
    #[serde(default, alias = "prompt")]
    pub scripture: String,
    #[serde(default)]
    pub image: String,
}

impl PromptRecord {
    fn tidy(mut self) -> Option<Self> {
        self.country = self.country.trim().to_string();
        if self.country.is_empty() {
            return None;
        }
        self.partner = self.partner.trim().to_string();
        self.scripture = self.scripture.trim().to_string();
        self.image = self.image.trim().to_string();
        if self.image.is_empty() {
            self.image = derive_image(&self.country, &self.partner);
        }
        Some(self)
    }
}

/// `/partner-images/{country}_{partner}.png`, or `{country}_flag.png` when
/// there is no partner.
pub fn derive_image(country: &str, partner: &str) -> String {
    let safe = |s: &str| s.replace(UNSAFE_NAME_CHARS, "-");
    if partner.is_empty() {
        format!("/partner-images/{}_flag.png", safe(country))
    } else {
        format!("/partner-images/{}_{}.png", safe(country), safe(partner))
    }
}

/// Read the record list. Records without a country are dropped.
pub fn load_records(path: &Path) -> Result<Vec<PromptRecord>, RecordError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            RecordError::NotFound(path.to_path_buf())
        } else {
            RecordError::ParseError(format!("{}: {e}", path.display()))
        }
    })?;
    parse_records(&content)
}

pub fn parse_records(json: &str) -> Result<Vec<PromptRecord>, RecordError> {
    let raw: Vec<PromptRecord> =
        serde_json::from_str(json).map_err(|e| RecordError::ParseError(e.to_string()))?;
    let total = raw.len();
    let records: Vec<PromptRecord> = raw.into_iter().filter_map(PromptRecord::tidy).collect();
    if records.len() < total {
        debug!(dropped = total - records.len(), "Dropped records without a country");
    }
    info!(count = records.len(), "Prayer records loaded");
    Ok(records)
}

/// Permute the records in place. A seed makes the order reproducible.
pub fn shuffle_records(records: &mut [PromptRecord], seed: Option<u64>) {
    match seed {
        Some(seed) => records.shuffle(&mut StdRng::seed_from_u64(seed)),
        None => records.shuffle(&mut rand::thread_rng()),
    }
}

/// Asset-safe form of an image name: lowercase, whitespace to `_`, and only
/// `[a-z0-9_.-]` kept.
pub fn sanitize_image_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_space = false;
    for c in name.to_lowercase().chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        if c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '.' | '-') {
            out.push(c);
        }
    }
    out
}

/// Locate a record's image under `asset_dir`, falling back to `fallback`
/// when the file is missing.
pub fn resolve_image(asset_dir: &Path, image: &str, fallback: &str) -> PathBuf {
    let file_name = image.rsplit(['/', '\\']).next().unwrap_or_default();
    let sanitized = sanitize_image_name(file_name);
    if !sanitized.is_empty() {
        let candidate = asset_dir.join(&sanitized);
        if candidate.is_file() {
            return candidate;
        }
    }
    debug!(image = %image, "Image asset missing, using fallback");
    asset_dir.join(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {"country": " Kenya East Africa ", "partner": "Grace Church", "prompt": "Pray for rain", "image": ""},
        {"country": "", "partner": "Nobody", "prompt": "skip me"},
        {"country": "Peru", "partner": "", "scripture": "John 3:16"},
        {"country": "Côte d'Ivoire", "partner": "A/B: \"C\"", "prompt": "x", "image": "/partner-images/custom.png"}
    ]"#;

    #[test]
    fn parses_and_filters() {
        let records = parse_records(SAMPLE).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].country, "Kenya East Africa");
        assert_eq!(records[0].scripture, "Pray for rain");
        assert_eq!(records[1].scripture, "John 3:16");
    }

    #[test]
    fn derives_missing_images() {
        let records = parse_records(SAMPLE).unwrap();
        assert_eq!(
            records[0].image,
            "/partner-images/Kenya East Africa_Grace Church.png"
        );
        assert_eq!(records[1].image, "/partner-images/Peru_flag.png");
        assert_eq!(records[2].image, "/partner-images/custom.png");
    }

    #[test]
    fn derive_image_replaces_unsafe_characters() {
        assert_eq!(
            derive_image("Côte d'Ivoire", "A/B: \"C\""),
            "/partner-images/Côte d'Ivoire_A-B- -C-.png"
        );
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            parse_records("{not json"),
            Err(RecordError::ParseError(_))
        ));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prayerData.json");
        assert!(matches!(load_records(&path), Err(RecordError::NotFound(_))));

        std::fs::write(&path, SAMPLE).unwrap();
        assert_eq!(load_records(&path).unwrap().len(), 3);
    }

    #[test]
    fn seeded_shuffle_is_deterministic_permutation() {
        let base = parse_records(SAMPLE).unwrap();
        let mut a = base.clone();
        let mut b = base.clone();
        shuffle_records(&mut a, Some(7));
        shuffle_records(&mut b, Some(7));
        assert_eq!(a, b);

        let mut sorted = a.clone();
        sorted.sort_by(|x, y| x.country.cmp(&y.country));
        let mut expected = base;
        expected.sort_by(|x, y| x.country.cmp(&y.country));
        assert_eq!(sorted, expected);
    }

    #[test]
    fn sanitizes_image_names() {
        assert_eq!(
            sanitize_image_name("Kenya East Africa_Grace Church.png"),
            "kenya_east_africa_grace_church.png"
        );
        assert_eq!(sanitize_image_name("Côte d'Ivoire_flag.png"), "cte_divoire_flag.png");
    }

    #[test]
    fn resolves_existing_image_or_fallback() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("peru_flag.png"), b"png").unwrap();

        assert_eq!(
            resolve_image(dir.path(), "/partner-images/Peru_flag.png", "worldmap.png"),
            dir.path().join("peru_flag.png")
        );
        assert_eq!(
            resolve_image(dir.path(), "/partner-images/Chad_flag.png", "worldmap.png"),
            dir.path().join("worldmap.png")
        );
        assert_eq!(
            resolve_image(dir.path(), "", "worldmap.png"),
            dir.path().join("worldmap.png")
        );
    }
}
