//! Issue-type taxonomy
//!
//! Detector class names and historical ticket data spell the same issue a
//! dozen ways (`"WaterPuddle"`, `"water puddle"`, `"waterpuddles"`, ...).
//! The taxonomy table below is the single source of truth: one canonical
//! snake_case tag per issue family, each with its accepted raw variants.
//!
//! Matching is exact-string after lower-case + trim — never fuzzy. Two
//! different unmapped strings stay distinct categories, and an unmapped
//! string passes through cleaned rather than erroring (open taxonomy).

use std::collections::HashMap;
use std::sync::LazyLock;

/// Canonical tag plus every accepted raw-string variant.
///
/// Variants already in canonical form are listed too, so membership in this
/// table is also the definition of "known issue type".
const TAXONOMY: &[(&str, &[&str])] = &[
    (
        "water_puddles",
        &[
            "water_puddles",
            "water_puddle",
            "waterpuddles",
            "waterpuddle",
            "water puddles",
            "water puddle",
            "puddles",
        ],
    ),
    (
        "open_manholes",
        &[
            "open_manholes",
            "open_manhole",
            "openmanholes",
            "openmanhole",
            "open manholes",
        ],
    ),
    (
        "garbage_overflow",
        &["garbage_overflow", "garbageoverflow", "garbage overflow"],
    ),
    (
        "sand_on_road",
        &["sand_on_road", "sandonroad", "sand on road"],
    ),
    (
        "road_cracks",
        &[
            "road_cracks",
            "road_crack",
            "roadcracks",
            "roadcrack",
            "road cracks",
        ],
    ),
    (
        "street_hawkers",
        &[
            "street_hawkers",
            "street_hawker",
            "streethawkers",
            "streethawker",
            "street hawkers",
        ],
    ),
    (
        "animal_carcases",
        &[
            "animal_carcases",
            "animal_carcass",
            "animalcarcases",
            "animalcarcass",
            "animal carcases",
        ],
    ),
    ("potholes", &["potholes", "pothole"]),
    (
        "street_debris",
        &["street_debris", "streetdebris", "street debris", "debris"],
    ),
];

/// variant → canonical tag, built once from [`TAXONOMY`]
static LOOKUP: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = HashMap::new();
    for (canonical, variants) in TAXONOMY {
        for variant in *variants {
            map.insert(*variant, *canonical);
        }
    }
    map
});

/// Canonicalize a raw issue-type string.
///
/// Empty input yields an empty string. Unmapped input passes through
/// lower-cased and trimmed, which makes the function idempotent:
/// `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(issue_type: &str) -> String {
    let cleaned = issue_type.trim().to_lowercase();
    if cleaned.is_empty() {
        return String::new();
    }
    match LOOKUP.get(cleaned.as_str()) {
        Some(canonical) => (*canonical).to_string(),
        None => cleaned,
    }
}

/// The closed set of canonical tags, in table order
pub fn canonical_tags() -> impl Iterator<Item = &'static str> {
    TAXONOMY.iter().map(|(canonical, _)| *canonical)
}

/// Whether a (normalized) tag belongs to the canonical set
pub fn is_canonical(tag: &str) -> bool {
    TAXONOMY.iter().any(|(canonical, _)| *canonical == tag)
}

/// Human-readable form of a tag: `"sand_on_road"` → `"Sand On Road"`
pub fn display_name(tag: &str) -> String {
    if tag == "all" {
        return "ALL".to_string();
    }
    tag.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
