//! Department classification
//!
//! One rule, one function. The source system grew three disagreeing copies
//! of this mapping (a fixed table with an Unassigned fallback, a substring
//! matcher that defaulted everything else to Roads, and a third table at the
//! ingest side); this module is the single owner now. Types outside the
//! canonical taxonomy classify as `Unassigned` — they are routed by a human,
//! not guessed into a department.

use shared::types::Department;

use super::taxonomy::normalize;

/// Issue families owned by the Roads department
const ROADS: &[&str] = &[
    "sand_on_road",
    "road_cracks",
    "potholes",
    "water_puddles",
    "open_manholes",
    "street_debris",
];

/// Issue families owned by the Garbage department
const GARBAGE: &[&str] = &["street_hawkers", "animal_carcases", "garbage_overflow"];

/// Map an issue type (raw or normalized) to its owning department.
pub fn department_for(issue_type: &str) -> Department {
    let normalized = normalize(issue_type);
    if ROADS.contains(&normalized.as_str()) {
        Department::Roads
    } else if GARBAGE.contains(&normalized.as_str()) {
        Department::Garbage
    } else {
        Department::Unassigned
    }
}
