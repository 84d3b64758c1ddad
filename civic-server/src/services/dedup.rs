//! Duplicate-evidence detection
//!
//! Rules, in order:
//! 1. Same issue type within 50 m → reject ("already registered")
//! 2. Same issue type with a near-identical image → reject ("duplicate image")
//! 3. Same location but a different issue → allow
//! 4. Different location and different image → allow
//!
//! Images are compared by a 64-bit difference hash over a 9×8 grayscale
//! reduction; media that cannot be decoded falls back to an exact SHA-256
//! hash. Videos skip hashing entirely.

use image::imageops::FilterType;
use sha2::{Digest, Sha256};

use crate::db::models::MediaRecord;

/// Mean earth radius in meters (haversine)
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Thresholds for the duplicate rules
#[derive(Debug, Clone, Copy)]
pub struct DedupConfig {
    /// Same-issue reports within this radius are one complaint
    pub distance_threshold_m: f64,
    /// Max Hamming distance between difference hashes to call images alike
    pub hash_threshold: u32,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            distance_threshold_m: 50.0,
            hash_threshold: 5,
        }
    }
}

/// Why an item was refused, with the citizen-facing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DuplicateReason {
    SameLocation,
    SimilarImage,
}

impl DuplicateReason {
    pub fn message(&self) -> &'static str {
        match self {
            DuplicateReason::SameLocation => {
                "This complaint is already registered. Thanks for your concern."
            }
            DuplicateReason::SimilarImage => {
                "Duplicate image detected. This issue has already been reported."
            }
        }
    }
}

/// Great-circle distance between two points, in meters
pub fn haversine_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * a.sqrt().asin() * EARTH_RADIUS_M
}

/// Compute the stored hash string for an image: 16 hex chars of difference
/// hash, or 64 hex chars of SHA-256 when the bytes do not decode as an image.
pub fn image_hash(bytes: &[u8]) -> String {
    match dhash(bytes) {
        Some(hash) => format!("{:016x}", hash),
        None => exact_hash(bytes),
    }
}

/// 64-bit difference hash: brightness gradient over a 9×8 reduction
fn dhash(bytes: &[u8]) -> Option<u64> {
    let img = image::load_from_memory(bytes).ok()?;
    let gray = img.to_luma8();
    let small = image::imageops::resize(&gray, 9, 8, FilterType::Triangle);

    let mut hash: u64 = 0;
    for y in 0..8 {
        for x in 0..8 {
            let left = small.get_pixel(x, y).0[0];
            let right = small.get_pixel(x + 1, y).0[0];
            hash <<= 1;
            if left > right {
                hash |= 1;
            }
        }
    }
    Some(hash)
}

fn exact_hash(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Whether two stored hash strings are close enough to call alike.
///
/// Difference hashes (16 chars) compare by Hamming distance; exact hashes
/// and mixed pairs compare by equality.
pub fn hashes_alike(a: &str, b: &str, threshold: u32) -> bool {
    if a.len() == 16 && b.len() == 16 {
        match (u64::from_str_radix(a, 16), u64::from_str_radix(b, 16)) {
            (Ok(ha), Ok(hb)) => (ha ^ hb).count_ones() <= threshold,
            _ => a == b,
        }
    } else {
        a == b
    }
}

/// Run the duplicate rules for a new item against stored candidates of the
/// same issue type.
pub fn check_duplicate(
    new_hash: &str,
    latitude: Option<f64>,
    longitude: Option<f64>,
    candidates: &[MediaRecord],
    config: &DedupConfig,
) -> Option<(DuplicateReason, MediaRecord)> {
    let has_location = matches!((latitude, longitude), (Some(lat), Some(lon))
        if lat != 0.0 && lon != 0.0);

    for existing in candidates {
        if has_location
            && let (Some(lat), Some(lon), Some(ex_lat), Some(ex_lon)) =
                (latitude, longitude, existing.latitude, existing.longitude)
        {
            let distance = haversine_m(lat, lon, ex_lat, ex_lon);
            if distance <= config.distance_threshold_m {
                return Some((DuplicateReason::SameLocation, existing.clone()));
            }
        }

        if let Some(existing_hash) = &existing.image_hash
            && hashes_alike(new_hash, existing_hash, config.hash_threshold)
        {
            return Some((DuplicateReason::SimilarImage, existing.clone()));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::types::MediaType;

    fn media(sub_id: &str, hash: &str, lat: Option<f64>, lon: Option<f64>) -> MediaRecord {
        MediaRecord {
            media_id: 1,
            sub_id: sub_id.to_string(),
            file_name: "x.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            media_type: MediaType::Image,
            image_hash: Some(hash.to_string()),
            latitude: lat,
            longitude: lon,
            confidence: None,
            gps_extracted: lat.is_some(),
            is_proof: false,
            created_at: 0,
        }
    }

    #[test]
    fn test_haversine_known_distance() {
        // One degree of latitude is ~111.2 km
        let d = haversine_m(12.0, 77.0, 13.0, 77.0);
        assert!((d - 111_195.0).abs() < 200.0, "got {}", d);
        assert_eq!(haversine_m(12.0, 77.0, 12.0, 77.0), 0.0);
    }

    #[test]
    fn test_hashes_alike_hamming() {
        // One flipped bit
        assert!(hashes_alike("00000000000000ff", "00000000000000fe", 5));
        // 8 flipped bits
        assert!(!hashes_alike("00000000000000ff", "0000000000000000", 5));
    }

    #[test]
    fn test_exact_hashes_compare_by_equality() {
        let a = exact_hash(b"one");
        let b = exact_hash(b"two");
        assert!(hashes_alike(&a, &a, 5));
        assert!(!hashes_alike(&a, &b, 5));
    }

    #[test]
    fn test_same_location_is_duplicate() {
        let candidates = vec![media("SUB-1", "aaaaaaaaaaaaaaaa", Some(12.0000), Some(77.0000))];
        let hit = check_duplicate(
            "ffffffffffffffff",
            Some(12.0001),
            Some(77.0000),
            &candidates,
            &DedupConfig::default(),
        );
        assert_eq!(hit.unwrap().0, DuplicateReason::SameLocation);
    }

    #[test]
    fn test_similar_image_far_away_is_duplicate() {
        let candidates = vec![media("SUB-1", "00000000000000ff", Some(20.0), Some(70.0))];
        let hit = check_duplicate(
            "00000000000000fe",
            Some(12.0),
            Some(77.0),
            &candidates,
            &DedupConfig::default(),
        );
        assert_eq!(hit.unwrap().0, DuplicateReason::SimilarImage);
    }

    #[test]
    fn test_distinct_report_passes() {
        let candidates = vec![media("SUB-1", "00000000000000ff", Some(20.0), Some(70.0))];
        let hit = check_duplicate(
            "ffffffffffff0000",
            Some(12.0),
            Some(77.0),
            &candidates,
            &DedupConfig::default(),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn test_dhash_of_solid_image_is_stable() {
        // 16x16 solid gray PNG built in-memory
        let img = image::RgbImage::from_pixel(16, 16, image::Rgb([128, 128, 128]));
        let mut bytes = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .unwrap();

        let first = image_hash(&bytes);
        let second = image_hash(&bytes);
        assert_eq!(first, second);
        assert_eq!(first.len(), 16);
    }

    #[test]
    fn test_undecodable_bytes_fall_back_to_exact_hash() {
        let hash = image_hash(b"definitely not an image");
        assert_eq!(hash.len(), 64);
    }
}
