//! Media Model
//!
//! Media bytes live on disk under the work dir; the record keeps the
//! metadata and the perceptual hash used for duplicate detection.

use serde::{Deserialize, Serialize};
use shared::types::MediaType;

/// Stored media attachment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaRecord {
    pub media_id: i64,
    pub sub_id: String,
    /// File name relative to the media directory
    pub file_name: String,
    pub content_type: String,
    #[serde(default)]
    pub media_type: MediaType,
    /// Perceptual hash (16 hex chars) or exact hash (64 hex chars)
    #[serde(default)]
    pub image_hash: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub confidence: Option<f64>,
    /// Whether the coordinates came with the upload
    #[serde(default)]
    pub gps_extracted: bool,
    /// Resolution proof uploaded by an inspector, not citizen evidence
    #[serde(default)]
    pub is_proof: bool,
    pub created_at: i64,
}

/// Create media payload
#[derive(Debug, Clone, Serialize)]
pub struct MediaCreate {
    pub sub_id: String,
    pub file_name: String,
    pub content_type: String,
    pub media_type: MediaType,
    pub image_hash: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub confidence: Option<f64>,
    pub gps_extracted: bool,
    pub is_proof: bool,
}
