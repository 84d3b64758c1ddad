//! External detection service client
//!
//! Classification is not done in-process: an external YOLO service receives
//! the media bytes and returns labelled detections. The trait seam keeps the
//! ingest workflow testable without the service running.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;

use crate::triage::taxonomy::{is_canonical, normalize};
use crate::utils::{AppError, AppResult};

/// One labelled detection from the external service
#[derive(Debug, Clone, Deserialize)]
pub struct Detection {
    pub class_name: String,
    pub confidence: f64,
}

#[derive(Debug, Deserialize)]
struct DetectResponse {
    #[serde(default)]
    detections: Vec<Detection>,
}

/// Detection service seam
#[async_trait]
pub trait Detector: Send + Sync {
    /// Run detection on raw media bytes
    async fn detect(&self, bytes: &[u8], content_type: &str) -> AppResult<Vec<Detection>>;

    /// Upstream URL of the live camera stream, if the service offers one
    fn live_feed_url(&self) -> Option<String> {
        None
    }

    /// Ask the service to stop its live camera session
    async fn stop_live(&self) -> AppResult<()> {
        Ok(())
    }
}

/// HTTP client for the YOLO detection service
#[derive(Clone)]
pub struct YoloClient {
    client: reqwest::Client,
    base_url: String,
}

impl YoloClient {
    pub fn new(base_url: String, timeout_ms: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(timeout_ms))
            .build()
            .unwrap_or_default();
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl Detector for YoloClient {
    async fn detect(&self, bytes: &[u8], content_type: &str) -> AppResult<Vec<Detection>> {
        let response = self
            .client
            .post(self.url("/detect"))
            .header(http::header::CONTENT_TYPE, content_type)
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|e| AppError::upstream(format!("Detection service unreachable: {}", e)))?
            .error_for_status()
            .map_err(|e| AppError::upstream(format!("Detection service error: {}", e)))?;

        let parsed: DetectResponse = response
            .json()
            .await
            .map_err(|e| AppError::upstream(format!("Bad detection response: {}", e)))?;

        Ok(parsed.detections)
    }

    fn live_feed_url(&self) -> Option<String> {
        Some(self.url("/live"))
    }

    async fn stop_live(&self) -> AppResult<()> {
        self.client
            .get(self.url("/stop"))
            .send()
            .await
            .map_err(|e| AppError::upstream(format!("Detection service unreachable: {}", e)))?;
        Ok(())
    }
}

/// Collapse raw detections to the best confidence per canonical issue type.
///
/// Detections whose class does not normalize into the canonical taxonomy are
/// discarded - an upload with only unknown classes is rejected upstream.
pub fn best_per_issue(detections: &[Detection]) -> Vec<(String, f64)> {
    let mut best: HashMap<String, f64> = HashMap::new();
    for det in detections {
        let tag = normalize(&det.class_name);
        if !is_canonical(&tag) {
            continue;
        }
        let entry = best.entry(tag).or_insert(det.confidence);
        if det.confidence > *entry {
            *entry = det.confidence;
        }
    }
    let mut issues: Vec<(String, f64)> = best.into_iter().collect();
    // Deterministic order: highest confidence first
    issues.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(class_name: &str, confidence: f64) -> Detection {
        Detection {
            class_name: class_name.to_string(),
            confidence,
        }
    }

    #[test]
    fn test_best_per_issue_keeps_highest_confidence() {
        let detections = vec![
            det("pothole", 0.61),
            det("Potholes", 0.87),
            det("garbage overflow", 0.55),
        ];
        let issues = best_per_issue(&detections);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0], ("potholes".to_string(), 0.87));
        assert_eq!(issues[1], ("garbage_overflow".to_string(), 0.55));
    }

    #[test]
    fn test_best_per_issue_drops_unknown_classes() {
        let detections = vec![det("person", 0.99), det("car", 0.98)];
        assert!(best_per_issue(&detections).is_empty());
    }
}
