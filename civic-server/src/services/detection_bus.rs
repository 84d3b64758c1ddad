//! Detection event bus
//!
//! Fan-out channel between the ingest workflow and the live SSE feed. Uses a
//! broadcast channel so a slow subscriber drops messages instead of blocking
//! the publisher; subscribers surface the gap as a skipped event.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tokio::sync::broadcast;

/// Buffered events per subscriber before lagging drops the oldest
const BUS_CAPACITY: usize = 256;

/// One live feed message.
///
/// Heartbeats serialize as `{"heartbeat": true}`; detection events carry a
/// timestamp, a display message and optionally the captured frame to fetch.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heartbeat: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture_filename: Option<String>,
}

impl DetectionEvent {
    pub fn heartbeat() -> Self {
        Self {
            heartbeat: Some(true),
            time: None,
            message: None,
            capture_filename: None,
        }
    }

    pub fn detection(message: impl Into<String>, capture_filename: Option<String>) -> Self {
        Self {
            heartbeat: None,
            time: Some(chrono::Utc::now().to_rfc3339()),
            message: Some(message.into()),
            capture_filename,
        }
    }
}

#[derive(Clone)]
pub struct DetectionBus {
    tx: broadcast::Sender<DetectionEvent>,
    active: Arc<AtomicBool>,
}

impl Default for DetectionBus {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectionBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BUS_CAPACITY);
        Self {
            tx,
            active: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Publish an event; subscriber count of zero is not an error
    pub fn publish(&self, event: DetectionEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DetectionEvent> {
        self.tx.subscribe()
    }

    /// Whether the live camera session is considered running
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }

    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let bus = DetectionBus::new();
        let mut rx = bus.subscribe();
        bus.publish(DetectionEvent::detection("pothole detected", None));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.message.as_deref(), Some("pothole detected"));
        assert!(event.heartbeat.is_none());
    }

    #[test]
    fn test_heartbeat_payload_shape() {
        let json = serde_json::to_string(&DetectionEvent::heartbeat()).unwrap();
        assert_eq!(json, r#"{"heartbeat":true}"#);
    }

    #[test]
    fn test_publish_without_subscribers_is_fine() {
        let bus = DetectionBus::new();
        bus.publish(DetectionEvent::heartbeat());
        assert!(bus.is_active());
        bus.set_active(false);
        assert!(!bus.is_active());
    }
}
