//! Service layer
//!
//! Long-lived collaborators owned by `ServerState`:
//! - [`GeocodeService`] - reverse geocoding with cache + request coalescing
//! - [`Detector`] / [`YoloClient`] - external detection service client
//! - [`dedup`] - duplicate-evidence rules
//! - [`DetectionBus`] - broadcast channel behind the live SSE feed
//! - [`IngestService`] - the upload → detect → dedup → ticket workflow

pub mod dedup;
pub mod detection_bus;
pub mod detector;
pub mod geocode;
pub mod ingest;

pub use detection_bus::{DetectionBus, DetectionEvent};
pub use detector::{Detection, Detector, YoloClient};
pub use geocode::{GeoArea, GeocodeService};
pub use ingest::{IngestOutcome, IngestService, RejectedItem};
