//! Live Detection Handlers

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    Json,
    body::Body,
    extract::{Path, State},
    response::{
        Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use futures::{Stream, StreamExt};
use tokio::sync::broadcast;

use shared::response::MessageResponse;

use crate::core::ServerState;
use crate::services::DetectionEvent;
use crate::utils::{AppError, AppResult};

/// Explicit heartbeat cadence; consumers treat a silent stream as dropped
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

/// GET /api/live/events - SSE stream of detection events
///
/// Emits `{"heartbeat": true}` during quiet periods. A lagging consumer
/// gets a gap notice instead of stalling the publisher.
pub async fn events(
    State(state): State<ServerState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.detection_bus.subscribe();

    let stream = futures::stream::unfold(rx, |mut rx| async move {
        let event = match tokio::time::timeout(HEARTBEAT_INTERVAL, rx.recv()).await {
            // Quiet period: keep the connection visibly alive
            Err(_) => DetectionEvent::heartbeat(),
            Ok(Ok(event)) => event,
            Ok(Err(broadcast::error::RecvError::Lagged(skipped))) => {
                DetectionEvent::detection(format!("{} event(s) skipped", skipped), None)
            }
            Ok(Err(broadcast::error::RecvError::Closed)) => return None,
        };
        Some((event, rx))
    })
    .map(|event| {
        let payload =
            serde_json::to_string(&event).unwrap_or_else(|_| "{\"heartbeat\":true}".to_string());
        Ok(Event::default().data(payload))
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// GET /api/live/feed - proxied MJPEG camera stream
pub async fn feed(State(state): State<ServerState>) -> AppResult<Response> {
    let url = state
        .detector
        .live_feed_url()
        .ok_or_else(|| AppError::upstream("Live feed not available".to_string()))?;

    let upstream = reqwest::get(&url)
        .await
        .map_err(|e| AppError::upstream(format!("Camera stream unreachable: {}", e)))?
        .error_for_status()
        .map_err(|e| AppError::upstream(format!("Camera stream error: {}", e)))?;

    let content_type = upstream
        .headers()
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("multipart/x-mixed-replace; boundary=frame")
        .to_string();

    state.detection_bus.set_active(true);

    Response::builder()
        .header(http::header::CONTENT_TYPE, content_type)
        .body(Body::from_stream(upstream.bytes_stream()))
        .map_err(|e| AppError::internal(format!("Failed to build response: {}", e)))
}

/// GET /api/live/stop - end the live camera session
pub async fn stop(State(state): State<ServerState>) -> AppResult<Json<MessageResponse>> {
    if let Err(e) = state.detector.stop_live().await {
        tracing::warn!(error = %e, "Detector stop request failed");
    }
    state.detection_bus.set_active(false);
    state
        .detection_bus
        .publish(DetectionEvent::detection("Camera session stopped", None));

    Ok(Json(MessageResponse::success("Camera stopped")))
}

/// GET /api/live/capture/{filename} - one captured frame
pub async fn capture(
    State(state): State<ServerState>,
    Path(filename): Path<String>,
) -> AppResult<Response> {
    // The filename came over the wire: keep it inside the media directory
    if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
        return Err(AppError::validation("Invalid capture filename".to_string()));
    }

    let path = state.ingest.media_dir().join(&filename);
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| AppError::not_found(format!("Capture {} not found", filename)))?;

    let mime = mime_guess::from_path(&path).first_or_octet_stream();

    Response::builder()
        .header(http::header::CONTENT_TYPE, mime.as_ref())
        .body(Body::from(bytes))
        .map_err(|e| AppError::internal(format!("Failed to build response: {}", e)))
}
