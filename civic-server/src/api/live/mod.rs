//! Live Detection API Module
//!
//! Relay over the external detection service: the MJPEG camera feed is
//! proxied through, detection events stream out as SSE, and captured frames
//! are served from the media directory.

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

/// Live router - public (event streams cannot carry auth headers)
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/live", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/events", get(handler::events))
        .route("/feed", get(handler::feed))
        .route("/stop", get(handler::stop))
        .route("/capture/{filename}", get(handler::capture))
}
