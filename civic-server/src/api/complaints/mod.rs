//! Complaints API Module
//!
//! Ticket listings (nested and flattened), statistics, batch upload, media
//! serving, geocoding, and ticket mutations.

mod handler;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post},
};

use crate::core::ServerState;

/// Complaints router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/complaints", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/tickets", get(handler::list_tickets))
        .route("/tickets/{ticket_id}", get(handler::get_ticket))
        .route("/tickets/{ticket_id}", delete(handler::delete_ticket))
        .route("/tickets/{ticket_id}/location", patch(handler::update_location))
        .route("/tickets/{ticket_id}/status", patch(handler::update_status))
        .route("/feed", get(handler::feed))
        .route("/stats", get(handler::stats))
        .route("/geocode", get(handler::geocode))
        .route("/images/{id}", get(handler::get_image))
        .route(
            "/batch",
            post(handler::batch_upload).layer(DefaultBodyLimit::max(256 * 1024 * 1024)),
        )
}
