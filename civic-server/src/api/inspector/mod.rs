//! Inspector API Module

mod handler;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::core::ServerState;

/// Inspector router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/inspector", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/tickets", get(handler::list_assigned))
        .route(
            "/sub-tickets/{sub_id}/resolve",
            post(handler::resolve).layer(DefaultBodyLimit::max(64 * 1024 * 1024)),
        )
}
