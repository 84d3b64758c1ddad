//! Admin API Module
//!
//! Management surface for the admin dashboard: inspector accounts, the
//! resolution activity log, account search, and notification watermarks.

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

/// Admin router - every handler checks the admin role
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/admin", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/create-inspector", post(handler::create_inspector))
        .route("/inspector-actions", get(handler::inspector_actions))
        .route("/accounts", get(handler::list_accounts))
        .route("/last-seen", get(handler::get_last_seen))
        .route("/last-seen", put(handler::put_last_seen))
}
