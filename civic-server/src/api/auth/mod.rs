//! Auth API Module

mod handler;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::core::ServerState;

/// Auth router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/auth", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        // Public (allow-listed in the auth middleware)
        .route("/signup", post(handler::signup))
        .route("/login", post(handler::login))
        // Authenticated
        .route("/me", get(handler::me))
        // Admin account management
        .route("/users", get(handler::list_users))
        .route("/users/{id}", delete(handler::delete_user))
}
