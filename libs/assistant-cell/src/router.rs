use axum::{routing::post, Router};

use crate::handlers;

pub fn assistant_routes() -> Router {
    Router::new().route("/chat", post(handlers::chat_with_assistant))
}
