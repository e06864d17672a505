use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;

use crate::handlers;

/// Identity-provider webhook endpoint. Unauthenticated: deliveries are
/// verified by signature, not bearer token.
pub fn webhook_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/clerk", post(handlers::handle_identity_webhook))
        .with_state(state)
}

pub fn user_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/medical-professionals", get(handlers::list_medical_professionals))
        .with_state(state)
}
