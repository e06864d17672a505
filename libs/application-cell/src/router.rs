use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn application_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", post(handlers::submit_application))
        .route("/", get(handlers::get_pending_applications))
        .route("/my-status", get(handlers::get_my_application_status))
        .route("/{application_id}/approve", put(handlers::approve_application))
        .route("/{application_id}/reject", put(handlers::reject_application))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
