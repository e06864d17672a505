use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn booking_routes(state: Arc<AppConfig>) -> Router {
    let public_routes = Router::new()
        .route("/medical/{external_id}", get(handlers::get_bookings_for_professional));

    let protected_routes = Router::new()
        .route("/", post(handlers::create_booking))
        .route("/my-bookings", get(handlers::get_my_bookings))
        .route("/my-schedule", get(handlers::get_my_schedule))
        .route("/{booking_id}/cancel", put(handlers::cancel_booking))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
