use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn availability_routes(state: Arc<AppConfig>) -> Router {
    let public_routes = Router::new()
        .route("/medical/{external_id}", get(handlers::get_availability_for_professional));

    let protected_routes = Router::new()
        .route("/", post(handlers::create_availability))
        .route("/my-availability", get(handlers::get_my_availability))
        .route("/{slot_id}", delete(handlers::delete_availability))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
