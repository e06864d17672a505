use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn category_routes(state: Arc<AppConfig>) -> Router {
    let public_routes = Router::new()
        .route("/", get(handlers::get_categories))
        .route("/{slug}", get(handlers::get_category_by_slug))
        .route("/{slug}/articles", get(handlers::get_articles_for_category));

    let protected_routes = Router::new()
        .route("/", post(handlers::create_category))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

pub fn article_routes(state: Arc<AppConfig>) -> Router {
    let public_routes = Router::new()
        .route("/", get(handlers::get_published_articles))
        // Same placeholder name as the protected writes below; merged method
        // routers must agree on it.
        .route("/{id}", get(handlers::get_article_by_slug));

    let protected_routes = Router::new()
        .route("/", post(handlers::create_article))
        .route("/my-articles", get(handlers::get_my_articles))
        .route("/{id}", put(handlers::update_article).delete(handlers::delete_article))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
