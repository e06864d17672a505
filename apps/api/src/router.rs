use std::sync::Arc;

use axum::{routing::get, Router};

use application_cell::router::application_routes;
use assistant_cell::router::assistant_routes;
use availability_cell::router::availability_routes;
use booking_cell::router::booking_routes;
use content_cell::router::{article_routes, category_routes};
use shared_config::AppConfig;
use user_cell::router::{user_routes, webhook_routes};

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "ThriveWell API is running!" }))
        .nest("/api/webhooks", webhook_routes(state.clone()))
        .nest("/api/users", user_routes(state.clone()))
        .nest("/api/categories", category_routes(state.clone()))
        .nest("/api/articles", article_routes(state.clone()))
        .nest("/api/applications", application_routes(state.clone()))
        .nest("/api/availability", availability_routes(state.clone()))
        .nest("/api/bookings", booking_routes(state.clone()))
        .nest("/api/ai", assistant_routes())
}
