// HTTP routes configuration

use crate::core::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Public endpoints
        .route("/health", get(crate::handlers::health::health_handler))
        .route("/users", post(crate::handlers::users::register_handler))
        .route("/auth", post(crate::handlers::users::auth_handler))

        // Page lifecycle (email and password in the body)
        .route("/pages", post(crate::handlers::pages::create_page_handler))
        .route("/pages/rename", post(crate::handlers::pages::rename_page_handler))
        .route("/pages/delete", post(crate::handlers::pages::delete_page_handler))

        // Graph is public, ingest requires API key
        .route(
            "/measure",
            get(crate::handlers::measure::graph_handler)
                .post(crate::handlers::measure::record_handler),
        )

        // Admin endpoints (require API key)
        .route("/metrics", get(crate::handlers::metrics::metrics_handler))

        // 404 fallback for all unmatched routes
        .fallback(crate::handlers::fallback::fallback_handler)

        .with_state(state)
}
