use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::features::categories::handlers;
use crate::features::categories::services::CategoryService;

/// Create routes for the categories feature
pub fn routes(service: Arc<CategoryService>) -> Router {
    Router::new()
        .route("/categories", post(handlers::create_category))
        .route(
            "/categories/{id}",
            get(handlers::get_category).delete(handlers::delete_category),
        )
        .route("/categories/{id}/move", put(handlers::move_category))
        .with_state(service)
}
