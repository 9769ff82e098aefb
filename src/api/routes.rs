use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::AppState;
use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/add_recommendation/", post(handlers::add_recommendation))
        .route(
            "/get_recommendations/:user_id",
            get(handlers::get_recommendations),
        )
        .route(
            "/get_all_recommendations/",
            get(handlers::get_all_recommendations),
        )
        .route(
            "/remove_recommendation/:user_id/:category",
            delete(handlers::remove_recommendation),
        )
        .layer(
            // request id first so the trace span can pick it up
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
        )
        .with_state(state)
}
