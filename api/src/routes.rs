use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Slack on top of the OCR timeout before a request is abandoned
const REQUEST_TIMEOUT_SLACK_SECONDS: u64 = 10;

/// Create the main application router with all routes and middleware
#[tracing::instrument(skip(state))]
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let request_timeout =
        Duration::from_secs(state.config.ocr.timeout_seconds + REQUEST_TIMEOUT_SLACK_SECONDS);
    let max_upload_bytes = state.config.server.max_upload_bytes;

    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ping", get(handlers::health::ping))
        .route("/metrics", get(handlers::metrics::metrics_handler));

    let timer_routes = Router::new()
        .route(
            "/api/timers",
            get(handlers::timers::list_timers).post(handlers::timers::create_timer),
        )
        .route(
            "/api/timers/clear-finished",
            post(handlers::timers::clear_finished),
        )
        .route("/api/timers/adjust", post(handlers::timers::adjust_timers))
        .route("/api/timers/import", post(handlers::timers::import_timers))
        .route(
            "/api/timers/:id",
            get(handlers::timers::get_timer).delete(handlers::timers::delete_timer),
        )
        .route("/api/timers/:id/clear", post(handlers::timers::clear_timer))
        .layer(
            ServiceBuilder::new()
                .layer(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(max_upload_bytes)),
        );

    Router::new()
        .merge(public_routes)
        .merge(timer_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(request_timeout))
                .layer(cors),
        )
        .with_state(state)
}
