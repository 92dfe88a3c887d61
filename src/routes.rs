//! Route definitions and router setup
//!
//! The whole API is one endpoint selected by method and `?action=`.

use crate::action::{Action, ActionQuery};
use crate::dispatch::Reply;
use crate::error::{ApiResult, AppError};
use crate::state::SharedState;
use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, QueryRejection},
        Query, State,
    },
    http::{header, Method},
    routing::{any, get},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::MakeRequestUuid,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
    ServiceBuilderExt,
};
use tracing::Level;

/// Browsers may cache preflight answers for a day
const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(86_400);

/// Create the application router with all routes and middleware
pub fn create_router(state: SharedState) -> Router {
    // Build tracing/logging layer
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    // Build middleware stack
    let middleware = ServiceBuilder::new()
        .set_x_request_id(MakeRequestUuid)
        .layer(trace_layer)
        .layer(CompressionLayer::new())
        .layer(build_cors_layer())
        .propagate_x_request_id();

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // The action endpoint
        .route("/", any(handle_action))
        .route("/api", any(handle_action))
        // Apply middleware and state
        .layer(middleware)
        .with_state(state)
}

/// Wildcard CORS; every response carries `Access-Control-Allow-Origin: *`
/// and OPTIONS is answered here without reaching the dispatcher.
fn build_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(PREFLIGHT_MAX_AGE)
}

/// Decode the request into an [`Action`] and run it
///
/// Extractor rejections are folded into [`AppError`] so they answer with
/// the same JSON error body as every other failure.
async fn handle_action(
    State(state): State<SharedState>,
    method: Method,
    query: Result<Query<ActionQuery>, QueryRejection>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<Reply> {
    let Query(query) = query.map_err(|e| AppError::InvalidInput(e.body_text()))?;
    let body = body.map_err(|e| AppError::InvalidInput(e.body_text()))?;

    let action = Action::parse(&method, &query, &body)?;
    state.dispatcher.dispatch(action).await
}

/// Health check endpoint
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "success": true,
        "message": "Server is running fine.",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}
