use std::{any::Any, time::Duration};

use axum::{
    Json, Router,
    http::{HeaderName, HeaderValue, Method, Request, Response, StatusCode, Uri, header},
    response::IntoResponse,
    routing::get,
};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::{
    response::{ErrorResponse, MessageResponse},
    services::upload_service::PUBLIC_PREFIX,
    state::AppState,
};

pub mod doc;
pub mod health;
pub mod params;
pub mod robots;
pub mod upload;
pub mod users;

const JSON_BODY_LIMIT: usize = 1024 * 1024;
const CONCURRENCY_LIMIT: usize = 100;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router(upload_body_limit: usize) -> Router<AppState> {
    let json_routes = Router::new()
        .nest("/robots", robots::router())
        .nest("/users", users::router())
        .layer(RequestBodyLimitLayer::new(JSON_BODY_LIMIT));

    json_routes.nest("/upload", upload::router(upload_body_limit))
}

/// The whole application: API, uploaded files, docs and the cross-cutting layers.
pub fn create_app(state: AppState) -> Router {
    let request_id_header = HeaderName::from_static("x-request-id");
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<_>| {
            let request_id = request
                .headers()
                .get("x-request-id")
                .and_then(|value| value.to_str().ok())
                .unwrap_or("-");
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id
            )
        })
        .on_request(|request: &Request<_>, _span: &tracing::Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "request started"
            );
        })
        .on_response(|response: &Response<_>, latency: Duration, _span: &tracing::Span| {
            tracing::info!(
                status = %response.status(),
                ms = %latency.as_millis(),
                "request finished"
            );
        });

    let cors = cors_layer(&state.config.cors_origin);
    let upload_dir = state.config.upload_dir.clone();
    let upload_body_limit = state.config.upload_body_limit();

    Router::new()
        .route("/", get(health::welcome))
        .route("/health", get(health::health_check))
        .nest("/api", create_api_router(upload_body_limit))
        .nest_service(PUBLIC_PREFIX, ServeDir::new(upload_dir))
        .merge(doc::scalar_docs())
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
        .layer(trace_layer)
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(ConcurrencyLimitLayer::new(CONCURRENCY_LIMIT))
        .with_state(state)
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    match HeaderValue::from_str(origin) {
        Ok(value) => layer.allow_origin(value),
        Err(_) => {
            tracing::warn!(origin, "CORS_ORIGIN is not a valid header value, cross-origin requests disabled");
            layer
        }
    }
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> axum::response::Response {
    let details = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(details, "handler panicked");

    let body = ErrorResponse {
        message: "Something went wrong!".to_string(),
        errors: None,
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

async fn not_found(uri: Uri) -> (StatusCode, Json<MessageResponse>) {
    tracing::debug!(path = uri.path(), "no route");
    (StatusCode::NOT_FOUND, Json(MessageResponse::new("Not Found")))
}
