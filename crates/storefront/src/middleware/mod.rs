//! HTTP middleware for the storefront API.
//!
//! # Layer order (outermost first)
//!
//! 1. Sentry hub and transaction per request
//! 2. CORS, when a browser origin is configured; answers preflights itself
//! 3. `TraceLayer` span per request
//! 4. Request ID, recorded into that span

pub mod request_id;

use axum::http::{HeaderValue, Method, header};
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

pub use request_id::{REQUEST_ID_HEADER, RequestSpan, request_id_middleware};

/// Request tracing layer.
#[must_use]
pub fn trace_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>, RequestSpan> {
    TraceLayer::new_for_http().make_span_with(RequestSpan)
}

/// CORS layer for a browser front-end served from `origin`.
///
/// Returns `None` if no origin is configured or it is not a valid header
/// value.
#[must_use]
pub fn cors_layer(origin: Option<&str>) -> Option<CorsLayer> {
    let origin = origin?;
    match HeaderValue::from_str(origin) {
        Ok(value) => Some(
            CorsLayer::new()
                .allow_origin(value)
                .allow_methods([Method::GET, Method::POST, Method::DELETE])
                .allow_headers([header::CONTENT_TYPE]),
        ),
        Err(_) => {
            warn!(origin, "Ignoring invalid CORS origin");
            None
        }
    }
}
