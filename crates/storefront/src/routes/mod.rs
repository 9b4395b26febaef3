//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                 - Health check
//!
//! # Products
//! GET    /products               - Product listing (?q=&category=)
//! GET    /products/categories    - Category selector entries
//! GET    /products/{id}          - Product detail
//!
//! # Cart
//! GET    /cart                   - Cart contents and totals
//! GET    /cart/count             - Cart badge counts
//! GET    /cart/events            - Cart changes (server-sent events)
//! POST   /cart/add               - Add one unit of a product
//! POST   /cart/update            - Set a line's quantity
//! POST   /cart/remove            - Remove a line
//!
//! # Checkout
//! POST   /checkout               - Start a checkout session
//! GET    /checkout               - Current checkout state
//! DELETE /checkout               - Abandon the session
//! POST   /checkout/fields        - Update form fields
//! POST   /checkout/next          - Advance a step
//! POST   /checkout/back          - Go back a step
//! POST   /checkout/submit        - Place the order
//! ```

pub mod cart;
pub mod checkout;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::{cors_layer, request_id_middleware, trace_layer};
use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/categories", get(products::categories))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/count", get(cart::count))
        .route("/events", get(cart::events))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(checkout::show)
                .post(checkout::start)
                .delete(checkout::abandon),
        )
        .route("/fields", post(checkout::update_fields))
        .route("/next", post(checkout::next))
        .route("/back", post(checkout::back))
        .route("/submit", post(checkout::submit))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
}

/// Build the application: routes, state and the request middleware stack.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(state.config().cors_origin.as_deref());

    let app = routes()
        .with_state(state)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(trace_layer());

    match cors {
        Some(cors) => app.layer(cors),
        None => app,
    }
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::config::StorefrontConfig;
    use crate::middleware::REQUEST_ID_HEADER;

    fn app() -> Router {
        router(AppState::from_config(StorefrontConfig::default()).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let response = app()
            .oneshot(
                Request::get("/health")
                    .header(REQUEST_ID_HEADER, "req-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()[REQUEST_ID_HEADER], "req-123");
    }

    #[tokio::test]
    async fn test_cors_answers_preflight_outside_request_id() {
        let config = StorefrontConfig {
            cors_origin: Some("http://localhost:5173".to_string()),
            ..StorefrontConfig::default()
        };
        let app = router(AppState::from_config(config).unwrap());

        let response = app
            .oneshot(
                Request::options("/cart/add")
                    .header("origin", "http://localhost:5173")
                    .header("access-control-request-method", "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "http://localhost:5173"
        );
        assert!(response.headers().get(REQUEST_ID_HEADER).is_none());
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let response = app()
            .oneshot(Request::get("/admin").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
