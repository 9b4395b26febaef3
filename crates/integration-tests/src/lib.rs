//! Integration tests for Digital Store.
//!
//! Tests drive the storefront router in-process with
//! `tower::ServiceExt::oneshot`; no server or network is needed.
//!
//! ```bash
//! cargo test -p digital-store-integration-tests
//! ```

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use digital_store_core::{Cart, CartTotals, Catalog, ProductId};
use digital_store_storefront::config::StorefrontConfig;
use digital_store_storefront::routes;
use digital_store_storefront::state::AppState;
use serde_json::Value;
use tower::ServiceExt;

/// Upper bound on a single response body in tests.
const BODY_LIMIT: usize = 1024 * 1024;

/// A storefront app with its own cart and checkout state.
#[derive(Clone)]
pub struct TestApp {
    router: Router,
}

impl TestApp {
    /// App on the sample catalog with the default settlement delay.
    ///
    /// # Panics
    ///
    /// Panics if the sample catalog fails to load.
    #[must_use]
    pub fn new() -> Self {
        Self::with_settlement_delay(StorefrontConfig::default().settlement_delay)
    }

    /// App on the sample catalog with the given settlement delay.
    ///
    /// # Panics
    ///
    /// Panics if the sample catalog fails to load.
    #[must_use]
    pub fn with_settlement_delay(settlement_delay: Duration) -> Self {
        let config = StorefrontConfig {
            settlement_delay,
            ..StorefrontConfig::default()
        };
        let state = AppState::from_config(config).expect("sample catalog loads");
        Self {
            router: routes::router(state),
        }
    }

    /// Send a request and return the raw response.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the router fails.
    pub async fn send(&self, method: Method, uri: &str, body: Option<&Value>) -> axum::response::Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("valid request");

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    /// Send a request and decode the JSON response body (`Null` if empty).
    ///
    /// # Panics
    ///
    /// Panics if the body cannot be read or is not JSON.
    pub async fn request(&self, method: Method, uri: &str, body: Option<&Value>) -> (StatusCode, Value) {
        let response = self.send(method, uri, body).await;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), BODY_LIMIT)
            .await
            .expect("body readable");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("JSON body")
        };
        (status, json)
    }

    /// `GET` a JSON resource.
    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    /// `POST` a JSON body.
    pub async fn post(&self, uri: &str, body: &Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    /// `POST` with no body.
    pub async fn post_empty(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::POST, uri, None).await
    }

    /// `DELETE` a resource.
    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None).await
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Product ids from a product listing response, in order.
#[must_use]
pub fn product_ids(listing: &Value) -> Vec<i64> {
    listing["products"]
        .as_array()
        .map(|products| products.iter().filter_map(|p| p["id"].as_i64()).collect())
        .unwrap_or_default()
}

/// Totals the core pricing rules give for `(product id, quantity)` pairs
/// on the sample catalog.
///
/// # Panics
///
/// Panics if the sample catalog fails to load or an id is not in it.
#[must_use]
pub fn expected_totals(items: &[(i32, i64)]) -> CartTotals {
    let catalog = Catalog::sample().expect("sample catalog loads");
    let mut cart = Cart::new();
    for &(id, quantity) in items {
        let product = catalog.get(ProductId::new(id)).expect("product in sample catalog");
        cart.add(product);
        cart.set_quantity(product.id, quantity);
    }
    cart.totals()
}
