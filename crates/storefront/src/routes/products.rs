//! Product route handlers.

use std::str::FromStr;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use digital_store_core::catalog::{CatalogQuery, filter_products};
use digital_store_core::{Category, CategoryFilter, Price, Product, ProductId};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Product display data.
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub price_display: String,
    pub category: Category,
    pub image: String,
    /// Image to show if `image` fails to load.
    pub fallback_image: String,
    pub description: String,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            price_display: product.price.to_string(),
            category: product.category,
            image: product.image.clone(),
            fallback_image: product.display_image(true).to_string(),
            description: product.description.clone(),
        }
    }
}

/// Filtered product listing.
#[derive(Debug, Serialize)]
pub struct ProductListView {
    pub query: String,
    pub category: &'static str,
    pub count: usize,
    pub products: Vec<ProductView>,
}

/// Category selector entry.
#[derive(Debug, Serialize)]
pub struct CategoryOption {
    pub key: &'static str,
    pub label: String,
}

impl From<CategoryFilter> for CategoryOption {
    fn from(filter: CategoryFilter) -> Self {
        Self {
            key: filter.key(),
            label: filter.label(),
        }
    }
}

/// Query parameters for product listing.
#[derive(Debug, Default, Deserialize)]
pub struct ProductsQuery {
    /// Free-text search.
    pub q: Option<String>,
    /// Category key, or `all`.
    pub category: Option<String>,
}

/// List products matching the search text and category.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<ProductsQuery>,
) -> Result<Json<ProductListView>> {
    let category = match params.category.as_deref() {
        None | Some("") => CategoryFilter::All,
        Some(key) => {
            CategoryFilter::from_str(key).map_err(|e| AppError::BadRequest(e.to_string()))?
        }
    };
    let query = CatalogQuery::new(params.q.unwrap_or_default(), category);

    let products: Vec<ProductView> = filter_products(state.catalog(), &query)
        .into_iter()
        .map(ProductView::from)
        .collect();

    Ok(Json(ProductListView {
        query: query.text,
        category: category.key(),
        count: products.len(),
        products,
    }))
}

/// Category selector options, starting with `all`.
pub async fn categories() -> Json<Vec<CategoryOption>> {
    Json(
        CategoryFilter::options()
            .into_iter()
            .map(CategoryOption::from)
            .collect(),
    )
}

/// Product detail.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductView>> {
    let id: ProductId = id
        .parse()
        .map_err(|_| AppError::NotFound(format!("product {id}")))?;
    let product = state.catalog().get(id)?;
    Ok(Json(ProductView::from(product)))
}
