//! Search and category filtering over the catalog.

use super::{Catalog, Product};
use crate::types::CategoryFilter;

/// A shopper's catalog query: free text plus a category selector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    /// Free-text search; empty matches everything.
    pub text: String,
    /// Category selector.
    pub category: CategoryFilter,
}

impl CatalogQuery {
    /// Create a query.
    #[must_use]
    pub fn new(text: impl Into<String>, category: CategoryFilter) -> Self {
        Self {
            text: text.into(),
            category,
        }
    }

    /// Whether a product satisfies both the text and category predicates.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        let needle = self.text.to_lowercase();
        let text_match = product.name.to_lowercase().contains(&needle)
            || product.description.to_lowercase().contains(&needle);
        text_match && self.category.matches(product.category)
    }
}

/// Products matching `query`, in catalog order.
///
/// The lowercased query must be a substring of the lowercased name or
/// description; an empty query is a substring of everything.
#[must_use]
pub fn filter_products<'a>(catalog: &'a Catalog, query: &CatalogQuery) -> Vec<&'a Product> {
    catalog
        .products()
        .iter()
        .filter(|product| query.matches(product))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{Category, ProductId};

    fn ids(products: &[&Product]) -> Vec<i32> {
        products.iter().map(|p| p.id.as_i32()).collect()
    }

    #[test]
    fn test_empty_query_all_returns_full_catalog_in_order() {
        let catalog = Catalog::sample().unwrap();
        let result = filter_products(&catalog, &CatalogQuery::default());
        assert_eq!(ids(&result), (1..=12).collect::<Vec<_>>());
    }

    #[test]
    fn test_text_matches_name_or_description() {
        let catalog = Catalog::sample().unwrap();
        // "AI Image Generator" by name, "Machine Learning Toolkit" by "train".
        let result = filter_products(&catalog, &CatalogQuery::new("ai", CategoryFilter::All));
        assert_eq!(ids(&result), vec![3, 8]);
    }

    #[test]
    fn test_text_is_case_insensitive() {
        let catalog = Catalog::sample().unwrap();
        let lower = filter_products(&catalog, &CatalogQuery::new("design", CategoryFilter::All));
        let upper = filter_products(&catalog, &CatalogQuery::new("DESIGN", CategoryFilter::All));
        assert_eq!(ids(&lower), ids(&upper));
        assert!(ids(&lower).contains(&2));
        assert!(ids(&lower).contains(&5));
    }

    #[test]
    fn test_category_only() {
        let catalog = Catalog::sample().unwrap();
        let result = filter_products(
            &catalog,
            &CatalogQuery::new("", CategoryFilter::Only(Category::Tools)),
        );
        assert_eq!(ids(&result), vec![6, 7, 10, 12]);
    }

    #[test]
    fn test_predicates_are_anded() {
        let catalog = Catalog::sample().unwrap();
        let result = filter_products(
            &catalog,
            &CatalogQuery::new("pro", CategoryFilter::Only(Category::Development)),
        );
        // "Pro", "productivity", "professional".
        assert_eq!(ids(&result), vec![1, 4, 11]);
        assert!(result.iter().all(|p| p.category == Category::Development));
    }

    #[test]
    fn test_no_match() {
        let catalog = Catalog::sample().unwrap();
        let result = filter_products(&catalog, &CatalogQuery::new("zzz", CategoryFilter::All));
        assert!(result.is_empty());
        assert!(catalog.find(ProductId::new(1)).is_some());
    }
}
