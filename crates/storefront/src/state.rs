//! Application state shared across handlers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use digital_store_core::{Catalog, CatalogError};
use tracing::info;

use crate::config::StorefrontConfig;
use crate::services::{CartStore, CheckoutSession, SimulatedProcessor};

/// Error building application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("failed to read catalog file: {0}")]
    CatalogFile(#[from] std::io::Error),
    #[error("invalid catalog: {0}")]
    Catalog(#[from] CatalogError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. It owns the catalog, the one
/// shared cart store, the payment processor and the current checkout
/// session, if any.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
    cart: CartStore,
    processor: SimulatedProcessor,
    checkout: Mutex<Option<CheckoutSession>>,
}

impl AppState {
    /// Create application state around an already loaded catalog.
    #[must_use]
    pub fn new(config: StorefrontConfig, catalog: Catalog) -> Self {
        let processor = SimulatedProcessor::new(config.settlement_delay);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                cart: CartStore::new(),
                processor,
                checkout: Mutex::new(None),
            }),
        }
    }

    /// Create application state, loading the catalog named by the
    /// configuration or the embedded sample catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog file cannot be read or is invalid.
    pub fn from_config(config: StorefrontConfig) -> Result<Self, StateError> {
        let catalog = match &config.catalog_path {
            Some(path) => {
                let json = std::fs::read_to_string(path)?;
                let catalog = Catalog::from_json(&json)?;
                info!(path = %path.display(), products = catalog.len(), "Catalog loaded");
                catalog
            }
            None => {
                let catalog = Catalog::sample()?;
                info!(products = catalog.len(), "Sample catalog loaded");
                catalog
            }
        };

        Ok(Self::new(config, catalog))
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get a reference to the shared cart store.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    /// Get a reference to the payment processor.
    #[must_use]
    pub fn processor(&self) -> &SimulatedProcessor {
        &self.inner.processor
    }

    /// The current checkout session, if one was started.
    #[must_use]
    pub fn checkout(&self) -> Option<CheckoutSession> {
        self.checkout_slot().clone()
    }

    /// Start a fresh checkout session, abandoning any previous one.
    pub fn start_checkout(&self) -> CheckoutSession {
        let session = CheckoutSession::new(self.inner.cart.clone());
        if let Some(previous) = self.checkout_slot().replace(session.clone()) {
            previous.abandon();
        }
        info!(session_id = %session.id(), "Checkout started");
        session
    }

    /// Abandon the current checkout session. Returns `false` if there was
    /// none.
    pub fn abandon_checkout(&self) -> bool {
        self.checkout_slot().take().is_some_and(|session| {
            session.abandon();
            true
        })
    }

    fn checkout_slot(&self) -> MutexGuard<'_, Option<CheckoutSession>> {
        self.inner
            .checkout
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
