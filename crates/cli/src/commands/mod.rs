//! CLI command implementations.

pub mod catalog;
pub mod quote;

use std::path::{Path, PathBuf};

use digital_store_core::{Catalog, CatalogError};
use thiserror::Error;

/// Environment variable naming a catalog file, shared with the storefront.
const CATALOG_PATH_ENV: &str = "STOREFRONT_CATALOG_PATH";

/// Errors loading the catalog a command works on.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Load the catalog from `path`, then `STOREFRONT_CATALOG_PATH`, falling
/// back to the embedded sample catalog.
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog, LoadError> {
    dotenvy::dotenv().ok();

    let path = path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CATALOG_PATH_ENV).map(PathBuf::from))
        .filter(|path| !path.as_os_str().is_empty());

    let Some(path) = path else {
        tracing::debug!("Using sample catalog");
        return Ok(Catalog::sample()?);
    };

    tracing::debug!(path = %path.display(), "Loading catalog");
    let json = std::fs::read_to_string(&path).map_err(|source| LoadError::Read {
        path: path.clone(),
        source,
    })?;
    Ok(Catalog::from_json(&json)?)
}
