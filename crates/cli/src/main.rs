//! Digital Store CLI - catalog inspection and price quotes.
//!
//! # Usage
//!
//! ```bash
//! # List the catalog, optionally filtered
//! ds-cli catalog list --search ai --category all
//!
//! # Show a product
//! ds-cli catalog show 3
//!
//! # Quote a cart: product 1, and two of product 4
//! ds-cli quote 1 4x2
//! ```
//!
//! # Commands
//!
//! - `catalog list` - List products matching a search and category
//! - `catalog show` - Show one product
//! - `quote` - Price a cart with tax and totals
//!
//! Every command reads `--catalog`, then `STOREFRONT_CATALOG_PATH`, then
//! falls back to the built-in sample catalog.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

use commands::quote::QuoteItem;

#[derive(Parser)]
#[command(name = "ds-cli")]
#[command(author, version, about = "Digital Store CLI tools")]
struct Cli {
    /// Catalog JSON file (defaults to the built-in sample catalog)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect the product catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Price a cart: items are product IDs, optionally with a quantity (4x2)
    Quote {
        #[arg(required = true)]
        items: Vec<QuoteItem>,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List products
    List {
        /// Text to find in product names and descriptions
        #[arg(short, long)]
        search: Option<String>,

        /// Category (`all`, `development`, `design`, `ai`, `tools`)
        #[arg(short, long, default_value = "all")]
        category: String,
    },
    /// Show one product
    Show {
        /// Product ID
        id: String,
    },
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = cli.catalog.as_deref();
    match cli.command {
        Commands::Catalog { action } => match action {
            CatalogAction::List { search, category } => {
                commands::catalog::list(catalog, search.as_deref(), &category)?;
            }
            CatalogAction::Show { id } => commands::catalog::show(catalog, &id)?,
        },
        Commands::Quote { items } => commands::quote::run(catalog, &items)?,
    }
    Ok(())
}
