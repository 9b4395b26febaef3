//! Stateful services shared across storefront views.
//!
//! # Services
//!
//! - `cart` - The process-wide cart store with change notification
//! - `checkout` - Checkout sessions and payment settlement

pub mod cart;
pub mod checkout;

pub use cart::CartStore;
pub use checkout::{CheckoutSession, PaymentProcessor, SettleOutcome, SimulatedProcessor};
