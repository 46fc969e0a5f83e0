//! QuickCart Checkout - client-side cart and checkout orchestration.
//!
//! # Architecture
//!
//! The orchestrator never talks to a concrete backend. Its collaborators are
//! traits injected at construction:
//!
//! - [`SessionProvider`] - who is signed in
//! - [`OrderEndpoint`] - creates an order and its lines in one call
//! - [`CartCache`] - on-device storage of the cart between page loads
//!
//! Production adapters are [`HttpOrderEndpoint`] (`reqwest`) and
//! [`FileCartCache`]; tests use [`MemoryCartCache`] and [`StaticSession`].
//!
//! # Example
//!
//! ```rust,ignore
//! let config = CheckoutConfig::from_env()?;
//! let cache = Arc::new(FileCartCache::new(&config.cache_dir));
//! let store = CartStore::new(Arc::clone(&cache));
//! let checkout = CheckoutOrchestrator::new(
//!     StaticSession::signed_in(user_id),
//!     HttpOrderEndpoint::new(&config)?,
//!     cache,
//!     CheckoutPolicy::from(&config),
//! );
//!
//! let cart = store.load().await?;
//! match checkout.submit(&cart, Some(&customer)).await {
//!     Ok(order_id) => show_confirmation(order_id),
//!     Err(e) => show_error(e.navigation(), e.to_string()),
//! }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cache;
pub mod cart_store;
pub mod checkout;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod session;

pub use cache::{CART_CACHE_KEY, CacheError, CartCache, FileCartCache, MemoryCartCache};
pub use cart_store::CartStore;
pub use checkout::{CheckoutOrchestrator, CheckoutPolicy, CheckoutState};
pub use config::{CheckoutConfig, ConfigError};
pub use endpoint::{EndpointError, HttpOrderEndpoint, OrderEndpoint};
pub use error::{CheckoutError, Navigation};
pub use session::{SessionProvider, StaticSession};
