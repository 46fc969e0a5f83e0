//! Application state shared across handlers.

use std::sync::Arc;

use quickcart_core::Money;

use crate::changes::ChangeFeed;
use crate::config::OrderServiceConfig;
use crate::db::OrderStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the order store and the change feed.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    delivery_fee: Money,
    store: Arc<dyn OrderStore>,
    changes: ChangeFeed,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Order service configuration
    /// * `store` - Order storage (`PgOrderStore` in production)
    #[must_use]
    pub fn new(config: &OrderServiceConfig, store: Arc<dyn OrderStore>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                delivery_fee: config.delivery_fee,
                store,
                changes: ChangeFeed::new(config.change_feed_capacity),
            }),
        }
    }

    /// Flat delivery fee used to price incoming carts.
    #[must_use]
    pub fn delivery_fee(&self) -> Money {
        self.inner.delivery_fee
    }

    /// Get a reference to the order store.
    #[must_use]
    pub fn store(&self) -> &dyn OrderStore {
        self.inner.store.as_ref()
    }

    /// Get a reference to the change feed.
    #[must_use]
    pub fn changes(&self) -> &ChangeFeed {
        &self.inner.changes
    }
}
