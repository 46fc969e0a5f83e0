//! Integration tests for QuickCart.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process tests (no external services)
//! cargo test -p quickcart-integration-tests
//!
//! # Include the PostgreSQL-backed tests
//! DATABASE_URL=postgres://localhost/quickcart_test \
//!     cargo test -p quickcart-integration-tests -- --include-ignored
//! ```
//!
//! # Test Categories
//!
//! - `checkout_flow` - Checkout orchestrator against a live order service
//! - `order_service_api` - Order service HTTP surface over the wire
//! - `postgres_store` - `PgOrderStore` against a real database

use std::net::SocketAddr;
use std::sync::Arc;

use quickcart_order_service::{AppState, MemoryOrderStore, OrderServiceConfig, OrderStore};
use tokio::task::JoinHandle;
use url::Url;

/// An order service running on an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub state: AppState,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start an order service over a fresh in-memory store.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> (Self, Arc<MemoryOrderStore>) {
        let store = Arc::new(MemoryOrderStore::new());
        let server = Self::start_with(OrderServiceConfig::local("postgres://unused"), store.clone()).await;
        (server, store)
    }

    /// Start an order service over `store` with `config`.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start_with(config: OrderServiceConfig, store: Arc<dyn OrderStore>) -> Self {
        let state = AppState::new(&config, store);
        let app = quickcart_order_service::app(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server error");
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    /// Absolute URL for `path` on this server.
    ///
    /// # Panics
    ///
    /// Panics if `path` does not form a valid URL.
    #[must_use]
    pub fn url(&self, path: &str) -> Url {
        Url::parse(&format!("http://{}{path}", self.addr)).expect("Invalid test URL")
    }

    /// URL of the create-order endpoint.
    #[must_use]
    pub fn create_order_url(&self) -> Url {
        self.url("/functions/create-order")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
