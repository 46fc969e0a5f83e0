//! QuickCart Order Service - the order endpoint behind checkout.
//!
//! Accepts a priced cart from the checkout client and writes the order, its
//! lines and the customer's profile in one `PostgreSQL` transaction. Also
//! serves order history, the admin order list with status changes, and a
//! live stream of order changes.
//!
//! The router is built by [`routes::app`] over an [`AppState`], so tests and
//! the binary share the same wiring; storage sits behind [`db::OrderStore`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod changes;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;

pub use changes::{ChangeEvent, ChangeFeed, ChangeKind, ChangeTable, Subscription};
pub use config::{ConfigError, OrderServiceConfig};
pub use db::{MemoryOrderStore, OrderStore, PgOrderStore, RepositoryError};
pub use error::AppError;
pub use models::AdminOrder;
pub use routes::app;
pub use state::AppState;
