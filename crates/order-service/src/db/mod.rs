//! Order storage.
//!
//! # Database: `quickcart`
//!
//! ## Tables
//!
//! - `profiles` - Customer name and phone, keyed by user id
//! - `orders` - One row per checkout (total, status, delivery address)
//! - `order_items` - Lines of an order, written together with the order
//!
//! # Migrations
//!
//! Migrations are stored in `crates/order-service/migrations/` and run via:
//! ```bash
//! cargo run -p quickcart-cli -- migrate
//! ```

pub mod memory;
pub mod orders;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use quickcart_core::{NewOrder, Order, OrderId, OrderLine, OrderStatus, UserId};

use crate::models::AdminOrder;

pub use memory::MemoryOrderStore;
pub use orders::PgOrderStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// The write is not allowed in the row's current state.
    #[error("conflict: {0}")]
    Conflict(String),
}

/// Persistence for orders, their lines and the profile fields shown with
/// them.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Create an order and all of its lines as one unit of work, upserting
    /// the customer's profile when customer info is present. Either
    /// everything is written or nothing is.
    async fn create_order(&self, order: NewOrder) -> Result<Order, RepositoryError>;

    /// Fetch one order.
    async fn get_order(&self, id: &OrderId) -> Result<Option<Order>, RepositoryError>;

    /// Lines of an order.
    async fn order_lines(&self, id: &OrderId) -> Result<Vec<OrderLine>, RepositoryError>;

    /// A customer's orders, newest first.
    async fn orders_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, RepositoryError>;

    /// Every order with its profile and line count, newest first,
    /// optionally restricted to one status.
    async fn admin_orders(
        &self,
        status: Option<OrderStatus>,
    ) -> Result<Vec<AdminOrder>, RepositoryError>;

    /// Move an order to `status`.
    ///
    /// Fails with `NotFound` for an unknown order and `Conflict` when the
    /// order is in a terminal status.
    async fn update_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError>;

    /// Check the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Reject a transition out of a terminal status.
pub(crate) fn check_transition(
    current: OrderStatus,
    next: OrderStatus,
) -> Result<(), RepositoryError> {
    if current.can_transition_to(next) {
        Ok(())
    } else {
        Err(RepositoryError::Conflict(format!(
            "order is {current} and cannot move to {next}"
        )))
    }
}
