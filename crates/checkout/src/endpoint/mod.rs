//! The remote order-creation endpoint.
//!
//! One call creates an order and all of its lines, or nothing. The
//! orchestrator relies on that and never writes order rows itself.

mod http;

pub use http::HttpOrderEndpoint;

use std::sync::Arc;

use async_trait::async_trait;
use quickcart_core::{CreateOrderRequest, OrderId};
use thiserror::Error;

/// Errors from an order endpoint call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EndpointError {
    /// The endpoint answered and refused the order.
    #[error("{0}")]
    Rejected(String),

    /// The endpoint could not be reached, or the call timed out.
    #[error("{0}")]
    Network(String),
}

/// Creates orders atomically on the caller's behalf.
#[async_trait]
pub trait OrderEndpoint: Send + Sync {
    /// Create an order and its lines from a cart snapshot.
    async fn create_order(&self, request: &CreateOrderRequest) -> Result<OrderId, EndpointError>;
}

#[async_trait]
impl<T: OrderEndpoint + ?Sized> OrderEndpoint for Arc<T> {
    async fn create_order(&self, request: &CreateOrderRequest) -> Result<OrderId, EndpointError> {
        (**self).create_order(request).await
    }
}
