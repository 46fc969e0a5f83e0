//! Checkout error types and the navigation signal derived from them.
//!
//! Every failure is terminal for the current attempt and surfaced to the
//! caller; none are retried here. The cart is preserved in all error cases.

use quickcart_core::{CustomerField, MoneyError, OrderId};
use thiserror::Error;

use crate::cache::CacheError;
use crate::endpoint::EndpointError;

/// Why a checkout attempt failed.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// No signed-in user. The caller should send the user to login.
    #[error("Please sign in to place an order")]
    NotAuthenticated,

    /// The cart has no lines.
    #[error("Your cart is empty")]
    EmptyCart,

    /// Shipping details are missing or malformed.
    #[error("Please check these fields: {}", join_fields(.0))]
    InvalidCustomerInfo(Vec<CustomerField>),

    /// The cart's total cannot be represented.
    #[error("Your cart total is too large to place: {0}")]
    TotalOutOfRange(#[from] MoneyError),

    /// The order endpoint refused the order.
    #[error("Order failed: {0}")]
    EndpointFailure(String),

    /// The order endpoint could not be reached or timed out.
    #[error("Network error: {0}")]
    Network(String),

    /// Another submission from this client is still in flight.
    #[error("An order is already being placed")]
    SubmissionInProgress,

    /// The cart cache could not be read.
    #[error("Cart storage error: {0}")]
    Cache(#[from] CacheError),
}

fn join_fields(fields: &[CustomerField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<EndpointError> for CheckoutError {
    fn from(err: EndpointError) -> Self {
        match err {
            EndpointError::Rejected(message) => Self::EndpointFailure(message),
            EndpointError::Network(message) => Self::Network(message),
        }
    }
}

/// Which view the UI should show after a checkout attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// The order was placed; show its confirmation.
    OrderConfirmation(OrderId),
    /// The user must sign in first.
    Login,
    /// Stay on the checkout view and show the error in place.
    StayOnCheckout,
}

impl Navigation {
    /// Map a `submit` result to the next view.
    #[must_use]
    pub fn for_result(result: &Result<OrderId, CheckoutError>) -> Self {
        match result {
            Ok(order_id) => Self::OrderConfirmation(order_id.clone()),
            Err(err) => err.navigation(),
        }
    }
}

impl CheckoutError {
    /// The view the UI should stay on or move to for this error.
    #[must_use]
    pub const fn navigation(&self) -> Navigation {
        match self {
            Self::NotAuthenticated => Navigation::Login,
            _ => Navigation::StayOnCheckout,
        }
    }
}
