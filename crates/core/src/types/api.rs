//! Request and response bodies of the create-order endpoint.
//!
//! Shared by the checkout client and the order service so both sides agree on
//! the JSON shape: `{ items, userId, customerInfo?, total? }` in, and
//! `{ success: true, order: { id } }` or `{ success: false, error }` out.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::cart::{Cart, CartLine};
use super::customer::CustomerInfo;
use super::id::{OrderId, ProductId, UserId};
use super::money::Money;

/// Body of `POST /functions/create-order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub items: Vec<CartLine>,
    #[serde(default = "blank_user")]
    pub user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_info: Option<CustomerInfo>,
    /// Total the client computed; the service rejects the order if its own
    /// computation disagrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<Money>,
}

fn blank_user() -> UserId {
    UserId::new("")
}

impl CreateOrderRequest {
    /// Build a request from a cart snapshot.
    #[must_use]
    pub fn new(
        cart: &Cart,
        user_id: UserId,
        total: Money,
        customer_info: Option<CustomerInfo>,
    ) -> Self {
        Self {
            items: cart.lines().to_vec(),
            user_id,
            customer_info,
            total: Some(total),
        }
    }

    /// The items as a cart value.
    #[must_use]
    pub fn cart(&self) -> Cart {
        Cart::from_lines(self.items.iter().cloned())
    }

    /// The first product listed more than once in `items`, if any.
    #[must_use]
    pub fn duplicate_product(&self) -> Option<&ProductId> {
        let mut seen = HashSet::new();
        self.items
            .iter()
            .map(|item| &item.product_id)
            .find(|id| !seen.insert(*id))
    }
}

/// The `order` object of a successful response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedOrder {
    pub id: OrderId,
}

/// Body returned by the create-order endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrderResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<CreatedOrder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CreateOrderResponse {
    /// A success envelope.
    #[must_use]
    pub const fn created(id: OrderId) -> Self {
        Self {
            success: true,
            order: Some(CreatedOrder { id }),
            error: None,
        }
    }

    /// A failure envelope.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            order: None,
            error: Some(message.into()),
        }
    }

    /// Collapse the envelope into the created order id or the error message.
    ///
    /// # Errors
    ///
    /// Returns the endpoint's message when `success` is false, or a generic
    /// message when a success envelope carries no order.
    pub fn into_result(self) -> Result<OrderId, String> {
        match (self.success, self.order) {
            (true, Some(order)) => Ok(order.id),
            (true, None) => Err("order endpoint returned no order".to_string()),
            (false, _) => Err(self
                .error
                .unwrap_or_else(|| "order creation failed".to_string())),
        }
    }
}
