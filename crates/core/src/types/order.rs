//! Persisted orders and their lines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::cart::{Cart, Quantity};
use super::customer::CustomerInfo;
use super::id::{OrderId, ProductId, UserId};
use super::money::{Money, MoneyError};
use super::status::OrderStatus;

/// A completed checkout as stored by the data store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub total: Money,
    pub status: OrderStatus,
    pub address: Option<String>,
    #[serde(rename = "pincode")]
    pub postal_code: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One product entry of an [`Order`]. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: Quantity,
    #[serde(rename = "price")]
    pub unit_price: Money,
}

/// Everything needed to create an order and its lines in one unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: UserId,
    pub total: Money,
    pub status: OrderStatus,
    pub customer: Option<CustomerInfo>,
    pub lines: Vec<NewOrderLine>,
}

/// An order line before the order id is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderLine {
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub unit_price: Money,
}

impl NewOrder {
    /// Build an order from a cart, pricing it with `delivery_fee`.
    ///
    /// New orders start out as [`OrderStatus::Processing`].
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::TooLarge` if the order total exceeds [`Money::MAX`].
    pub fn from_cart(
        user_id: UserId,
        cart: &Cart,
        delivery_fee: Money,
        customer: Option<CustomerInfo>,
    ) -> Result<Self, MoneyError> {
        let total = cart.totals(delivery_fee)?.total;
        let lines = cart
            .lines()
            .iter()
            .map(|line| NewOrderLine {
                product_id: line.product_id.clone(),
                quantity: line.quantity,
                unit_price: line.unit_price,
            })
            .collect();

        Ok(Self {
            user_id,
            total,
            status: OrderStatus::Processing,
            customer,
            lines,
        })
    }
}

impl NewOrderLine {
    /// Attach the order id assigned by the store.
    #[must_use]
    pub fn into_line(self, order_id: OrderId) -> OrderLine {
        OrderLine {
            order_id,
            product_id: self.product_id,
            quantity: self.quantity,
            unit_price: self.unit_price,
        }
    }
}
