//! Core types for QuickCart.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod api;
pub mod cart;
pub mod customer;
pub mod id;
pub mod money;
pub mod order;
pub mod status;

pub use api::{CreateOrderRequest, CreateOrderResponse, CreatedOrder};
pub use cart::{Cart, CartLine, CartTotals, DEFAULT_DELIVERY_FEE, Quantity, QuantityError};
pub use customer::{CustomerField, CustomerInfo, CustomerInfoError};
pub use id::*;
pub use money::{Money, MoneyError};
pub use order::{NewOrder, NewOrderLine, Order, OrderLine};
pub use status::*;
