//! QuickCart Core - Shared domain types.
//!
//! This crate provides the types used across all QuickCart components:
//! - `checkout` - Client-side cart handling and checkout orchestration
//! - `order-service` - Order endpoint backed by `PostgreSQL`
//! - `cli` - Command-line tools for migrations
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. Cart totals are derived here so the client and the
//! order service always agree on what an order costs.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, money, cart, customer info, orders, statuses and
//!   the create-order wire format

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
