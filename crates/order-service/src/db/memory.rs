//! In-process order store for tests and local runs without a database.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use quickcart_core::{NewOrder, Order, OrderId, OrderLine, OrderStatus, UserId};

use super::{OrderStore, RepositoryError, check_transition};
use crate::models::AdminOrder;

#[derive(Debug, Clone)]
struct Profile {
    full_name: String,
    phone: String,
}

#[derive(Debug, Default)]
struct Tables {
    profiles: HashMap<UserId, Profile>,
    /// Insertion order; newest last.
    orders: Vec<Order>,
    lines: Vec<OrderLine>,
}

/// Order store holding everything in memory behind one lock, so each write
/// is applied as a whole.
#[derive(Debug, Default)]
pub struct MemoryOrderStore {
    tables: Mutex<Tables>,
    fail_writes: Mutex<bool>,
}

impl MemoryOrderStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail, as a lost database would.
    pub fn fail_writes(&self, fail: bool) {
        *self
            .fail_writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = fail;
    }

    /// Number of stored orders.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.tables().orders.len()
    }

    /// Number of stored order lines across all orders.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.tables().lines.len()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_writable(&self) -> Result<(), RepositoryError> {
        if *self
            .fail_writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
        {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

fn newest_first(orders: impl Iterator<Item = Order>) -> Vec<Order> {
    let mut orders: Vec<Order> = orders.collect();
    orders.reverse();
    orders
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn create_order(&self, new: NewOrder) -> Result<Order, RepositoryError> {
        self.check_writable()?;

        let id = OrderId::new(Uuid::new_v4().to_string());
        let order = Order {
            id: id.clone(),
            user_id: new.user_id.clone(),
            total: new.total,
            status: new.status,
            address: new.customer.as_ref().map(|c| c.address.trim().to_string()),
            postal_code: new.customer.as_ref().map(|c| c.postal_code.trim().to_string()),
            created_at: Utc::now(),
        };

        let mut tables = self.tables();
        if let Some(customer) = &new.customer {
            tables.profiles.insert(
                new.user_id.clone(),
                Profile {
                    full_name: customer.name.trim().to_string(),
                    phone: customer.phone.trim().to_string(),
                },
            );
        }
        tables.orders.push(order.clone());
        tables
            .lines
            .extend(new.lines.into_iter().map(|line| line.into_line(id.clone())));

        Ok(order)
    }

    async fn get_order(&self, id: &OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.tables().orders.iter().find(|o| &o.id == id).cloned())
    }

    async fn order_lines(&self, id: &OrderId) -> Result<Vec<OrderLine>, RepositoryError> {
        Ok(self
            .tables()
            .lines
            .iter()
            .filter(|l| &l.order_id == id)
            .cloned()
            .collect())
    }

    async fn orders_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, RepositoryError> {
        let tables = self.tables();
        Ok(newest_first(
            tables
                .orders
                .iter()
                .filter(|o| &o.user_id == user_id)
                .cloned(),
        ))
    }

    async fn admin_orders(
        &self,
        status: Option<OrderStatus>,
    ) -> Result<Vec<AdminOrder>, RepositoryError> {
        let tables = self.tables();
        let orders = newest_first(
            tables
                .orders
                .iter()
                .filter(|o| status.is_none_or(|s| o.status == s))
                .cloned(),
        );

        Ok(orders
            .into_iter()
            .map(|order| {
                let item_count = tables.lines.iter().filter(|l| l.order_id == order.id).count();
                let profile = tables.profiles.get(&order.user_id).cloned();
                AdminOrder::new(
                    order,
                    u32::try_from(item_count).unwrap_or(u32::MAX),
                    profile.as_ref().map(|p| p.full_name.clone()),
                    profile.map(|p| p.phone),
                )
            })
            .collect())
    }

    async fn update_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        self.check_writable()?;

        let mut tables = self.tables();
        let order = tables
            .orders
            .iter_mut()
            .find(|o| &o.id == id)
            .ok_or(RepositoryError::NotFound)?;

        check_transition(order.status, status)?;
        order.status = status;
        Ok(order.clone())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        self.check_writable()
    }
}
