//! `PostgreSQL` order store.
//!
//! Queries are checked at runtime (`query_as` + `FromRow`) so the crate
//! builds without a database or an offline query cache.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;
use uuid::Uuid;

use quickcart_core::{
    Money, NewOrder, Order, OrderId, OrderLine, OrderStatus, ProductId, Quantity, UserId,
};

use super::{OrderStore, RepositoryError, check_transition};
use crate::models::AdminOrder;

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    user_id: String,
    total: Decimal,
    status: String,
    address: Option<String>,
    pincode: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let total = Money::new(row.total)
            .map_err(|e| RepositoryError::DataCorruption(format!("order {}: {e}", row.id)))?;
        let status = row
            .status
            .parse::<OrderStatus>()
            .map_err(|e| RepositoryError::DataCorruption(format!("order {}: {e}", row.id)))?;

        Ok(Self {
            id: OrderId::new(row.id),
            user_id: UserId::new(row.user_id),
            total,
            status,
            address: row.address,
            postal_code: row.pincode,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AdminOrderRow {
    #[sqlx(flatten)]
    order: OrderRow,
    item_count: i64,
    full_name: Option<String>,
    phone: Option<String>,
}

impl TryFrom<AdminOrderRow> for AdminOrder {
    type Error = RepositoryError;

    fn try_from(row: AdminOrderRow) -> Result<Self, Self::Error> {
        let item_count = u32::try_from(row.item_count).map_err(|_| {
            RepositoryError::DataCorruption(format!("order {}: bad item count", row.order.id))
        })?;
        Ok(Self::new(
            row.order.try_into()?,
            item_count,
            row.full_name,
            row.phone,
        ))
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderLineRow {
    order_id: String,
    product_id: String,
    quantity: i32,
    price: Decimal,
}

impl TryFrom<OrderLineRow> for OrderLine {
    type Error = RepositoryError;

    fn try_from(row: OrderLineRow) -> Result<Self, Self::Error> {
        let corrupt =
            |e: String| RepositoryError::DataCorruption(format!("order {}: {e}", row.order_id));
        let quantity = Quantity::new(i64::from(row.quantity)).map_err(|e| corrupt(e.to_string()))?;
        let unit_price = Money::new(row.price).map_err(|e| corrupt(e.to_string()))?;

        Ok(Self {
            order_id: OrderId::new(row.order_id),
            product_id: ProductId::new(row.product_id),
            quantity,
            unit_price,
        })
    }
}

const ORDER_COLUMNS: &str = "o.id, o.user_id, o.total, o.status, o.address, o.pincode, o.created_at";

// =============================================================================
// Repository
// =============================================================================

/// Order store backed by `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    /// Create a new order store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    #[instrument(skip(self, order), fields(user_id = %order.user_id, line_count = order.lines.len()))]
    async fn create_order(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        let id = OrderId::new(Uuid::new_v4().to_string());
        let mut tx = self.pool.begin().await?;

        if let Some(customer) = &order.customer {
            sqlx::query(
                r"
                INSERT INTO profiles (id, full_name, phone, updated_at)
                VALUES ($1, $2, $3, NOW())
                ON CONFLICT (id) DO UPDATE
                SET full_name = EXCLUDED.full_name,
                    phone = EXCLUDED.phone,
                    updated_at = NOW()
                ",
            )
            .bind(&order.user_id)
            .bind(customer.name.trim())
            .bind(customer.phone.trim())
            .execute(&mut *tx)
            .await?;
        }

        let row = sqlx::query_as::<_, OrderRow>(
            r"
            INSERT INTO orders AS o (id, user_id, total, status, address, pincode)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING o.id, o.user_id, o.total, o.status, o.address, o.pincode, o.created_at
            ",
        )
        .bind(&id)
        .bind(&order.user_id)
        .bind(order.total.amount())
        .bind(order.status.as_str())
        .bind(order.customer.as_ref().map(|c| c.address.trim().to_string()))
        .bind(order.customer.as_ref().map(|c| c.postal_code.trim().to_string()))
        .fetch_one(&mut *tx)
        .await?;

        if !order.lines.is_empty() {
            let mut insert: QueryBuilder<'_, Postgres> =
                QueryBuilder::new("INSERT INTO order_items (order_id, product_id, quantity, price) ");
            insert.push_values(&order.lines, |mut b, line| {
                b.push_bind(&id)
                    .push_bind(&line.product_id)
                    .push_bind(i32::from(line.quantity))
                    .push_bind(line.unit_price.amount());
            });
            insert.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;
        tracing::info!(order_id = %id, "Order created");

        row.try_into()
    }

    async fn get_order(&self, id: &OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders o WHERE o.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn order_lines(&self, id: &OrderId) -> Result<Vec<OrderLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderLineRow>(
            r"
            SELECT order_id, product_id, quantity, price
            FROM order_items
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn orders_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders o WHERE o.user_id = $1 ORDER BY o.created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn admin_orders(
        &self,
        status: Option<OrderStatus>,
    ) -> Result<Vec<AdminOrder>, RepositoryError> {
        let rows = sqlx::query_as::<_, AdminOrderRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS},
                   (SELECT COUNT(*) FROM order_items i WHERE i.order_id = o.id) AS item_count,
                   p.full_name, p.phone
            FROM orders o
            LEFT JOIN profiles p ON p.id = o.user_id
            WHERE $1::text IS NULL OR o.status = $1
            ORDER BY o.created_at DESC
            "
        ))
        .bind(status.map(OrderStatus::as_str))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    async fn update_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_scalar::<_, String>(
            "SELECT status FROM orders WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;
        let current = current
            .parse::<OrderStatus>()
            .map_err(|e| RepositoryError::DataCorruption(format!("order {id}: {e}")))?;

        check_transition(current, status)?;

        let row = sqlx::query_as::<_, OrderRow>(
            r"
            UPDATE orders AS o SET status = $2
            WHERE o.id = $1
            RETURNING o.id, o.user_id, o.total, o.status, o.address, o.pincode, o.created_at
            ",
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        row.try_into()
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
