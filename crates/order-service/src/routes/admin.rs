//! Admin order management: listing, status changes and the live change
//! stream.
//!
//! These routes carry no authentication of their own and are expected to be
//! reachable only from the admin network.

use std::convert::Infallible;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    response::Sse,
    response::sse::{Event, KeepAlive},
};
use serde::Deserialize;
use tracing::instrument;

use quickcart_core::{Order, OrderId, OrderStatus};

use super::parse_json_body;
use crate::changes::ChangeEvent;
use crate::error::{AppError, Result};
use crate::models::AdminOrder;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AdminOrdersQuery {
    /// Status name; `all` or empty means no filter.
    pub status: Option<String>,
    /// Free-text search.
    pub q: Option<String>,
}

impl AdminOrdersQuery {
    fn status_filter(&self) -> Result<Option<OrderStatus>> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) if s.eq_ignore_ascii_case("all") => Ok(None),
            Some(s) => s
                .parse::<OrderStatus>()
                .map(Some)
                .map_err(|e| AppError::BadRequest(e.to_string())),
        }
    }
}

/// GET /admin/orders?status=&q=
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<AdminOrdersQuery>,
) -> Result<Json<Vec<AdminOrder>>> {
    let status = query.status_filter()?;
    let orders = state.store().admin_orders(status).await?;

    let search = query.q.as_deref().unwrap_or_default();
    Ok(Json(
        orders
            .into_iter()
            .filter(|o| o.matches_search(search))
            .collect(),
    ))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// PATCH /admin/orders/{id}/status
#[instrument(skip(state, body), fields(order_id = %id))]
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Order>> {
    let request: UpdateStatusRequest = parse_json_body(&body)?;
    let id = OrderId::new(id);

    let order = state
        .store()
        .update_status(&id, request.status)
        .await
        .map_err(|e| AppError::from_repository(e, &format!("order {id}")))?;

    state
        .changes()
        .publish(ChangeEvent::order_updated(order.id.clone(), order.status));
    tracing::info!(status = %order.status, "Order status updated");

    Ok(Json(order))
}

/// GET /admin/orders/changes
///
/// One event per committed change to the `orders` table. The subscription
/// lives as long as the client stays connected.
pub async fn changes(
    State(state): State<AppState>,
) -> Sse<impl futures::Stream<Item = std::result::Result<Event, Infallible>>> {
    let mut subscription = state.changes().subscribe();

    let stream = async_stream::stream! {
        while let Some(change) = subscription.recv().await {
            let json = serde_json::to_string(&change).unwrap_or_else(|_| {
                r#"{"error":"Failed to serialize change"}"#.to_string()
            });
            yield Ok(Event::default().event("change").data(json));
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}
