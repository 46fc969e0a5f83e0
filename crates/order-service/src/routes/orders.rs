//! Order creation and customer order queries.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use quickcart_core::{
    CreateOrderRequest, CreateOrderResponse, NewOrder, Order, OrderId, OrderLine, UserId,
};

use super::parse_json_body;
use crate::changes::ChangeEvent;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// POST /functions/create-order
///
/// Validates the cart, prices it with the configured delivery fee and
/// writes the order, its lines and the customer's profile in one go.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<CreateOrderResponse>> {
    let request: CreateOrderRequest = parse_json_body(&body)?;
    let new_order = validate(&request, &state)?;

    let order = state
        .store()
        .create_order(new_order)
        .await
        .map_err(AppError::OrderCreation)?;

    state
        .changes()
        .publish(ChangeEvent::order_inserted(order.id.clone(), order.status));
    tracing::info!(order_id = %order.id, user_id = %order.user_id, total = %order.total, "Order placed");

    Ok(Json(CreateOrderResponse::created(order.id)))
}

fn validate(request: &CreateOrderRequest, state: &AppState) -> Result<NewOrder> {
    if request.items.is_empty() {
        return Err(AppError::BadRequest("No items provided".to_string()));
    }
    if request.user_id.is_blank() {
        return Err(AppError::BadRequest("User ID is required".to_string()));
    }
    if let Some(product_id) = request.duplicate_product() {
        return Err(AppError::BadRequest(format!(
            "Duplicate product in items: {product_id}"
        )));
    }
    if let Some(info) = &request.customer_info {
        info.validate()
            .map_err(|e| AppError::BadRequest(capitalize(&e.to_string())))?;
    }

    let new_order = NewOrder::from_cart(
        request.user_id.clone(),
        &request.cart(),
        state.delivery_fee(),
        request.customer_info.clone(),
    )
    .map_err(|e| AppError::BadRequest(format!("Invalid order total: {e}")))?;

    if let Some(client_total) = request.total.filter(|t| *t != new_order.total) {
        tracing::warn!(
            client_total = %client_total,
            server_total = %new_order.total,
            "Rejected order with mismatched total"
        );
        return Err(AppError::BadRequest(
            "Order total does not match cart".to_string(),
        ));
    }

    Ok(new_order)
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[derive(Debug, Deserialize)]
pub struct UserOrdersQuery {
    #[serde(default)]
    pub user_id: Option<UserId>,
}

/// GET /orders?user_id=
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<UserOrdersQuery>,
) -> Result<Json<Vec<Order>>> {
    let user_id = query
        .user_id
        .filter(|id| !id.is_blank())
        .ok_or_else(|| AppError::BadRequest("User ID is required".to_string()))?;

    let orders = state.store().orders_for_user(&user_id).await?;
    Ok(Json(orders))
}

/// An order with its lines.
#[derive(Debug, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderLine>,
}

/// GET /orders/{id}
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OrderDetail>> {
    let id = OrderId::new(id);
    let order = state
        .store()
        .get_order(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;
    let items = state.store().order_lines(&id).await?;

    Ok(Json(OrderDetail { order, items }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use serde_json::json;

    use crate::routes::tests::{json_request, send, test_app};

    fn valid_body() -> serde_json::Value {
        json!({
            "items": [
                { "id": "P1", "name": "Phone", "price": 500, "image": "", "quantity": 2 },
                { "id": "P2", "name": "Case", "price": 400, "image": "", "quantity": 1 }
            ],
            "userId": "user-1",
            "customerInfo": {
                "name": "Asha Rao",
                "phone": "9876543210",
                "address": "12 MG Road",
                "pincode": "560001"
            },
            "total": 1499
        })
    }

    async fn post(app: &axum::Router, body: &str) -> (StatusCode, serde_json::Value) {
        send(app, json_request(Method::POST, "/functions/create-order", body)).await
    }

    #[tokio::test]
    async fn test_create_order_writes_order_and_lines() {
        let (app, state, store) = test_app();
        let mut changes = state.changes().subscribe();

        let (status, json) = post(&app, &valid_body().to_string()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        let id = json["order"]["id"].as_str().unwrap().to_string();

        assert_eq!(store.order_count(), 1);
        assert_eq!(store.line_count(), 2);

        let event = changes.recv().await.unwrap();
        assert_eq!(event.order_id.as_str(), id);

        let request = Request::get(format!("/orders/{id}")).body(Body::empty()).unwrap();
        let (status, json) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "Processing");
        assert_eq!(json["total"], "1499");
        assert_eq!(json["items"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_body_errors() {
        let (app, _, store) = test_app();

        let (status, json) = post(&app, "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Request body is empty");

        let (status, json) = post(&app, "{\"items\": [").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Invalid JSON in request");

        assert_eq!(store.order_count(), 0);
    }

    #[tokio::test]
    async fn test_validation_errors() {
        let (app, _, store) = test_app();

        let mut body = valid_body();
        body["items"] = json!([]);
        let (status, json) = post(&app, &body.to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "No items provided");

        let mut body = valid_body();
        body["userId"] = json!("");
        let (_, json) = post(&app, &body.to_string()).await;
        assert_eq!(json["error"], "User ID is required");

        let mut body = valid_body();
        body["customerInfo"]["pincode"] = json!("12");
        let (status, json) = post(&app, &body.to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Invalid customer info: postal_code");

        assert_eq!(store.order_count(), 0);
    }

    #[tokio::test]
    async fn test_total_mismatch_is_rejected() {
        let (app, _, store) = test_app();

        let mut body = valid_body();
        body["total"] = json!(1400);
        let (status, json) = post(&app, &body.to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Order total does not match cart");
        assert_eq!(store.order_count(), 0);

        // Omitting the total lets the service price the cart itself
        let mut body = valid_body();
        body.as_object_mut().unwrap().remove("total");
        let (status, _) = post(&app, &body.to_string()).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_total_past_max_is_rejected() {
        let (app, _, store) = test_app();

        let mut body = valid_body();
        body["items"] = json!([
            { "id": "P1", "name": "Yacht", "price": "9999999999.99", "quantity": 5 }
        ]);
        body.as_object_mut().unwrap().remove("total");
        let (status, json) = post(&app, &body.to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
        assert_eq!(
            json["error"],
            "Invalid order total: amount exceeds 9999999999.99"
        );

        // Prices beyond what an order can hold never parse
        body["items"][0]["price"] = json!("79228162514264337593543950335");
        let (status, json) = post(&app, &body.to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Invalid JSON in request");

        body["items"][0]["price"] = json!("19.999");
        let (status, _) = post(&app, &body.to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert_eq!(store.order_count(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_items_are_rejected() {
        let (app, _, store) = test_app();

        let mut body = valid_body();
        body["items"] = json!([
            { "id": "P1", "name": "Phone", "price": 500, "image": "", "quantity": 3 },
            { "id": "P1", "name": "Phone", "price": 500, "image": "", "quantity": 3 }
        ]);
        body.as_object_mut().unwrap().remove("total");
        let (status, json) = post(&app, &body.to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Duplicate product in items: P1");
        assert_eq!(store.order_count(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_is_generic_500() {
        let (app, _, store) = test_app();
        store.fail_writes(true);

        let (status, json) = post(&app, &valid_body().to_string()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Failed to create order");
        assert_eq!(store.order_count(), 0);
        assert_eq!(store.line_count(), 0);
    }

    #[tokio::test]
    async fn test_user_orders_newest_first() {
        let (app, _, _) = test_app();
        let (_, first) = post(&app, &valid_body().to_string()).await;
        let (_, second) = post(&app, &valid_body().to_string()).await;

        let request = Request::get("/orders?user_id=user-1").body(Body::empty()).unwrap();
        let (status, json) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        let orders = json.as_array().unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0]["id"], second["order"]["id"]);
        assert_eq!(orders[1]["id"], first["order"]["id"]);

        let request = Request::get("/orders").body(Body::empty()).unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_order_is_404() {
        let (app, _, _) = test_app();
        let request = Request::get("/orders/nope").body(Body::empty()).unwrap();
        let (status, json) = send(&app, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["success"], false);
    }
}
