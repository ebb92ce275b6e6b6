use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::order_service::OrderService;
use crate::domain::order::{Order, OrderLineRequest, OrderRequest, OrderUpdate};
use crate::domain::ports::Storage;
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderLineRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub note: String,
    pub lines: Vec<CreateOrderLineRequest>,
}

impl From<CreateOrderRequest> for OrderRequest {
    fn from(body: CreateOrderRequest) -> Self {
        OrderRequest {
            user_id: body.user_id,
            note: body.note,
            lines: body
                .lines
                .into_iter()
                .map(|l| OrderLineRequest {
                    product_id: l.product_id,
                    quantity: l.quantity,
                })
                .collect(),
        }
    }
}

/// Empty or missing fields leave the stored value unchanged.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderRequest {
    pub status: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderHistoryParams {
    pub display_name: String,
    pub product_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderLineResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    /// Price per unit at the time the order was placed, e.g. "9.99"
    pub unit_price: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total_price: String,
    pub note: String,
    pub status: String,
    pub created_at: String,
    pub lines: Vec<OrderLineResponse>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        OrderResponse {
            id: order.id,
            user_id: order.user_id,
            total_price: order.total_price.to_string(),
            note: order.note,
            status: order.status,
            created_at: order.created_at.to_rfc3339(),
            lines: order
                .lines
                .into_iter()
                .map(|l| OrderLineResponse {
                    id: l.id,
                    product_id: l.product_id,
                    quantity: l.quantity,
                    unit_price: l.unit_price.to_string(),
                })
                .collect(),
        }
    }
}

fn to_responses(orders: Vec<Order>) -> Vec<OrderResponse> {
    orders.into_iter().map(OrderResponse::from).collect()
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Validates the requested lines against the catalog, prices them, and stores
/// the order while taking its stock, all in one database transaction.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = OrderResponse),
        (status = 400, description = "Invalid quantity or expired product"),
        (status = 404, description = "Product not found or sold out"),
        (status = 409, description = "Insufficient or concurrently changed stock"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order<S: Storage>(
    service: web::Data<OrderService<S>>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let request = OrderRequest::from(body.into_inner());

    let order = web::block(move || service.create_order(request))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(OrderResponse::from(order)))
}

/// GET /orders/{id}
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order<S: Storage>(
    service: web::Data<OrderService<S>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let order = web::block(move || service.get_order(order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// GET /orders
///
/// Returns every order that has not been cancelled, newest first.
#[utoipa::path(
    get,
    path = "/orders",
    responses(
        (status = 200, description = "Orders", body = [OrderResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_orders<S: Storage>(
    service: web::Data<OrderService<S>>,
) -> Result<HttpResponse, AppError> {
    let orders = web::block(move || service.list_orders())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(to_responses(orders)))
}

/// PATCH /orders/{id}
#[utoipa::path(
    patch,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Order updated", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn update_order<S: Storage>(
    service: web::Data<OrderService<S>>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let body = body.into_inner();
    let update = OrderUpdate {
        status: body.status,
        note: body.note,
    };

    let order = web::block(move || service.update_order(order_id, update))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// DELETE /orders/{id}
///
/// Cancels the order: its stock goes back to the products and the order is
/// soft-deleted.
#[utoipa::path(
    delete,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 204, description = "Order cancelled"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn cancel_order<S: Storage>(
    service: web::Data<OrderService<S>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    web::block(move || service.cancel_order(order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::NoContent().finish())
}

/// GET /orders/by-user/{display_name}
#[utoipa::path(
    get,
    path = "/orders/by-user/{display_name}",
    params(
        ("display_name" = String, Path, description = "Display name of the user"),
    ),
    responses(
        (status = 200, description = "Orders of the user", body = [OrderResponse]),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_orders_by_user<S: Storage>(
    service: web::Data<OrderService<S>>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let display_name = path.into_inner();

    let orders = web::block(move || service.list_orders_by_display_name(&display_name))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(to_responses(orders)))
}

/// GET /orders/history
///
/// Orders of a user that contain the given product.
#[utoipa::path(
    get,
    path = "/orders/history",
    params(
        ("display_name" = String, Query, description = "Display name of the user"),
        ("product_id" = Uuid, Query, description = "Product UUID"),
    ),
    responses(
        (status = 200, description = "Matching orders", body = [OrderResponse]),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn order_history<S: Storage>(
    service: web::Data<OrderService<S>>,
    query: web::Query<OrderHistoryParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();

    let orders = web::block(move || {
        service.list_order_history(&params.display_name, params.product_id)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(to_responses(orders)))
}
