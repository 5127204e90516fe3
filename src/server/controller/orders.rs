use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use log::warn;
use validator::Validate;
use crate::server::controller::error::CustomError;
use crate::server::database::store::{NewOrder, OrderChanges, StoreError};
use crate::server::model::order::{
    CreateOrderRequest, CreateOrderResponse, DeleteOrderResponse, GetOrdersResponse, Order, UpdateOrderRequest,
    UpdateOrderResponse,
};
use crate::server::model::ErrorResponse;
use crate::server::state::AppState;
use crate::server::util::time;

fn rejected(op: &'static str) -> impl Fn(validator::ValidationErrors) -> CustomError {
    move |e| {
        warn!("{} rejected, {}", op, e);
        CustomError::bad_request(e)
    }
}

fn failed(op: &'static str) -> impl Fn(StoreError) -> CustomError {
    move |e| {
        if !matches!(e, StoreError::NotFound) {
            warn!("{} failed, {}", op, e.detail());
        }
        CustomError::from(e)
    }
}

/// Get list of all orders
///
/// Every order is returned with its items.
#[utoipa::path(
    operation_id = "get-all-orders",
    tag = "orders",
    responses(
        (status = 200, description = "All orders", body = GetOrdersResponse),
        (status = 500, description = "Query failed", body = ErrorResponse),
    )
)]
#[get("/orders")]
pub(crate) async fn get_orders(data: web::Data<AppState>) -> Result<impl Responder, CustomError> {
    let orders = data.store().list_orders().await.map_err(failed("get_orders"))?;
    Ok(web::Json(GetOrdersResponse { orders }))
}

/// Get an order data by id
#[utoipa::path(
    operation_id = "get-order-by-id",
    tag = "orders",
    params(("id" = i64, Path, description = "Order ID")),
    responses(
        (status = 200, description = "The order with its items", body = Order),
        (status = 404, description = "Order id not found", body = ErrorResponse),
    )
)]
#[get("/orders/{id}")]
pub(crate) async fn get_order(id: web::Path<i64>, data: web::Data<AppState>) -> Result<impl Responder, CustomError> {
    let order = data.store().get_order(id.into_inner()).await.map_err(failed("get_order"))?;
    Ok(web::Json(order))
}

/// Create a new order
///
/// The order and all of its items are stored together, `ordered_at` is set to the current time.
#[utoipa::path(
    operation_id = "create-order",
    tag = "orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = CreateOrderResponse),
        (status = 400, description = "Malformed or invalid body", body = ErrorResponse),
        (status = 500, description = "Insert failed", body = ErrorResponse),
    )
)]
#[post("/orders")]
pub(crate) async fn create_order(
    body: web::Json<CreateOrderRequest>,
    data: web::Data<AppState>,
) -> Result<impl Responder, CustomError> {
    body.validate().map_err(rejected("create_order"))?;
    let CreateOrderRequest { customer_name, items } = body.into_inner();
    let order = data
        .store()
        .create_order(NewOrder {
            customer_name,
            items,
            ordered_at: time::helper::get_utc_now(),
        })
        .await
        .map_err(failed("create_order"))?;

    Ok(HttpResponse::Created().json(CreateOrderResponse {
        message: "Order created".to_string(),
        order,
    }))
}

/// Update an order data by id
///
/// Absent fields are left untouched. Items carrying a `line_item_id` are overwritten, the others are
/// appended. `ordered_at` is always refreshed to the current time.
#[utoipa::path(
    operation_id = "update-order-by-id",
    tag = "orders",
    params(("id" = i64, Path, description = "Order ID")),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Order updated", body = UpdateOrderResponse),
        (status = 400, description = "Malformed body or item of another order", body = ErrorResponse),
        (status = 404, description = "Order id not found", body = ErrorResponse),
    )
)]
#[put("/orders/{id}")]
pub(crate) async fn update_order(
    id: web::Path<i64>,
    body: Result<web::Json<UpdateOrderRequest>, actix_web::Error>,
    data: web::Data<AppState>,
) -> Result<impl Responder, actix_web::Error> {
    let id = id.into_inner();
    // an unknown order is reported ahead of a bad body
    data.store().get_order(id).await.map_err(failed("update_order"))?;
    let body = body?;
    body.validate().map_err(rejected("update_order"))?;
    let UpdateOrderRequest { customer_name, items } = body.into_inner();
    let order = data
        .store()
        .update_order(
            id,
            OrderChanges {
                customer_name,
                items: items.unwrap_or_default(),
                ordered_at: time::helper::get_utc_now(),
            },
        )
        .await
        .map_err(failed("update_order"))?;

    Ok(web::Json(UpdateOrderResponse {
        message: "Update order data successfully".to_string(),
        new_order_data: order,
    }))
}

/// Delete an order by id
///
/// Items are removed together with the order.
#[utoipa::path(
    operation_id = "delete-order-by-id",
    tag = "orders",
    params(("id" = i64, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order deleted", body = DeleteOrderResponse),
        (status = 404, description = "Order id not found", body = ErrorResponse),
    )
)]
#[delete("/orders/{id}")]
pub(crate) async fn delete_order(id: web::Path<i64>, data: web::Data<AppState>) -> Result<impl Responder, CustomError> {
    let id = id.into_inner();
    data.store().delete_order(id).await.map_err(failed("delete_order"))?;
    Ok(web::Json(DeleteOrderResponse {
        message: format!("Order with id {id} successfully deleted"),
    }))
}
