//! Authenticated order endpoints.

use crate::http::envelope::Envelope;
use crate::http::error::ApiError;
use crate::http::extract::{ApiJson, ApiQuery, Session};
use crate::http::AppState;
use crate::model::{Order, OrderStatus};
use crate::order_actor::ShipmentInfo;
use crate::orders::{OrderDetail, OrderPage, OrderQuery};
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

pub type ApiResult<T> = Result<Json<Envelope<T>>, ApiError>;

#[derive(Debug, Serialize)]
pub struct OrderBody {
    pub order: Order,
}

impl From<Order> for OrderBody {
    fn from(order: Order) -> Self {
        Self { order }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceRequest {
    #[serde(default)]
    pub status: String,
    pub carrier: Option<String>,
    pub tracking_number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    #[serde(default)]
    pub reference: String,
}

#[derive(Debug, Deserialize)]
pub struct ReasonRequest {
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApproveRequest {
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    #[serde(default)]
    pub notes: String,
}

pub async fn list_orders(
    State(state): State<AppState>,
    Session(user): Session,
    ApiQuery(query): ApiQuery<OrderQuery>,
) -> ApiResult<OrderPage> {
    let page = state.orders.list_orders(user.id, &query).await?;
    Ok(Envelope::ok(page))
}

pub async fn list_vendor_orders(
    State(state): State<AppState>,
    Session(user): Session,
    ApiQuery(query): ApiQuery<OrderQuery>,
) -> ApiResult<OrderPage> {
    let page = state.orders.list_vendor_orders(&user, &query).await?;
    Ok(Envelope::ok(page))
}

pub async fn get_order(
    State(state): State<AppState>,
    Session(user): Session,
    Path(number): Path<String>,
) -> ApiResult<OrderDetail> {
    let detail = state.orders.get_order_by_number(&number, &user).await?;
    Ok(Envelope::ok(detail))
}

pub async fn advance_status(
    State(state): State<AppState>,
    Session(user): Session,
    Path(number): Path<String>,
    ApiJson(body): ApiJson<AdvanceRequest>,
) -> ApiResult<OrderBody> {
    let target = body
        .status
        .parse::<OrderStatus>()
        .map_err(ApiError::validation)?;
    let shipment = match (body.carrier, body.tracking_number) {
        (None, None) => None,
        (carrier, tracking_number) => Some(ShipmentInfo {
            carrier: carrier.unwrap_or_default(),
            tracking_number: tracking_number.unwrap_or_default(),
        }),
    };
    let order = state
        .orders
        .advance_status(&user, &number, target, shipment)
        .await?;
    Ok(Envelope::ok(order.into()))
}

pub async fn record_payment(
    State(state): State<AppState>,
    Session(user): Session,
    Path(number): Path<String>,
    ApiJson(body): ApiJson<PaymentRequest>,
) -> ApiResult<OrderBody> {
    let order = state
        .orders
        .record_payment(&user, &number, &body.reference)
        .await?;
    Ok(Envelope::ok(order.into()))
}

pub async fn cancel_order(
    State(state): State<AppState>,
    Session(user): Session,
    Path(number): Path<String>,
    ApiJson(body): ApiJson<ReasonRequest>,
) -> ApiResult<OrderBody> {
    let order = state
        .refunds
        .cancel_order(&user, &number, &body.reason)
        .await?;
    Ok(Envelope::ok(order.into()))
}

pub async fn request_refund(
    State(state): State<AppState>,
    Session(user): Session,
    Path(number): Path<String>,
    ApiJson(body): ApiJson<ReasonRequest>,
) -> ApiResult<OrderBody> {
    let order = state
        .refunds
        .request_refund(&user, &number, &body.reason)
        .await?;
    Ok(Envelope::ok(order.into()))
}

pub async fn approve_refund(
    State(state): State<AppState>,
    Session(user): Session,
    Path(number): Path<String>,
    ApiJson(body): ApiJson<ApproveRequest>,
) -> ApiResult<OrderBody> {
    let order = state
        .refunds
        .approve_refund(&user, &number, body.notes.as_deref())
        .await?;
    Ok(Envelope::ok(order.into()))
}

pub async fn reject_refund(
    State(state): State<AppState>,
    Session(user): Session,
    Path(number): Path<String>,
    ApiJson(body): ApiJson<RejectRequest>,
) -> ApiResult<OrderBody> {
    let order = state
        .refunds
        .reject_refund(&user, &number, &body.notes)
        .await?;
    Ok(Envelope::ok(order.into()))
}
