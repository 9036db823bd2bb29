//! Guest endpoints: the email the order was placed with plus its number
//! stand in for a session.

use super::orders::{ApiResult, OrderBody};
use crate::http::envelope::Envelope;
use crate::http::extract::{ApiJson, ApiQuery};
use crate::http::AppState;
use crate::orders::{OrderDetail, TrackingView};
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestProof {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub order_number: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestAction {
    #[serde(flatten)]
    pub proof: GuestProof,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct TrackingBody {
    pub tracking: TrackingView,
}

pub async fn lookup_by_query(
    State(state): State<AppState>,
    ApiQuery(proof): ApiQuery<GuestProof>,
) -> ApiResult<OrderDetail> {
    let detail = state
        .orders
        .lookup_guest_order(&proof.email, &proof.order_number)
        .await?;
    Ok(Envelope::ok(detail))
}

pub async fn lookup_by_body(
    State(state): State<AppState>,
    ApiJson(proof): ApiJson<GuestProof>,
) -> ApiResult<OrderDetail> {
    let detail = state
        .orders
        .lookup_guest_order(&proof.email, &proof.order_number)
        .await?;
    Ok(Envelope::ok(detail))
}

pub async fn request_refund(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<GuestAction>,
) -> ApiResult<OrderBody> {
    let order = state
        .refunds
        .guest_request_refund(&body.proof.email, &body.proof.order_number, &body.reason)
        .await?;
    Ok(Envelope::ok(order.into()))
}

pub async fn cancel_order(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<GuestAction>,
) -> ApiResult<OrderBody> {
    let order = state
        .refunds
        .guest_cancel_order(&body.proof.email, &body.proof.order_number, &body.reason)
        .await?;
    Ok(Envelope::ok(order.into()))
}

pub async fn tracking(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> ApiResult<TrackingBody> {
    let tracking = state.orders.get_order_tracking(&number).await?;
    Ok(Envelope::ok(TrackingBody { tracking }))
}
