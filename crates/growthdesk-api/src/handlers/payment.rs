use crate::billing::{
    self, CheckoutRequest, CheckoutResponse, ConfirmPaymentRequest, ConfirmPaymentResponse,
    PaymentIntentRequest, PaymentIntentResponse,
};
use crate::error::ApiResult;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use growthdesk_integrations::SIGNATURE_HEADER;
use serde_json::{json, Value};

pub async fn create_payment_intent(
    State(state): State<AppState>,
    payload: Result<Json<PaymentIntentRequest>, JsonRejection>,
) -> ApiResult<Json<PaymentIntentResponse>> {
    let Json(request) = payload?;
    billing::start_plan_payment(&state, &request).await.map(Json)
}

pub async fn confirm_payment(
    State(state): State<AppState>,
    payload: Result<Json<ConfirmPaymentRequest>, JsonRejection>,
) -> ApiResult<Json<ConfirmPaymentResponse>> {
    let Json(request) = payload?;
    billing::confirm_payment(&state, &request).await.map(Json)
}

/// Takes the raw body: the signature covers the exact bytes sent.
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    billing::handle_webhook(&state, &body, signature).await?;
    Ok(Json(json!({"status": "success"})))
}

pub async fn create_checkout_session(
    State(state): State<AppState>,
    payload: Result<Json<CheckoutRequest>, JsonRejection>,
) -> ApiResult<Json<CheckoutResponse>> {
    let Json(request) = payload?;
    billing::create_checkout(&state, &request).await.map(Json)
}
