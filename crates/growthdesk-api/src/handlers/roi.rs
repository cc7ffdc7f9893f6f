use crate::error::{ApiError, ApiResult};
use crate::leads::{self, DeliveryReport};
use crate::{emails, AppState};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::Utc;
use growthdesk_core::{LeadSubmission, RoiProjection};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

#[derive(Debug, Serialize, Deserialize)]
pub struct RoiCalculatorResponse {
    pub success: bool,
    pub message: String,
    pub roi_data: RoiProjection,
    pub lead_score: u8,
    pub delivery: DeliveryReport,
}

pub async fn roi_calculator(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<RoiCalculatorResponse>> {
    let Json(body) = payload?;
    if !body.is_object() {
        return Err(ApiError::BadRequest(
            "Request body must be a JSON object".into(),
        ));
    }
    let submission = LeadSubmission::from_value(body)
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let report = leads::process_lead(&state, &submission).await;

    Ok(Json(RoiCalculatorResponse {
        success: true,
        message: "ROI report sent successfully".to_string(),
        roi_data: report.projection,
        lead_score: report.lead_score,
        delivery: report.delivery,
    }))
}

#[derive(Debug, Deserialize)]
pub struct TestEmailRequest {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TestEmailDelivery {
    pub email_configured: bool,
    pub target_email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TestEmailResponse {
    pub success: bool,
    pub message: String,
    pub delivery: TestEmailDelivery,
}

pub async fn test_email(
    State(state): State<AppState>,
    payload: Result<Json<TestEmailRequest>, JsonRejection>,
) -> ApiResult<Json<TestEmailResponse>> {
    let Json(request) = payload?;
    let target = request
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Email address required".into()))?
        .to_string();

    let success = match state
        .email
        .send(&emails::test_message(&target, Utc::now()))
        .await
    {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Test email failed");
            false
        }
    };

    Ok(Json(TestEmailResponse {
        success,
        message: format!("Test email {}", if success { "sent" } else { "failed" }),
        delivery: TestEmailDelivery {
            email_configured: state.email.is_configured(),
            target_email: target,
        },
    }))
}
