use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use growthdesk_integrations::IntegrationError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Integration error: {0}")]
    Integration(#[from] IntegrationError),

    #[error("Invalid request body: {0}")]
    Body(#[from] JsonRejection),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Integration(IntegrationError::NotConfigured(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApiError::Integration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Body(rejection) => rejection.status(),
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// The message the browser client shows, without the variant prefix.
    pub fn message(&self) -> String {
        match self {
            ApiError::Integration(e) => e.to_string(),
            ApiError::Body(rejection) => rejection.body_text(),
            ApiError::Validation(m)
            | ApiError::Internal(m)
            | ApiError::BadRequest(m)
            | ApiError::ServiceUnavailable(m) => m.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "success": false,
            "error": self.message(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_variant() {
        assert_eq!(
            ApiError::BadRequest("Invalid plan selected".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Integration(IntegrationError::NotConfigured("Stripe")).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::Internal("Failed to create customer".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn message_is_unprefixed() {
        assert_eq!(
            ApiError::BadRequest("Payment intent ID required".into()).message(),
            "Payment intent ID required"
        );
    }
}
