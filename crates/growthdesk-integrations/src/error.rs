use thiserror::Error;

#[derive(Error, Debug)]
pub enum IntegrationError {
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} API error ({status}): {body}")]
    Api {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid signature header: {0}")]
    InvalidSignatureHeader(String),
}

impl IntegrationError {
    pub fn status(&self) -> Option<u16> {
        match self {
            IntegrationError::Api { status, .. } => Some(*status),
            IntegrationError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type IntegrationResult<T> = Result<T, IntegrationError>;

/// Turn a non-success response into [`IntegrationError::Api`], keeping the body
/// for the log line.
pub(crate) async fn api_error(service: &'static str, response: reqwest::Response) -> IntegrationError {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    IntegrationError::Api {
        service,
        status,
        body,
    }
}
