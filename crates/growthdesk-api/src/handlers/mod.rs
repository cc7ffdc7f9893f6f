use axum::Json;
use serde::{Deserialize, Serialize};

pub mod payment;
pub mod roi;

pub use payment::*;
pub use roi::*;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
