use crate::error::{api_error, IntegrationError, IntegrationResult};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Pooled client with a per-request timeout.
pub(crate) fn build_client(timeout_secs: u64) -> IntegrationResult<Client> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?)
}

/// Append percent-encoded path segments to a configured API base.
pub(crate) fn endpoint(base: &str, segments: &[&str]) -> IntegrationResult<Url> {
    let mut url = Url::parse(base)
        .map_err(|e| IntegrationError::InvalidRequest(format!("invalid api_base {base:?}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| IntegrationError::InvalidRequest(format!("api_base {base:?} cannot be a base")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Decode a 2xx JSON body, or turn anything else into an API error.
pub(crate) async fn decode<T: DeserializeOwned>(
    service: &'static str,
    response: Response,
) -> IntegrationResult<T> {
    if !response.status().is_success() {
        return Err(api_error(service, response).await);
    }
    response
        .json::<T>()
        .await
        .map_err(|e| IntegrationError::Decode(format!("{service}: {e}")))
}
