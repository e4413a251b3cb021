//! Shared reqwest plumbing for the HTTP adapters.

use std::time::Duration;

use reqwest::{Client, Response};

use crate::domain::errors::{DomainError, DomainResult, ProviderKind};
use crate::infrastructure::logging::scrub_secrets;

/// Longest error body kept in an error message
const MAX_ERROR_BODY: usize = 512;

/// Build a client with a fixed request timeout
pub fn build_client(provider: ProviderKind, timeout_secs: u64) -> DomainResult<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| DomainError::provider(provider, format!("failed to build HTTP client: {e}")))
}

/// Classify a transport failure
pub fn send_error(provider: ProviderKind, timeout_secs: u64, err: &reqwest::Error) -> DomainError {
    if err.is_timeout() {
        DomainError::Timeout {
            provider,
            timeout_secs,
        }
    } else {
        DomainError::provider(provider, scrub_secrets(&format!("request failed: {err}")))
    }
}

/// Turn a non-success response into a provider error with a scrubbed body
pub async fn status_error(provider: ProviderKind, context: &str, response: Response) -> DomainError {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "unable to read response body".to_string());
    let mut body = scrub_secrets(body.trim());
    if let Some((cut, _)) = body.char_indices().nth(MAX_ERROR_BODY) {
        body.truncate(cut);
        body.push_str("...");
    }
    DomainError::provider(provider, format!("{context} returned {status}: {body}"))
}

/// Decode a JSON response body
pub async fn decode<T: serde::de::DeserializeOwned>(
    provider: ProviderKind,
    context: &str,
    response: Response,
) -> DomainResult<T> {
    response.json().await.map_err(|e| {
        DomainError::SerializationError(format!("{provider}: failed to parse {context} response: {e}"))
    })
}
