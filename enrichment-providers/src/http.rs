use std::time::{Duration, Instant};

use enrichment_common::LookupError;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// `method`/`host` logged for a request that couldn't even be built (should
/// never happen for the providers in this crate, whose requests are always
/// well-formed).
const UNKNOWN: &str = "unknown";

/// Send `request`, classify any failure (transport/timeout are
/// distinguished from 4xx/5xx), and extract the phone number from a
/// successful JSON body with `extract`. Logs method, URL host, status (or
/// failure kind), and latency for every attempt — never the request body or
/// headers, so API keys never reach the logs.
pub(crate) async fn send_and_extract<T, F>(
    provider: &str,
    timeout: Duration,
    request: reqwest::RequestBuilder,
    extract: F,
) -> Result<Option<String>, LookupError>
where
    T: DeserializeOwned,
    F: FnOnce(T) -> Option<String>,
{
    let (method, host) = request
        .try_clone()
        .and_then(|clone| clone.build().ok())
        .map(|built| (built.method().to_string(), built.url().host_str().unwrap_or(UNKNOWN).to_string()))
        .unwrap_or_else(|| (UNKNOWN.to_string(), UNKNOWN.to_string()));

    let started_at = Instant::now();
    let response = request.timeout(timeout).send().await;
    let latency_ms = started_at.elapsed().as_millis();

    let response = match response {
        Ok(response) => response,
        Err(error) if error.is_timeout() => {
            warn!(provider, method, host, latency_ms, "provider request timed out");
            return Err(LookupError::Timeout {
                provider: provider.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            });
        }
        Err(error) => {
            warn!(provider, method, host, latency_ms, %error, "provider request failed");
            return Err(LookupError::Transport {
                provider: provider.to_string(),
                source: error,
            });
        }
    };

    let status = response.status();
    debug!(provider, method, host, status = status.as_u16(), latency_ms, "provider request completed");

    if status.is_client_error() {
        return Err(LookupError::ClientError {
            provider: provider.to_string(),
            status: status.as_u16(),
        });
    }
    if status.is_server_error() {
        return Err(LookupError::ServerError {
            provider: provider.to_string(),
            status: status.as_u16(),
        });
    }

    let body: T = response.json().await.map_err(|error| LookupError::Decode {
        provider: provider.to_string(),
        message: error.to_string(),
    })?;

    Ok(extract(body))
}
