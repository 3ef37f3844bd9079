use async_trait::async_trait;
use enrichment_common::{LookupError, LookupParams, ProviderConfig, RetryPolicy};
use enrichment_limiter::QueuedRateLimiter;
use serde::{Deserialize, Serialize};

use crate::http::send_and_extract;
use crate::provider::PhoneProvider;

const DEFAULT_BASE_URL: &str = "https://api.genesy.ai";

#[derive(Serialize)]
struct OrionRequest<'a> {
    #[serde(rename = "fullName")]
    full_name: &'a str,
    #[serde(rename = "companyWebsite")]
    company_website: &'a str,
}

#[derive(Deserialize)]
struct OrionResponse {
    phone: Option<String>,
}

/// Orion Connect — priority 1, auth via the `x-auth-me` header.
pub struct OrionProvider {
    config: ProviderConfig,
    limiter: QueuedRateLimiter,
    retry_policy: RetryPolicy,
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OrionProvider {
    pub fn new(config: ProviderConfig, api_key: String) -> Self {
        Self::with_base_url(config, api_key, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(config: ProviderConfig, api_key: String, base_url: String) -> Self {
        let limiter = QueuedRateLimiter::new(
            config.name.clone(),
            config.rate_limit.get(),
            config.time_window,
            config.max_concurrent.get(),
        );
        Self {
            config,
            limiter,
            retry_policy: RetryPolicy::default(),
            client: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl PhoneProvider for OrionProvider {
    async fn lookup(&self, params: &LookupParams) -> Result<Option<String>, LookupError> {
        let url = format!("{}/api/tmp/orionConnect", self.base_url);
        let request = self
            .client
            .post(url)
            .header("x-auth-me", &self.api_key)
            .json(&OrionRequest {
                full_name: &params.full_name,
                company_website: &params.company_website,
            });

        send_and_extract::<OrionResponse, _>(
            &self.config.name,
            self.config.timeout,
            request,
            |body| body.phone,
        )
        .await
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn limiter(&self) -> &QueuedRateLimiter {
        &self.limiter
    }

    fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }
}
