use async_trait::async_trait;
use enrichment_common::{LookupError, LookupParams, ProviderConfig, RetryPolicy};
use enrichment_limiter::QueuedRateLimiter;
use serde::Deserialize;

use crate::http::send_and_extract;
use crate::provider::PhoneProvider;

const DEFAULT_BASE_URL: &str = "https://api.genesy.ai";

#[derive(Deserialize)]
struct AstraResponse {
    #[serde(rename = "phoneNumber")]
    phone_number: Option<String>,
}

/// Astra Dialer — priority 2, auth via an `apiKey` query parameter.
pub struct AstraProvider {
    config: ProviderConfig,
    limiter: QueuedRateLimiter,
    retry_policy: RetryPolicy,
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl AstraProvider {
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
impl PhoneProvider for AstraProvider {
    async fn lookup(&self, params: &LookupParams) -> Result<Option<String>, LookupError> {
        let url = format!("{}/api/tmp/astraDialer", self.base_url);
        let request = self.client.get(url).query(&[
            ("apiKey", self.api_key.as_str()),
            ("fullName", params.full_name.as_str()),
            ("companyWebsite", params.company_website.as_str()),
        ]);

        send_and_extract::<AstraResponse, _>(
            &self.config.name,
            self.config.timeout,
            request,
            |body| body.phone_number,
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

#[cfg(test)]
mod tests {
    use super::*;
    use enrichment_common::provider_config::ProviderConfig;
    use std::num::{NonZeroU32, NonZeroUsize};
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config() -> ProviderConfig {
        ProviderConfig {
            name: "Astra Dialer".to_string(),
            priority: NonZeroU32::new(2).unwrap(),
            cost_per_request: rust_decimal::Decimal::new(1, 2),
            rate_limit: NonZeroU32::new(10).unwrap(),
            time_window: Duration::from_millis(1000),
            max_concurrent: NonZeroUsize::new(10).unwrap(),
            enabled: true,
            timeout: Duration::from_millis(10_000),
        }
    }

    fn params() -> LookupParams {
        LookupParams {
            full_name: "Grace Hopper".to_string(),
            company_website: "navy.mil".to_string(),
            job_title: "Admiral".to_string(),
        }
    }

    #[tokio::test]
    async fn extracts_phone_number_field() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tmp/astraDialer"))
            .and(query_param("apiKey", "1234jhgf"))
            .and(query_param("fullName", "Grace Hopper"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "phoneNumber": "+1-202-555-0133"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider =
            AstraProvider::with_base_url(config(), "1234jhgf".to_string(), server.uri());
        let phone = provider.lookup(&params()).await.unwrap();
        assert_eq!(phone, Some("+1-202-555-0133".to_string()));
    }

    #[tokio::test]
    async fn missing_phone_number_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "phoneNumber": null
            })))
            .mount(&server)
            .await;

        let provider = AstraProvider::with_base_url(config(), "key".to_string(), server.uri());
        let phone = provider.lookup(&params()).await.unwrap();
        assert_eq!(phone, None);
    }
}
