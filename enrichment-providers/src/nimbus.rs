use async_trait::async_trait;
use enrichment_common::{LookupError, LookupParams, ProviderConfig, RetryPolicy};
use enrichment_limiter::QueuedRateLimiter;
use serde::{Deserialize, Serialize};

use crate::http::send_and_extract;
use crate::provider::PhoneProvider;

const DEFAULT_BASE_URL: &str = "https://api.genesy.ai";

#[derive(Serialize)]
struct NimbusRequest<'a> {
    api: &'a str,
    #[serde(rename = "fullName")]
    full_name: &'a str,
    #[serde(rename = "companyWebsite")]
    company_website: &'a str,
    #[serde(rename = "jobTitle")]
    job_title: &'a str,
}

#[derive(Deserialize)]
struct NimbusContact {
    phone: Option<String>,
}

#[derive(Deserialize)]
struct NimbusResponse {
    contact: NimbusContact,
}

/// Nimbus Lookup — priority 3, auth via an `api` field in the JSON body.
pub struct NimbusProvider {
    config: ProviderConfig,
    limiter: QueuedRateLimiter,
    retry_policy: RetryPolicy,
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl NimbusProvider {
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
impl PhoneProvider for NimbusProvider {
    async fn lookup(&self, params: &LookupParams) -> Result<Option<String>, LookupError> {
        let url = format!("{}/api/tmp/numbusLookup", self.base_url);
        let request = self.client.post(url).json(&NimbusRequest {
            api: &self.api_key,
            full_name: &params.full_name,
            company_website: &params.company_website,
            job_title: &params.job_title,
        });

        send_and_extract::<NimbusResponse, _>(
            &self.config.name,
            self.config.timeout,
            request,
            |body| body.contact.phone,
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
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config() -> ProviderConfig {
        ProviderConfig {
            name: "Nimbus Lookup".to_string(),
            priority: NonZeroU32::new(3).unwrap(),
            cost_per_request: rust_decimal::Decimal::new(15, 3),
            rate_limit: NonZeroU32::new(2).unwrap(),
            time_window: Duration::from_millis(1000),
            max_concurrent: NonZeroUsize::new(2).unwrap(),
            enabled: true,
            timeout: Duration::from_millis(10_000),
        }
    }

    fn params() -> LookupParams {
        LookupParams {
            full_name: "Katherine Johnson".to_string(),
            company_website: "nasa.gov".to_string(),
            job_title: "Mathematician".to_string(),
        }
    }

    #[tokio::test]
    async fn extracts_nested_contact_phone() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/tmp/numbusLookup"))
            .and(body_json(serde_json::json!({
                "api": "000099998888",
                "fullName": "Katherine Johnson",
                "companyWebsite": "nasa.gov",
                "jobTitle": "Mathematician",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "contact": { "phone": "+1-757-555-0166" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = NimbusProvider::with_base_url(
            config(),
            "000099998888".to_string(),
            server.uri(),
        );
        let phone = provider.lookup(&params()).await.unwrap();
        assert_eq!(phone, Some("+1-757-555-0166".to_string()));
    }

    #[tokio::test]
    async fn missing_contact_phone_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "contact": { "phone": null }
            })))
            .mount(&server)
            .await;

        let provider =
            NimbusProvider::with_base_url(config(), "000099998888".to_string(), server.uri());
        let phone = provider.lookup(&params()).await.unwrap();
        assert_eq!(phone, None);
    }
}
