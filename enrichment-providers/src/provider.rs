use async_trait::async_trait;
use enrichment_common::{LookupError, LookupParams, PhoneResult, ProviderConfig, RetryPolicy};
use enrichment_limiter::{LimiterStats, QueuedRateLimiter};
use rust_decimal::prelude::ToPrimitive;

/// Merged limiter + config stats, as returned by `PhoneProvider::get_stats`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderStats {
    pub provider: String,
    pub cost_per_request: rust_decimal::Decimal,
    pub priority: u32,
    pub enabled: bool,
    pub limiter: LimiterStats,
}

/// One external phone-lookup backend, gated through its own rate limiter.
///
/// Implementors provide only `lookup` (one raw HTTP attempt) and the shared
/// bits (`config`, `limiter`, `retry_policy`); `execute` is a single
/// combinator shared by every provider, holding the rate limiter and cost
/// decoration. Every error kind a provider can hit (transient transport/5xx,
/// client 4xx, timeout) resolves to a "no phone from this provider"
/// outcome rather than a propagated failure — `execute` never fails.
#[async_trait]
pub trait PhoneProvider: Send + Sync {
    /// Provider-specific lookup: one HTTP attempt, translated to `Option<String>`
    /// (`None` on a successful-but-empty response), or a classified `LookupError`.
    async fn lookup(&self, params: &LookupParams) -> Result<Option<String>, LookupError>;

    fn config(&self) -> &ProviderConfig;
    fn limiter(&self) -> &QueuedRateLimiter;
    fn retry_policy(&self) -> &RetryPolicy;

    /// Run `lookup` under the rate limiter with the shared retry policy,
    /// decorating the outcome with cost and provider identity. Cost is
    /// charged for the attempt that ran, whether or not it found a phone;
    /// an exhausted or non-retryable failure still charges the attempt and
    /// surfaces as "no phone".
    async fn execute(&self, params: &LookupParams) -> PhoneResult {
        let config = self.config();
        let provider_name = config.name.clone();
        let cost = config.cost_per_request;

        let outcome = self
            .limiter()
            .execute(|| async {
                self.retry_policy()
                    .run(&provider_name, || self.lookup(params))
                    .await
            })
            .await;

        let charge_cost = || {
            metrics::gauge!("phone_lookup_cost_total", "provider" => provider_name.clone())
                .increment(cost.to_f64().unwrap_or(0.0));
        };

        match outcome {
            Ok(Some(phone)) => {
                metrics::counter!("phone_lookup_found_total", "provider" => provider_name.clone())
                    .increment(1);
                charge_cost();
                PhoneResult::found(phone, provider_name, cost)
            }
            Ok(None) => {
                metrics::counter!("phone_lookup_empty_total", "provider" => provider_name.clone())
                    .increment(1);
                charge_cost();
                PhoneResult::not_found(provider_name, cost)
            }
            Err(error) => {
                metrics::counter!("phone_lookup_failed_total", "provider" => provider_name.clone())
                    .increment(1);
                charge_cost();
                tracing::warn!(provider = %error.provider(), %error, "provider attempt exhausted, no phone");
                PhoneResult::not_found(provider_name, cost)
            }
        }
    }

    async fn get_stats(&self) -> ProviderStats {
        let config = self.config();
        ProviderStats {
            provider: config.name.clone(),
            cost_per_request: config.cost_per_request,
            priority: config.priority.get(),
            enabled: config.enabled,
            limiter: self.limiter().stats().await,
        }
    }
}
