use std::num::{NonZeroU32, NonZeroUsize};
use std::time::Duration;

use enrichment_common::provider_config::ProviderConfig;
use rust_decimal_macros::dec;

/// Static configs for the three provider backends. API keys are supplied
/// separately at construction time (see `enrichment-api`'s configuration):
/// `ProviderConfig` itself is static and never mutated.
pub fn orion_config() -> ProviderConfig {
    ProviderConfig {
        name: "Orion Connect".to_string(),
        priority: NonZeroU32::new(1).unwrap(),
        cost_per_request: dec!(0.02),
        rate_limit: NonZeroU32::new(5).unwrap(),
        time_window: Duration::from_millis(1000),
        max_concurrent: NonZeroUsize::new(3).unwrap(),
        enabled: true,
        timeout: Duration::from_millis(10_000),
    }
}

pub fn astra_config() -> ProviderConfig {
    ProviderConfig {
        name: "Astra Dialer".to_string(),
        priority: NonZeroU32::new(2).unwrap(),
        cost_per_request: dec!(0.01),
        rate_limit: NonZeroU32::new(10).unwrap(),
        time_window: Duration::from_millis(1000),
        max_concurrent: NonZeroUsize::new(10).unwrap(),
        enabled: true,
        timeout: Duration::from_millis(10_000),
    }
}

pub fn nimbus_config() -> ProviderConfig {
    ProviderConfig {
        name: "Nimbus Lookup".to_string(),
        priority: NonZeroU32::new(3).unwrap(),
        cost_per_request: dec!(0.015),
        rate_limit: NonZeroU32::new(2).unwrap(),
        time_window: Duration::from_millis(1000),
        max_concurrent: NonZeroUsize::new(2).unwrap(),
        enabled: true,
        timeout: Duration::from_millis(10_000),
    }
}

/// The Nimbus Lookup API key is embedded in the request body rather than
/// read from the environment, matching its wire contract
/// (`{ "api": "000099998888", ... }`).
pub const NIMBUS_STATIC_API_KEY: &str = "000099998888";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priorities_form_a_total_order() {
        assert_eq!(orion_config().priority.get(), 1);
        assert_eq!(astra_config().priority.get(), 2);
        assert_eq!(nimbus_config().priority.get(), 3);
    }
}
