use std::num::{NonZeroU32, NonZeroUsize};
use std::time::Duration;

use rust_decimal::Decimal;

/// Static, process-start configuration for one lookup provider.
///
/// Invariant (enforced by [`crate::provider_config::validate_uniqueness`],
/// not by the type itself — priorities and names are only meaningful in
/// relation to their sibling configs): names are unique and priorities
/// define a total order among enabled providers.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub name: String,
    pub priority: NonZeroU32,
    pub cost_per_request: Decimal,
    pub rate_limit: NonZeroU32,
    pub time_window: Duration,
    pub max_concurrent: NonZeroUsize,
    pub enabled: bool,
    pub timeout: Duration,
}

/// Validate that a slice of configs has unique names.
/// Returns the name of the first duplicate found, if any.
pub fn first_duplicate_name(configs: &[ProviderConfig]) -> Option<&str> {
    let mut seen = std::collections::HashSet::new();
    for config in configs {
        if !seen.insert(config.name.as_str()) {
            return Some(config.name.as_str());
        }
    }
    None
}
