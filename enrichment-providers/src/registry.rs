use std::sync::Arc;

use enrichment_common::provider_config::first_duplicate_name;

use crate::provider::PhoneProvider;

/// Owns the set of enabled providers, sorted by priority ascending.
/// Constructed once; immutable thereafter.
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn PhoneProvider>>,
}

impl ProviderRegistry {
    /// Builds the registry from an already-constructed list of providers,
    /// filtering out disabled configs and sorting the rest by priority.
    ///
    /// # Panics
    ///
    /// Panics if two provider configs share a name — names must be unique,
    /// and a registry that silently picked one would hide a configuration
    /// bug rather than surface it at startup.
    pub fn new(providers: Vec<Arc<dyn PhoneProvider>>) -> Self {
        let configs: Vec<_> = providers.iter().map(|p| p.config().clone()).collect();
        if let Some(duplicate) = first_duplicate_name(&configs) {
            panic!("duplicate provider name in registry: {duplicate}");
        }

        let mut enabled: Vec<_> = providers
            .into_iter()
            .filter(|provider| provider.config().enabled)
            .collect();
        enabled.sort_by_key(|provider| provider.config().priority);

        Self { providers: enabled }
    }

    /// Providers in priority order, ascending (lowest numeric priority first).
    pub fn ordered(&self) -> &[Arc<dyn PhoneProvider>] {
        &self.providers
    }

    /// Look up an enabled provider by name. O(n); registries are small (a
    /// handful of providers), so no index is warranted.
    pub fn find_by_name(&self, name: &str) -> Option<&Arc<dyn PhoneProvider>> {
        self.providers.iter().find(|p| p.config().name == name)
    }
}
