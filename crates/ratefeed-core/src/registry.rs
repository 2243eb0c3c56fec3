//! Provider registry: resolves a provider name to a provider instance.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ProviderError;
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::provider::CurrencyProvider;
use crate::providers::FrankfurterProvider;

/// Name of the provider used when callers do not ask for one.
pub const DEFAULT_PROVIDER: &str = "frankfurter";

/// Maps provider names to instances.
///
/// Lookup is case-insensitive; an empty or whitespace name resolves to the
/// configured default provider.
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn CurrencyProvider>>,
    default_name: String,
}

impl ProviderRegistry {
    pub fn new(
        default_name: impl Into<String>,
        providers: Vec<Arc<dyn CurrencyProvider>>,
    ) -> Self {
        let providers = providers
            .into_iter()
            .map(|provider| (provider.name().to_ascii_lowercase(), provider))
            .collect();
        Self {
            providers,
            default_name: default_name.into().to_ascii_lowercase(),
        }
    }

    /// Resolve a provider by name.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::ProviderNotFound`] for a name that is not
    /// registered (including a misconfigured default).
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn CurrencyProvider>, ProviderError> {
        let trimmed = name.trim();
        let key = if trimmed.is_empty() {
            self.default_name.clone()
        } else {
            trimmed.to_ascii_lowercase()
        };

        self.providers
            .get(&key)
            .cloned()
            .ok_or(ProviderError::ProviderNotFound { name: key })
    }

    pub fn resolve_default(&self) -> Result<Arc<dyn CurrencyProvider>, ProviderError> {
        self.resolve("")
    }

    /// Registered provider names, sorted for stable display.
    pub fn provider_names(&self) -> Vec<&str> {
        let mut names = self
            .providers
            .keys()
            .map(String::as_str)
            .collect::<Vec<_>>();
        names.sort_unstable();
        names
    }
}

/// Builder for a [`ProviderRegistry`] wired with real or injected
/// transports.
#[derive(Default)]
pub struct RegistryBuilder {
    http: Option<Arc<dyn HttpClient>>,
    frankfurter_base_url: Option<String>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inject a transport, e.g. a scripted client in tests.
    pub fn with_http_client(mut self, http: Arc<dyn HttpClient>) -> Self {
        self.http = Some(http);
        self
    }

    /// Point the Frankfurter provider at a non-default base URL.
    pub fn with_frankfurter_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.frankfurter_base_url = Some(base_url.into());
        self
    }

    pub fn build(self) -> ProviderRegistry {
        let http = self
            .http
            .unwrap_or_else(|| Arc::new(ReqwestHttpClient::new()));

        let frankfurter: Arc<dyn CurrencyProvider> = match self.frankfurter_base_url {
            Some(base_url) => Arc::new(FrankfurterProvider::with_config(
                http,
                base_url,
                crate::retry::RetryConfig::default(),
                crate::circuit_breaker::CircuitBreakerConfig::default(),
            )),
            None => Arc::new(FrankfurterProvider::new(http)),
        };

        ProviderRegistry::new(DEFAULT_PROVIDER, vec![frankfurter])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ProviderRegistry {
        RegistryBuilder::new().build()
    }

    #[test]
    fn empty_name_resolves_the_default_provider() {
        let registry = registry();

        let provider = registry.resolve("").expect("default must resolve");
        assert_eq!(provider.name(), DEFAULT_PROVIDER);

        let provider = registry.resolve("   ").expect("whitespace resolves default");
        assert_eq!(provider.name(), DEFAULT_PROVIDER);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let registry = registry();

        for name in ["frankfurter", "FRANKFURTER", "Frankfurter"] {
            let provider = registry.resolve(name).expect("must resolve");
            assert_eq!(provider.name(), DEFAULT_PROVIDER);
        }
    }

    #[test]
    fn unknown_name_fails_with_not_found() {
        let registry = registry();

        let err = registry.resolve("fixer").expect_err("unknown must fail");
        assert!(matches!(err, ProviderError::ProviderNotFound { name } if name == "fixer"));
    }

    #[test]
    fn provider_names_are_sorted() {
        let registry = registry();
        assert_eq!(registry.provider_names(), vec!["frankfurter"]);
    }
}
