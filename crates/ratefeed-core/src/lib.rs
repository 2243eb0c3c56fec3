//! # Ratefeed Core
//!
//! Resilient currency-rate provider layer: fetches, caches, and paginates
//! foreign-exchange rates from an upstream HTTP API while shielding
//! callers from upstream instability.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`cache`] | Generic TTL cache for rate lookups |
//! | [`circuit_breaker`] | Circuit breaker for upstream calls |
//! | [`domain`] | Currency codes, restricted policy, rate records |
//! | [`error`] | Error taxonomy crossing the provider boundary |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`provider`] | Provider trait and historical query/page types |
//! | [`providers`] | Upstream implementations (Frankfurter) |
//! | [`registry`] | Provider name resolution |
//! | [`resilience`] | Retry loop wrapped by the circuit breaker |
//! | [`retry`] | Backoff and retry configuration |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ratefeed_core::{CurrencyProvider, RegistryBuilder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = RegistryBuilder::new().build();
//!     let provider = registry.resolve("frankfurter")?;
//!
//!     let record = provider.latest_rates("USD").await?;
//!     println!("1 USD buys {} currencies", record.rates().len());
//!
//!     let eur = provider.convert(100.0, "USD", "EUR").await?;
//!     println!("100 USD = {eur:.2} EUR");
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │ ProviderRegistry │  name -> provider (default: frankfurter)
//! └────────┬─────────┘
//!          ▼
//! ┌──────────────────┐     ┌──────────────────┐
//! │ CurrencyProvider │────▶│ TtlCache         │  latest 1h / convert 1h
//! │ (Frankfurter)    │     │                  │  historical 24h
//! └────────┬─────────┘     └──────────────────┘
//!          ▼ (cache miss)
//! ┌──────────────────┐     ┌──────────────────┐
//! │ ResilientClient  │────▶│ CircuitBreaker   │  5 failures / 60s open
//! │ (retry 1s 2s 4s) │     └──────────────────┘
//! └────────┬─────────┘
//!          ▼
//! ┌──────────────────┐
//! │ HttpClient       │  reqwest in production, scripted in tests
//! └──────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Every fallible operation returns a [`ProviderError`]; callers can
//! branch on the variant to pick a backoff strategy:
//!
//! ```rust
//! use ratefeed_core::ProviderError;
//!
//! fn handle_error(error: ProviderError) {
//!     match error {
//!         ProviderError::ServiceUnavailable => {
//!             // Circuit is open: back off hard, no call was made.
//!         }
//!         ProviderError::TransientFailure { .. } => {
//!             // Retries already ran in-process: retry later, not now.
//!         }
//!         ProviderError::RestrictedCurrency { .. } => {
//!             // Business rejection: report, never retry.
//!         }
//!         _ => {}
//!     }
//! }
//! ```

pub mod cache;
pub mod circuit_breaker;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod provider;
pub mod providers;
pub mod registry;
pub mod resilience;
pub mod retry;

// Re-export commonly used types at crate root for convenience

pub use cache::TtlCache;
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use domain::{CurrencyCode, RateRecord, RestrictedCurrencyPolicy};
pub use error::{ProviderError, ValidationError};
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};
pub use provider::{CurrencyProvider, HistoricalPage, HistoricalQuery, MAX_PAGE_SIZE};
pub use providers::FrankfurterProvider;
pub use registry::{ProviderRegistry, RegistryBuilder, DEFAULT_PROVIDER};
pub use resilience::ResilientClient;
pub use retry::{Backoff, RetryConfig};
