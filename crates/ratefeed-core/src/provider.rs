//! Provider contract and request/response types.
//!
//! [`CurrencyProvider`] is the upward interface the request-handling layer
//! calls into; implementations own their cache, breaker, and policy state.

use std::future::Future;
use std::pin::Pin;

use time::Date;

use crate::domain::RateRecord;
use crate::error::{ProviderError, ValidationError};

/// Largest page size a historical query may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Validated historical-range query.
///
/// Pagination applies to the provider's view of the full range; the range
/// itself (not the page) is the cache unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoricalQuery {
    pub base: String,
    pub start: Date,
    pub end: Date,
    pub page: u32,
    pub page_size: u32,
}

impl HistoricalQuery {
    /// Validate the request shape before any network call is considered.
    pub fn new(
        base: impl Into<String>,
        start: Date,
        end: Date,
        page: u32,
        page_size: u32,
    ) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::DateRangeInverted { start, end });
        }
        if page < 1 {
            return Err(ValidationError::PageOutOfRange { page });
        }
        if page_size < 1 || page_size > MAX_PAGE_SIZE {
            return Err(ValidationError::PageSizeOutOfRange {
                page_size,
                max: MAX_PAGE_SIZE,
            });
        }

        Ok(Self {
            base: base.into(),
            start,
            end,
            page,
            page_size,
        })
    }
}

/// One page of a historical range, plus the unpaginated record count.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalPage {
    pub records: Vec<RateRecord>,
    pub total_count: usize,
}

impl HistoricalPage {
    /// Page count for display: `ceil(total_count / page_size)`.
    pub fn total_pages(&self, page_size: u32) -> usize {
        self.total_count.div_ceil(page_size as usize)
    }
}

/// Boxed future returned by provider trait methods.
pub type ProviderFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, ProviderError>> + Send + 'a>>;

/// Exchange-rate provider contract.
///
/// Implementations must be `Send + Sync`; one instance serves many
/// concurrent callers and outbound calls must not block each other.
pub trait CurrencyProvider: Send + Sync {
    /// Registry name of this provider.
    fn name(&self) -> &'static str;

    /// Latest rates for a base currency.
    ///
    /// # Errors
    ///
    /// `Validation` for malformed codes, `RestrictedCurrency` for blocked
    /// ones, `ServiceUnavailable` while the breaker is open,
    /// `TransientFailure` after retries exhaust, `Deserialization` for
    /// malformed payloads.
    fn latest_rates<'a>(&'a self, base: &'a str) -> ProviderFuture<'a, RateRecord>;

    /// Convert `amount` from one currency to another at the latest rate.
    fn convert<'a>(&'a self, amount: f64, from: &'a str, to: &'a str) -> ProviderFuture<'a, f64>;

    /// One page of rates over a historical date range, newest first.
    fn historical_rates<'a>(&'a self, query: HistoricalQuery)
        -> ProviderFuture<'a, HistoricalPage>;
}

impl std::fmt::Debug for dyn CurrencyProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrencyProvider")
            .field("name", &self.name())
            .finish()
    }
}
