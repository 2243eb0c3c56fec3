use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use time::{Date, OffsetDateTime};
use tracing::{debug, info, warn};

use crate::cache::TtlCache;
use crate::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
use crate::domain::{CurrencyCode, RateRecord, RestrictedCurrencyPolicy};
use crate::error::{ProviderError, ValidationError};
use crate::http_client::{HttpClient, HttpRequest, HttpResponse};
use crate::provider::{CurrencyProvider, HistoricalPage, HistoricalQuery, ProviderFuture};
use crate::resilience::ResilientClient;
use crate::retry::RetryConfig;

const PROVIDER_NAME: &str = "frankfurter";
const API_SOURCE: &str = "Frankfurter API";
const DEFAULT_BASE_URL: &str = "https://api.frankfurter.dev/v1";

const LATEST_TTL: Duration = Duration::from_secs(60 * 60);
const CONVERT_TTL: Duration = Duration::from_secs(60 * 60);
// Historical ranges in the past are immutable, so they keep much longer.
const HISTORICAL_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// `latest` endpoint payload: `{ base, date, rates: {CODE: number} }`.
///
/// Only the fields the mapping reads are declared; serde skips the rest.
#[derive(Debug, Deserialize)]
struct LatestPayload {
    date: String,
    rates: HashMap<String, f64>,
}

/// Date-range payload: `{ rates: {date: {CODE: number}} }`.
#[derive(Debug, Deserialize)]
struct RangePayload {
    rates: BTreeMap<String, HashMap<String, f64>>,
}

/// Rate provider backed by the Frankfurter HTTP API.
///
/// Owns its resilience wrapper, restricted-currency policy, and one typed
/// TTL cache per operation. All state is instance-local; clones of the
/// `Arc`-wrapped provider share it.
pub struct FrankfurterProvider {
    client: ResilientClient,
    base_url: String,
    policy: RestrictedCurrencyPolicy,
    latest_cache: TtlCache<RateRecord>,
    convert_cache: TtlCache<f64>,
    historical_cache: TtlCache<Vec<RateRecord>>,
}

impl FrankfurterProvider {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self::with_config(
            http,
            DEFAULT_BASE_URL,
            RetryConfig::default(),
            CircuitBreakerConfig::default(),
        )
    }

    pub fn with_config(
        http: Arc<dyn HttpClient>,
        base_url: impl Into<String>,
        retry: RetryConfig,
        breaker: CircuitBreakerConfig,
    ) -> Self {
        let base_url = base_url.into();
        let base_url = base_url.trim_end_matches('/').to_owned();
        Self {
            client: ResilientClient::new(http, Arc::new(CircuitBreaker::new(breaker)), retry),
            base_url,
            policy: RestrictedCurrencyPolicy::default(),
            latest_cache: TtlCache::new(LATEST_TTL),
            convert_cache: TtlCache::new(CONVERT_TTL),
            historical_cache: TtlCache::new(HISTORICAL_TTL),
        }
    }

    /// Current breaker state, for health inspection.
    pub fn circuit_state(&self) -> CircuitState {
        self.client.breaker().state()
    }

    async fn fetch(&self, url: String) -> Result<HttpResponse, ProviderError> {
        info!(%url, provider = PROVIDER_NAME, "calling upstream rate API");
        self.client.execute(HttpRequest::get(url)).await
    }

    async fn latest_rates_impl(&self, base: &str) -> Result<RateRecord, ProviderError> {
        let base = CurrencyCode::parse(base)?;
        self.policy.ensure_allowed(&base)?;

        let cache_key = format!("latest:{base}");
        if let Some(record) = self.latest_cache.get(&cache_key).await {
            info!(%base, "latest rates served from cache");
            return Ok(record);
        }

        let url = format!(
            "{}/latest?base={}",
            self.base_url,
            urlencoding::encode(base.as_str())
        );
        let response = self.fetch(url).await?;
        let payload: LatestPayload = parse_payload(&response.body)?;

        let timestamp = parse_upstream_date(&payload.date)?
            .midnight()
            .assume_utc();
        let record = self.build_record(base, timestamp, &payload.rates)?;

        self.latest_cache.put(cache_key, record.clone(), None).await;
        Ok(record)
    }

    async fn convert_impl(&self, amount: f64, from: &str, to: &str) -> Result<f64, ProviderError> {
        let from = CurrencyCode::parse(from)?;
        self.policy.ensure_allowed(&from)?;
        let to = CurrencyCode::parse(to)?;
        self.policy.ensure_allowed(&to)?;

        if !amount.is_finite() || amount <= 0.0 {
            return Err(ValidationError::NonPositiveAmount { amount }.into());
        }

        // Converting a currency to itself is always 1, no lookup needed.
        if from == to {
            return Ok(amount);
        }

        let cache_key = format!("convert:{amount}:{from}:{to}");
        if let Some(converted) = self.convert_cache.get(&cache_key).await {
            info!(%from, %to, amount, "conversion served from cache");
            return Ok(converted);
        }

        let url = format!(
            "{}/latest?base={}&symbols={}",
            self.base_url,
            urlencoding::encode(from.as_str()),
            urlencoding::encode(to.as_str())
        );
        let response = self.fetch(url).await?;
        let payload: LatestPayload = parse_payload(&response.body)?;

        // Graceful degradation: a response that omits the target symbol
        // yields the amount unchanged rather than an error.
        let converted = match payload.rates.get(to.as_str()) {
            Some(rate) => amount * rate,
            None => {
                warn!(%from, %to, "upstream omitted target symbol; returning amount unconverted");
                amount
            }
        };

        self.convert_cache.put(cache_key, converted, None).await;
        Ok(converted)
    }

    async fn historical_rates_impl(
        &self,
        query: HistoricalQuery,
    ) -> Result<HistoricalPage, ProviderError> {
        let base = CurrencyCode::parse(&query.base)?;
        self.policy.ensure_allowed(&base)?;

        let start = format_date(query.start);
        let end = format_date(query.end);

        // The cache unit is the full unpaginated range; every page of the
        // same range is served from one upstream fetch.
        let cache_key = format!("historical:{base}:{start}:{end}");
        let all_records = match self.historical_cache.get(&cache_key).await {
            Some(records) => {
                info!(%base, %start, %end, "historical range served from cache");
                records
            }
            None => {
                let url = format!(
                    "{}/{start}..{end}?base={}",
                    self.base_url,
                    urlencoding::encode(base.as_str())
                );
                let response = self.fetch(url).await?;
                let payload: RangePayload = parse_payload(&response.body)?;

                let records = self.map_range(&base, payload)?;
                self.historical_cache
                    .put(cache_key, records.clone(), None)
                    .await;
                records
            }
        };

        let total_count = all_records.len();
        let skip = (query.page as usize - 1) * query.page_size as usize;
        let records = all_records
            .into_iter()
            .skip(skip)
            .take(query.page_size as usize)
            .collect();

        Ok(HistoricalPage {
            records,
            total_count,
        })
    }

    /// Map one day's rate map into a record, silently dropping restricted
    /// codes and a redundant base key.
    fn build_record(
        &self,
        base: CurrencyCode,
        timestamp: OffsetDateTime,
        rates: &HashMap<String, f64>,
    ) -> Result<RateRecord, ProviderError> {
        let mut record = RateRecord::new(base, timestamp, API_SOURCE, &self.policy)?;

        for (code, rate) in rates {
            let code = CurrencyCode::parse(code).map_err(|_| ProviderError::Deserialization {
                message: format!("invalid currency code in upstream payload: '{code}'"),
            })?;

            if self.policy.is_restricted(&code) {
                debug!(code = %code, "dropping restricted currency from upstream response");
                continue;
            }
            if code == *record.base() {
                continue;
            }

            record.add_rate(code, *rate, &self.policy)?;
        }

        Ok(record)
    }

    fn map_range(
        &self,
        base: &CurrencyCode,
        payload: RangePayload,
    ) -> Result<Vec<RateRecord>, ProviderError> {
        let mut records = Vec::with_capacity(payload.rates.len());

        for (date, rates) in &payload.rates {
            let Ok(date) = parse_upstream_date(date) else {
                warn!(%date, "skipping unparseable date key in range response");
                continue;
            };

            let record =
                self.build_record(base.clone(), date.midnight().assume_utc(), rates)?;
            records.push(record);
        }

        records.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
        Ok(records)
    }
}

impl CurrencyProvider for FrankfurterProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn latest_rates<'a>(&'a self, base: &'a str) -> ProviderFuture<'a, RateRecord> {
        Box::pin(self.latest_rates_impl(base))
    }

    fn convert<'a>(&'a self, amount: f64, from: &'a str, to: &'a str) -> ProviderFuture<'a, f64> {
        Box::pin(self.convert_impl(amount, from, to))
    }

    fn historical_rates<'a>(
        &'a self,
        query: HistoricalQuery,
    ) -> ProviderFuture<'a, HistoricalPage> {
        Box::pin(self.historical_rates_impl(query))
    }
}

fn parse_payload<'a, T: Deserialize<'a>>(body: &'a str) -> Result<T, ProviderError> {
    serde_json::from_str(body).map_err(|e| ProviderError::Deserialization {
        message: e.to_string(),
    })
}

fn parse_upstream_date(input: &str) -> Result<Date, ProviderError> {
    let format = time::macros::format_description!("[year]-[month]-[day]");
    Date::parse(input, &format).map_err(|e| ProviderError::Deserialization {
        message: format!("invalid date '{input}' in upstream payload: {e}"),
    })
}

fn format_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}
