//! Behavior-driven tests for historical-range queries and pagination.

use ratefeed_tests::*;
use time::macros::date;

const THREE_DAY_RANGE: &str = r#"{
    "base": "EUR",
    "start_date": "2023-01-01",
    "end_date": "2023-01-03",
    "rates": {
        "2023-01-01": { "USD": 1.05, "GBP": 0.88 },
        "2023-01-02": { "USD": 1.06, "GBP": 0.87, "TRY": 20.1 },
        "2023-01-03": { "USD": 1.07, "GBP": 0.89 }
    }
}"#;

fn provider_from(transport: Arc<ScriptedHttpClient>) -> FrankfurterProvider {
    FrankfurterProvider::with_config(
        transport,
        "https://rates.test/v1",
        RetryConfig::no_retry(),
        CircuitBreakerConfig::default(),
    )
}

// =============================================================================
// Pagination: Ordering and counts
// =============================================================================

#[tokio::test]
async fn when_first_page_of_three_days_is_requested_newest_two_come_back() {
    // Given: a 3-day upstream range response
    let transport = Arc::new(ScriptedHttpClient::always_ok(THREE_DAY_RANGE));
    let provider = provider_from(transport);

    // When: page 1 with page size 2 is requested
    let query = HistoricalQuery::new("EUR", date!(2023 - 01 - 01), date!(2023 - 01 - 03), 1, 2)
        .expect("valid query");
    let page = provider.historical_rates(query).await.expect("succeeds");

    // Then: two records arrive newest-first and the total covers all days
    assert_eq!(page.total_count, 3);
    assert_eq!(page.records.len(), 2);
    assert_eq!(page.records[0].timestamp().date(), date!(2023 - 01 - 03));
    assert_eq!(page.records[1].timestamp().date(), date!(2023 - 01 - 02));
    assert_eq!(page.total_pages(2), 2);
}

#[tokio::test]
async fn when_later_pages_are_requested_the_full_range_is_fetched_once() {
    // Given: a provider that already served page 1 of the range
    let transport = Arc::new(ScriptedHttpClient::always_ok(THREE_DAY_RANGE));
    let provider = provider_from(transport.clone());
    let page_one = HistoricalQuery::new("EUR", date!(2023 - 01 - 01), date!(2023 - 01 - 03), 1, 2)
        .expect("valid query");
    provider
        .historical_rates(page_one)
        .await
        .expect("first page");

    // When: page 2 of the same range is requested
    let page_two = HistoricalQuery::new("EUR", date!(2023 - 01 - 01), date!(2023 - 01 - 03), 2, 2)
        .expect("valid query");
    let page = provider
        .historical_rates(page_two)
        .await
        .expect("second page");

    // Then: the oldest day arrives from cache; only one upstream call ever ran
    assert_eq!(page.records.len(), 1);
    assert_eq!(page.records[0].timestamp().date(), date!(2023 - 01 - 01));
    assert_eq!(page.total_count, 3);
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn when_page_lies_beyond_the_range_an_empty_page_with_full_count_returns() {
    let transport = Arc::new(ScriptedHttpClient::always_ok(THREE_DAY_RANGE));
    let provider = provider_from(transport);

    let query = HistoricalQuery::new("EUR", date!(2023 - 01 - 01), date!(2023 - 01 - 03), 9, 50)
        .expect("valid query");
    let page = provider.historical_rates(query).await.expect("succeeds");

    assert!(page.records.is_empty());
    assert_eq!(page.total_count, 3);
}

// =============================================================================
// Pagination: Per-record filtering
// =============================================================================

#[tokio::test]
async fn when_a_day_contains_restricted_codes_only_those_entries_are_dropped() {
    // Given: Jan-2 carries a TRY rate alongside allowed ones
    let transport = Arc::new(ScriptedHttpClient::always_ok(THREE_DAY_RANGE));
    let provider = provider_from(transport);

    // When: the full range is requested
    let query = HistoricalQuery::new("EUR", date!(2023 - 01 - 01), date!(2023 - 01 - 03), 1, 100)
        .expect("valid query");
    let page = provider.historical_rates(query).await.expect("succeeds");

    // Then: every record survives, each without restricted keys
    assert_eq!(page.total_count, 3);
    for record in &page.records {
        assert!(record
            .rates()
            .keys()
            .all(|code| !matches!(code.as_str(), "TRY" | "PLN" | "THB" | "MXN")));
    }
    assert_eq!(page.records[1].rates().len(), 2);
}

// =============================================================================
// Pagination: Request-shape validation
// =============================================================================

#[test]
fn when_the_date_range_is_inverted_validation_fails_before_any_call() {
    let error = HistoricalQuery::new("EUR", date!(2023 - 01 - 03), date!(2023 - 01 - 01), 1, 10)
        .expect_err("inverted range must fail");
    assert!(matches!(error, ValidationError::DateRangeInverted { .. }));
}

#[test]
fn when_page_or_page_size_is_out_of_bounds_validation_fails() {
    let error = HistoricalQuery::new("EUR", date!(2023 - 01 - 01), date!(2023 - 01 - 03), 0, 10)
        .expect_err("page 0 must fail");
    assert!(matches!(error, ValidationError::PageOutOfRange { .. }));

    let error = HistoricalQuery::new("EUR", date!(2023 - 01 - 01), date!(2023 - 01 - 03), 1, 101)
        .expect_err("oversized page must fail");
    assert!(matches!(error, ValidationError::PageSizeOutOfRange { .. }));
}

#[tokio::test]
async fn when_the_base_is_restricted_history_is_refused_without_io() {
    let transport = Arc::new(ScriptedHttpClient::always_ok(THREE_DAY_RANGE));
    let provider = provider_from(transport.clone());

    let query = HistoricalQuery::new("MXN", date!(2023 - 01 - 01), date!(2023 - 01 - 03), 1, 10)
        .expect("shape itself is valid");
    let error = provider
        .historical_rates(query)
        .await
        .expect_err("restricted base must fail");

    assert!(matches!(error, ProviderError::RestrictedCurrency { .. }));
    assert_eq!(transport.calls(), 0);
}
