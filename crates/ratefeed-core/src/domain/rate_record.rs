use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::currency::{CurrencyCode, RestrictedCurrencyPolicy};
use crate::error::{ProviderError, ValidationError};

/// Snapshot of exchange rates for one base currency at one instant.
///
/// Built once per upstream response (or per historical day) and immutable
/// to callers afterwards; [`add_rate`](RateRecord::add_rate) exists only
/// for the construction path. The rate map never contains the base
/// currency itself and never contains a restricted code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateRecord {
    base: CurrencyCode,
    #[serde(with = "time::serde::rfc3339")]
    timestamp: OffsetDateTime,
    source: String,
    rates: BTreeMap<CurrencyCode, f64>,
}

impl RateRecord {
    /// Create an empty record, validating the base currency against the
    /// restricted-currency policy.
    pub fn new(
        base: CurrencyCode,
        timestamp: OffsetDateTime,
        source: impl Into<String>,
        policy: &RestrictedCurrencyPolicy,
    ) -> Result<Self, ProviderError> {
        policy.ensure_allowed(&base)?;

        let source = source.into();
        if source.trim().is_empty() {
            return Err(ValidationError::EmptySource.into());
        }

        Ok(Self {
            base,
            timestamp,
            source,
            rates: BTreeMap::new(),
        })
    }

    /// Insert one rate, rejecting restricted codes, non-positive values,
    /// and the base currency itself (the self-rate is derived, not stored).
    pub fn add_rate(
        &mut self,
        currency: CurrencyCode,
        rate: f64,
        policy: &RestrictedCurrencyPolicy,
    ) -> Result<(), ProviderError> {
        policy.ensure_allowed(&currency)?;

        if currency == self.base {
            return Err(ValidationError::SelfRate {
                currency: currency.as_str().to_owned(),
            }
            .into());
        }

        if !rate.is_finite() || rate <= 0.0 {
            return Err(ValidationError::NonPositiveRate {
                currency: currency.as_str().to_owned(),
                rate,
            }
            .into());
        }

        self.rates.insert(currency, rate);
        Ok(())
    }

    pub fn base(&self) -> &CurrencyCode {
        &self.base
    }

    pub fn timestamp(&self) -> OffsetDateTime {
        self.timestamp
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn rates(&self) -> &BTreeMap<CurrencyCode, f64> {
        &self.rates
    }

    pub fn has_currency(&self, currency: &CurrencyCode) -> bool {
        *currency == self.base || self.rates.contains_key(currency)
    }

    /// Rate from the base to `target`; the base converts to itself at 1
    /// without a map lookup.
    pub fn conversion_rate(&self, target: &CurrencyCode) -> Option<f64> {
        if *target == self.base {
            return Some(1.0);
        }
        self.rates.get(target).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn usd_record(policy: &RestrictedCurrencyPolicy) -> RateRecord {
        RateRecord::new(
            CurrencyCode::parse("USD").expect("valid"),
            datetime!(2024-03-01 00:00 UTC),
            "Frankfurter API",
            policy,
        )
        .expect("USD is allowed")
    }

    #[test]
    fn restricted_base_is_rejected() {
        let policy = RestrictedCurrencyPolicy::default();
        let err = RateRecord::new(
            CurrencyCode::parse("TRY").expect("shape is valid"),
            datetime!(2024-03-01 00:00 UTC),
            "Frankfurter API",
            &policy,
        )
        .expect_err("restricted base must fail");

        assert!(matches!(err, ProviderError::RestrictedCurrency { code } if code == "TRY"));
    }

    #[test]
    fn restricted_rate_key_is_rejected() {
        let policy = RestrictedCurrencyPolicy::default();
        let mut record = usd_record(&policy);

        for code in ["PLN", "THB", "MXN"] {
            let err = record
                .add_rate(CurrencyCode::parse(code).expect("valid shape"), 4.5, &policy)
                .expect_err("restricted code must fail");
            assert!(matches!(err, ProviderError::RestrictedCurrency { .. }));
        }
    }

    #[test]
    fn non_positive_rates_are_rejected() {
        let policy = RestrictedCurrencyPolicy::default();
        let mut record = usd_record(&policy);
        let eur = CurrencyCode::parse("EUR").expect("valid");

        for rate in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = record
                .add_rate(eur.clone(), rate, &policy)
                .expect_err("must fail");
            assert!(matches!(
                err,
                ProviderError::Validation(ValidationError::NonPositiveRate { .. })
            ));
        }
    }

    #[test]
    fn base_rate_is_derived_not_stored() {
        let policy = RestrictedCurrencyPolicy::default();
        let mut record = usd_record(&policy);
        let usd = CurrencyCode::parse("USD").expect("valid");

        let err = record
            .add_rate(usd.clone(), 1.0, &policy)
            .expect_err("self-rate must fail");
        assert!(matches!(
            err,
            ProviderError::Validation(ValidationError::SelfRate { .. })
        ));

        assert_eq!(record.conversion_rate(&usd), Some(1.0));
        assert!(!record.rates().contains_key(&usd));
    }

    #[test]
    fn empty_source_is_rejected() {
        let policy = RestrictedCurrencyPolicy::default();
        let err = RateRecord::new(
            CurrencyCode::parse("USD").expect("valid"),
            datetime!(2024-03-01 00:00 UTC),
            "  ",
            &policy,
        )
        .expect_err("blank source must fail");

        assert!(matches!(
            err,
            ProviderError::Validation(ValidationError::EmptySource)
        ));
    }

    #[test]
    fn lookup_covers_base_and_rate_keys() {
        let policy = RestrictedCurrencyPolicy::default();
        let mut record = usd_record(&policy);
        let eur = CurrencyCode::parse("EUR").expect("valid");
        let gbp = CurrencyCode::parse("GBP").expect("valid");

        record.add_rate(eur.clone(), 0.85, &policy).expect("valid rate");

        assert!(record.has_currency(&eur));
        assert!(record.has_currency(record.base()));
        assert!(!record.has_currency(&gbp));
        assert_eq!(record.conversion_rate(&eur), Some(0.85));
        assert_eq!(record.conversion_rate(&gbp), None);
    }
}
