use thiserror::Error;

/// Malformed-input and request-shape errors exposed by `ratefeed-core`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("currency code cannot be empty")]
    EmptyCurrency,
    #[error("currency must be a 3-letter ISO code: '{value}'")]
    InvalidCurrency { value: String },

    #[error("rate for '{currency}' must be a positive finite number, got {rate}")]
    NonPositiveRate { currency: String, rate: f64 },
    #[error("rate for the base currency '{currency}' is derived, not stored")]
    SelfRate { currency: String },
    #[error("amount must be a positive finite number, got {amount}")]
    NonPositiveAmount { amount: f64 },
    #[error("rate source cannot be empty")]
    EmptySource,

    #[error("start date {start} must be on or before end date {end}")]
    DateRangeInverted { start: time::Date, end: time::Date },
    #[error("page must be at least 1, got {page}")]
    PageOutOfRange { page: u32 },
    #[error("page size must be between 1 and {max}, got {page_size}")]
    PageSizeOutOfRange { page_size: u32, max: u32 },
}

/// Top-level error type crossing the provider boundary.
///
/// Every failure a caller can observe is one of these variants; nothing
/// leaves the crate as a raw transport or parse error.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProviderError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Business-rule rejection, distinct from malformed input.
    #[error("currency '{code}' is restricted")]
    RestrictedCurrency { code: String },

    /// The circuit breaker is open; no network call was attempted.
    #[error("upstream rate service is unavailable: circuit breaker is open")]
    ServiceUnavailable,

    /// The upstream kept failing after the retry budget was spent.
    #[error("upstream request failed after {attempts} attempt(s): {message}")]
    TransientFailure { attempts: u32, message: String },

    /// The upstream answered, but the payload did not parse.
    #[error("failed to deserialize upstream payload: {message}")]
    Deserialization { message: String },

    #[error("provider '{name}' is not registered")]
    ProviderNotFound { name: String },
}

impl ProviderError {
    /// Stable error code for logs and envelope serialization.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "provider.invalid_argument",
            Self::RestrictedCurrency { .. } => "provider.restricted_currency",
            Self::ServiceUnavailable => "provider.service_unavailable",
            Self::TransientFailure { .. } => "provider.transient_failure",
            Self::Deserialization { .. } => "provider.deserialization",
            Self::ProviderNotFound { .. } => "provider.not_found",
        }
    }

    /// Whether a caller may reasonably retry the same request later.
    ///
    /// `ServiceUnavailable` and `TransientFailure` are both retryable but
    /// deserve different backoff: the former fails fast while the breaker
    /// cools down, the latter already burned the in-process retry budget.
    pub const fn retryable(&self) -> bool {
        matches!(
            self,
            Self::ServiceUnavailable | Self::TransientFailure { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restricted_is_not_a_validation_error() {
        let err = ProviderError::RestrictedCurrency {
            code: String::from("TRY"),
        };
        assert!(!matches!(err, ProviderError::Validation(_)));
        assert_eq!(err.code(), "provider.restricted_currency");
        assert!(!err.retryable());
    }

    #[test]
    fn transient_and_unavailable_are_retryable() {
        assert!(ProviderError::ServiceUnavailable.retryable());
        assert!(ProviderError::TransientFailure {
            attempts: 4,
            message: String::from("status 503"),
        }
        .retryable());
        assert!(!ProviderError::Deserialization {
            message: String::from("expected value"),
        }
        .retryable());
    }
}
