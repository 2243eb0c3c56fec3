use std::collections::HashSet;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::error::{ProviderError, ValidationError};

/// Normalized ISO-4217 currency code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parse and normalize a currency code to uppercase.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyCurrency);
        }

        let normalized = trimmed.to_ascii_uppercase();
        let is_valid =
            normalized.len() == 3 && normalized.chars().all(|ch| ch.is_ascii_alphabetic());
        if !is_valid {
            return Err(ValidationError::InvalidCurrency {
                value: input.to_owned(),
            });
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CurrencyCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for CurrencyCode {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<CurrencyCode> for String {
    fn from(value: CurrencyCode) -> Self {
        value.0
    }
}

/// Currencies the service refuses to quote, convert, or store.
///
/// Consulted by every mutation path: direct construction fails with
/// [`ProviderError::RestrictedCurrency`], while upstream response mapping
/// silently drops restricted rate keys.
#[derive(Debug, Clone)]
pub struct RestrictedCurrencyPolicy {
    codes: HashSet<&'static str>,
}

impl Default for RestrictedCurrencyPolicy {
    fn default() -> Self {
        Self {
            codes: HashSet::from(["TRY", "PLN", "THB", "MXN"]),
        }
    }
}

impl RestrictedCurrencyPolicy {
    pub fn is_restricted(&self, code: &CurrencyCode) -> bool {
        self.codes.contains(code.as_str())
    }

    pub fn ensure_allowed(&self, code: &CurrencyCode) -> Result<(), ProviderError> {
        if self.is_restricted(code) {
            return Err(ProviderError::RestrictedCurrency {
                code: code.as_str().to_owned(),
            });
        }
        Ok(())
    }
}
