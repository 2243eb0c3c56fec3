//! Domain types for exchange-rate data.
//!
//! All types validate their invariants at construction time:
//!
//! - [`CurrencyCode`] is always a normalized 3-letter code
//! - [`RateRecord`] never stores a restricted currency, a non-positive
//!   rate, or a rate for its own base
//! - [`RestrictedCurrencyPolicy`] is the single source of truth for the
//!   restricted set, injected into every mutation path

mod currency;
mod rate_record;

pub use currency::{CurrencyCode, RestrictedCurrencyPolicy};
pub use rate_record::RateRecord;
