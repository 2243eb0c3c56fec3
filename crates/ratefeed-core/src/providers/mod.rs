//! Upstream rate-provider implementations.

mod frankfurter;

pub use frankfurter::FrankfurterProvider;
