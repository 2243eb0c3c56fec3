//! Resilient execution of upstream calls: circuit breaker wrapping a
//! bounded retry loop.
//!
//! The breaker is consulted once per logical call and records only the
//! final outcome of the retry loop, so the failure streak counts logical
//! calls, not individual attempts.

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, warn};

use crate::circuit_breaker::{CircuitBreaker, CircuitState};
use crate::error::ProviderError;
use crate::http_client::{HttpClient, HttpRequest, HttpResponse};
use crate::retry::RetryConfig;

/// Transport wrapper that applies retry and circuit-breaker policies to
/// every outbound call.
///
/// One instance per provider; the breaker inside is shared by all
/// concurrent calls through that provider.
pub struct ResilientClient {
    http: Arc<dyn HttpClient>,
    breaker: Arc<CircuitBreaker>,
    retry: RetryConfig,
}

impl ResilientClient {
    pub fn new(http: Arc<dyn HttpClient>, breaker: Arc<CircuitBreaker>, retry: RetryConfig) -> Self {
        Self {
            http,
            breaker,
            retry,
        }
    }

    /// Breaker handle, exposed for health inspection.
    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Execute a logical call with no overall deadline.
    pub async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ProviderError> {
        self.execute_with_deadline(request, None).await
    }

    /// Execute a logical call, giving up at `deadline` if one is supplied.
    ///
    /// The deadline is checked before every attempt and caps backoff
    /// sleeps, so a caller-side cutoff aborts the retry loop immediately
    /// instead of completing the remaining attempts. A non-2xx status
    /// counts as a failed attempt.
    pub async fn execute_with_deadline(
        &self,
        request: HttpRequest,
        deadline: Option<Instant>,
    ) -> Result<HttpResponse, ProviderError> {
        if !self.breaker.allow_request() {
            warn!(url = %request.url, "circuit breaker is open; failing fast");
            return Err(ProviderError::ServiceUnavailable);
        }

        let max_attempts = self.retry.max_retries.saturating_add(1);
        let mut attempts_made = 0u32;
        let mut last_failure = String::from("no attempt was made");

        'attempts: for attempt in 0..max_attempts {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                last_failure = format!("call deadline reached after {attempts_made} attempt(s)");
                break;
            }

            attempts_made += 1;
            match self.http.execute(request.clone()).await {
                Ok(response) if response.is_success() => {
                    self.breaker.record_success();
                    return Ok(response);
                }
                Ok(response) => {
                    last_failure = format!("upstream returned status {}", response.status);
                }
                Err(transport) => {
                    last_failure = transport.message().to_owned();
                    if !transport.retryable() {
                        // Retrying cannot help; report the logical failure now.
                        break 'attempts;
                    }
                }
            }

            if attempt + 1 < max_attempts {
                let delay = self.retry.delay_for_attempt(attempt);
                warn!(
                    url = %request.url,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    failure = %last_failure,
                    "upstream attempt failed; backing off before retry"
                );

                if let Some(deadline) = deadline {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if delay >= remaining {
                        last_failure =
                            format!("call deadline reached after {attempts_made} attempt(s)");
                        break;
                    }
                }

                tokio::time::sleep(delay).await;
            }
        }

        self.breaker.record_failure();
        if self.breaker.state() == CircuitState::Open {
            error!(
                url = %request.url,
                failures = self.breaker.consecutive_failures(),
                "circuit breaker tripped; upstream calls suspended"
            );
        }

        Err(ProviderError::TransientFailure {
            attempts: attempts_made,
            message: last_failure,
        })
    }
}
