//! Retrying request executor: one logical request, up to `max_retries + 1`
//! strictly sequential attempts, each bounded by a per-attempt deadline.

use std::time::Duration;

use reqwest::StatusCode;

use crate::error::Error;

/// Retry and timeout policy for a logical request.
///
/// The defaults match the production backend contract: 3 retries (4 attempts
/// total), exponential backoff from 1 s capped at 10 s, and a 15 s deadline
/// per attempt. Tests shrink the delays with the `with_*` overrides.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
    max_delay: Duration,
    timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            timeout: Duration::from_secs(15),
        }
    }
}

impl RetryPolicy {
    /// Override the maximum number of retries (attempts after the first).
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Override the backoff base delay.
    #[must_use]
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Override the backoff delay cap.
    #[must_use]
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Override the per-attempt deadline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Maximum number of retries (attempts after the first).
    #[must_use]
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Per-attempt deadline.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Backoff delay before the retry following attempt `attempt` (0-based):
    /// `min(base_delay * 2^attempt, max_delay)`. Deterministic, no jitter.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(self.max_delay)
    }
}

/// A status that is worth another attempt: rate limiting or a server error.
/// Client errors are the caller's fault and are returned as-is.
fn retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Executes a request with retry, backoff, and a per-attempt deadline.
///
/// `build_request` is invoked fresh for every attempt — multipart bodies are
/// consumed on send and cannot be replayed from the same builder.
///
/// Outcomes:
/// - success and non-retryable statuses return the response immediately;
/// - retryable statuses (429, 5xx) are retried up to `max_retries`, then the
///   **last response** is returned for the normalizer to map — an HTTP error
///   response is still structured data the caller can parse;
/// - transport failures are retried the same way but have no response to
///   return, so exhaustion surfaces as [`Error::Network`];
/// - an attempt that outlives the deadline is abandoned and surfaces as
///   [`Error::Timeout`] without further retries.
///
/// # Errors
///
/// Returns [`Error::Timeout`], [`Error::Network`], or whatever error
/// `build_request` produced.
pub async fn execute<F>(policy: &RetryPolicy, build_request: F) -> Result<reqwest::Response, Error>
where
    F: Fn() -> Result<reqwest::RequestBuilder, Error>,
{
    let mut attempt: u32 = 0;
    loop {
        let request = build_request()?;
        match tokio::time::timeout(policy.timeout(), request.send()).await {
            // Deadline exceeded: dropping the send future aborts the attempt.
            Err(_) => {
                tracing::warn!(
                    attempt = attempt + 1,
                    timeout_ms = policy.timeout().as_millis() as u64,
                    "request timed out"
                );
                return Err(Error::Timeout);
            }
            Ok(Ok(response)) => {
                let status = response.status();
                if !retryable(status) {
                    return Ok(response);
                }
                if attempt >= policy.max_retries() {
                    tracing::warn!(
                        attempts = attempt + 1,
                        status = %status,
                        "retries exhausted, returning last response"
                    );
                    return Ok(response);
                }
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    attempt = attempt + 1,
                    max_retries = policy.max_retries(),
                    status = %status,
                    delay_ms = delay.as_millis() as u64,
                    "retryable status, backing off"
                );
                tokio::time::sleep(delay).await;
            }
            Ok(Err(error)) => {
                if attempt >= policy.max_retries() {
                    return Err(Error::Network(error.to_string()));
                }
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    attempt = attempt + 1,
                    max_retries = policy.max_retries(),
                    error = %error,
                    delay_ms = delay.as_millis() as u64,
                    "network error, backing off"
                );
                tokio::time::sleep(delay).await;
            }
        }
        attempt += 1;
    }
}
