// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Retry engine with exponential backoff + jitter for fill requests.
//
// Classifies errors into Transient (auto-retry), UserAction (stop and tell
// the operator), and Permanent (give up). Only transient errors are retried.

use std::time::Duration;

use async_trait::async_trait;
use outcrop_canvas::{Mask, Matte, Raster};
use outcrop_core::config::RetrySettings;
use outcrop_core::error::{OutcropError, Result};
use outcrop_core::types::{ErrorClass, FillParams};
use tracing::{debug, info, warn};

use crate::client::FillService;

/// Retry configuration.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,
    /// Base delay between retries (exponential backoff).
    pub base_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::from(&RetrySettings::default())
    }
}

impl From<&RetrySettings> for RetryConfig {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_retries: settings.max_retries,
            base_delay: Duration::from_millis(settings.base_delay_ms),
            max_delay: Duration::from_millis(settings.max_delay_ms),
        }
    }
}

/// Result of evaluating whether to retry.
#[derive(Debug)]
pub enum RetryDecision {
    /// Retry after this delay.
    RetryAfter(Duration),
    /// Do not retry: the error is permanent or operator action is needed.
    GiveUp(ErrorClass),
    /// Maximum retries exhausted.
    Exhausted,
}

/// Classify an `OutcropError` into an `ErrorClass` for retry decisions.
pub fn classify_error(err: &OutcropError) -> ErrorClass {
    match err {
        // Transient: network, timeouts, throttling, server trouble
        OutcropError::Transport(_) => ErrorClass::Transient,
        OutcropError::HttpStatus { status, .. } => classify_status(*status),

        // Operator must act
        OutcropError::Credential(_) => ErrorClass::UserAction,
        OutcropError::ImageRead { .. } => ErrorClass::UserAction,
        OutcropError::ImageWrite { .. } => ErrorClass::UserAction,
        OutcropError::OutputDir { .. } => ErrorClass::UserAction,
        OutcropError::InvalidConfig(_) => ErrorClass::UserAction,

        // Permanent: the same request would get the same answer
        OutcropError::MissingOutput { .. } => ErrorClass::Permanent,
        OutcropError::Image(_) => ErrorClass::Permanent,
        OutcropError::Serialization(_) => ErrorClass::Permanent,
        OutcropError::Cancelled { .. } => ErrorClass::Permanent,

        // IO errors depend on the kind
        OutcropError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::TimedOut
            | std::io::ErrorKind::ConnectionRefused
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::Interrupted => ErrorClass::Transient,
            std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                ErrorClass::UserAction
            }
            _ => ErrorClass::Transient,
        },
    }
}

/// Classify an HTTP status returned by the fill service.
///
/// 401 is transient because the client drops its cached token on 401, so the
/// next attempt runs with a freshly minted one.
fn classify_status(status: u16) -> ErrorClass {
    match status {
        401 | 408 | 429 => ErrorClass::Transient,
        500..=599 => ErrorClass::Transient,
        403 | 404 => ErrorClass::UserAction,
        _ => ErrorClass::Permanent,
    }
}

/// Decide whether to retry based on the error class and attempt count.
pub fn should_retry(err: &OutcropError, attempt: u32, config: &RetryConfig) -> RetryDecision {
    let class = classify_error(err);

    match class {
        ErrorClass::Permanent => {
            info!("permanent error, not retrying");
            RetryDecision::GiveUp(ErrorClass::Permanent)
        }
        ErrorClass::UserAction => {
            info!("operator action required, not retrying");
            RetryDecision::GiveUp(ErrorClass::UserAction)
        }
        ErrorClass::Transient => {
            if attempt >= config.max_retries {
                warn!(attempt, max = config.max_retries, "retry limit exhausted");
                RetryDecision::Exhausted
            } else {
                let delay = compute_delay(attempt, config);
                debug!(attempt, delay_ms = delay.as_millis(), "scheduling retry");
                RetryDecision::RetryAfter(delay)
            }
        }
    }
}

/// Compute exponential backoff delay with jitter.
///
/// delay = min(base * 2^attempt + jitter, max_delay)
/// jitter is a value in [0, base) so concurrent runs don't retry in lockstep.
fn compute_delay(attempt: u32, config: &RetryConfig) -> Duration {
    let base_ms = u64::try_from(config.base_delay.as_millis()).unwrap_or(u64::MAX);
    let max_ms = u64::try_from(config.max_delay.as_millis()).unwrap_or(u64::MAX);
    let exp_ms = base_ms.saturating_mul(1u64 << attempt.min(10));

    let jitter_ms = jitter(base_ms, attempt);
    let total_ms = exp_ms.saturating_add(jitter_ms);

    Duration::from_millis(total_ms.min(max_ms))
}

/// Deterministic jitter spread across [0, base) by hashing the attempt number.
fn jitter(base_ms: u64, attempt: u32) -> u64 {
    let hash = u64::from(attempt).wrapping_mul(6364136223846793005);
    hash % base_ms.max(1)
}

/// A `FillService` that retries transient failures of the one it wraps.
pub struct RetryingFill<S> {
    inner: S,
    config: RetryConfig,
}

impl<S: FillService> RetryingFill<S> {
    pub fn new(inner: S, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: FillService> FillService for RetryingFill<S> {
    async fn fill(&self, matte: &Matte, mask: &Mask, params: &FillParams) -> Result<Raster> {
        let mut attempt = 0;
        loop {
            let err = match self.inner.fill(matte, mask, params).await {
                Ok(raster) => return Ok(raster),
                Err(err) => err,
            };

            match should_retry(&err, attempt, &self.config) {
                RetryDecision::RetryAfter(delay) => {
                    warn!(
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis(),
                        error = %err,
                        "fill failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                RetryDecision::GiveUp(_) | RetryDecision::Exhausted => return Err(err),
            }
        }
    }
}
