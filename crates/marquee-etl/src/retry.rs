//! Retry with exponential backoff for transient failures.
//!
//! Only errors classified as [`Transient`] are retried, and every budget is
//! finite: once `max_attempts` is spent the last error is returned to the
//! caller, which treats it as fatal for the cycle.

use std::{fmt::Display, future::Future, time::Duration};

use marquee_core::Transient;
use serde::Deserialize;
use tokio::time::sleep;
use tracing::{error, info, warn};

/// Backoff settings, deserialised from the `[retry]` config table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
  /// Total attempts including the first one.
  pub max_attempts:     u32,
  pub initial_delay_ms: u64,
  pub max_delay_ms:     u64,
  pub factor:           f64,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self { max_attempts: 5, initial_delay_ms: 200, max_delay_ms: 10_000, factor: 2.0 }
  }
}

impl RetryPolicy {
  /// No delay between attempts.
  pub fn immediate(max_attempts: u32) -> Self {
    Self { max_attempts, initial_delay_ms: 0, max_delay_ms: 0, factor: 1.0 }
  }

  pub fn initial_delay(&self) -> Duration { Duration::from_millis(self.initial_delay_ms) }

  pub fn max_delay(&self) -> Duration { Duration::from_millis(self.max_delay_ms) }

  /// Upper bound on the total time spent sleeping between attempts.
  pub fn max_stall(&self) -> Duration {
    let mut delay = self.initial_delay();
    let mut total = Duration::ZERO;
    for _ in 1..self.max_attempts {
      total += delay;
      delay = delay.mul_f64(self.factor).min(self.max_delay());
    }
    total
  }
}

/// Run `operation` until it succeeds, fails permanently, or the attempt
/// budget runs out.
pub async fn retry<F, Fut, T, E>(
  operation_name: &str,
  policy: &RetryPolicy,
  mut operation: F,
) -> Result<T, E>
where
  F: FnMut() -> Fut,
  Fut: Future<Output = Result<T, E>>,
  E: Transient + Display,
{
  let max_attempts = policy.max_attempts.max(1);
  let mut delay = policy.initial_delay();
  let mut attempt = 1;

  loop {
    match operation().await {
      Ok(value) => {
        if attempt > 1 {
          info!(operation = operation_name, attempt, "succeeded after retry");
        }
        return Ok(value);
      }
      Err(err) if !err.is_transient() => return Err(err),
      Err(err) if attempt >= max_attempts => {
        error!(operation = operation_name, attempts = attempt, %err, "retries exhausted");
        return Err(err);
      }
      Err(err) => {
        warn!(
          operation = operation_name,
          attempt,
          max_attempts,
          %err,
          next_in = ?delay,
          "transient failure, backing off"
        );
        sleep(delay).await;
        delay = delay.mul_f64(policy.factor).min(policy.max_delay());
        attempt += 1;
      }
    }
  }
}
