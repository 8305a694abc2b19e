use std::future::Future;
use std::time::Duration;

use crate::{FetchError, Result};

/// Default number of additional attempts after the first failure.
pub const DEFAULT_RETRIES: u32 = 2;

/// Default delay between a failure and the next attempt.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Fixed-delay retry policy for directory fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
	/// Additional attempts after the first one.
	pub retries: u32,
	/// Delay after each failure before the next attempt.
	pub delay: Duration,
}

impl Default for RetryPolicy {
	fn default() -> Self {
		Self {
			retries: DEFAULT_RETRIES,
			delay: DEFAULT_RETRY_DELAY,
		}
	}
}

impl RetryPolicy {
	pub fn new(retries: u32, delay: Duration) -> Self {
		Self { retries, delay }
	}

	/// Total number of calls this policy allows.
	pub fn max_attempts(&self) -> u32 {
		self.retries.saturating_add(1)
	}

	/// Delay in whole milliseconds, saturating at `u64::MAX`.
	pub fn delay_ms(&self) -> u64 {
		u64::try_from(self.delay.as_millis()).unwrap_or(u64::MAX)
	}

	/// Runs `op` until it succeeds or the attempt budget is spent.
	///
	/// `op` receives the 1-based attempt number. When every attempt fails the
	/// result is [`FetchError::Exhausted`] carrying the last failure.
	pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T>
	where
		F: FnMut(u32) -> Fut,
		Fut: Future<Output = Result<T>>,
	{
		let mut attempt = 0u32;
		loop {
			attempt = attempt.saturating_add(1);
			match op(attempt).await {
				Ok(value) => return Ok(value),
				Err(err) if attempt >= self.max_attempts() => {
					tracing::error!(attempts = attempt, error = %err, "directory.fetch.exhausted");
					return Err(FetchError::Exhausted {
						attempts: attempt,
						last: err.to_string().into(),
					});
				}
				Err(err) => {
					tracing::warn!(
						attempt,
						delay_ms = self.delay_ms(),
						error = %err,
						"directory.fetch.retry"
					);
					tokio::time::sleep(self.delay).await;
				}
			}
		}
	}
}
