use crate::domain::model::{DesiredProviderSet, ProviderRecord};
use crate::domain::ports::AvailabilitySource;
use crate::utils::error::{AlertError, Result};
use crate::utils::signal::ShutdownSignal;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Number of poll cycles run so far. Owned by the caller so the count carries
/// over when the retry wrapper restarts the loop.
#[derive(Debug, Default)]
pub struct IterationCounter(AtomicU64);

impl IterationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Sleeps `interval`, checks once, and repeats until the source reports at least one match.
///
/// No timeout and no backoff. Errors from the source end the loop and are left to the
/// caller's retry wrapper. A triggered `signal` ends it with [`AlertError::Cancelled`].
pub async fn poll_until_available<A>(
    source: &A,
    desired: &DesiredProviderSet,
    interval: Duration,
    counter: &IterationCounter,
    signal: &ShutdownSignal,
) -> Result<Vec<ProviderRecord>>
where
    A: AvailabilitySource + ?Sized,
{
    loop {
        if signal.is_cancelled() {
            return Err(AlertError::Cancelled);
        }

        tokio::select! {
            biased;
            _ = signal.cancelled() => return Err(AlertError::Cancelled),
            _ = tokio::time::sleep(interval) => {}
        }

        // 只印出次數，讓使用者知道程式還在跑
        let iteration = counter.increment();
        println!("#{}", iteration);
        tracing::debug!(iteration, "Checking availability");

        let matches = source.check(desired).await?;
        if !matches.is_empty() {
            tracing::info!(
                iteration,
                "✅ Found {} desired provider(s) with availability",
                matches.len()
            );
            return Ok(matches);
        }
    }
}
