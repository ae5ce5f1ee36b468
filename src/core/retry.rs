use crate::utils::error::AlertError;
use crate::utils::signal::ShutdownSignal;
use std::future::Future;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    /// Fresh wrapper, or one with an attempt in flight.
    Running,
    Succeeded,
    ExhaustedRetries,
    UserCancelled,
    /// Stopped on an error the policy refuses to retry.
    Aborted,
}

#[derive(Debug)]
pub enum RetryOutcome<T> {
    Succeeded(T),
    ExhaustedRetries {
        attempts: u32,
        last_error: Option<AlertError>,
    },
    UserCancelled,
    Aborted(AlertError),
}

impl<T> RetryOutcome<T> {
    pub fn state(&self) -> RetryState {
        match self {
            RetryOutcome::Succeeded(_) => RetryState::Succeeded,
            RetryOutcome::ExhaustedRetries { .. } => RetryState::ExhaustedRetries,
            RetryOutcome::UserCancelled => RetryState::UserCancelled,
            RetryOutcome::Aborted(_) => RetryState::Aborted,
        }
    }
}

/// Runs an operation until it succeeds, the budget runs out, or the user interrupts.
///
/// Every failed attempt costs one unit of budget and restarts the operation from
/// scratch. Cancellation always wins and is never retried. Errors are swallowed;
/// only the last one is kept on the outcome for diagnostics.
#[derive(Debug, Clone)]
pub struct RetryWrapper {
    name: &'static str,
    budget: u32,
    retry_auth_failures: bool,
    state: RetryState,
}

impl RetryWrapper {
    pub fn new(name: &'static str, budget: u32) -> Self {
        Self {
            name,
            budget,
            retry_auth_failures: true,
            state: RetryState::Running,
        }
    }

    /// Stop at the first SMTP authentication rejection instead of spending budget on it.
    pub fn fail_fast_on_auth(mut self, fail_fast: bool) -> Self {
        self.retry_auth_failures = !fail_fast;
        self
    }

    pub fn budget(&self) -> u32 {
        self.budget
    }

    pub fn state(&self) -> RetryState {
        self.state
    }

    fn should_retry(&self, err: &AlertError) -> bool {
        match err {
            AlertError::Auth(_) => self.retry_auth_failures,
            other => other.is_retryable(),
        }
    }

    pub async fn run<T, F, Fut>(&mut self, signal: &ShutdownSignal, operation: F) -> RetryOutcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = crate::utils::error::Result<T>>,
    {
        self.state = RetryState::Running;
        let outcome = self.attempt(signal, operation).await;
        self.state = outcome.state();
        outcome
    }

    async fn attempt<T, F, Fut>(&self, signal: &ShutdownSignal, mut operation: F) -> RetryOutcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = crate::utils::error::Result<T>>,
    {
        let mut remaining = self.budget;
        let mut attempts = 0;
        let mut last_error = None;

        while remaining > 0 {
            if signal.is_cancelled() {
                return RetryOutcome::UserCancelled;
            }

            attempts += 1;
            tracing::debug!(wrapper = self.name, attempt = attempts, remaining, "Starting attempt");

            let result = tokio::select! {
                biased;
                _ = signal.cancelled() => Err(AlertError::Cancelled),
                result = operation() => result,
            };

            match result {
                Ok(value) => return RetryOutcome::Succeeded(value),
                Err(AlertError::Cancelled) => {
                    tracing::info!(wrapper = self.name, "🛑 Cancelled by user");
                    return RetryOutcome::UserCancelled;
                }
                Err(err) if !self.should_retry(&err) => {
                    tracing::error!(wrapper = self.name, "❌ Giving up without retrying: {}", err);
                    return RetryOutcome::Aborted(err);
                }
                Err(err) => {
                    remaining -= 1;
                    tracing::info!(
                        wrapper = self.name,
                        "⚠️ Attempt {} failed, {} retries left",
                        attempts,
                        remaining
                    );
                    tracing::debug!(wrapper = self.name, error = ?err, "Attempt failure detail: {}", err);
                    last_error = Some(err);
                }
            }
        }

        tracing::warn!(
            wrapper = self.name,
            "Retry budget of {} exhausted",
            self.budget
        );
        RetryOutcome::ExhaustedRetries {
            attempts,
            last_error,
        }
    }
}
