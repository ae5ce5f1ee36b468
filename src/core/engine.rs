use crate::config::AlertConfig;
use crate::core::message::compose_message;
use crate::core::poll::{poll_until_available, IterationCounter};
use crate::core::retry::{RetryOutcome, RetryWrapper};
use crate::domain::model::{DesiredProviderSet, ProviderRecord};
use crate::domain::ports::{AvailabilitySource, Notifier};
use crate::utils::error::{AlertError, Result};
use crate::utils::signal::ShutdownSignal;
use chrono::Local;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct WatchSettings {
    pub desired: DesiredProviderSet,
    pub poll_interval: Duration,
    pub poll_retry_budget: u32,
    pub notify_retry_budget: u32,
    pub body_header: String,
    pub fail_fast_on_auth: bool,
}

impl WatchSettings {
    pub fn from_config(config: &AlertConfig) -> Self {
        Self {
            desired: config.watch.desired_set(),
            poll_interval: config.watch.poll_interval(),
            poll_retry_budget: config.watch.poll_retry_budget,
            notify_retry_budget: config.watch.notify_retry_budget,
            body_header: config.notification.body_header.clone(),
            fail_fast_on_auth: config.notification.fail_fast_on_auth,
        }
    }
}

/// How a whole run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// Availability found and the notification went out.
    Notified {
        matches: Vec<ProviderRecord>,
        body: String,
    },
    /// The poll retry budget ran out before anything was found.
    NoAvailability {
        attempts: u32,
        last_error: Option<AlertError>,
    },
    /// Availability found but every notification attempt failed.
    NotificationFailed {
        matches: Vec<ProviderRecord>,
        last_error: Option<AlertError>,
    },
    Cancelled,
    Aborted(AlertError),
}

impl RunOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::Notified { .. } | RunOutcome::NoAvailability { .. } => 0,
            RunOutcome::Aborted(_) => 1,
            RunOutcome::NotificationFailed { .. } => 2,
            RunOutcome::Cancelled => 130,
        }
    }

    pub fn status_line(&self) -> &'static str {
        match self {
            RunOutcome::Notified { .. } => "Vaccine availability detected, exiting",
            RunOutcome::NoAvailability { .. } => "No vaccine availability detected, exiting",
            RunOutcome::NotificationFailed { .. } => {
                "Vaccine availability detected, but the notification could not be sent"
            }
            RunOutcome::Cancelled => "User break - exiting",
            RunOutcome::Aborted(_) => "Stopped on a non-retryable error, exiting",
        }
    }
}

/// Retry wrapper → poll loop → availability check, then retry wrapper → notifier.
pub struct AlertEngine<A: AvailabilitySource, N: Notifier> {
    source: A,
    notifier: N,
    settings: WatchSettings,
    signal: ShutdownSignal,
    counter: IterationCounter,
}

impl<A: AvailabilitySource, N: Notifier> AlertEngine<A, N> {
    pub fn new(source: A, notifier: N, settings: WatchSettings, signal: ShutdownSignal) -> Self {
        Self {
            source,
            notifier,
            settings,
            signal,
            counter: IterationCounter::new(),
        }
    }

    /// Poll cycles run so far, across all retry attempts.
    pub fn iterations(&self) -> u64 {
        self.counter.get()
    }

    pub async fn run(&self) -> RunOutcome {
        tracing::info!(
            "🚀 Watching {} provider(s) every {:?} (poll budget {}, notify budget {})",
            self.settings.desired.len(),
            self.settings.poll_interval,
            self.settings.poll_retry_budget,
            self.settings.notify_retry_budget
        );

        let matches = match self.watch().await {
            RetryOutcome::Succeeded(matches) => matches,
            RetryOutcome::ExhaustedRetries {
                attempts,
                last_error,
            } => {
                return RunOutcome::NoAvailability {
                    attempts,
                    last_error,
                }
            }
            RetryOutcome::UserCancelled => return RunOutcome::Cancelled,
            RetryOutcome::Aborted(err) => return RunOutcome::Aborted(err),
        };

        for provider in &matches {
            tracing::info!(provider_id = provider.id, "📍 {}", provider.name);
        }

        match self.send_notification(&matches).await {
            RetryOutcome::Succeeded(body) => {
                tracing::info!("📧 Notification sent");
                RunOutcome::Notified { matches, body }
            }
            RetryOutcome::ExhaustedRetries { last_error, .. } => {
                RunOutcome::NotificationFailed {
                    matches,
                    last_error,
                }
            }
            RetryOutcome::UserCancelled => RunOutcome::Cancelled,
            RetryOutcome::Aborted(err) => RunOutcome::Aborted(err),
        }
    }

    async fn watch(&self) -> RetryOutcome<Vec<ProviderRecord>> {
        let mut wrapper = RetryWrapper::new("poll", self.settings.poll_retry_budget);
        let source = &self.source;
        let desired = &self.settings.desired;
        let interval = self.settings.poll_interval;
        let counter = &self.counter;
        let signal = &self.signal;

        wrapper
            .run(signal, move || {
                poll_until_available(source, desired, interval, counter, signal)
            })
            .await
    }

    async fn send_notification(&self, matches: &[ProviderRecord]) -> RetryOutcome<String> {
        let mut wrapper = RetryWrapper::new("notify", self.settings.notify_retry_budget)
            .fail_fast_on_auth(self.settings.fail_fast_on_auth);
        let notifier = &self.notifier;
        let header = self.settings.body_header.as_str();

        wrapper
            .run(&self.signal, move || async move {
                // 每次重試都重新產生內容，時間戳記才會是送出當下
                let body = compose_message(matches, header, &Local::now());
                notifier.notify(&body).await?;
                Ok::<_, AlertError>(body)
            })
            .await
    }

    /// One availability check with no sleep and no retry.
    pub async fn check_once(&self) -> Result<Vec<ProviderRecord>> {
        self.source.check(&self.settings.desired).await
    }

    /// The body that would be sent for `matches` right now.
    pub fn preview_message(&self, matches: &[ProviderRecord]) -> String {
        compose_message(matches, &self.settings.body_header, &Local::now())
    }
}
