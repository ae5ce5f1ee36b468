use crate::domain::model::{DesiredProviderSet, ProviderRecord};
use crate::utils::error::Result;
use async_trait::async_trait;

/// One availability lookup: a single request, no internal retries.
#[async_trait]
pub trait AvailabilitySource: Send + Sync {
    async fn check(&self, desired: &DesiredProviderSet) -> Result<Vec<ProviderRecord>>;
}

/// Delivers one plaintext notification. Each call is one complete attempt.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, body: &str) -> Result<()>;
}
