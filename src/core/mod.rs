pub mod availability;
pub mod engine;
pub mod message;
pub mod poll;
pub mod retry;

pub use crate::domain::model::{DesiredProviderSet, ProviderRecord};
pub use crate::domain::ports::{AvailabilitySource, Notifier};
pub use crate::utils::error::Result;
