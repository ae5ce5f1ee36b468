pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;
pub use config::AlertConfig;

pub use adapters::{HttpAvailabilityChecker, SmtpNotifier};
pub use crate::core::engine::{AlertEngine, RunOutcome, WatchSettings};
pub use utils::error::{AlertError, Result};
pub use utils::signal::ShutdownSignal;
