// Adapters layer: concrete implementations of the domain ports for external systems.

pub mod http;
pub mod smtp;

pub use http::HttpAvailabilityChecker;
pub use smtp::SmtpNotifier;
