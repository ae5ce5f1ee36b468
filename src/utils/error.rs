use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlertError {
    #[error("API request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API returned non-success status: HTTP {status}")]
    HttpStatus { status: u16 },

    #[error("Invalid JSON in API response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unexpected API response shape: {message}")]
    Parse { message: String },

    #[error("SMTP authentication rejected: {0}")]
    Auth(lettre::transport::smtp::Error),

    #[error("SMTP delivery failed: {0}")]
    Smtp(lettre::transport::smtp::Error),

    #[error("Failed to build email: {0}")]
    Email(#[from] lettre::error::Error),

    #[error("Invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Operation cancelled by user")]
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Parse,
    Auth,
    Config,
    Cancelled,
}

// 530 需要認證、534 機制太弱、535 帳密錯誤
const SMTP_AUTH_REJECTION_CODES: [&str; 3] = ["530", "534", "535"];

impl From<lettre::transport::smtp::Error> for AlertError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        let is_auth = err
            .status()
            .map(|code| SMTP_AUTH_REJECTION_CODES.contains(&code.to_string().as_str()))
            .unwrap_or(false);

        if is_auth {
            AlertError::Auth(err)
        } else {
            AlertError::Smtp(err)
        }
    }
}

impl AlertError {
    pub fn parse(message: impl Into<String>) -> Self {
        AlertError::Parse {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        AlertError::ConfigError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            AlertError::Network(_) | AlertError::Smtp(_) | AlertError::IoError(_) => {
                ErrorCategory::Network
            }
            AlertError::HttpStatus { .. } | AlertError::Json(_) | AlertError::Parse { .. } => {
                ErrorCategory::Parse
            }
            AlertError::Auth(_) => ErrorCategory::Auth,
            AlertError::Email(_)
            | AlertError::Address(_)
            | AlertError::ConfigError { .. }
            | AlertError::InvalidConfigValueError { .. }
            | AlertError::MissingConfigError { .. } => ErrorCategory::Config,
            AlertError::Cancelled => ErrorCategory::Cancelled,
        }
    }

    /// Everything except a user interrupt is worth another attempt.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, AlertError::Cancelled)
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not reach the remote service: {}", self),
            ErrorCategory::Parse => format!("The availability API answered unexpectedly: {}", self),
            ErrorCategory::Auth => "The SMTP server rejected the configured credentials".to_string(),
            ErrorCategory::Config => format!("Configuration problem: {}", self),
            ErrorCategory::Cancelled => "Cancelled by user".to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check your network connection and the configured URL or SMTP host",
            ErrorCategory::Parse => {
                "Check api.list_field / api.availability_field against the current API response (run with -v)"
            }
            ErrorCategory::Auth => "Check notification.username and notification.password (app passwords for Gmail)",
            ErrorCategory::Config => "Fix the configuration file and run again",
            ErrorCategory::Cancelled => "Run again when ready",
        }
    }
}

pub type Result<T> = std::result::Result<T, AlertError>;
