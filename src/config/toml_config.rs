use crate::domain::model::DesiredProviderSet;
use crate::utils::error::{AlertError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    pub api: AvailabilityQuery,
    pub watch: WatchConfig,
    pub notification: NotificationConfig,
}

/// How to read the availability API. The field names and the "available" value
/// changed between API revisions, so none of them are hard-coded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityQuery {
    pub url: String,
    #[serde(default = "default_list_field")]
    pub list_field: String,
    #[serde(default = "default_id_field")]
    pub id_field: String,
    #[serde(default = "default_name_field")]
    pub name_field: String,
    #[serde(default = "default_availability_field")]
    pub availability_field: String,
    #[serde(default = "default_available_value")]
    pub available_value: String,
    #[serde(default)]
    pub on_http_error: StatusPolicy,
    pub timeout_seconds: Option<u64>,
}

/// What to do when the API answers with a non-2xx status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusPolicy {
    /// Parse whatever body came back. The API has been seen returning usable
    /// JSON alongside error statuses.
    #[default]
    Ignore,
    /// Treat the status as a failed attempt without looking at the body.
    Fail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchConfig {
    pub desired_providers: Vec<i64>,
    #[serde(default = "default_poll_interval_seconds")]
    pub poll_interval_seconds: u64,
    #[serde(default = "default_poll_retry_budget")]
    pub poll_retry_budget: u32,
    #[serde(default = "default_notify_retry_budget")]
    pub notify_retry_budget: u32,
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationConfig {
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    /// Sender address; falls back to `username`.
    pub from: Option<String>,
    pub to: String,
    #[serde(default = "default_subject")]
    pub subject: String,
    #[serde(default = "default_body_header")]
    pub body_header: String,
    #[serde(default)]
    pub fail_fast_on_auth: bool,
}

fn default_list_field() -> String {
    "providerList".to_string()
}

fn default_id_field() -> String {
    "providerId".to_string()
}

fn default_name_field() -> String {
    "providerName".to_string()
}

fn default_availability_field() -> String {
    "availableAppointments".to_string()
}

fn default_available_value() -> String {
    "Y".to_string()
}

fn default_poll_interval_seconds() -> u64 {
    30
}

fn default_poll_retry_budget() -> u32 {
    25
}

fn default_notify_retry_budget() -> u32 {
    5
}

fn default_smtp_port() -> u16 {
    587
}

fn default_subject() -> String {
    "Alert - NY vaccine available".to_string()
}

fn default_body_header() -> String {
    "NY vaccine available!".to_string()
}

impl AvailabilityQuery {
    /// Query against `url` using the default (current) response format.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            list_field: default_list_field(),
            id_field: default_id_field(),
            name_field: default_name_field(),
            availability_field: default_availability_field(),
            available_value: default_available_value(),
            on_http_error: StatusPolicy::default(),
            timeout_seconds: None,
        }
    }
}

impl WatchConfig {
    pub fn desired_set(&self) -> DesiredProviderSet {
        self.desired_providers.iter().copied().collect()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }
}

impl NotificationConfig {
    pub fn sender(&self) -> &str {
        self.from.as_deref().unwrap_or(&self.username)
    }
}

impl fmt::Debug for NotificationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("subject", &self.subject)
            .field("body_header", &self.body_header)
            .field("fail_fast_on_auth", &self.fail_fast_on_auth)
            .finish()
    }
}

impl AlertConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AlertError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content)
            .map_err(|e| AlertError::config(format!("TOML parsing error: {}", e)))
    }

    /// 替換環境變數 (例如 ${SMTP_PASSWORD})，找不到的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| AlertError::config(format!("Invalid substitution pattern: {}", e)))?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        // api
        validation::validate_url("api.url", &self.api.url)?;
        validation::validate_non_empty_string("api.list_field", &self.api.list_field)?;
        validation::validate_non_empty_string("api.id_field", &self.api.id_field)?;
        validation::validate_non_empty_string("api.name_field", &self.api.name_field)?;
        validation::validate_non_empty_string(
            "api.availability_field",
            &self.api.availability_field,
        )?;
        validation::validate_non_empty_string("api.available_value", &self.api.available_value)?;
        if let Some(timeout) = self.api.timeout_seconds {
            validation::validate_positive_number("api.timeout_seconds", timeout, 1)?;
        }

        // watch
        validation::validate_non_empty_list(
            "watch.desired_providers",
            &self.watch.desired_providers,
        )?;
        validation::validate_positive_number(
            "watch.poll_retry_budget",
            u64::from(self.watch.poll_retry_budget),
            1,
        )?;
        validation::validate_positive_number(
            "watch.notify_retry_budget",
            u64::from(self.watch.notify_retry_budget),
            1,
        )?;

        // notification
        let notification = &self.notification;
        validation::validate_non_empty_string("notification.smtp_host", &notification.smtp_host)?;
        validation::validate_positive_number(
            "notification.smtp_port",
            u64::from(notification.smtp_port),
            1,
        )?;
        validation::validate_non_empty_string("notification.username", &notification.username)?;
        reject_unresolved_placeholder("notification.username", &notification.username)?;
        reject_unresolved_placeholder("notification.password", &notification.password)?;
        validation::validate_email_address("notification.from", notification.sender())?;
        validation::validate_email_address("notification.to", &notification.to)?;

        Ok(())
    }
}

fn reject_unresolved_placeholder(field: &str, value: &str) -> Result<()> {
    if value.contains("${") {
        return Err(AlertError::InvalidConfigValueError {
            field: field.to_string(),
            value: value.to_string(),
            reason: "Referenced environment variable is not set".to_string(),
        });
    }
    Ok(())
}

impl Validate for AlertConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
