use crate::domain::model::ProviderRecord;
use chrono::{DateTime, TimeZone};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Builds the plaintext notification body: a header line with the timestamp,
/// then one line per matched provider name.
pub fn compose_message<Tz>(matches: &[ProviderRecord], header: &str, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut body = format!("{} ({})\n", header, now.format(TIMESTAMP_FORMAT));
    for provider in matches {
        body.push_str(&provider.name);
        body.push('\n');
    }
    body
}
