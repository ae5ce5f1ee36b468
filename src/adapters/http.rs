use crate::config::{AvailabilityQuery, StatusPolicy};
use crate::core::availability::find_matches;
use crate::domain::model::{DesiredProviderSet, ProviderRecord};
use crate::domain::ports::AvailabilitySource;
use crate::utils::error::{AlertError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Availability checker backed by one HTTP GET per call.
pub struct HttpAvailabilityChecker {
    query: AvailabilityQuery,
    client: Client,
}

impl HttpAvailabilityChecker {
    pub fn new(query: AvailabilityQuery) -> Self {
        Self::with_client(query, Client::new())
    }

    pub fn with_client(query: AvailabilityQuery, client: Client) -> Self {
        Self { query, client }
    }

    pub fn query(&self) -> &AvailabilityQuery {
        &self.query
    }

    async fn fetch(&self) -> Result<serde_json::Value> {
        let mut request = self.client.get(&self.query.url);

        // 預設不設超時，卡住就一直等
        if let Some(timeout) = self.query.timeout_seconds {
            request = request.timeout(Duration::from_secs(timeout));
        }

        tracing::debug!("Making API request to: {}", self.query.url);
        let response = request.send().await?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if !status.is_success() {
            match self.query.on_http_error {
                StatusPolicy::Fail => {
                    return Err(AlertError::HttpStatus {
                        status: status.as_u16(),
                    })
                }
                StatusPolicy::Ignore => {
                    tracing::debug!("Ignoring HTTP {} and parsing the body anyway", status);
                }
            }
        }

        let body = response.text().await?;
        let json: serde_json::Value = serde_json::from_str(&body)?;

        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!("API response:\n{}", serde_json::to_string_pretty(&json)?);
        }

        Ok(json)
    }
}

#[async_trait]
impl AvailabilitySource for HttpAvailabilityChecker {
    async fn check(&self, desired: &DesiredProviderSet) -> Result<Vec<ProviderRecord>> {
        let json = self.fetch().await?;
        find_matches(&json, &self.query, desired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn desired() -> DesiredProviderSet {
        DesiredProviderSet::from(vec![1000, 1004, 1019])
    }

    #[tokio::test]
    async fn test_check_filters_live_response() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/api/list-providers");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "providerList": [
                        {"providerId": 1003, "providerName": "SUNY Albany", "availableAppointments": "Y"},
                        {"providerId": 1000, "providerName": "Javits Center", "availableAppointments": "N"},
                        {"providerId": 1004, "providerName": "Westchester County Center", "availableAppointments": "Y"}
                    ],
                    "lastUpdated": "3/18/2021, 6:07:59 PM"
                }));
        });

        let checker =
            HttpAvailabilityChecker::new(AvailabilityQuery::new(server.url("/api/list-providers")));
        let matches = checker.check(&desired()).await.unwrap();

        api_mock.assert();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, 1004);
    }

    #[tokio::test]
    async fn test_error_status_is_ignored_by_default() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/api/list-providers");
            then.status(503)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "providerList": [
                        {"providerId": 1019, "providerName": "Javits Center - Night", "availableAppointments": "Y"}
                    ]
                }));
        });

        let checker =
            HttpAvailabilityChecker::new(AvailabilityQuery::new(server.url("/api/list-providers")));
        let matches = checker.check(&desired()).await.unwrap();

        api_mock.assert();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name, "Javits Center - Night");
    }

    #[tokio::test]
    async fn test_error_status_fails_under_fail_policy() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/api/list-providers");
            then.status(503)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"providerList": []}));
        });

        let mut query = AvailabilityQuery::new(server.url("/api/list-providers"));
        query.on_http_error = StatusPolicy::Fail;
        let checker = HttpAvailabilityChecker::new(query);

        let err = checker.check(&desired()).await.unwrap_err();

        api_mock.assert();
        assert!(matches!(err, AlertError::HttpStatus { status: 503 }));
    }

    #[tokio::test]
    async fn test_html_error_page_is_parse_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/list-providers");
            then.status(502).body("<html><body>Bad Gateway</body></html>");
        });

        let checker =
            HttpAvailabilityChecker::new(AvailabilityQuery::new(server.url("/api/list-providers")));
        let err = checker.check(&desired()).await.unwrap_err();

        assert!(matches!(err, AlertError::Json(_)));
    }

    #[tokio::test]
    async fn test_with_client_uses_preconfigured_client() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/list-providers")
                .header("user-agent", "vax-alert-test");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "providerList": [
                        {"providerId": 1000, "providerName": "Javits Center", "availableAppointments": "Y"}
                    ]
                }));
        });

        let client = Client::builder().user_agent("vax-alert-test").build().unwrap();
        let checker = HttpAvailabilityChecker::with_client(
            AvailabilityQuery::new(server.url("/api/list-providers")),
            client,
        );
        assert_eq!(checker.query().url, server.url("/api/list-providers"));

        let matches = checker.check(&desired()).await.unwrap();

        api_mock.assert();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name, "Javits Center");
    }
}
