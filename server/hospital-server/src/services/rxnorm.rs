use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::config::RxNormSettings;

#[derive(Error, Debug)]
pub enum RxNormError {
    #[error("RxNorm request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("RxNorm answered with status {0}")]
    Status(u16),
}

/// Thin client for the public RxNorm drug-name API.
#[derive(Debug, Clone)]
pub struct RxNormClient {
    http: reqwest::Client,
    base_url: String,
}

impl RxNormClient {
    /// # Errors
    ///
    /// Fails when the HTTP client cannot be built (TLS backend init).
    pub fn new(settings: &RxNormSettings) -> Result<Self, RxNormError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// `GET {base_url}/drugs.json?name=...`, returned as received.
    ///
    /// # Errors
    ///
    /// Network failures, non-success statuses and undecodable bodies.
    pub async fn drugs(&self, name: &str) -> Result<serde_json::Value, RxNormError> {
        let url = format!("{}/drugs.json", self.base_url);
        debug!(url = %url, "Querying RxNorm");

        let response = self.http.get(&url).query(&[("name", name)]).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "RxNorm lookup rejected");
            return Err(RxNormError::Status(status.as_u16()));
        }
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = RxNormClient::new(&RxNormSettings {
            base_url: "https://rxnav.example/REST/".into(),
            timeout_secs: 1,
        })
        .unwrap();
        assert_eq!(client.base_url, "https://rxnav.example/REST");
    }

    #[tokio::test]
    async fn unreachable_host_is_a_request_error() {
        let client = RxNormClient::new(&RxNormSettings {
            base_url: "http://127.0.0.1:9".into(),
            timeout_secs: 1,
        })
        .unwrap();
        assert!(matches!(
            client.drugs("aspirin").await,
            Err(RxNormError::Request(_))
        ));
    }
}
