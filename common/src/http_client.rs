use crate::errors::AppError;
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Single-shot JSON HTTP client with a request timeout
pub struct HttpClient {
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(timeout_secs: u64) -> Result<Self, AppError> {
        let timeout = Duration::from_secs(timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, timeout })
    }

    /// Fetch JSON from URL. One attempt, no retries.
    #[instrument(skip(self, url), fields(host = url.host_str().unwrap_or_default(), path = url.path()))]
    pub async fn get_json<T>(&self, url: Url) -> Result<T, AppError>
    where
        T: serde::de::DeserializeOwned,
    {
        match self.fetch_with_timeout(url).await {
            Ok(response) => {
                info!("Request successful");
                Ok(response)
            }
            Err(e) => {
                warn!(error = %e, "Request failed");
                Err(e)
            }
        }
    }

    async fn fetch_with_timeout<T>(&self, url: Url) -> Result<T, AppError>
    where
        T: serde::de::DeserializeOwned,
    {
        // Only the path is reported; the query string may carry credentials.
        let target = url.path().to_string();

        let response = tokio::time::timeout(self.timeout, self.client.get(url).send())
            .await
            .map_err(|_| AppError::timeout(format!("Request to {} timed out", target)))?
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::timeout(format!("Request to {} timed out", target))
                } else {
                    AppError::NetworkError(e.without_url())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::http(
                status.as_u16(),
                format!("HTTP error: {}", status),
            ));
        }

        let text = response
            .text()
            .await
            .map_err(|e| AppError::NetworkError(e.without_url()))?;
        let json: T = serde_json::from_str(&text).map_err(AppError::ParseError)?;

        Ok(json)
    }
}
