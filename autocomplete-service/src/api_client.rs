use async_trait::async_trait;
use common::errors::AppError;
use common::http_client::HttpClient;
use common::models::ExternalCity;
use reqwest::Url;
use tracing::{error, info, instrument};

/// Source of city candidates outside the local store.
#[async_trait]
pub trait CityLookup: Send + Sync {
    /// Search cities for a raw query. Any failure is an opaque
    /// [`AppError::ExternalLookup`].
    async fn search(&self, query: &str) -> Result<Vec<ExternalCity>, AppError>;
}

/// WeatherAPI `search.json` client
pub struct WeatherApiClient {
    http_client: HttpClient,
    search_url: Url,
    api_key: String,
}

impl WeatherApiClient {
    pub fn new(base_url: &str, api_key: String, timeout_secs: u64) -> Result<Self, AppError> {
        let base = base_url.trim_end_matches('/');
        let search_url = Url::parse(&format!("{}/search.json", base))
            .map_err(|e| AppError::internal(format!("Invalid lookup base URL: {}", e)))?;

        Ok(Self {
            http_client: HttpClient::new(timeout_secs)?,
            search_url,
            api_key,
        })
    }

    fn search_url(&self, query: &str) -> Url {
        let mut url = self.search_url.clone();
        url.query_pairs_mut()
            .append_pair("key", &self.api_key)
            .append_pair("q", query);
        url
    }
}

#[async_trait]
impl CityLookup for WeatherApiClient {
    #[instrument(skip(self), fields(query = %query))]
    async fn search(&self, query: &str) -> Result<Vec<ExternalCity>, AppError> {
        info!("Fetching cities from external API");

        let cities: Vec<ExternalCity> = self
            .http_client
            .get_json(self.search_url(query))
            .await
            .map_err(|e| {
                error!(error = %e, "Error calling external API");
                AppError::external_lookup("Error calling API")
            })?;

        info!(count = cities.len(), "External API returned cities");
        Ok(cities)
    }
}
