use common::errors::AppError;
use common::models::{AutocompleteResponse, City, SuggestionSource};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

use crate::api_client::CityLookup;
use crate::cache::SuggestionCache;
use crate::parser::parse_query;
use crate::store::{CityStore, SEARCH_LIMIT, insert_unique};

const CACHE_KEY_PREFIX: &str = "autocomplete:";
const RETRIEVAL_FAILURE: &str = "Failed to retrieve suggestions";

/// Cache key for a query: namespaced, trimmed and lowercased.
pub fn cache_key(query: &str) -> String {
    format!("{}{}", CACHE_KEY_PREFIX, query.trim().to_lowercase())
}

/// Three-tier suggestion pipeline: cache, then store, then external API.
pub struct AutocompleteService {
    cache: Arc<dyn SuggestionCache>,
    store: Arc<dyn CityStore>,
    lookup: Arc<dyn CityLookup>,
    cache_ttl: Duration,
}

impl AutocompleteService {
    pub fn new(
        cache: Arc<dyn SuggestionCache>,
        store: Arc<dyn CityStore>,
        lookup: Arc<dyn CityLookup>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            cache,
            store,
            lookup,
            cache_ttl,
        }
    }

    /// Resolve suggestions for a query.
    ///
    /// Every failure surfaces as [`AppError::SuggestionRetrieval`]; the
    /// underlying fault is logged here and not returned.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn get_suggestions(&self, query: &str) -> Result<AutocompleteResponse, AppError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(AutocompleteResponse::empty());
        }

        self.resolve(query).await.map_err(|e| {
            error!(stage = e.stage(), error = %e, "Error on autocomplete service");
            AppError::retrieval(RETRIEVAL_FAILURE)
        })
    }

    async fn resolve(&self, query: &str) -> Result<AutocompleteResponse, AppError> {
        let key = cache_key(query);

        if let Some(cached) = self.read_cache(&key).await {
            info!(count = cached.len(), "Cache hit");
            return Ok(AutocompleteResponse::from_source(
                cached,
                SuggestionSource::Cache,
            ));
        }

        let fragments = parse_query(query);
        let stored = self
            .store
            .query(&fragments.city, fragments.country.as_deref(), SEARCH_LIMIT)
            .await?;

        if !stored.is_empty() {
            info!(count = stored.len(), "Resolved from database");
            let suggestions: Vec<String> = stored.iter().map(City::suggestion).collect();
            self.write_cache(&key, &suggestions).await;
            return Ok(AutocompleteResponse::from_source(
                suggestions,
                SuggestionSource::Database,
            ));
        }

        let found: Vec<City> = self
            .lookup
            .search(query)
            .await?
            .into_iter()
            .map(City::from)
            .collect();

        insert_unique(self.store.as_ref(), &found).await?;

        info!(count = found.len(), "Resolved from external API");
        let suggestions: Vec<String> = found.iter().map(City::suggestion).collect();
        self.write_cache(&key, &suggestions).await;

        Ok(AutocompleteResponse::from_source(
            suggestions,
            SuggestionSource::Api,
        ))
    }

    /// Cache faults count as a miss.
    async fn read_cache(&self, key: &str) -> Option<Vec<String>> {
        match self.cache.get(key).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache read failed, falling through to store");
                None
            }
        }
    }

    /// Cache faults are logged and otherwise ignored.
    async fn write_cache(&self, key: &str, suggestions: &[String]) {
        if let Err(e) = self
            .cache
            .set(key, suggestions.to_vec(), self.cache_ttl)
            .await
        {
            warn!(key = %key, error = %e, "Cache write failed");
        }
    }
}
