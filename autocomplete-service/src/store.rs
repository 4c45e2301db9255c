//! City store contract, the deduplicating persist step, and an in-process
//! implementation. The Postgres implementation lives in [`crate::db`].

use async_trait::async_trait;
use common::errors::AppError;
use common::models::City;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

/// Maximum number of records a store query returns.
pub const SEARCH_LIMIT: usize = 10;

#[async_trait]
pub trait CityStore: Send + Sync {
    /// Case-insensitive substring match on name, ANDed with a
    /// case-insensitive prefix match on country when one is given.
    /// Results keep insertion order, at most `limit` of them.
    async fn query(
        &self,
        city: &str,
        country: Option<&str>,
        limit: usize,
    ) -> Result<Vec<City>, AppError>;

    /// Stored records whose (name, country) equals any of `keys`,
    /// compared case-insensitively.
    async fn find_existing(&self, keys: &[City]) -> Result<Vec<City>, AppError>;

    /// Unordered bulk insert. Rows violating the unique pair are skipped.
    /// Returns the number of rows written.
    async fn insert_many(&self, cities: Vec<City>) -> Result<u64, AppError>;
}

/// Persist candidates that the store does not already know about.
///
/// Names and countries are trimmed first. Candidates matching an existing
/// record (or an earlier candidate) case-insensitively are dropped. No
/// insert is issued when nothing is left.
#[instrument(skip_all, fields(candidates = candidates.len()))]
pub async fn insert_unique(store: &dyn CityStore, candidates: &[City]) -> Result<u64, AppError> {
    if candidates.is_empty() {
        return Ok(0);
    }

    let normalized: Vec<City> = candidates.iter().map(City::normalized).collect();
    let existing = store.find_existing(&normalized).await?;

    let mut fresh: Vec<City> = Vec::with_capacity(normalized.len());
    for city in normalized {
        let known = existing.iter().any(|e| e.same_place(&city))
            || fresh.iter().any(|f| f.same_place(&city));
        if !known {
            fresh.push(city);
        }
    }

    if fresh.is_empty() {
        debug!("All candidates already stored");
        return Ok(0);
    }

    let attempted = fresh.len();
    let written = store.insert_many(fresh).await?;
    info!(attempted, written, "Persisted new cities");

    Ok(written)
}

/// In-process city store with the same matching rules as the Postgres one
#[derive(Default)]
pub struct MemoryCityStore {
    cities: RwLock<Vec<City>>,
}

impl MemoryCityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cities(cities: Vec<City>) -> Self {
        Self {
            cities: RwLock::new(cities.iter().map(City::normalized).collect()),
        }
    }

    pub async fn all(&self) -> Vec<City> {
        self.cities.read().await.clone()
    }
}

#[async_trait]
impl CityStore for MemoryCityStore {
    async fn query(
        &self,
        city: &str,
        country: Option<&str>,
        limit: usize,
    ) -> Result<Vec<City>, AppError> {
        let city = city.to_lowercase();
        let country = country.filter(|c| !c.is_empty()).map(str::to_lowercase);

        let cities = self.cities.read().await;
        let matches = cities
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&city))
            .filter(|c| match &country {
                Some(prefix) => c.country.to_lowercase().starts_with(prefix),
                None => true,
            })
            .take(limit)
            .cloned()
            .collect();

        Ok(matches)
    }

    async fn find_existing(&self, keys: &[City]) -> Result<Vec<City>, AppError> {
        let cities = self.cities.read().await;
        Ok(cities
            .iter()
            .filter(|c| keys.iter().any(|k| k.same_place(c)))
            .cloned()
            .collect())
    }

    async fn insert_many(&self, new_cities: Vec<City>) -> Result<u64, AppError> {
        let mut cities = self.cities.write().await;
        let mut written = 0;
        for city in new_cities {
            if cities.iter().any(|c| c.same_place(&city)) {
                continue;
            }
            cities.push(city);
            written += 1;
        }
        Ok(written)
    }
}
