use async_trait::async_trait;
use common::errors::AppError;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{Duration, Instant};

/// Key-value store of formatted suggestions with per-entry expiry.
#[async_trait]
pub trait SuggestionCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<String>>, AppError>;

    async fn set(
        &self,
        key: &str,
        suggestions: Vec<String>,
        ttl: Duration,
    ) -> Result<(), AppError>;
}

struct CacheEntry {
    suggestions: Vec<String>,
    expires_at: Instant,
}

/// In-process suggestion cache
#[derive(Default)]
pub struct MemoryCache {
    cache: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries. Expired entries linger until the next
    /// `set` or a `get` of their key.
    pub async fn len(&self) -> usize {
        self.cache.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SuggestionCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<String>>, AppError> {
        {
            let cache = self.cache.read().await;
            match cache.get(key) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Ok(Some(entry.suggestions.clone()));
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // Expired: drop it unless a concurrent `set` refreshed it meanwhile.
        let mut cache = self.cache.write().await;
        let expired = cache
            .get(key)
            .is_some_and(|entry| entry.expires_at <= Instant::now());
        if expired {
            cache.remove(key);
        }
        Ok(None)
    }

    async fn set(
        &self,
        key: &str,
        suggestions: Vec<String>,
        ttl: Duration,
    ) -> Result<(), AppError> {
        let mut cache = self.cache.write().await;
        let now = Instant::now();
        cache.retain(|_, entry| entry.expires_at > now);
        cache.insert(
            key.to_string(),
            CacheEntry {
                suggestions,
                expires_at: now + ttl,
            },
        );
        Ok(())
    }
}

/// Redis-backed suggestion cache, shared by every service instance.
///
/// Values are stored as JSON arrays and expire through `PSETEX`.
#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
}

impl RedisCache {
    pub async fn connect(redis_url: &str) -> Result<Self, AppError> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| AppError::cache(format!("Invalid Redis URL: {}", e)))?;
        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| AppError::cache(format!("Failed to connect to Redis: {}", e)))?;

        Ok(Self { connection })
    }
}

fn encode_suggestions(suggestions: &[String]) -> Result<String, AppError> {
    serde_json::to_string(suggestions)
        .map_err(|e| AppError::cache(format!("Failed to encode cache entry: {}", e)))
}

fn decode_suggestions(payload: &str) -> Result<Vec<String>, AppError> {
    serde_json::from_str(payload)
        .map_err(|e| AppError::cache(format!("Corrupt cache entry: {}", e)))
}

/// Millisecond TTL for `PSETEX`, which rejects zero.
fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

#[async_trait]
impl SuggestionCache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<String>>, AppError> {
        let mut connection = self.connection.clone();
        let payload: Option<String> = connection
            .get(key)
            .await
            .map_err(|e| AppError::cache(e.to_string()))?;

        payload.as_deref().map(decode_suggestions).transpose()
    }

    async fn set(
        &self,
        key: &str,
        suggestions: Vec<String>,
        ttl: Duration,
    ) -> Result<(), AppError> {
        let payload = encode_suggestions(&suggestions)?;
        let mut connection = self.connection.clone();
        connection
            .pset_ex::<_, _, ()>(key, payload, ttl_millis(ttl))
            .await
            .map_err(|e| AppError::cache(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_returns_stored_value() {
        let cache = MemoryCache::new();
        let value = vec!["London, United Kingdom".to_string(), "London, Canada".to_string()];

        cache
            .set("autocomplete:lon", value.clone(), Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(cache.get("autocomplete:lon").await.unwrap(), Some(value));
        assert_eq!(cache.get("autocomplete:par").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        let cache = MemoryCache::new();
        cache
            .set("autocomplete:ber", vec!["Berlin, Germany".to_string()], Duration::from_millis(5))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(cache.get("autocomplete:ber").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_entries_are_evicted_on_set() {
        let cache = MemoryCache::new();
        for i in 0..1000 {
            cache
                .set(&format!("autocomplete:q{i}"), vec![], Duration::from_millis(1))
                .await
                .unwrap();
        }

        tokio::time::sleep(Duration::from_millis(20)).await;

        for i in 0..10 {
            cache
                .set(&format!("autocomplete:live{i}"), vec![], Duration::from_secs(60))
                .await
                .unwrap();
        }

        assert_eq!(cache.len().await, 10);
    }

    #[tokio::test]
    async fn test_expired_entry_is_removed_on_get() {
        let cache = MemoryCache::new();
        cache
            .set("autocomplete:ber", vec!["Berlin, Germany".to_string()], Duration::from_millis(5))
            .await
            .unwrap();
        assert_eq!(cache.len().await, 1);

        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(cache.get("autocomplete:ber").await.unwrap(), None);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let cache = MemoryCache::new();
        let ttl = Duration::from_secs(60);
        cache.set("k", vec!["a".to_string()], ttl).await.unwrap();
        cache.set("k", vec!["b".to_string()], ttl).await.unwrap();

        assert_eq!(cache.get("k").await.unwrap(), Some(vec!["b".to_string()]));
        assert_eq!(cache.len().await, 1);
    }

    #[test]
    fn test_redis_payload_is_json_array() {
        let payload = encode_suggestions(&[
            "São Paulo, Brazil".to_string(),
            "Paris, France".to_string(),
        ])
        .unwrap();
        assert_eq!(payload, r#"["São Paulo, Brazil","Paris, France"]"#);
    }

    #[test]
    fn test_corrupt_redis_payload_is_cache_error() {
        let err = decode_suggestions("{not json").unwrap_err();
        assert!(matches!(err, AppError::Cache(_)));
    }

    #[test]
    fn test_ttl_millis() {
        assert_eq!(ttl_millis(Duration::from_secs(3600)), 3_600_000);
        assert_eq!(ttl_millis(Duration::from_micros(10)), 1);
    }

    #[tokio::test]
    async fn test_redis_connect_rejects_invalid_url() {
        let err = RedisCache::connect("not a redis url").await.err().unwrap();
        assert!(matches!(err, AppError::Cache(_)));
    }
}
