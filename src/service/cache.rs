//! Redis cache for the latest analysis version of each case

use std::env;

use once_cell::sync::Lazy;
use redis::{AsyncCommands, Client, Script};
use serde::de::DeserializeOwned;

use crate::model::AnalysisVersion;

// Environment variable names
const ENV_REDIS_HOST: &str = "CASE_MOMENTUM_REDIS_HOST";
const ENV_REDIS_PORT: &str = "CASE_MOMENTUM_REDIS_PORT";
const ENV_REDIS_PASSWORD: &str = "CASE_MOMENTUM_REDIS_PASSWORD";
const ENV_REDIS_DB: &str = "CASE_MOMENTUM_REDIS_DB";
const ENV_CACHE_TTL: &str = "CASE_MOMENTUM_CACHE_TTL";

// Default values
const DEFAULT_REDIS_HOST: &str = "127.0.0.1";
const DEFAULT_REDIS_PORT: &str = "6379";
const DEFAULT_REDIS_DB: &str = "0";
const DEFAULT_TTL_SECONDS: u64 = 3600; // 1 hour

const PREFIX_LATEST: &str = "analysis:latest:";

/// Writes ARGV[1] with a TTL of ARGV[3] unless the cached version number is
/// already at least ARGV[2]. Returns 1 when written.
static SET_IF_NEWER: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r#"
local current = redis.call('GET', KEYS[1])
if current then
  local ok, cached = pcall(cjson.decode, current)
  if ok and type(cached) == 'table' then
    local cached_number = tonumber(cached['version_number'])
    if cached_number and cached_number >= tonumber(ARGV[2]) then
      return 0
    end
  end
end
redis.call('SET', KEYS[1], ARGV[1], 'EX', ARGV[3])
return 1
"#,
    )
});

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CacheError {
    #[error("Redis connection error: {0}")]
    Connection(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Cache miss for key: {0}")]
    Miss(String),
}

/// Redis-based cache of analysis versions
#[derive(Clone)]
pub struct AnalysisCache {
    client: Client,
    ttl_seconds: u64,
}

impl AnalysisCache {
    /// Create a new cache instance and verify connection
    ///
    /// Configuration via environment variables:
    /// - `CASE_MOMENTUM_REDIS_HOST` - Redis host (default: 127.0.0.1)
    /// - `CASE_MOMENTUM_REDIS_PORT` - Redis port (default: 6379)
    /// - `CASE_MOMENTUM_REDIS_PASSWORD` - Redis password (default: none)
    /// - `CASE_MOMENTUM_REDIS_DB` - Redis database number (default: 0)
    /// - `CASE_MOMENTUM_CACHE_TTL` - Cache TTL in seconds (default: 3600)
    pub async fn new() -> Result<Self, CacheError> {
        let host = env::var(ENV_REDIS_HOST).unwrap_or_else(|_| DEFAULT_REDIS_HOST.to_string());
        let port = env::var(ENV_REDIS_PORT).unwrap_or_else(|_| DEFAULT_REDIS_PORT.to_string());
        let password = env::var(ENV_REDIS_PASSWORD).ok();
        let db = env::var(ENV_REDIS_DB).unwrap_or_else(|_| DEFAULT_REDIS_DB.to_string());

        let ttl_seconds = env::var(ENV_CACHE_TTL)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TTL_SECONDS);

        let redis_url = redis_url(&host, &port, password.as_deref(), &db);

        tracing::debug!(host = %host, port = %port, db = %db, "Connecting to Redis");

        let client = Client::open(redis_url)?;

        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;

        tracing::info!(host = %host, port = %port, "Redis connection established");

        Ok(Self {
            client,
            ttl_seconds,
        })
    }

    pub async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    /// Get the cached latest version of a case
    pub async fn get_latest(&self, case_id: &str) -> Result<AnalysisVersion, CacheError> {
        self.get_with_prefix(PREFIX_LATEST, case_id).await
    }

    /// Cache a version as the latest of its case.
    ///
    /// A cached version with an equal or higher number is left in place; the
    /// comparison and the write run as one script. Returns whether this call wrote.
    pub async fn set_latest(&self, version: &AnalysisVersion) -> Result<bool, CacheError> {
        let full_key = format!("{}{}", PREFIX_LATEST, version.case_id);
        let json =
            serde_json::to_string(version).map_err(|e| CacheError::Serialization(e.to_string()))?;

        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let written: i32 = SET_IF_NEWER
            .key(&full_key)
            .arg(json)
            .arg(version.version_number)
            .arg(self.ttl_seconds)
            .invoke_async(&mut conn)
            .await?;

        tracing::debug!(
            key = %full_key,
            version_number = version.version_number,
            written = written == 1,
            ttl = self.ttl_seconds,
            "Cached latest analysis"
        );
        Ok(written == 1)
    }

    async fn get_with_prefix<T: DeserializeOwned>(
        &self,
        prefix: &str,
        key: &str,
    ) -> Result<T, CacheError> {
        let full_key = format!("{}{}", prefix, key);
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let data: Option<String> = conn.get(&full_key).await?;

        match data {
            Some(json) => {
                serde_json::from_str(&json).map_err(|e| CacheError::Serialization(e.to_string()))
            }
            None => Err(CacheError::Miss(key.to_string())),
        }
    }
}

/// Build Redis URL: redis://[password@]host:port/db
fn redis_url(host: &str, port: &str, password: Option<&str>, db: &str) -> String {
    match password {
        Some(pwd) if !pwd.is_empty() => format!("redis://:{}@{}:{}/{}", pwd, host, port, db),
        _ => format!("redis://{}:{}/{}", host, port, db),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires a Redis server
    async fn test_set_latest_keeps_highest_version() {
        use crate::model::CaseMomentum;
        use crate::service::delta::tests::{sample_result, sample_version};

        let cache = AnalysisCache::new().await.unwrap();
        let case_id = format!("cache-test-{}", uuid::Uuid::new_v4());
        let v2 = sample_version(&case_id, 2, sample_result(CaseMomentum::Balanced));
        let v3 = sample_version(&case_id, 3, sample_result(CaseMomentum::Strong));

        assert!(cache.set_latest(&v3).await.unwrap());
        assert!(!cache.set_latest(&v2).await.unwrap());
        assert_eq!(cache.get_latest(&case_id).await.unwrap().version_number, 3);
    }

    #[test]
    fn test_redis_url() {
        assert_eq!(redis_url("cache", "6380", None, "2"), "redis://cache:6380/2");
        assert_eq!(redis_url("cache", "6380", Some(""), "0"), "redis://cache:6380/0");
        assert_eq!(
            redis_url("cache", "6380", Some("s3cret"), "0"),
            "redis://:s3cret@cache:6380/0"
        );
    }
}
