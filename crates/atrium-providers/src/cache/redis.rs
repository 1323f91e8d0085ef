//! Redis distributed cache provider
//!
//! Shared cache for multi-instance deployments. Keys are laid out as
//! `{prefix}:{region}:{key}` so one region can be dropped with a SCAN over its
//! pattern without touching other regions or other applications sharing the
//! database.
//!
//! Values are wrapped in a small envelope recording the TTL and mode, so a
//! read of a sliding entry can renew its expiry with `PEXPIRE`.
//!
//! ## Example
//!
//! ```no_run
//! use atrium_providers::cache::RedisCacheProvider;
//!
//! let provider = RedisCacheProvider::new("redis://localhost:6379")?
//!     .with_key_prefix("backoffice");
//! # Ok::<(), atrium_domain::Error>(())
//! ```

use super::stats::ProviderCounters;
use crate::constants::{
    CACHE_NAMESPACE_SEPARATOR, REDIS_CONNECT_TIMEOUT_SECS, REDIS_DEFAULT_KEY_PREFIX,
    REDIS_SCAN_BATCH_SIZE,
};
use async_trait::async_trait;
use atrium_domain::constants::DEFAULT_CACHE_TTL_SECS;
use atrium_domain::error::{Error, Result};
use atrium_domain::ports::providers::{CacheEntryConfig, CacheProvider};
use atrium_domain::value_objects::CacheStats;
use redis::Client;
use redis::aio::MultiplexedConnection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

/// Stored form of every value
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    data: String,
    ttl_ms: u64,
    sliding: bool,
}

/// Redis cache provider
///
/// One multiplexed connection is opened lazily on first use and shared by
/// every clone of the provider.
#[derive(Clone)]
pub struct RedisCacheProvider {
    client: Client,
    key_prefix: String,
    default_ttl: Duration,
    connection: Arc<OnceCell<MultiplexedConnection>>,
    counters: Arc<ProviderCounters>,
}

impl RedisCacheProvider {
    /// Create a new Redis cache provider with connection string
    ///
    /// No connection is made until the first command.
    pub fn new(connection_string: &str) -> Result<Self> {
        let client = Client::open(connection_string).map_err(|e| {
            Error::infrastructure_with_source(format!("Failed to create Redis client: {e}"), e)
        })?;

        Ok(Self {
            client,
            key_prefix: REDIS_DEFAULT_KEY_PREFIX.to_string(),
            default_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            connection: Arc::new(OnceCell::new()),
            counters: Arc::new(ProviderCounters::default()),
        })
    }

    /// Prefix every key with `prefix`
    pub fn with_key_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// TTL used for writes that carry none
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Key prefix in use
    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    /// Full Redis key of an entry
    ///
    /// The region is encoded so a separator inside it cannot make one
    /// region's keys look like another's.
    pub fn full_key(&self, region: &str, key: &str) -> String {
        format!(
            "{prefix}{sep}{region}{sep}{key}",
            prefix = self.key_prefix,
            region = encode_region(region),
            sep = CACHE_NAMESPACE_SEPARATOR
        )
    }

    /// SCAN pattern matching every key of `region`
    pub fn region_pattern(&self, region: &str) -> String {
        format!(
            "{prefix}{sep}{region}{sep}*",
            prefix = escape_glob(&self.key_prefix),
            region = escape_glob(&encode_region(region)),
            sep = CACHE_NAMESPACE_SEPARATOR
        )
    }

    fn prefix_pattern(&self) -> String {
        format!(
            "{}{}*",
            escape_glob(&self.key_prefix),
            CACHE_NAMESPACE_SEPARATOR
        )
    }

    /// Shared connection, opened on first use
    async fn connection(&self) -> Result<MultiplexedConnection> {
        let conn = self
            .connection
            .get_or_try_init(|| async {
                let timeout = Duration::from_secs(REDIS_CONNECT_TIMEOUT_SECS);
                match tokio::time::timeout(timeout, self.client.get_multiplexed_async_connection())
                    .await
                {
                    Ok(Ok(conn)) => {
                        tracing::info!(prefix = %self.key_prefix, "connected to Redis");
                        Ok(conn)
                    }
                    Ok(Err(e)) => Err(Error::infrastructure_with_source(
                        format!("Redis connection failed: {e}"),
                        e,
                    )),
                    Err(_) => Err(Error::infrastructure("Redis connection timed out")),
                }
            })
            .await?;
        Ok(conn.clone())
    }

    /// Every key matching `pattern`, collected with SCAN
    async fn scan_keys(&self, pattern: &str) -> Result<Vec<String>> {
        let mut conn = self.connection().await?;
        let mut cursor: u64 = 0;
        let mut keys = Vec::new();
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(REDIS_SCAN_BATCH_SIZE)
                .query_async(&mut conn)
                .await
                .map_err(|e| redis_error("SCAN", e))?;
            keys.extend(batch);
            if next == 0 {
                return Ok(keys);
            }
            cursor = next;
        }
    }

    async fn delete_keys(&self, keys: &[String]) -> Result<u64> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.connection().await?;
        let mut removed = 0;
        for chunk in keys.chunks(REDIS_SCAN_BATCH_SIZE) {
            let count: u64 = redis::cmd("DEL")
                .arg(chunk)
                .query_async(&mut conn)
                .await
                .map_err(|e| redis_error("DEL", e))?;
            removed += count;
        }
        Ok(removed)
    }
}

fn redis_error(command: &str, e: redis::RedisError) -> Error {
    Error::infrastructure_with_source(format!("Redis {command} failed: {e}"), e)
}

/// Percent-encode the separator (and `%` itself) inside a region name
fn encode_region(region: &str) -> String {
    region
        .replace('%', "%25")
        .replace(CACHE_NAMESPACE_SEPARATOR, "%3A")
}

/// Escape glob metacharacters so a region name matches literally
fn escape_glob(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

#[async_trait]
impl CacheProvider for RedisCacheProvider {
    async fn get_json(&self, region: &str, key: &str) -> Result<Option<String>> {
        Ok(self
            .get_json_with_ttl(region, key)
            .await?
            .map(|(json, _)| json))
    }

    async fn get_json_with_ttl(
        &self,
        region: &str,
        key: &str,
    ) -> Result<Option<(String, Option<Duration>)>> {
        let full_key = self.full_key(region, key);
        let mut conn = self.connection().await?;

        let raw: Option<String> = redis::cmd("GET")
            .arg(&full_key)
            .query_async(&mut conn)
            .await
            .map_err(|e| redis_error("GET", e))?;

        let Some(raw) = raw else {
            self.counters.miss();
            return Ok(None);
        };

        let envelope: Envelope = serde_json::from_str(&raw)?;
        let remaining_ms = if envelope.sliding {
            redis::cmd("PEXPIRE")
                .arg(&full_key)
                .arg(envelope.ttl_ms)
                .query_async::<()>(&mut conn)
                .await
                .map_err(|e| redis_error("PEXPIRE", e))?;
            Some(envelope.ttl_ms)
        } else {
            // Negative replies mean the key vanished or has no expiry
            let pttl: i64 = redis::cmd("PTTL")
                .arg(&full_key)
                .query_async(&mut conn)
                .await
                .map_err(|e| redis_error("PTTL", e))?;
            u64::try_from(pttl).ok()
        };
        self.counters.hit();
        Ok(Some((envelope.data, remaining_ms.map(Duration::from_millis))))
    }

    async fn set_json(
        &self,
        region: &str,
        key: &str,
        value: &str,
        config: CacheEntryConfig,
    ) -> Result<()> {
        let expiration = config.expiration(self.default_ttl);
        let envelope = Envelope {
            data: value.to_string(),
            ttl_ms: ttl_millis(expiration.ttl),
            sliding: expiration.is_sliding(),
        };
        let payload = serde_json::to_string(&envelope)?;
        let mut conn = self.connection().await?;

        redis::cmd("SET")
            .arg(self.full_key(region, key))
            .arg(payload)
            .arg("PX")
            .arg(envelope.ttl_ms)
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| redis_error("SET", e))?;
        self.counters.set();
        Ok(())
    }

    async fn delete(&self, region: &str, key: &str) -> Result<bool> {
        let removed = self.delete_keys(&[self.full_key(region, key)]).await?;
        self.counters.removed(removed);
        Ok(removed > 0)
    }

    async fn exists(&self, region: &str, key: &str) -> Result<bool> {
        let mut conn = self.connection().await?;
        let count: u64 = redis::cmd("EXISTS")
            .arg(self.full_key(region, key))
            .query_async(&mut conn)
            .await
            .map_err(|e| redis_error("EXISTS", e))?;
        Ok(count > 0)
    }

    async fn clear_region(&self, region: &str) -> Result<u64> {
        let keys = self.scan_keys(&self.region_pattern(region)).await?;
        let removed = self.delete_keys(&keys).await?;
        self.counters.removed(removed);
        tracing::debug!(region, removed, "cleared distributed cache region");
        Ok(removed)
    }

    async fn clear(&self) -> Result<()> {
        let keys = self.scan_keys(&self.prefix_pattern()).await?;
        let removed = self.delete_keys(&keys).await?;
        self.counters.removed(removed);
        Ok(())
    }

    async fn stats(&self) -> Result<CacheStats> {
        let entries = self.scan_keys(&self.prefix_pattern()).await?.len();
        Ok(self.counters.snapshot(entries as u64))
    }

    async fn size(&self) -> Result<usize> {
        Ok(self.scan_keys(&self.prefix_pattern()).await?.len())
    }

    fn provider_name(&self) -> &str {
        "redis"
    }
}

impl std::fmt::Debug for RedisCacheProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCacheProvider")
            .field("key_prefix", &self.key_prefix)
            .field("default_ttl", &self.default_ttl)
            .field("connected", &self.connection.initialized())
            .finish_non_exhaustive()
    }
}
