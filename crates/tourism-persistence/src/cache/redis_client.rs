//! # Redis Query Cache
//!
//! Append-only analytics cache on Redis lists. Each fingerprint owns one
//! list; new entries are pushed to the head so the newest entry is read
//! first. Keys carry no TTL, expiry is judged from the entry itself.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use crate::error::Result;
use crate::repository::QueryCacheRepository;
use tourism_domain::CacheEntry;

/// Redis cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub url: String,
    pub key_prefix: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            key_prefix: "analytics:cache".to_string(),
        }
    }
}

/// Redis-backed [`QueryCacheRepository`].
#[derive(Clone)]
pub struct RedisQueryCache {
    conn: ConnectionManager,
    config: CacheConfig,
}

impl RedisQueryCache {
    /// Connect to Redis.
    pub async fn new(config: CacheConfig) -> Result<Self> {
        let client = Client::open(config.url.as_str())?;
        let conn = ConnectionManager::new(client).await?;
        tracing::info!(url = %config.url, "Connected to Redis query cache");

        Ok(Self { conn, config })
    }

    fn key(&self, fingerprint: &str) -> String {
        entry_key(&self.config.key_prefix, fingerprint)
    }
}

fn entry_key(prefix: &str, fingerprint: &str) -> String {
    format!("{prefix}:{fingerprint}")
}

/// Newest entry still valid at `now`, given raw list items ordered newest first.
fn newest_valid(raw: &[String], now: DateTime<Utc>) -> Result<Option<CacheEntry>> {
    for item in raw {
        let entry: CacheEntry = serde_json::from_str(item)?;
        if entry.is_valid_at(now) {
            return Ok(Some(entry));
        }
    }
    Ok(None)
}

#[async_trait]
impl QueryCacheRepository for RedisQueryCache {
    async fn find_valid(&self, fingerprint: &str, now: DateTime<Utc>) -> Result<Option<CacheEntry>> {
        let mut conn = self.conn.clone();
        let raw: Vec<String> = conn.lrange(self.key(fingerprint), 0, -1).await?;
        newest_valid(&raw, now)
    }

    async fn insert_entry(&self, entry: &CacheEntry) -> Result<()> {
        let mut conn = self.conn.clone();
        let json = serde_json::to_string(entry)?;
        let _: i64 = conn.lpush(self.key(&entry.fingerprint), json).await?;
        Ok(())
    }

    async fn count_entries(&self, fingerprint: &str) -> Result<usize> {
        let mut conn = self.conn.clone();
        let len: usize = conn.llen(self.key(fingerprint)).await?;
        Ok(len)
    }
}
