//! Injected key-value store abstraction.
//!
//! Small get/set/expire surface used for notification staging and other
//! short-lived side-channel state. The engine only ever sees the trait, so
//! tests substitute [`InMemoryKv`] and production can wire any backend with
//! the same semantics.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// Error from a key-value backend.
#[derive(Debug, thiserror::Error)]
pub enum KvError {
    #[error("Key-value backend error: {0}")]
    Backend(String),
}

/// Minimal key-value contract: string keys and values, optional expiry.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch a value. Expired keys read as absent.
    async fn get(&self, key: &str) -> Result<Option<String>, KvError>;

    /// Store a value without expiry, overwriting any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), KvError>;

    /// Store a value that expires after `ttl`.
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<(), KvError>;

    /// Attach or replace an expiry on an existing key. Returns `false` when
    /// the key does not exist.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, KvError>;

    /// Remove a key. Returns `true` when something was removed.
    async fn delete(&self, key: &str) -> Result<bool, KvError>;
}

// ---------------------------------------------------------------------------
// InMemoryKv
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        matches!(self.expires_at, Some(at) if at <= now)
    }
}

/// In-process [`KeyValueStore`] with lazy expiry.
///
/// Expired entries are dropped on access rather than by a sweeper task;
/// the working set here is small (per-contributor notification markers).
#[derive(Default)]
pub struct InMemoryKv {
    entries: RwLock<HashMap<String, Entry>>,
}

impl InMemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKv {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired(now) => {
                    return Ok(Some(entry.value.clone()));
                }
                Some(_) => {}
            }
        }
        // Expired: drop it under the write lock.
        self.entries.write().await.remove(key);
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        self.entries.write().await.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: None,
            },
        );
        Ok(())
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<(), KvError> {
        self.entries.write().await.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Some(Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, KvError> {
        let mut entries = self.entries.write().await;
        match entries.get_mut(key) {
            Some(entry) if !entry.is_expired(Instant::now()) => {
                entry.expires_at = Some(Instant::now() + ttl);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, key: &str) -> Result<bool, KvError> {
        Ok(self.entries.write().await.remove(key).is_some())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_then_get() {
        let kv = InMemoryKv::new();
        kv.set("notification:alice:42", "queued").await.unwrap();
        let got = kv.get("notification:alice:42").await.unwrap();
        assert_eq!(got.as_deref(), Some("queued"));
    }

    #[tokio::test]
    async fn missing_key_reads_none() {
        let kv = InMemoryKv::new();
        assert_eq!(kv.get("absent").await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_removes_key() {
        let kv = InMemoryKv::new();
        kv.set("k", "v").await.unwrap();
        assert!(kv.delete("k").await.unwrap());
        assert!(!kv.delete("k").await.unwrap());
        assert_eq!(kv.get("k").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn ttl_expires_entries() {
        let kv = InMemoryKv::new();
        kv.set_with_ttl("k", "v", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(kv.get("k").await.unwrap().as_deref(), Some("v"));

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(kv.get("k").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn expire_attaches_ttl_to_live_key() {
        let kv = InMemoryKv::new();
        kv.set("k", "v").await.unwrap();
        assert!(kv.expire("k", Duration::from_secs(30)).await.unwrap());

        tokio::time::advance(Duration::from_secs(31)).await;
        assert_eq!(kv.get("k").await.unwrap(), None);
        assert!(!kv.expire("k", Duration::from_secs(30)).await.unwrap());
    }
}
