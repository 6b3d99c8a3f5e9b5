//! Key-value store adapter.
//!
//! The registry and responder talk to storage through the
//! [`KeyValueStore`] trait; the store is the sole source of truth and is
//! read fresh on every mock request. Values are JSON-encoded records as
//! opaque text.
//!
//! [`MemoryStore`] is the bundled backend: a process-local map guarded by
//! a `tokio` RwLock, with the same explicit connect/disconnect lifecycle
//! a networked client would have. A shared networked store plugs in at
//! the trait seam.

use crate::error::StoreError;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

/// Async key-value store contract.
///
/// `keys` takes a trailing-`*` glob, matching everything under the
/// prefix before the `*`. `m_get` preserves input order, returning
/// `None` for keys that are absent.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: String) -> Result<(), StoreError>;
    async fn del(&self, key: &str) -> Result<(), StoreError>;
    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError>;
    async fn m_get(&self, keys: &[String]) -> Result<Vec<Option<String>>, StoreError>;
}

/// In-process store backend.
pub struct MemoryStore {
    data: RwLock<BTreeMap<String, String>>,
    connected: AtomicBool,
}

impl MemoryStore {
    /// Create a store in the disconnected state.
    pub fn new() -> Self {
        Self {
            data: RwLock::new(BTreeMap::new()),
            connected: AtomicBool::new(false),
        }
    }

    /// Create a store that is already connected. Test convenience.
    pub fn connected() -> Self {
        let store = Self::new();
        store.connect();
        store
    }

    /// Mark the client connected. Idempotent.
    pub fn connect(&self) {
        self.connected.store(true, Ordering::SeqCst);
        debug!("memory store connected");
    }

    /// Mark the client disconnected; subsequent operations fail with
    /// [`StoreError::NotConnected`].
    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
        debug!("memory store disconnected");
    }

    fn check_connected(&self) -> Result<(), StoreError> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::NotConnected)
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check_connected()?;
        Ok(self.data.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.check_connected()?;
        self.data.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), StoreError> {
        self.check_connected()?;
        self.data.write().await.remove(key);
        Ok(())
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        self.check_connected()?;
        let prefix = pattern.strip_suffix('*').unwrap_or(pattern);
        Ok(self
            .data
            .read()
            .await
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.clone())
            .collect())
    }

    async fn m_get(&self, keys: &[String]) -> Result<Vec<Option<String>>, StoreError> {
        self.check_connected()?;
        let data = self.data.read().await;
        Ok(keys.iter().map(|k| data.get(k).cloned()).collect())
    }
}
