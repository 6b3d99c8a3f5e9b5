//! Endpoint registry: CRUD over the key-value store.
//!
//! All operations go straight to the store; there is no cache and no
//! transactional coordination with the hot-path lookup. The one
//! invariant owned here is that a created collection always holds at
//! least one record (the seed), so prefix-scan existence checks are
//! reliable.

use crate::endpoint::{endpoint_key, sample_record, sample_record_key, EndpointRecord};
use crate::error::MockHostError;
use crate::store::KeyValueStore;
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of [`EndpointRegistry::create_collection`].
///
/// Already-exists is a success for callers, not a failure: creation is
/// idempotent and never re-seeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionCreated {
    Created,
    AlreadyExists,
}

/// CRUD operations on collections and their endpoint records.
pub struct EndpointRegistry {
    store: Arc<dyn KeyValueStore>,
}

impl EndpointRegistry {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// All records of a collection, in key order.
    ///
    /// An unknown collection is an empty list, not an error. Keys that
    /// vanish between the prefix scan and the bulk read are skipped;
    /// that read window is part of the no-transactions contract.
    pub async fn list_collection(
        &self,
        collection: &str,
    ) -> Result<Vec<EndpointRecord>, MockHostError> {
        let keys = self.store.keys(&format!("{collection}-*")).await?;
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let values = self.store.m_get(&keys).await?;
        let mut records = Vec::with_capacity(values.len());
        for value in values.into_iter().flatten() {
            records.push(serde_json::from_str(&value)?);
        }
        Ok(records)
    }

    /// Create a collection by seeding its default GET "/" record.
    ///
    /// Two concurrent creates can both pass the existence scan; both
    /// then write the same seed key, which is harmless.
    pub async fn create_collection(
        &self,
        collection: &str,
    ) -> Result<CollectionCreated, MockHostError> {
        let existing = self.store.keys(&format!("{collection}-*")).await?;
        if !existing.is_empty() {
            debug!(collection = %collection, "collection already exists");
            return Ok(CollectionCreated::AlreadyExists);
        }

        let seed = serde_json::to_string(&sample_record())?;
        self.store.set(&sample_record_key(collection), seed).await?;
        info!(collection = %collection, "collection created");
        Ok(CollectionCreated::Created)
    }

    /// Store a record under its derived key, returning the key.
    ///
    /// Unconditional write: a colliding key is silently overwritten,
    /// last writer wins.
    pub async fn create_endpoint(
        &self,
        collection: &str,
        record: EndpointRecord,
    ) -> Result<String, MockHostError> {
        let key = endpoint_key(collection, &record.method, &record.path);
        self.store.set(&key, serde_json::to_string(&record)?).await?;
        info!(collection = %collection, key = %key, "endpoint created");
        Ok(key)
    }

    /// Replace the record behind an opaque id with a freshly derived one.
    ///
    /// Two store operations with no atomicity between them: the old key
    /// is deleted, then the new key is written. A lookup interleaving
    /// between the two sees the record absent for one store round trip.
    /// A method/path change effectively renames the record.
    pub async fn update_endpoint(
        &self,
        collection: &str,
        opaque_old_id: &str,
        record: EndpointRecord,
    ) -> Result<String, MockHostError> {
        let old_key = self.resolve_opaque_id(opaque_old_id).await?;
        self.store.del(&old_key).await?;

        let new_key = endpoint_key(collection, &record.method, &record.path);
        self.store
            .set(&new_key, serde_json::to_string(&record)?)
            .await?;
        info!(
            collection = %collection,
            old_key = %old_key,
            new_key = %new_key,
            "endpoint updated"
        );
        Ok(new_key)
    }

    /// Delete the record behind an opaque id.
    pub async fn delete_endpoint(&self, opaque_id: &str) -> Result<(), MockHostError> {
        let key = self.resolve_opaque_id(opaque_id).await?;
        self.store.del(&key).await?;
        info!(key = %key, "endpoint deleted");
        Ok(())
    }

    /// Decode an opaque id and check the key exists.
    ///
    /// An undecodable token and a decoded-but-absent key are the same
    /// invalid-id outcome.
    async fn resolve_opaque_id(&self, opaque_id: &str) -> Result<String, MockHostError> {
        let key = crate::endpoint::decode_endpoint_id(opaque_id)
            .ok_or(MockHostError::InvalidEndpointId)?;
        match self.store.get(&key).await? {
            Some(_) => Ok(key),
            None => Err(MockHostError::InvalidEndpointId),
        }
    }
}
