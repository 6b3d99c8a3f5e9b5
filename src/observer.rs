//! Live observer channel.
//!
//! Every inbound mock request is published as a [`RequestObservation`]
//! into a broadcast channel scoped to its collection. Fan-out uses
//! `tokio::sync::broadcast`: every subscriber joined to a collection
//! sees every event, a channel with no subscribers drops events, and
//! late joiners get no replay.
//!
//! Publication is fire-and-forget. [`ObserverHub::emit`] is synchronous,
//! never blocks on delivery, and never surfaces an error into the
//! request path.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// One observed inbound mock request, as delivered to subscribers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RequestObservation {
    /// Request path including the query string.
    pub path: String,
    /// Full URL the caller hit.
    pub url: String,
    /// Request headers.
    pub headers: HashMap<String, String>,
    /// Request body: parsed JSON when possible, raw text otherwise,
    /// null when empty.
    pub body: serde_json::Value,
    /// HTTP method.
    pub method: String,
    /// Cookies parsed from the `Cookie` header.
    pub cookies: HashMap<String, String>,
    /// Percent-decoded query parameters.
    pub query: HashMap<String, String>,
}

/// Per-collection broadcast fan-out.
pub struct ObserverHub {
    capacity: usize,
    channels: RwLock<HashMap<String, broadcast::Sender<RequestObservation>>>,
}

impl ObserverHub {
    /// `capacity` bounds how many undelivered events a slow subscriber
    /// can lag behind before it starts missing them.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            channels: RwLock::new(HashMap::new()),
        }
    }

    /// Join a collection's channel, creating it on first join.
    ///
    /// The returned receiver sees every event emitted after this call.
    pub fn join(&self, slug: &str) -> broadcast::Receiver<RequestObservation> {
        let mut channels = self
            .channels
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let sender = channels
            .entry(slug.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0);
        debug!(collection = %slug, subscribers = sender.receiver_count() + 1, "observer joined");
        sender.subscribe()
    }

    /// Broadcast an observation to everyone joined to `slug`.
    ///
    /// Dropped silently when no channel exists or nobody is listening.
    pub fn emit(&self, slug: &str, observation: RequestObservation) {
        let channels = self.channels.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(sender) = channels.get(slug) {
            if sender.send(observation).is_err() {
                trace!(collection = %slug, "observation dropped, no subscribers");
            }
        } else {
            trace!(collection = %slug, "observation dropped, channel never joined");
        }
    }

    /// Number of live subscribers for a collection.
    pub fn subscriber_count(&self, slug: &str) -> usize {
        self.channels
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(slug)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }
}
