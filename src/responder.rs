//! Hot-path mock responder.
//!
//! Derives the storage key from the inbound request, reads the store
//! fresh (no cache, no coordination with registry writes), and replays
//! the stored record. Performs no writes and is safe to call
//! concurrently without bound.

use crate::endpoint::{endpoint_key, EndpointRecord};
use crate::request::{InboundRequest, MockResponse};
use crate::store::KeyValueStore;
use std::sync::Arc;
use tracing::{debug, error};

/// Replays stored canned responses for inbound mock requests.
pub struct MockResponder {
    store: Arc<dyn KeyValueStore>,
}

impl MockResponder {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Look up and replay the record for (collection, method, path).
    ///
    /// Absent key is a 404 - indistinguishable between a collection
    /// that was never created and one merely missing this method/path.
    /// A store failure or an unparsable stored value is a 500, surfaced
    /// immediately with no retry.
    pub async fn respond(&self, collection: &str, request: &InboundRequest) -> MockResponse {
        let key = endpoint_key(collection, &request.method, &request.path);

        let raw = match self.store.get(&key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %key, "no endpoint for key");
                return MockResponse::text(404, "Not Found");
            }
            Err(err) => {
                error!(key = %key, error = %err, "store lookup failed");
                return MockResponse::text(500, "Internal server error");
            }
        };

        let record: EndpointRecord = match serde_json::from_str(&raw) {
            Ok(record) => record,
            Err(err) => {
                error!(key = %key, error = %err, "stored record failed to parse");
                return MockResponse::text(500, "Internal server error");
            }
        };

        debug!(key = %key, status = record.status_code, "replaying endpoint");
        let mut response = MockResponse::status(record.status_code);
        for (name, value) in &record.headers {
            response = response.with_header(name, value);
        }
        response.body = record.body_bytes();
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::sample_record;
    use crate::store::MemoryStore;
    use serde_json::json;
    use std::collections::HashMap;

    fn responder() -> (MockResponder, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::connected());
        (MockResponder::new(store.clone()), store)
    }

    async fn put_record(store: &MemoryStore, key: &str, record: &EndpointRecord) {
        store
            .set(key, serde_json::to_string(record).unwrap())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_replays_status_headers_and_body() {
        let (responder, store) = responder();
        let record = EndpointRecord {
            method: "POST".to_string(),
            path: "/ping".to_string(),
            headers: HashMap::from([
                ("Content-Type".to_string(), "application/json".to_string()),
                ("X-Mock".to_string(), "yes".to_string()),
            ]),
            body: json!({"pong": true}),
            status_code: 201,
        };
        put_record(&store, "demo-POST-/ping", &record).await;

        let request = InboundRequest::new("POST", "demo.roketo.cloud", "/ping");
        let response = responder.respond("demo", &request).await;

        assert_eq!(response.status, 201);
        assert_eq!(
            response.headers.get("X-Mock").map(String::as_str),
            Some("yes")
        );
        assert_eq!(response.body_text(), r#"{"pong":true}"#);
    }

    #[tokio::test]
    async fn test_missing_key_is_404() {
        let (responder, store) = responder();
        put_record(&store, "demo-GET-/", &sample_record()).await;

        // Existing collection, missing method/path.
        let request = InboundRequest::new("GET", "demo.roketo.cloud", "/missing");
        assert_eq!(responder.respond("demo", &request).await.status, 404);

        // Collection never created: identical outcome.
        let request = InboundRequest::new("GET", "ghost.roketo.cloud", "/");
        assert_eq!(responder.respond("ghost", &request).await.status, 404);
    }

    #[tokio::test]
    async fn test_method_match_is_case_sensitive() {
        let (responder, store) = responder();
        let mut record = sample_record();
        record.method = "get".to_string();
        put_record(&store, "demo-get-/", &record).await;

        // Inbound methods are uppercased by the transport, so the
        // lowercase record never matches.
        let request = InboundRequest::new("GET", "demo.roketo.cloud", "/");
        assert_eq!(responder.respond("demo", &request).await.status, 404);
    }

    #[tokio::test]
    async fn test_unparsable_record_is_500() {
        let (responder, store) = responder();
        store
            .set("demo-GET-/", "{not valid json".to_string())
            .await
            .unwrap();

        let request = InboundRequest::new("GET", "demo.roketo.cloud", "/");
        let response = responder.respond("demo", &request).await;
        assert_eq!(response.status, 500);
        assert_eq!(response.body_text(), "Internal server error");
    }

    #[tokio::test]
    async fn test_store_failure_is_500() {
        let store = Arc::new(MemoryStore::new());
        let responder = MockResponder::new(store);

        let request = InboundRequest::new("GET", "demo.roketo.cloud", "/");
        assert_eq!(responder.respond("demo", &request).await.status, 500);
    }

    #[tokio::test]
    async fn test_update_window_is_visible() {
        // delete-then-insert with no transaction: between the two store
        // operations the key is absent and the responder 404s; after the
        // insert it resolves again. Bounded by one store round trip.
        let (responder, store) = responder();
        put_record(&store, "demo-GET-/", &sample_record()).await;
        let request = InboundRequest::new("GET", "demo.roketo.cloud", "/");

        assert_eq!(responder.respond("demo", &request).await.status, 200);

        store.del("demo-GET-/").await.unwrap();
        assert_eq!(responder.respond("demo", &request).await.status, 404);

        put_record(&store, "demo-GET-/", &sample_record()).await;
        assert_eq!(responder.respond("demo", &request).await.status, 200);
    }
}
