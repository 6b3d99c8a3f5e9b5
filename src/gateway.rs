//! Request gateway: the single entry point the transport drives.
//!
//! Splits traffic on the request's subdomain. The reserved admin
//! subdomain gets the collection/endpoint CRUD routes; every other slug
//! is mock traffic: publish an observation, then look up and replay.
//! The publish is issued before the lookup and never awaited, failed,
//! or blocked on.

use crate::config::ServerConfig;
use crate::endpoint::EndpointRecord;
use crate::error::MockHostError;
use crate::observer::{ObserverHub, RequestObservation};
use crate::registry::{CollectionCreated, EndpointRegistry};
use crate::request::{collection_slug, InboundRequest, MockResponse};
use crate::responder::MockResponder;
use crate::store::KeyValueStore;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Routes every inbound request to the registry or the responder.
pub struct Gateway {
    config: ServerConfig,
    registry: EndpointRegistry,
    responder: MockResponder,
    observer: Arc<ObserverHub>,
    /// Total requests handled.
    requests_total: AtomicU64,
    /// Requests served from the mock path.
    requests_mocked: AtomicU64,
    /// Requests routed to the admin surface.
    requests_admin: AtomicU64,
}

impl Gateway {
    pub fn new(
        config: ServerConfig,
        store: Arc<dyn KeyValueStore>,
        observer: Arc<ObserverHub>,
    ) -> Self {
        info!(
            admin_subdomain = %config.admin_subdomain,
            base_domain = config.base_domain.as_deref().unwrap_or("(host labels)"),
            "gateway initialized"
        );
        Self {
            config,
            registry: EndpointRegistry::new(store.clone()),
            responder: MockResponder::new(store),
            observer,
            requests_total: AtomicU64::new(0),
            requests_mocked: AtomicU64::new(0),
            requests_admin: AtomicU64::new(0),
        }
    }

    /// Total requests handled.
    pub fn total_requests(&self) -> u64 {
        self.requests_total.load(Ordering::Relaxed)
    }

    /// Requests served from the mock path.
    pub fn total_mocked(&self) -> u64 {
        self.requests_mocked.load(Ordering::Relaxed)
    }

    /// Requests routed to the admin surface.
    pub fn total_admin(&self) -> u64 {
        self.requests_admin.load(Ordering::Relaxed)
    }

    /// Handle one inbound request.
    pub async fn handle(&self, request: &InboundRequest) -> MockResponse {
        self.requests_total.fetch_add(1, Ordering::Relaxed);

        let slug = collection_slug(&request.host, self.config.base_domain.as_deref());
        match slug {
            Some(slug) if slug == self.config.admin_subdomain => {
                self.requests_admin.fetch_add(1, Ordering::Relaxed);
                self.handle_admin(request).await
            }
            Some(slug) => {
                self.requests_mocked.fetch_add(1, Ordering::Relaxed);
                if self.config.settings.log_requests {
                    info!(
                        collection = %slug,
                        method = %request.method,
                        path = %request.path,
                        "mock request"
                    );
                }
                // Fire-and-forget: subscribers hear about the request
                // whether or not the lookup finds anything.
                self.observer.emit(&slug, observe(request));
                self.responder.respond(&slug, request).await
            }
            None => {
                debug!(host = %request.host, "no collection slug in host");
                MockResponse::text(404, "Not Found")
            }
        }
    }

    /// Admin surface: collection/endpoint CRUD.
    async fn handle_admin(&self, request: &InboundRequest) -> MockResponse {
        let path = request.path.trim_matches('/').to_string();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        if self.config.settings.log_admin {
            info!(method = %request.method, path = %request.path, "admin request");
        }

        let result = match (request.method.as_str(), segments.as_slice()) {
            ("GET", ["collections", collection]) => self.list_collection(collection).await,
            ("POST", ["collections"]) => self.create_collection(request).await,
            ("POST", ["collections", collection, "endpoint"]) => {
                self.create_endpoint(collection, request).await
            }
            ("PUT", ["collections", collection, "endpoint", endpoint_id]) => {
                self.update_endpoint(collection, endpoint_id, request).await
            }
            ("DELETE", ["collections", _collection, "endpoint", endpoint_id]) => {
                self.delete_endpoint(endpoint_id).await
            }
            _ => {
                debug!(method = %request.method, path = %request.path, "unknown admin route");
                return MockResponse::text(404, "Not Found");
            }
        };

        result.unwrap_or_else(error_response)
    }

    async fn list_collection(&self, collection: &str) -> Result<MockResponse, MockHostError> {
        let records = self.registry.list_collection(collection).await?;
        Ok(MockResponse::json(200, &serde_json::to_value(records)?))
    }

    async fn create_collection(
        &self,
        request: &InboundRequest,
    ) -> Result<MockResponse, MockHostError> {
        let draft: CreateCollectionDraft = parse_body(request)?;
        let collection = match draft.collection_id.as_deref() {
            Some(id) if !id.is_empty() => id,
            _ => return Err(MockHostError::Validation("collectionId")),
        };

        match self.registry.create_collection(collection).await? {
            CollectionCreated::Created => Ok(MockResponse::status(204)),
            CollectionCreated::AlreadyExists => Ok(MockResponse::json(
                200,
                &json!({"message": "Collection exists"}),
            )),
        }
    }

    async fn create_endpoint(
        &self,
        collection: &str,
        request: &InboundRequest,
    ) -> Result<MockResponse, MockHostError> {
        let record = parse_body::<EndpointDraft>(request)?.into_record()?;
        self.registry.create_endpoint(collection, record).await?;
        Ok(MockResponse::status(204))
    }

    async fn update_endpoint(
        &self,
        collection: &str,
        endpoint_id: &str,
        request: &InboundRequest,
    ) -> Result<MockResponse, MockHostError> {
        let record = parse_body::<EndpointDraft>(request)?.into_record()?;
        self.registry
            .update_endpoint(collection, endpoint_id, record)
            .await?;
        Ok(MockResponse::status(204))
    }

    async fn delete_endpoint(&self, endpoint_id: &str) -> Result<MockResponse, MockHostError> {
        self.registry.delete_endpoint(endpoint_id).await?;
        Ok(MockResponse::status(204))
    }
}

/// Build the observation event for an inbound mock request.
fn observe(request: &InboundRequest) -> RequestObservation {
    RequestObservation {
        path: request.original_url(),
        url: request.full_url(),
        headers: request.headers.clone(),
        body: request.body_json(),
        method: request.method.clone(),
        cookies: request.cookies(),
        query: request.query_params(),
    }
}

/// Map an operation failure to its wire shape.
fn error_response(err: MockHostError) -> MockResponse {
    match err {
        MockHostError::Validation(field) => MockResponse::json(
            400,
            &json!({"message": format!("Missing required field: {field}")}),
        ),
        MockHostError::InvalidEndpointId => {
            MockResponse::json(400, &json!({"message": "Invalid endpoint ID"}))
        }
        MockHostError::Store(err) => {
            error!(error = %err, "store failure on admin route");
            MockResponse::json(500, &json!({"message": "Internal server error"}))
        }
    }
}

fn parse_body<T: for<'de> Deserialize<'de>>(
    request: &InboundRequest,
) -> Result<T, MockHostError> {
    serde_json::from_slice(&request.body).map_err(|err| {
        warn!(error = %err, "unparsable admin request body");
        MockHostError::Validation("body")
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateCollectionDraft {
    collection_id: Option<String>,
}

/// Endpoint fields as sent by the client; every field is required and
/// checked one by one so the 400 can name what is missing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EndpointDraft {
    method: Option<String>,
    path: Option<String>,
    headers: Option<HashMap<String, String>>,
    body: Option<serde_json::Value>,
    status_code: Option<u16>,
}

impl EndpointDraft {
    fn into_record(self) -> Result<EndpointRecord, MockHostError> {
        Ok(EndpointRecord {
            method: self.method.ok_or(MockHostError::Validation("method"))?,
            path: self.path.ok_or(MockHostError::Validation("path"))?,
            headers: self.headers.ok_or(MockHostError::Validation("headers"))?,
            body: self.body.ok_or(MockHostError::Validation("body"))?,
            status_code: self
                .status_code
                .ok_or(MockHostError::Validation("statusCode"))?,
        })
    }
}
