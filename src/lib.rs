//! Roketo Mock Server
//!
//! A mock-API hosting service: register a collection of canned HTTP
//! endpoint definitions, point external callers at
//! `<collection>.<domain>/<path>`, and watch the calls arrive in real
//! time while the stored response is replayed.
//!
//! # Features
//!
//! - **Collections**: namespaced sets of endpoint definitions, addressed
//!   by subdomain
//! - **Canned Responses**: status, headers, and body replayed verbatim
//!   per (method, path)
//! - **Live Observation**: every inbound mock request is broadcast to
//!   subscribers joined to the collection's channel
//! - **Opaque Endpoint Ids**: update/delete existing endpoints without
//!   knowing the storage key scheme
//! - **Pluggable Storage**: an async key-value trait with a bundled
//!   in-process backend
//!
//! # Example Configuration
//!
//! ```yaml
//! listen: "0.0.0.0:8000"
//! base_domain: roketo.cloud
//! admin_subdomain: api
//! observer:
//!   channel_capacity: 64
//! ```

pub mod config;
pub mod endpoint;
pub mod error;
pub mod gateway;
pub mod observer;
pub mod registry;
pub mod request;
pub mod responder;
pub mod store;

pub use config::ServerConfig;
pub use endpoint::EndpointRecord;
pub use error::{MockHostError, StoreError};
pub use gateway::Gateway;
pub use observer::{ObserverHub, RequestObservation};
pub use registry::EndpointRegistry;
pub use request::{InboundRequest, MockResponse};
pub use responder::MockResponder;
pub use store::{KeyValueStore, MemoryStore};
