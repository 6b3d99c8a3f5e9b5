//! Transport-independent request and response types.
//!
//! The HTTP listener (whatever it is) converts each wire request into an
//! [`InboundRequest`] and replays the [`MockResponse`] the gateway hands
//! back. Nothing in the core depends on the transport.

use std::collections::HashMap;

/// An inbound HTTP request, already decoded off the wire.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    /// Uppercased HTTP method.
    pub method: String,
    /// Authority from the Host header, port included if sent.
    pub host: String,
    /// Request path, without the query string.
    pub path: String,
    /// Raw query string, without the leading `?`.
    pub query_string: Option<String>,
    /// Single-valued request headers.
    pub headers: HashMap<String, String>,
    /// Raw request body.
    pub body: Vec<u8>,
    /// URL scheme the caller used.
    pub scheme: String,
}

impl InboundRequest {
    /// Minimal request for driving the gateway directly.
    pub fn new(method: &str, host: &str, path: &str) -> Self {
        Self {
            method: method.to_uppercase(),
            host: host.to_string(),
            path: path.to_string(),
            query_string: None,
            headers: HashMap::new(),
            body: Vec::new(),
            scheme: "http".to_string(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_query_string(mut self, query: &str) -> Self {
        self.query_string = Some(query.to_string());
        self
    }

    /// Header lookup, case-insensitive on the name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Path plus query string, as the caller sent it.
    pub fn original_url(&self) -> String {
        match &self.query_string {
            Some(query) => format!("{}?{}", self.path, query),
            None => self.path.clone(),
        }
    }

    /// Full URL: scheme://host/path?query.
    pub fn full_url(&self) -> String {
        format!("{}://{}{}", self.scheme, self.host, self.original_url())
    }

    /// Percent-decoded query parameters. Later duplicates win.
    pub fn query_params(&self) -> HashMap<String, String> {
        let Some(query) = &self.query_string else {
            return HashMap::new();
        };
        query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
                (decode_component(name), decode_component(value))
            })
            .collect()
    }

    /// Cookies from the `Cookie` header.
    pub fn cookies(&self) -> HashMap<String, String> {
        let Some(raw) = self.header("cookie") else {
            return HashMap::new();
        };
        raw.split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    /// Body as JSON when it parses, raw text otherwise, null when empty.
    pub fn body_json(&self) -> serde_json::Value {
        if self.body.is_empty() {
            return serde_json::Value::Null;
        }
        if let Ok(value) = serde_json::from_slice(&self.body) {
            return value;
        }
        serde_json::Value::String(String::from_utf8_lossy(&self.body).into_owned())
    }
}

fn decode_component(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

/// Response the transport replays to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct MockResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl MockResponse {
    /// Bare status with an empty body.
    pub fn status(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Plain-text response.
    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            headers: HashMap::from([(
                "Content-Type".to_string(),
                "text/plain".to_string(),
            )]),
            body: body.as_bytes().to_vec(),
        }
    }

    /// JSON response.
    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        Self {
            status,
            headers: HashMap::from([(
                "Content-Type".to_string(),
                "application/json".to_string(),
            )]),
            body: body.to_string().into_bytes(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    /// Body as UTF-8, for assertions and logs.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Extract the collection slug from a request host.
///
/// With a configured base domain, the slug is the label immediately
/// left of it (`demo.roketo.cloud` gives `demo`). Without one, the
/// host's labels beyond the registrable two are the subdomains and the
/// slug is the label closest to the domain (`demo.example.com` gives
/// `demo`). A bare or unrelated host has no slug.
pub fn collection_slug(host: &str, base_domain: Option<&str>) -> Option<String> {
    let host = host.split(':').next().unwrap_or(host);

    if let Some(base) = base_domain {
        let prefix = host.strip_suffix(base)?.strip_suffix('.')?;
        let slug = prefix.rsplit('.').next()?;
        return (!slug.is_empty()).then(|| slug.to_string());
    }

    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 3 {
        return None;
    }
    Some(labels[labels.len() - 3].to_string())
}
