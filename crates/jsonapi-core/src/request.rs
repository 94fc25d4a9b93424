//! Request types for JsonApi.

use bytes::Bytes;
use http::{request::Parts, HeaderMap, Method, Uri};
use serde_json::Value;
use std::collections::HashMap;

/// HTTP request wrapper.
///
/// Provides the validation layer with read access to the parts of an
/// incoming request it may depend on: method, URI, headers, path parameters
/// and the JSON document body. The validation layer never mutates a request.
pub struct Request {
    parts: Parts,
    body: Option<Bytes>,
    path_params: HashMap<String, String>,
}

impl Request {
    /// Create a new request from parts.
    pub fn new(parts: Parts, body: Bytes, path_params: HashMap<String, String>) -> Self {
        Self {
            parts,
            body: Some(body),
            path_params,
        }
    }

    /// Get the HTTP method.
    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    /// Get the URI.
    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    /// Get the headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    /// Get the request path.
    pub fn path(&self) -> &str {
        self.parts.uri.path()
    }

    /// Get the query string.
    pub fn query_string(&self) -> Option<&str> {
        self.parts.uri.query()
    }

    /// Get path parameters.
    pub fn path_params(&self) -> &HashMap<String, String> {
        &self.path_params
    }

    /// Get a specific path parameter.
    pub fn path_param(&self, name: &str) -> Option<&String> {
        self.path_params.get(name)
    }

    /// Get the raw body bytes.
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Parse the body as a JSON document.
    ///
    /// Returns `None` when the body is absent or not valid JSON.
    pub fn json(&self) -> Option<Value> {
        let body = self.body.as_ref()?;
        serde_json::from_slice(body).ok()
    }

    /// Take the body bytes (can only be called once).
    pub fn take_body(&mut self) -> Option<Bytes> {
        self.body.take()
    }
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.parts.method)
            .field("uri", &self.parts.uri)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with_body(body: &str) -> Request {
        let (parts, _) = http::Request::builder()
            .method(Method::POST)
            .uri("/api/v1/posts")
            .body(())
            .unwrap()
            .into_parts();
        Request::new(parts, Bytes::from(body.to_string()), HashMap::new())
    }

    #[test]
    fn json_body_parses() {
        let request = request_with_body(r#"{"data": {"type": "posts"}}"#);
        let doc = request.json().unwrap();
        assert_eq!(doc["data"]["type"], "posts");
    }

    #[test]
    fn invalid_json_body_is_none() {
        let request = request_with_body("not json");
        assert!(request.json().is_none());
    }

    #[test]
    fn take_body_is_one_shot() {
        let mut request = request_with_body("{}");
        assert!(request.take_body().is_some());
        assert!(request.take_body().is_none());
        assert!(request.json().is_none());
    }
}
