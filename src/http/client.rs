//! Request building and sending
//!
//! `ApiClient` owns the request convention (base URL, JSON content type,
//! demo flag). The bytes on the wire go through a `Transport`, which is
//! reqwest in production and an in-memory fake in tests.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, Url};
use serde_json::Value;
use tracing::debug;

use crate::common::config::ApiConfig;
use crate::common::{Error, Result};

use super::response::ApiResponse;

/// Query flag that makes the service skip authentication
pub const DEMO_FLAG: (&str, &str) = ("demo", "true");

/// A fully built request, ready to send
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    pub body: Option<Value>,
}

impl ApiRequest {
    /// Value of a query parameter, if present
    pub fn query_value(&self, key: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }
}

/// Sends built requests and normalizes responses
///
/// A request that never gets a response must come back as
/// `Error::Transport`, never as a panic.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}

/// reqwest-backed transport with the client's default timeouts
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = request.url.to_string();

        let mut builder = self
            .client
            .request(request.method, request.url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::transport(&url, e))?;
        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::transport(&url, e))?;

        Ok(ApiResponse::from_bytes(status, &bytes))
    }
}

/// Client for the remote API
pub struct ApiClient {
    base_url: String,
    demo: bool,
    transport: Box<dyn Transport>,
}

impl ApiClient {
    /// Client talking HTTP to the configured service
    pub fn new(config: &ApiConfig) -> Self {
        Self::with_transport(config, HttpTransport::new())
    }

    /// Client sending through an arbitrary transport
    pub fn with_transport(config: &ApiConfig, transport: impl Transport + 'static) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            demo: config.demo,
            transport: Box::new(transport),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn demo(&self) -> bool {
        self.demo
    }

    /// Build a request for `path` under the base URL
    ///
    /// Query pairs are appended in order, followed by the demo flag when
    /// demo mode is on.
    pub fn build_request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        query: &[(&str, &str)],
    ) -> Result<ApiRequest> {
        let raw = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let mut url = Url::parse(&raw).map_err(|e| Error::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;

        if !query.is_empty() || self.demo {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
            if self.demo {
                pairs.append_pair(DEMO_FLAG.0, DEMO_FLAG.1);
            }
        }

        Ok(ApiRequest { method, url, body })
    }

    /// Send a built request
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        debug!(method = %request.method, url = %request.url, "sending request");
        let method = request.method.clone();
        let url = request.url.clone();

        let result = self.transport.send(request).await;
        match &result {
            Ok(response) => debug!(%method, %url, status = response.status, "received response"),
            Err(e) => debug!(%method, %url, error = %e, "no response"),
        }
        result
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        let request = self.build_request(Method::GET, path, None, &[])?;
        self.send(request).await
    }

    pub async fn post(&self, path: &str, body: Option<Value>) -> Result<ApiResponse> {
        let request = self.build_request(Method::POST, path, body, &[])?;
        self.send(request).await
    }

    pub async fn put(&self, path: &str, body: Value) -> Result<ApiResponse> {
        let request = self.build_request(Method::PUT, path, Some(body), &[])?;
        self.send(request).await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
        let request = self.build_request(Method::DELETE, path, None, &[])?;
        self.send(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    /// Transport that answers every request with 200 and remembers it
    #[derive(Clone, Default)]
    struct Echo {
        seen: Arc<Mutex<Vec<ApiRequest>>>,
    }

    #[async_trait]
    impl Transport for Echo {
        async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
            self.seen.lock().unwrap().push(request);
            Ok(ApiResponse::from_bytes(200, b"{}"))
        }
    }

    fn config(base_url: &str, demo: bool) -> ApiConfig {
        ApiConfig {
            base_url: base_url.to_string(),
            demo,
        }
    }

    #[test]
    fn test_build_request_appends_demo_flag() {
        let client = ApiClient::with_transport(&config("https://studio.test/api", true), Echo::default());
        let request = client
            .build_request(Method::GET, "/workspaces", None, &[])
            .unwrap();

        assert_eq!(request.url.as_str(), "https://studio.test/api/workspaces?demo=true");
        assert_eq!(request.query_value("demo").as_deref(), Some("true"));
    }

    #[test]
    fn test_build_request_without_demo_has_no_query() {
        let client = ApiClient::with_transport(&config("https://studio.test/api/", false), Echo::default());
        let request = client
            .build_request(Method::DELETE, "segments/abc", None, &[])
            .unwrap();

        assert_eq!(request.url.as_str(), "https://studio.test/api/segments/abc");
        assert!(request.query_value("demo").is_none());
    }

    #[test]
    fn test_build_request_keeps_query_order() {
        let client = ApiClient::with_transport(&config("https://studio.test/api", true), Echo::default());
        let request = client
            .build_request(Method::GET, "/workspaces", None, &[("page", "2"), ("q", "a b")])
            .unwrap();

        assert_eq!(request.url.query(), Some("page=2&q=a+b&demo=true"));
    }

    #[test]
    fn test_build_request_rejects_bad_base_url() {
        let client = ApiClient::with_transport(&config("not a url", true), Echo::default());
        let err = client
            .build_request(Method::GET, "/workspaces", None, &[])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn test_verbs_map_to_methods_and_bodies() {
        let echo = Echo::default();
        let client = ApiClient::with_transport(&config("https://studio.test/api", true), echo.clone());

        client.get("/workspaces").await.unwrap();
        client.post("/workspaces", Some(json!({"name": "A"}))).await.unwrap();
        client.put("/workspaces/1", json!({"name": "B"})).await.unwrap();
        client.delete("/workspaces/1").await.unwrap();

        let seen = echo.seen.lock().unwrap();
        let methods: Vec<&Method> = seen.iter().map(|r| &r.method).collect();
        assert_eq!(methods, [&Method::GET, &Method::POST, &Method::PUT, &Method::DELETE]);
        assert_eq!(seen[0].body, None);
        assert_eq!(seen[1].body, Some(json!({"name": "A"})));
        assert_eq!(seen[2].body, Some(json!({"name": "B"})));
        assert_eq!(seen[3].body, None);
    }
}
