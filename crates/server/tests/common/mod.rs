//! Common test utilities for in-process API testing.
//!
//! The fixture builds the full router over the seeded sample catalog (or any
//! other data source, such as a failing [`MockDataSource`]) and drives it
//! with `oneshot`, so no port is bound.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use mangashelf_core::{Config, DataSource, ImageProxy, MangaCatalog};
use mangashelf_server::{api::create_router, state::AppState};

/// Re-export fixtures for test convenience
pub use mangashelf_core::testing::{fixtures, MockDataSource};

/// In-process server over a chosen data source.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_search() {
///     let fixture = TestFixture::new();
///     let response = fixture.get("/search?q=artist:hyji").await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    pub router: Router,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Parsed JSON, or `Value::Null` when the body is not JSON.
    pub body: Value,
    pub bytes: Bytes,
}

impl TestResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Ids of a JSON array of items, in response order.
    pub fn ids(&self) -> Vec<i64> {
        self.body
            .as_array()
            .expect("Expected a JSON array")
            .iter()
            .map(|item| item["id"].as_i64().expect("Item without integer id"))
            .collect()
    }
}

impl TestFixture {
    /// Fixture over the seeded sample catalog with default config.
    pub fn new() -> Self {
        Self::with_source(Arc::new(fixtures::sample_store()))
    }

    pub fn with_source(source: Arc<dyn DataSource>) -> Self {
        Self::with_config(source, Config::default())
    }

    pub fn with_config(source: Arc<dyn DataSource>, config: Config) -> Self {
        let catalog = MangaCatalog::new(source).with_page_size(config.catalog.page_size);
        let proxy = ImageProxy::new(&config.proxy).expect("Failed to create image proxy");
        let state = Arc::new(AppState::new(config, catalog, proxy));

        Self {
            router: create_router(state),
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
            bytes,
        }
    }
}
