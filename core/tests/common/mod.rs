//! In-process transport: requests go straight into the mock server's router.

use std::sync::Arc;

use axum::body::Body;
use http_body_util::BodyExt;
use mock_server::{app_with, InMemoryRepository};
use todo_core::{ApiClient, HttpRequest, HttpResponse, Transport, TransportError};
use tower::ServiceExt;

pub const BASE_URL: &str = "http://mock";

#[derive(Clone)]
pub struct RouterTransport {
    router: axum::Router,
}

impl RouterTransport {
    pub fn new(repo: InMemoryRepository) -> Self {
        Self {
            router: app_with(Arc::new(repo)),
        }
    }
}

impl Transport for RouterTransport {
    async fn execute(&self, req: HttpRequest) -> Result<HttpResponse, TransportError> {
        let uri = req.path.strip_prefix(BASE_URL).unwrap_or(&req.path).to_string();
        let mut builder = axum::http::Request::builder()
            .method(req.method.as_str())
            .uri(uri);
        for (name, value) in &req.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let request = builder
            .body(Body::from(req.body.unwrap_or_default()))
            .map_err(|e| TransportError(e.to_string()))?;

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .map_err(|e| TransportError(e.to_string()))?;
        let status = response.status().as_u16();
        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| TransportError(e.to_string()))?
            .to_bytes();

        Ok(HttpResponse {
            status,
            headers: Vec::new(),
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

pub fn seeded_api() -> ApiClient<RouterTransport> {
    ApiClient::new(BASE_URL, RouterTransport::new(InMemoryRepository::seeded()))
}

#[allow(dead_code)]
pub fn empty_api() -> ApiClient<RouterTransport> {
    ApiClient::new(BASE_URL, RouterTransport::new(InMemoryRepository::new()))
}
