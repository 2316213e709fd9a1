//! Executes `HttpRequest`s.
//!
//! The client core never touches the network; a `Transport` does. The
//! binary uses `ReqwestTransport`, tests route requests into the mock
//! server's router directly.

use std::future::Future;

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

pub trait Transport: Send + Sync {
    /// Performs one round-trip. Non-2xx statuses are returned as data;
    /// only a missing response is an error.
    fn execute(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &request.path);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
