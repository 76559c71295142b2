//! HTTP transport for the admin API.

use crate::config::WireMockConfig;
use crate::error::{AdminError, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method};
use url::Url;

/// A single admin API request.
#[derive(Debug, Clone)]
pub struct AdminRequest {
    pub method: Method,
    /// Path relative to the server root, e.g. `__admin/mappings`
    pub path: String,
    pub body: Option<Vec<u8>>,
}

impl AdminRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }
}

/// Raw answer from the admin API, before classification.
#[derive(Debug, Clone)]
pub struct AdminResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Sends admin requests to the mock server.
#[async_trait]
pub trait AdminTransport: Send + Sync {
    /// Execute one request. Errors only for failures below HTTP; any status
    /// code is a successful transport round trip.
    async fn execute(&self, request: AdminRequest) -> Result<AdminResponse>;
}

/// `reqwest`-backed transport.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
}

impl ReqwestTransport {
    pub fn new(config: &WireMockConfig) -> Result<Self> {
        let base_url = config.base_url()?;
        // The bridge enforces the bounded wait; this only reaps stragglers
        let client = Client::builder()
            .timeout(config.timeout() * 2)
            .build()
            .map_err(|e| AdminError::runtime(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|_| AdminError::invalid_url(format!("{}{}", self.base_url, path)))
    }
}

#[async_trait]
impl AdminTransport for ReqwestTransport {
    async fn execute(&self, request: AdminRequest) -> Result<AdminResponse> {
        let url = self.url(&request.path)?;

        let mut builder = self
            .client
            .request(request.method, url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| AdminError::invalid_response(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| AdminError::invalid_response(e.to_string()))?;

        Ok(AdminResponse {
            status,
            body: body.to_vec(),
        })
    }
}
