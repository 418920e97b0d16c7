//! Roster backend HTTP client.
//!
//! Reqwest-backed [`Transport`]. Headers arrive already built by the
//! session; this layer only resolves the URL, encodes the body, and turns
//! the reply into status plus body text.

use crate::error::AppError;
use crate::services::transport::{HttpRequest, HttpResponse, Method, RequestBody, Transport};
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::multipart::{Form, Part};
use reqwest::Client;

/// API client configuration.
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL of the backend (e.g., `http://localhost:5000`).
    pub base_url: String,

    /// Request timeout in seconds. `None` never times out.
    pub timeout_secs: Option<u64>,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: crate::config::DEFAULT_API_URL.to_string(),
            timeout_secs: None,
        }
    }
}

/// Roster backend API client.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    config: ApiClientConfig,
}

impl ApiClient {
    /// Create a new API client.
    pub fn new(config: ApiClientConfig) -> Result<Self, AppError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(std::time::Duration::from_secs(secs));
        }

        let client = builder
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Full URL for an endpoint path.
    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, AppError> {
        let url = self.api_url(&request.path);

        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        };

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match request.body {
            Some(RequestBody::Json(value)) => builder.body(serde_json::to_vec(&value)?),
            Some(RequestBody::Multipart(file)) => {
                let part = Part::bytes(file.bytes)
                    .file_name(file.file_name)
                    .mime_str(&file.mime)
                    .map_err(|e| AppError::invalid_input_field(e.to_string(), "file"))?;
                builder.multipart(Form::new().part("file", part))
            }
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::network(format!("Failed to read response body: {}", e)))?;

        Ok(HttpResponse { status, body })
    }
}

impl Transport for ApiClient {
    fn execute(&self, request: HttpRequest) -> BoxFuture<'_, Result<HttpResponse, AppError>> {
        self.send(request).boxed()
    }
}
