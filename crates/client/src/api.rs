//! REST client for the conversion backend's HTTP endpoints.
//!
//! [`ConverterApi`] wraps the backend's JSON API (settings, directory
//! browsing, sequence scanning, job launch/cancel, dependency status
//! and temp cleanup) using [`reqwest`]. The rest of the crate talks to
//! it through the [`ConverterBackend`] trait so the controller can be
//! driven by a scripted backend in tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use seqconv_core::browse::BrowseResult;
use seqconv_core::job_config::JobConfig;
use seqconv_core::sequence::SequenceDescriptor;
use seqconv_core::settings::SettingsRecord;

/// Generic `{"status": "..."}` acknowledgement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub status: String,
}

/// Response of `GET /api/deps`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyStatus {
    /// `true` when every external tool the backend needs was found.
    pub ok: bool,
    #[serde(default)]
    pub issues: Vec<String>,
    /// Tool name to version string or diagnostic.
    #[serde(default)]
    pub details: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct ScanRequest<'a> {
    path: &'a str,
}

/// Errors from the REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (connect, DNS, TLS, body read).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("backend error ({status}): {body}")]
    Status { status: u16, body: String },

    /// The backend answered 2xx with a body we could not decode.
    #[error("Malformed response: {0}")]
    Decode(String),
}

/// Backend operations consumed by the client.
#[async_trait]
pub trait ConverterBackend: Send + Sync {
    async fn load_settings(&self) -> Result<SettingsRecord, ApiError>;
    async fn save_settings(&self, record: &SettingsRecord) -> Result<(), ApiError>;
    async fn browse(&self, path: &str) -> Result<BrowseResult, ApiError>;
    async fn scan(&self, path: &str) -> Result<Vec<SequenceDescriptor>, ApiError>;
    async fn start_conversion(&self, config: &JobConfig) -> Result<Ack, ApiError>;
    /// Ask the backend to stop the running job. Confirmation arrives
    /// later on the status channel.
    async fn cancel_conversion(&self) -> Result<Ack, ApiError>;
    async fn dependency_status(&self) -> Result<DependencyStatus, ApiError>;
    async fn cleanup(&self) -> Result<Ack, ApiError>;
}

/// HTTP client for one conversion backend.
#[derive(Debug, Clone)]
pub struct ConverterApi {
    client: reqwest::Client,
    api_url: String,
}

impl ConverterApi {
    /// * `api_url` - Base HTTP URL, e.g. `http://127.0.0.1:8000`.
    pub fn new(api_url: String) -> Self {
        Self::with_client(reqwest::Client::new(), api_url)
    }

    /// Reuse an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: String) -> Self {
        let api_url = api_url.trim_end_matches('/').to_string();
        Self { client, api_url }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{path}", self.api_url)
    }

    // ---- private helpers ----

    /// Return the response unchanged on 2xx, otherwise an
    /// [`ApiError::Status`] carrying the backend's error detail.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: error_detail(body),
            });
        }
        Ok(response)
    }

    /// Decode a successful JSON body, keeping transport and decode
    /// failures apart.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let response = Self::ensure_success(response).await?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Pull FastAPI's `{"detail": "..."}` message out of an error body.
fn error_detail(body: String) -> String {
    #[derive(Deserialize)]
    struct Detail {
        detail: serde_json::Value,
    }

    match serde_json::from_str::<Detail>(&body) {
        Ok(Detail {
            detail: serde_json::Value::String(message),
        }) => message,
        Ok(Detail { detail }) => detail.to_string(),
        Err(_) => body,
    }
}

#[async_trait]
impl ConverterBackend for ConverterApi {
    async fn load_settings(&self) -> Result<SettingsRecord, ApiError> {
        let response = self.client.get(self.endpoint("settings")).send().await?;
        let raw: serde_json::Value = Self::parse_response(response).await?;
        SettingsRecord::from_json(raw).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn save_settings(&self, record: &SettingsRecord) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.endpoint("settings"))
            .json(record)
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn browse(&self, path: &str) -> Result<BrowseResult, ApiError> {
        let response = self
            .client
            .get(self.endpoint("browse"))
            .query(&[("path", path)])
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn scan(&self, path: &str) -> Result<Vec<SequenceDescriptor>, ApiError> {
        let response = self
            .client
            .post(self.endpoint("scan"))
            .json(&ScanRequest { path })
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn start_conversion(&self, config: &JobConfig) -> Result<Ack, ApiError> {
        let response = self
            .client
            .post(self.endpoint("convert"))
            .json(config)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn cancel_conversion(&self) -> Result<Ack, ApiError> {
        let response = self.client.post(self.endpoint("cancel")).send().await?;
        Self::parse_response(response).await
    }

    async fn dependency_status(&self) -> Result<DependencyStatus, ApiError> {
        let response = self.client.get(self.endpoint("deps")).send().await?;
        Self::parse_response(response).await
    }

    async fn cleanup(&self) -> Result<Ack, ApiError> {
        let response = self.client.post(self.endpoint("cleanup")).send().await?;
        Self::parse_response(response).await
    }
}
