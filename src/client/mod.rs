//! API client for the model server
//!
//! [`ServerClient`] wraps the base URL of an Ollama-compatible server and
//! exposes typed operations over its REST surface: model listing, single-shot
//! generation, streaming chat, model pull/delete, and a liveness probe. It
//! holds no state besides the configured endpoint; every operation is an
//! independent request/response exchange with no retry and no caching.

pub mod error;
pub mod stream;

pub use error::ClientError;
pub use stream::ChatStream;

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use crate::types::api::{ChatRequest, GenerateRequest, GenerateResponse};
use crate::types::model::ModelDescriptor;

/// Endpoint used when nothing is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Bound on the liveness probe; it reuses the listing path but only looks at
/// the status code.
const LIVENESS_TIMEOUT: Duration = Duration::from_secs(5);

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Root address of the server; all API paths are relative to it
    pub base_url: String,
    /// Timeout for bounded operations (listing, generate, delete). Chat and
    /// pull run unbounded since both can legitimately take minutes.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Wire shape of the listing endpoint
#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelDescriptor>,
}

/// Typed client for the server's REST API
pub struct ServerClient {
    config: ClientConfig,
    http: reqwest::Client,
}

impl ServerClient {
    /// Create a client from an explicit configuration
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// The currently configured base URL
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Replace the base URL for all subsequent calls.
    ///
    /// Empty input is ignored; a trailing slash is stripped so path joining
    /// stays uniform. In-flight operations keep the URL they were bound to.
    pub fn configure_endpoint(&mut self, url: &str) {
        let url = url.trim().trim_end_matches('/');
        if url.is_empty() {
            tracing::warn!("ignoring empty endpoint URL");
            return;
        }
        tracing::info!(endpoint = url, "endpoint configured");
        self.config.base_url = url.to_string();
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// Probe whether the server is reachable.
    ///
    /// True iff the listing path answers with a success status within five
    /// seconds. Never errors; any failure collapses to `false`.
    pub async fn check_availability(&self) -> bool {
        let url = self.url("/api/tags");
        match self.http.get(&url).timeout(LIVENESS_TIMEOUT).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                tracing::debug!("liveness probe failed: {}", e);
                false
            }
        }
    }

    /// List the models available on the server.
    ///
    /// A server with no models yields an empty list, not an error.
    pub async fn list_models(&self) -> Result<Vec<ModelDescriptor>, ClientError> {
        let url = self.url("/api/tags");
        let resp = self
            .http
            .get(&url)
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| ClientError::ServerUnreachable {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            return Err(ClientError::ServerUnreachable {
                url,
                reason: format!("server returned status {}", resp.status()),
            });
        }

        let tags: TagsResponse = resp.json().await.map_err(|e| ClientError::ServerUnreachable {
            url,
            reason: format!("invalid listing payload: {e}"),
        })?;

        tracing::debug!(count = tags.models.len(), "listed models");
        Ok(tags.models)
    }

    /// Single-shot text generation; streaming is always disabled.
    pub async fn generate(
        &self,
        mut request: GenerateRequest,
    ) -> Result<GenerateResponse, ClientError> {
        request.stream = Some(false);
        let url = self.url("/api/generate");
        tracing::debug!(model = %request.model, "generate request");

        let resp = self
            .http
            .post(&url)
            .timeout(self.config.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| ClientError::GenerationFailed(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ClientError::GenerationFailed(format!(
                "server returned status {}",
                resp.status()
            )));
        }

        resp.json()
            .await
            .map_err(|e| ClientError::GenerationFailed(format!("invalid response payload: {e}")))
    }

    /// Start a streaming chat exchange; streaming is always enabled.
    ///
    /// Returns a lazy sequence of response fragments decoded as bytes arrive.
    /// Failures before the first byte are [`ClientError::ChatStartFailed`];
    /// failures after at least one fragment surface on the stream as
    /// [`ClientError::ChatStreamInterrupted`]. Dropping the stream closes the
    /// connection.
    pub async fn chat(&self, mut request: ChatRequest) -> Result<ChatStream, ClientError> {
        request.stream = Some(true);
        let url = self.url("/api/chat");
        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            "chat request"
        );

        let resp = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ClientError::ChatStartFailed(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ClientError::ChatStartFailed(format!(
                "server returned status {}",
                resp.status()
            )));
        }

        Ok(ChatStream::new(resp))
    }

    /// Pull a model onto the server, returning once the exchange completes.
    ///
    /// The server emits streaming progress records; this client drains them
    /// and treats the whole exchange as atomic success/failure.
    pub async fn pull_model(&self, name: &str) -> Result<(), ClientError> {
        let url = self.url("/api/pull");
        tracing::info!(model = name, "pulling model");

        let mut resp = self
            .http
            .post(&url)
            .json(&json!({ "name": name }))
            .send()
            .await
            .map_err(|e| ClientError::ModelPullFailed {
                name: name.to_string(),
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            return Err(ClientError::ModelPullFailed {
                name: name.to_string(),
                reason: format!("server returned status {}", resp.status()),
            });
        }

        // drain progress records until the server finishes
        while let Some(chunk) = resp.chunk().await.map_err(|e| ClientError::ModelPullFailed {
            name: name.to_string(),
            reason: e.to_string(),
        })? {
            let _ = chunk;
        }

        tracing::info!(model = name, "pull complete");
        Ok(())
    }

    /// Delete a model from the server.
    ///
    /// Deleting a model the server does not have is an error, not a silent
    /// success.
    pub async fn delete_model(&self, name: &str) -> Result<(), ClientError> {
        let url = self.url("/api/delete");
        tracing::info!(model = name, "deleting model");

        let resp = self
            .http
            .delete(&url)
            .timeout(self.config.timeout)
            .json(&json!({ "name": name }))
            .send()
            .await
            .map_err(|e| ClientError::ModelDeleteFailed {
                name: name.to_string(),
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            return Err(ClientError::ModelDeleteFailed {
                name: name.to_string(),
                reason: format!("server returned status {}", resp.status()),
            });
        }

        Ok(())
    }
}

impl Default for ServerClient {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}
