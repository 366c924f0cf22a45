//! Client errors
//!
//! One variant per failing operation, per the error taxonomy of the API
//! surface. All variants are recoverable from the caller's point of view.

use thiserror::Error;

/// Errors surfaced by [`ServerClient`](crate::client::ServerClient) operations
#[derive(Debug, Error)]
pub enum ClientError {
    /// A read-path request could not reach the server or got a non-success
    /// status. Carries the URL that was attempted.
    #[error("server unreachable at {url}: {reason}. Make sure the Ollama server is running.")]
    ServerUnreachable { url: String, reason: String },

    /// Single-shot generation failed
    #[error("failed to generate response: {0}")]
    GenerationFailed(String),

    /// The chat connection or handshake did not succeed
    #[error("failed to start chat: {0}")]
    ChatStartFailed(String),

    /// The chat stream failed after at least one fragment was yielded
    #[error("chat stream interrupted: {0}")]
    ChatStreamInterrupted(String),

    /// Pulling a model failed
    #[error("failed to pull model '{name}': {reason}")]
    ModelPullFailed { name: String, reason: String },

    /// Deleting a model failed
    #[error("failed to delete model '{name}': {reason}")]
    ModelDeleteFailed { name: String, reason: String },
}

impl ClientError {
    /// The URL the failed request was sent to, when the variant records one
    pub fn url(&self) -> Option<&str> {
        match self {
            ClientError::ServerUnreachable { url, .. } => Some(url),
            _ => None,
        }
    }

    /// The model name involved, when the variant records one
    pub fn model_name(&self) -> Option<&str> {
        match self {
            ClientError::ModelPullFailed { name, .. }
            | ClientError::ModelDeleteFailed { name, .. } => Some(name),
            _ => None,
        }
    }
}
